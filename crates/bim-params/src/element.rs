//! Element parameter facade
//!
//! Binds one element to the parameter operations and offers `*_or`
//! variants that downgrade an absent parameter to a caller default.

use crate::error::ParamError;
use crate::identity::RevitParam;
use bim_host::{DocumentHost, ElementRef, ParamValue};

/// Parameter access bound to a single element
#[derive(Clone, Copy)]
pub struct ElementParams<'h> {
    host: &'h dyn DocumentHost,
    element: ElementRef,
}

impl<'h> ElementParams<'h> {
    /// Bind the facade to `element`
    ///
    /// # Errors
    /// [`ParamError::InvalidArgument`] for an invalid element id
    pub fn new(host: &'h dyn DocumentHost, element: ElementRef) -> Result<Self, ParamError> {
        if !element.element.is_valid() {
            return Err(ParamError::invalid_argument("element", "invalid element id"));
        }
        Ok(Self { host, element })
    }

    /// Bound element
    #[inline]
    #[must_use]
    pub fn element(&self) -> ElementRef {
        self.element
    }

    /// Check whether the element carries `param`
    #[inline]
    #[must_use]
    pub fn exists(&self, param: &RevitParam) -> bool {
        param.exists_on(self.host, self.element)
    }

    /// Stored value of `param`
    ///
    /// # Errors
    /// [`ParamError::NotFound`] if the element does not carry `param`
    pub fn value(&self, param: &RevitParam) -> Result<Option<ParamValue>, ParamError> {
        param.value(self.host, self.element)
    }

    /// Stored value of `param`, or `default` if absent or empty
    ///
    /// # Errors
    /// Host failures other than absence
    pub fn value_or(
        &self,
        param: &RevitParam,
        default: impl Into<ParamValue>,
    ) -> Result<ParamValue, ParamError> {
        match param.value(self.host, self.element) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Ok(default.into()),
            Err(e) if e.is_lookup() => Ok(default.into()),
            Err(e) => Err(e),
        }
    }

    /// Formatted value of `param`
    ///
    /// # Errors
    /// [`ParamError::NotFound`] if the element does not carry `param`
    pub fn display_string(&self, param: &RevitParam) -> Result<Option<String>, ParamError> {
        param.display_string(self.host, self.element)
    }

    /// Formatted value of `param`, or `default` if absent or empty
    ///
    /// # Errors
    /// Host failures other than absence
    pub fn display_string_or(
        &self,
        param: &RevitParam,
        default: impl Into<String>,
    ) -> Result<String, ParamError> {
        match param.display_string(self.host, self.element) {
            Ok(Some(s)) => Ok(s),
            Ok(None) => Ok(default.into()),
            Err(e) if e.is_lookup() => Ok(default.into()),
            Err(e) => Err(e),
        }
    }

    /// Write `value` into `param`
    ///
    /// # Errors
    /// See [`RevitParam::set_value`]
    pub fn set(&self, param: &RevitParam, value: impl Into<ParamValue>) -> Result<(), ParamError> {
        param.set_value(self.host, self.element, value)
    }

    /// Copy the value of `source` into `target`
    ///
    /// # Errors
    /// See [`RevitParam::set_value_from`]
    pub fn set_from(&self, target: &RevitParam, source: &RevitParam) -> Result<(), ParamError> {
        target.set_value_from(self.host, self.element, source)
    }

    /// Clear `param`; `false` on any failure
    #[inline]
    #[must_use]
    pub fn remove(&self, param: &RevitParam) -> bool {
        param.remove_value(self.host, self.element)
    }
}

impl std::fmt::Debug for ElementParams<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementParams")
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}

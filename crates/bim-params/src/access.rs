//! Parameter access
//!
//! Uniform exists/get/set operations on [`RevitParam`], dispatched per
//! variant. Resolution failures surface as [`ParamError::NotFound`]; only
//! [`RevitParam::exists_on`], [`RevitParam::exists_in`] and
//! [`RevitParam::remove_value`] fold them into a boolean.

use crate::error::ParamError;
use crate::identity::RevitParam;
use bim_host::{
    Definition, DefinitionKind, DocumentHost, DocumentId, ElementClass, ElementInfo, ElementRef,
    HostError, ParamBinding, ParamValue, ParameterInfo,
};

impl RevitParam {
    /// Check whether `definition` is the low-level handle of this identity
    ///
    /// Shared identities match only shared definitions, project identities
    /// only document-scoped ones, built-in identities only the built-in
    /// definition with the same host type id.
    ///
    /// No document argument is taken: a [`Definition`] is read from one
    /// document and already carries its namespace, name and type id.
    #[must_use]
    pub fn is_revit_param(&self, definition: &Definition) -> bool {
        match (self, &definition.kind) {
            (Self::System(p), DefinitionKind::BuiltIn { type_id }) => p.type_id() == type_id,
            (Self::Shared(p), DefinitionKind::Shared) => p.name() == definition.name,
            (Self::Project(p), DefinitionKind::Project) => p.name() == definition.name,
            _ => false,
        }
    }

    /// Check whether the document knows this parameter
    ///
    /// Built-in parameters always exist. Never fails: any resolution error
    /// reads as absence.
    #[must_use]
    pub fn exists_in(&self, host: &dyn DocumentHost, document: DocumentId) -> bool {
        match self {
            Self::System(_) => true,
            Self::Shared(_) | Self::Project(_) => match self.find_binding(host, document) {
                Ok(found) => found.is_some(),
                Err(e) => {
                    tracing::debug!(param = %self.id(), %document, error = %e, "binding lookup failed");
                    false
                }
            },
        }
    }

    /// Binding that governs this parameter in the document
    ///
    /// # Errors
    /// [`ParamError::NotFound`] if no registered definition matches
    pub fn binding(
        &self,
        host: &dyn DocumentHost,
        document: DocumentId,
    ) -> Result<ParamBinding, ParamError> {
        self.find_binding(host, document)?
            .ok_or_else(|| ParamError::not_found(self.id(), document))
    }

    /// Element that backs this parameter's definition in the document
    ///
    /// Built-in parameters have no definition element and yield `None`.
    ///
    /// # Errors
    /// Host lookup failures
    pub fn param_element(
        &self,
        host: &dyn DocumentHost,
        document: DocumentId,
    ) -> Result<Option<ElementInfo>, ParamError> {
        let class = match self {
            Self::System(_) => return Ok(None),
            Self::Shared(_) => ElementClass::SharedParameterElement,
            Self::Project(_) => ElementClass::ParameterElement,
        };
        let name = self.name();
        let mut found = host.find_elements(document, &class, &|e: &ElementInfo| e.name == name)?;

        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    /// Check whether the element carries this parameter
    ///
    /// Never fails: invalid elements and resolution errors read as absence.
    #[must_use]
    pub fn exists_on(&self, host: &dyn DocumentHost, element: ElementRef) -> bool {
        self.live(host, element).is_ok()
    }

    /// Stored value in its native storage type
    ///
    /// # Returns
    /// `None` if the parameter exists but holds no value
    ///
    /// # Errors
    /// [`ParamError::InvalidArgument`] for an invalid element,
    /// [`ParamError::NotFound`] if the parameter is absent
    pub fn value(
        &self,
        host: &dyn DocumentHost,
        element: ElementRef,
    ) -> Result<Option<ParamValue>, ParamError> {
        Ok(self.live(host, element)?.value)
    }

    /// Host-formatted, unit-aware representation of the value
    ///
    /// # Errors
    /// Same as [`RevitParam::value`]
    pub fn display_string(
        &self,
        host: &dyn DocumentHost,
        element: ElementRef,
    ) -> Result<Option<String>, ParamError> {
        Ok(self.live(host, element)?.display)
    }

    /// Write a value through to the live parameter
    ///
    /// # Errors
    /// [`ParamError::TypeMismatch`] if the value's type differs from the
    /// parameter's storage type; resolution and host errors otherwise
    pub fn set_value(
        &self,
        host: &dyn DocumentHost,
        element: ElementRef,
        value: impl Into<ParamValue>,
    ) -> Result<(), ParamError> {
        let value = value.into();
        let live = self.live(host, element)?;
        self.check_storage(&live, &value)?;

        host.set_parameter(element, &self.lookup(), &value)?;
        Ok(())
    }

    /// Copy the value of `source` on the same element into this parameter
    ///
    /// An empty source clears this parameter.
    ///
    /// # Errors
    /// Resolution failure of either parameter, or [`ParamError::TypeMismatch`]
    pub fn set_value_from(
        &self,
        host: &dyn DocumentHost,
        element: ElementRef,
        source: &RevitParam,
    ) -> Result<(), ParamError> {
        let target = self.live(host, element)?;
        let source_live = source.live(host, element)?;

        match source_live.value {
            Some(value) => {
                self.check_storage(&target, &value)?;
                host.set_parameter(element, &self.lookup(), &value)?;
            }
            None => host.clear_parameter(element, &self.lookup())?,
        }
        Ok(())
    }

    /// Clear the parameter's value
    ///
    /// # Returns
    /// `true` on success, `false` on any failure including absence
    #[must_use]
    pub fn remove_value(&self, host: &dyn DocumentHost, element: ElementRef) -> bool {
        let cleared = self
            .live(host, element)
            .and_then(|_| host.clear_parameter(element, &self.lookup()).map_err(ParamError::from));

        match cleared {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(param = %self.id(), %element, error = %e, "remove value failed");
                false
            }
        }
    }

    fn find_binding(
        &self,
        host: &dyn DocumentHost,
        document: DocumentId,
    ) -> Result<Option<ParamBinding>, ParamError> {
        Ok(host
            .bindings(document)?
            .into_iter()
            .find(|b| self.is_revit_param(&b.definition)))
    }

    fn live(&self, host: &dyn DocumentHost, element: ElementRef) -> Result<ParameterInfo, ParamError> {
        if !element.element.is_valid() {
            return Err(ParamError::invalid_argument("element", "invalid element id"));
        }

        match host.parameter(element, &self.lookup()) {
            Ok(Some(info)) => Ok(info),
            Ok(None) => Err(ParamError::not_found(self.id(), element)),
            Err(HostError::UnknownElement { .. }) => Err(ParamError::not_found(self.id(), element)),
            Err(e) => Err(e.into()),
        }
    }

    fn check_storage(&self, live: &ParameterInfo, value: &ParamValue) -> Result<(), ParamError> {
        if live.storage_type == value.storage_type() {
            Ok(())
        } else {
            Err(ParamError::TypeMismatch {
                param: self.id().to_owned(),
                expected: live.storage_type,
                actual: value.storage_type(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ProjectParam, SharedParam, SystemParam};
    use bim_host::{DefinitionId, StorageType};

    fn definition(name: &str, kind: DefinitionKind) -> Definition {
        Definition {
            id: DefinitionId::new(1),
            name: name.into(),
            kind,
            storage_type: StorageType::String,
        }
    }

    #[test]
    fn shared_matches_only_shared_definitions() {
        let p: RevitParam = SharedParam::new("Apt", "Apartment", StorageType::String)
            .unwrap()
            .into();

        assert!(p.is_revit_param(&definition("Apartment", DefinitionKind::Shared)));
        assert!(!p.is_revit_param(&definition("Apartment", DefinitionKind::Project)));
        assert!(!p.is_revit_param(&definition("Other", DefinitionKind::Shared)));
    }

    #[test]
    fn project_matches_only_project_definitions() {
        let p: RevitParam = ProjectParam::new("Stage", "Stage", StorageType::String)
            .unwrap()
            .into();

        assert!(p.is_revit_param(&definition("Stage", DefinitionKind::Project)));
        assert!(!p.is_revit_param(&definition("Stage", DefinitionKind::Shared)));
    }

    #[test]
    fn system_matches_by_type_id() {
        let p: RevitParam = SystemParam::new("AllModelMark", None).unwrap().into();
        let builtin = DefinitionKind::BuiltIn {
            type_id: "autodesk.revit.parameter:allModelMark-1.0.0".into(),
        };
        let other = DefinitionKind::BuiltIn {
            type_id: "autodesk.revit.parameter:roomName-1.0.0".into(),
        };

        assert!(p.is_revit_param(&definition("Whatever label", builtin)));
        assert!(!p.is_revit_param(&definition("Mark", other)));
        assert!(!p.is_revit_param(&definition("Mark", DefinitionKind::Project)));
    }
}

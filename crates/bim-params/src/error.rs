//! Parameter error types

use bim_host::{HostError, StorageType};

/// Errors raised by parameter identities and parameter access
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// Required input missing or malformed
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
        /// Reason
        reason: String,
    },

    /// Parameter could not be located
    #[error("parameter '{param}' not found in {target}")]
    NotFound {
        /// Parameter id
        param: String,
        /// Element or document that was searched
        target: String,
    },

    /// Value type disagrees with the parameter's storage type
    #[error("type mismatch for '{param}': storage is {expected}, value is {actual}")]
    TypeMismatch {
        /// Parameter id
        param: String,
        /// Storage type of the live parameter
        expected: StorageType,
        /// Storage type implied by the value
        actual: StorageType,
    },

    /// Attribute is derived and cannot be set
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Host document model failure
    #[error("host error: {0}")]
    Host(#[from] HostError),
}

impl ParamError {
    /// Create an invalid argument error
    #[inline]
    #[must_use]
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    #[inline]
    #[must_use]
    pub fn not_found(param: impl Into<String>, target: impl ToString) -> Self {
        Self::NotFound {
            param: param.into(),
            target: target.to_string(),
        }
    }

    /// Check if the error means the parameter is absent
    #[inline]
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the error is a caller input error
    #[inline]
    #[must_use]
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

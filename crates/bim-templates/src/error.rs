//! Provisioning error types

use bim_host::HostError;
use bim_params::ParamError;
use std::path::PathBuf;

/// Errors raised while provisioning a target document
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    /// Parameter resolution or access failed
    #[error("parameter error: {0}")]
    Param(#[from] ParamError),

    /// Host document operation failed
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// Configuration is invalid or unreadable
    #[error("configuration error: {0}")]
    Config(String),

    /// Template document could not be opened
    #[error("cannot open template '{}': {source}", path.display())]
    TemplateOpen {
        /// Template path
        path: PathBuf,
        /// Host failure
        #[source]
        source: HostError,
    },
}

impl ProvisioningError {
    /// Create a configuration error
    #[inline]
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check whether this is a missing parameter or element
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        match self {
            Self::Param(e) => e.is_lookup(),
            Self::Host(e) => e.is_not_found(),
            Self::Config(_) | Self::TemplateOpen { .. } => false,
        }
    }
}

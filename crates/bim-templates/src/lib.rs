//! BIM Template Provisioning
//!
//! Aligns a target document with the parameters template shipped for the
//! host version.
//!
//! # Overview
//!
//! - [`ProjectParameters`]: provisions parameter definitions and bindings,
//!   key schedules and browser organization
//! - [`ProvisioningConfig`]: template library root and host version, with
//!   the derived template paths
//! - [`ScheduleRule`]: a template schedule named by title
//! - [`logging::init_logging`]: subscriber setup for hosts and tools
//!
//! # Example
//!
//! ```rust,ignore
//! use bim_templates::{ProjectParameters, ProvisioningConfig, ScheduleRule};
//!
//! let config = ProvisioningConfig::from_toml_file("provisioning.toml")?;
//! let provisioning = ProjectParameters::new(&host, config)?;
//!
//! provisioning.setup_params(target, [apartment_number, room_finish])?;
//! provisioning.setup_schedules(target, false, &[ScheduleRule::new("Rooms")?])?;
//! provisioning.setup_browser_organization(target)?;
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod project_parameters;
pub mod schedule;

// Re-exports
pub use config::{BrowserOrganizationConfig, ProvisioningConfig};
pub use error::ProvisioningError;
pub use logging::{init_logging, LogFormat};
pub use project_parameters::ProjectParameters;
pub use schedule::ScheduleRule;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for provisioning
    pub use crate::{
        BrowserOrganizationConfig, ProjectParameters, ProvisioningConfig, ProvisioningError,
        ScheduleRule,
    };
    pub use bim_params::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

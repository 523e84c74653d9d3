//! BIM Parameter Abstraction
//!
//! One interface over three structurally different kinds of parameters.
//!
//! # Overview
//!
//! - [`SystemParam`]: built-in parameter, resolved through a precompiled
//!   manifest; its name is derived from a label table and cannot be set
//! - [`SharedParam`]: definition loaded from a shared definition file
//! - [`ProjectParam`]: definition scoped to one document
//! - [`RevitParam`]: closed sum over the three, with uniform
//!   exists/get/set/describe operations
//! - [`ElementParams`]: convenience facade that downgrades "absent" to
//!   caller-supplied defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use bim_params::{ElementParams, RevitParam, SystemParam};
//!
//! let mark: RevitParam = SystemParam::new("AllModelMark", None)?.into();
//! let params = ElementParams::new(&host, door)?;
//!
//! params.set(&mark, "D-101")?;
//! assert_eq!(params.value_or(&mark, "")?.as_str(), Some("D-101"));
//! ```

#![warn(missing_docs)]

pub mod access;
pub mod element;
pub mod error;
pub mod identity;
pub mod known;
pub mod language;
pub mod manifest;

// Re-exports
pub use element::ElementParams;
pub use error::ParamError;
pub use identity::{ParamKind, ProjectParam, RevitParam, SharedParam, SystemParam};
pub use language::LanguageType;
pub use manifest::SystemParamSpec;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for parameter access
    pub use crate::{
        ElementParams, LanguageType, ParamError, ParamKind, ProjectParam, RevitParam,
        SharedParam, SystemParam,
    };
    pub use bim_host::{ElementId, ElementRef, ParamValue, StorageType};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

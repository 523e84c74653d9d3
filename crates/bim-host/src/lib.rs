//! BIM Host Seam
//!
//! The narrow slice of the host CAD/BIM document model that parameter access
//! and provisioning depend on.
//!
//! # Overview
//!
//! - [`DocumentHost`]: open/close documents, transactions, element transfer,
//!   element lookup, bindings and per-element parameter primitives
//! - [`Transaction`], [`TransactionGroup`], [`OpenedDocument`]: scope guards
//!   that roll back or close on every exit path
//! - [`EventBridge`]: single-slot bridge that marshals work onto the host's
//!   document-modification thread
//!
//! # Example
//!
//! ```rust,ignore
//! use bim_host::{DocumentHost, Transaction};
//!
//! let tx = Transaction::start(&host, target, "Rename rooms")?;
//! host.delete_elements(target, &ids)?;
//! tx.commit()?;
//! ```

#![warn(missing_docs)]

pub mod bridge;
pub mod error;
pub mod host;
pub mod transaction;
pub mod types;

// Re-exports
pub use bridge::{BridgeCompletion, EventBridge, ExternalEvent};
pub use error::HostError;
pub use host::DocumentHost;
pub use transaction::{OpenedDocument, Transaction, TransactionGroup};
pub use types::{
    Binding, BindingKind, Category, CopyPasteOptions, Definition, DefinitionId, DefinitionKind,
    DocumentId, ElementClass, ElementId, ElementInfo, ElementRef, ParamBinding, ParamLookup,
    ParamValue, ParameterInfo, StorageType, Transform, TransactionGroupId, TransactionId,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for host operations
    pub use crate::{
        Category, DocumentHost, DocumentId, ElementClass, ElementId, ElementRef, HostError,
        OpenedDocument, ParamValue, StorageType, Transaction, TransactionGroup,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

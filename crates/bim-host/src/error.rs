//! Host error types

use crate::types::{DocumentId, ElementId, TransactionGroupId, TransactionId};

/// Errors raised by the host document model
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Document could not be opened
    #[error("failed to open document '{path}': {reason}")]
    DocumentOpen {
        /// Path that was requested
        path: String,
        /// Host reason
        reason: String,
    },

    /// Document could not be closed
    #[error("failed to close {document}: {reason}")]
    DocumentClose {
        /// Document handle
        document: DocumentId,
        /// Host reason
        reason: String,
    },

    /// Document handle is not open
    #[error("unknown document: {0}")]
    UnknownDocument(DocumentId),

    /// Element does not exist in the document
    #[error("unknown element {element} in {document}")]
    UnknownElement {
        /// Document handle
        document: DocumentId,
        /// Missing element
        element: ElementId,
    },

    /// Definition does not exist in the document
    #[error("unknown definition '{name}' in {document}")]
    UnknownDefinition {
        /// Document handle
        document: DocumentId,
        /// Definition name or id
        name: String,
    },

    /// Modification attempted with no open transaction
    #[error("{0} has no open transaction")]
    NoOpenTransaction(DocumentId),

    /// Transaction could not be started, committed or rolled back
    #[error("transaction {id:?} failed: {reason}")]
    Transaction {
        /// Transaction handle
        id: Option<TransactionId>,
        /// Host reason
        reason: String,
    },

    /// Transaction group could not be started, assimilated or rolled back
    #[error("transaction group {id:?} failed: {reason}")]
    TransactionGroup {
        /// Group handle
        id: Option<TransactionGroupId>,
        /// Host reason
        reason: String,
    },

    /// Raised external event was superseded or its bridge dropped before it ran
    #[error("external event '{0}' was abandoned before it ran")]
    EventAbandoned(String),

    /// Host refused the operation
    #[error("operation rejected by host: {0}")]
    Rejected(String),

    /// Invalid argument passed to the host
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
        /// Reason
        reason: String,
    },
}

impl HostError {
    /// Create a rejected error
    #[inline]
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Create an invalid argument error
    #[inline]
    #[must_use]
    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// Check if the error means "not there" rather than "broken"
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownElement { .. } | Self::UnknownDefinition { .. }
        )
    }
}

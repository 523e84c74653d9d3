//! Scope guards over host transactions and opened documents
//!
//! Each guard releases its host resource on every exit path: an explicit
//! `commit`/`assimilate`/`close` reports errors to the caller, and `Drop`
//! rolls back or closes when the guard is abandoned by `?` or a panic.

use crate::error::HostError;
use crate::host::DocumentHost;
use crate::types::{DocumentId, TransactionGroupId, TransactionId};
use std::path::{Path, PathBuf};

/// Open transaction; rolled back on drop unless committed
#[must_use = "a transaction is rolled back when dropped"]
pub struct Transaction<'h> {
    host: &'h dyn DocumentHost,
    document: DocumentId,
    id: TransactionId,
    name: String,
    finished: bool,
}

impl<'h> Transaction<'h> {
    /// Start a named transaction on `document`
    ///
    /// # Errors
    /// Propagates the host's refusal to start
    pub fn start(
        host: &'h dyn DocumentHost,
        document: DocumentId,
        name: impl Into<String>,
    ) -> Result<Self, HostError> {
        let name = name.into();
        let id = host.begin_transaction(document, &name)?;
        tracing::debug!(%document, transaction = %name, "transaction started");

        Ok(Self {
            host,
            document,
            id,
            name,
            finished: false,
        })
    }

    /// Commit all changes made since `start`
    ///
    /// # Errors
    /// Commit failure; the host has already rolled back
    pub fn commit(mut self) -> Result<(), HostError> {
        self.finished = true;
        self.host.commit_transaction(self.document, self.id)?;
        tracing::debug!(document = %self.document, transaction = %self.name, "transaction committed");
        Ok(())
    }

    /// Discard all changes made since `start`
    ///
    /// # Errors
    /// Host rollback failure
    pub fn rollback(mut self) -> Result<(), HostError> {
        self.finished = true;
        self.host.rollback_transaction(self.document, self.id)
    }

    /// Transaction name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Document the transaction is open on
    #[inline]
    #[must_use]
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Host handle
    #[inline]
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::warn!(document = %self.document, transaction = %self.name, "transaction abandoned, rolling back");
        if let Err(e) = self.host.rollback_transaction(self.document, self.id) {
            tracing::error!(document = %self.document, transaction = %self.name, error = %e, "rollback failed");
        }
    }
}

/// Open transaction group; rolled back on drop unless assimilated
#[must_use = "a transaction group is rolled back when dropped"]
pub struct TransactionGroup<'h> {
    host: &'h dyn DocumentHost,
    document: DocumentId,
    id: TransactionGroupId,
    name: String,
    finished: bool,
}

impl<'h> TransactionGroup<'h> {
    /// Start a named group on `document`
    ///
    /// # Errors
    /// Propagates the host's refusal to start
    pub fn start(
        host: &'h dyn DocumentHost,
        document: DocumentId,
        name: impl Into<String>,
    ) -> Result<Self, HostError> {
        let name = name.into();
        let id = host.begin_transaction_group(document, &name)?;
        tracing::debug!(%document, group = %name, "transaction group started");

        Ok(Self {
            host,
            document,
            id,
            name,
            finished: false,
        })
    }

    /// Merge the group's committed transactions into one undo step
    ///
    /// # Errors
    /// Host assimilation failure
    pub fn assimilate(mut self) -> Result<(), HostError> {
        self.finished = true;
        self.host.assimilate_transaction_group(self.document, self.id)?;
        tracing::debug!(document = %self.document, group = %self.name, "transaction group assimilated");
        Ok(())
    }

    /// Undo every transaction committed inside the group
    ///
    /// # Errors
    /// Host rollback failure
    pub fn rollback(mut self) -> Result<(), HostError> {
        self.finished = true;
        self.host.rollback_transaction_group(self.document, self.id)
    }

    /// Group name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for TransactionGroup<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::warn!(document = %self.document, group = %self.name, "transaction group abandoned, rolling back");
        if let Err(e) = self.host.rollback_transaction_group(self.document, self.id) {
            tracing::error!(document = %self.document, group = %self.name, error = %e, "group rollback failed");
        }
    }
}

/// A document opened for reading; closed without saving on drop
///
/// Changes made to an opened document are always discarded.
#[must_use = "an opened document is closed when dropped"]
pub struct OpenedDocument<'h> {
    host: &'h dyn DocumentHost,
    document: DocumentId,
    path: PathBuf,
    closed: bool,
}

impl std::fmt::Debug for OpenedDocument<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedDocument")
            .field("document", &self.document)
            .field("path", &self.path)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl<'h> OpenedDocument<'h> {
    /// Open the document at `path`
    ///
    /// # Errors
    /// [`HostError::DocumentOpen`]
    pub fn open(host: &'h dyn DocumentHost, path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref().to_path_buf();
        let document = host.open_document(&path)?;
        tracing::debug!(%document, path = %path.display(), "document opened");

        Ok(Self {
            host,
            document,
            path,
            closed: false,
        })
    }

    /// Document handle
    #[inline]
    #[must_use]
    pub fn id(&self) -> DocumentId {
        self.document
    }

    /// Path the document was opened from
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the document, discarding changes
    ///
    /// # Errors
    /// [`HostError::DocumentClose`]
    pub fn close(mut self) -> Result<(), HostError> {
        self.closed = true;
        self.host.close_document(self.document, false)?;
        tracing::debug!(document = %self.document, "document closed");
        Ok(())
    }
}

impl Drop for OpenedDocument<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.host.close_document(self.document, false) {
            tracing::error!(document = %self.document, path = %self.path.display(), error = %e, "failed to close document");
        }
    }
}

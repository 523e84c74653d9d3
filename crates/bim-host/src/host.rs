//! Document host trait
//!
//! Provides the [`DocumentHost`] trait: the only path through which this
//! workspace touches host documents.

use crate::error::HostError;
use crate::types::{
    Category, CopyPasteOptions, DefinitionId, DocumentId, ElementClass, ElementId, ElementInfo,
    ElementRef, ParamBinding, ParamLookup, ParamValue, ParameterInfo, Transform,
    TransactionGroupId, TransactionId,
};
use std::collections::BTreeSet;
use std::path::Path;

/// Host document model
///
/// Handles are plain values; the host owns the documents behind them.
/// All calls happen on the host's document-modification thread, so methods
/// take `&self` and implementations serialize internally.
///
/// # Contract
/// - Mutating calls (`copy_elements`, `delete_elements`,
///   `set_binding_categories`, `set_parameter`, `clear_parameter`) require
///   an open transaction on the affected document
/// - Rolling back a transaction restores the document to its state at
///   `begin_transaction`
/// - A failed commit leaves the document as if rolled back
pub trait DocumentHost: Send + Sync {
    /// Open a document file
    ///
    /// # Errors
    /// [`HostError::DocumentOpen`] if the file is missing or unreadable
    fn open_document(&self, path: &Path) -> Result<DocumentId, HostError>;

    /// Close a document, optionally saving it
    ///
    /// # Errors
    /// [`HostError::DocumentClose`] or [`HostError::UnknownDocument`]
    fn close_document(&self, document: DocumentId, save_changes: bool) -> Result<(), HostError>;

    /// Document title for diagnostics
    ///
    /// # Errors
    /// [`HostError::UnknownDocument`]
    fn document_title(&self, document: DocumentId) -> Result<String, HostError>;

    /// Start a named transaction
    ///
    /// # Errors
    /// [`HostError::Transaction`] if one cannot be started
    fn begin_transaction(&self, document: DocumentId, name: &str)
        -> Result<TransactionId, HostError>;

    /// Commit a transaction
    ///
    /// # Errors
    /// [`HostError::Transaction`]; the document is left rolled back
    fn commit_transaction(&self, document: DocumentId, id: TransactionId) -> Result<(), HostError>;

    /// Roll back a transaction
    ///
    /// # Errors
    /// [`HostError::Transaction`]
    fn rollback_transaction(&self, document: DocumentId, id: TransactionId)
        -> Result<(), HostError>;

    /// Start a named transaction group
    ///
    /// # Errors
    /// [`HostError::TransactionGroup`]
    fn begin_transaction_group(
        &self,
        document: DocumentId,
        name: &str,
    ) -> Result<TransactionGroupId, HostError>;

    /// Merge all transactions committed inside the group into one undo step
    ///
    /// # Errors
    /// [`HostError::TransactionGroup`]
    fn assimilate_transaction_group(
        &self,
        document: DocumentId,
        id: TransactionGroupId,
    ) -> Result<(), HostError>;

    /// Undo everything committed inside the group
    ///
    /// # Errors
    /// [`HostError::TransactionGroup`]
    fn rollback_transaction_group(
        &self,
        document: DocumentId,
        id: TransactionGroupId,
    ) -> Result<(), HostError>;

    /// Copy elements between documents in a single transfer
    ///
    /// Copying a set in one call keeps references between the copied
    /// elements pointing at the copies.
    ///
    /// # Returns
    /// Ids of the new elements in `target`
    ///
    /// # Errors
    /// Host failures; requires an open transaction on `target`
    fn copy_elements(
        &self,
        source: DocumentId,
        elements: &[ElementId],
        target: DocumentId,
        transform: &Transform,
        options: &CopyPasteOptions,
    ) -> Result<Vec<ElementId>, HostError>;

    /// Delete elements
    ///
    /// # Errors
    /// Host failures; requires an open transaction
    fn delete_elements(&self, document: DocumentId, elements: &[ElementId])
        -> Result<(), HostError>;

    /// Enumerate elements of a class that satisfy `predicate`
    ///
    /// # Errors
    /// [`HostError::UnknownDocument`]
    fn find_elements(
        &self,
        document: DocumentId,
        class: &ElementClass,
        predicate: &dyn Fn(&ElementInfo) -> bool,
    ) -> Result<Vec<ElementInfo>, HostError>;

    /// All definition/binding pairs registered in the document
    ///
    /// # Errors
    /// [`HostError::UnknownDocument`]
    fn bindings(&self, document: DocumentId) -> Result<Vec<ParamBinding>, HostError>;

    /// Replace the category set of the binding governing `definition`
    ///
    /// # Errors
    /// [`HostError::UnknownDefinition`]; requires an open transaction
    fn set_binding_categories(
        &self,
        document: DocumentId,
        definition: DefinitionId,
        categories: &BTreeSet<Category>,
    ) -> Result<(), HostError>;

    /// Resolve a live parameter on an element
    ///
    /// # Returns
    /// `None` if the element does not carry the parameter
    ///
    /// # Errors
    /// [`HostError::UnknownElement`] if the element itself is missing
    fn parameter(
        &self,
        element: ElementRef,
        lookup: &ParamLookup,
    ) -> Result<Option<ParameterInfo>, HostError>;

    /// Write a value to a live parameter
    ///
    /// # Errors
    /// Host failures; requires an open transaction
    fn set_parameter(
        &self,
        element: ElementRef,
        lookup: &ParamLookup,
        value: &ParamValue,
    ) -> Result<(), HostError>;

    /// Clear the value of a live parameter
    ///
    /// # Errors
    /// Host failures; requires an open transaction
    fn clear_parameter(&self, element: ElementRef, lookup: &ParamLookup) -> Result<(), HostError>;

    /// Enumerate every element of a class
    ///
    /// # Errors
    /// See [`DocumentHost::find_elements`]
    fn elements_of_class(
        &self,
        document: DocumentId,
        class: &ElementClass,
    ) -> Result<Vec<ElementInfo>, HostError> {
        self.find_elements(document, class, &|_| true)
    }
}

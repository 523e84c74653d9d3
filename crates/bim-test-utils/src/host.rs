//! In-memory [`DocumentHost`]
//!
//! Honors the host contract the provisioning code relies on: mutation
//! needs an open transaction, rollback restores the snapshot taken at
//! begin, an assimilated group leaves a single undo step, and the last
//! browser organization of a document cannot be deleted.

use crate::document::DocumentData;
use bim_host::{
    Category, CopyPasteOptions, DefinitionId, DocumentHost, DocumentId, ElementClass, ElementId,
    ElementInfo, ElementRef, HostError, ParamBinding, ParamLookup, ParamValue, ParameterInfo,
    Transform, TransactionGroupId, TransactionId,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    pub opened: usize,
    pub closed: usize,
    pub copy_calls: usize,
    pub delete_calls: usize,
}

#[derive(Debug, Default)]
struct Faults {
    open: Option<String>,
    copy: Option<String>,
    delete: Option<String>,
    close: Option<String>,
}

#[derive(Debug)]
struct OpenTransaction {
    id: TransactionId,
    name: String,
    snapshot: DocumentData,
}

#[derive(Debug)]
struct OpenGroup {
    id: TransactionGroupId,
    name: String,
    snapshot: DocumentData,
    undo_len: usize,
}

#[derive(Debug)]
struct OpenDocument {
    path: Option<PathBuf>,
    data: DocumentData,
    transaction: Option<OpenTransaction>,
    groups: Vec<OpenGroup>,
    undo: Vec<String>,
}

#[derive(Debug, Default)]
struct HostState {
    files: HashMap<PathBuf, DocumentData>,
    open: BTreeMap<DocumentId, OpenDocument>,
    next_document: u64,
    next_handle: u64,
    stats: HostStats,
    faults: Faults,
}

impl HostState {
    fn doc(&self, document: DocumentId) -> Result<&OpenDocument, HostError> {
        self.open
            .get(&document)
            .ok_or(HostError::UnknownDocument(document))
    }

    fn doc_mut(&mut self, document: DocumentId) -> Result<&mut OpenDocument, HostError> {
        self.open
            .get_mut(&document)
            .ok_or(HostError::UnknownDocument(document))
    }

    /// Document open for modification
    fn writable(&mut self, document: DocumentId) -> Result<&mut OpenDocument, HostError> {
        let doc = self.doc_mut(document)?;
        if doc.transaction.is_none() {
            return Err(HostError::NoOpenTransaction(document));
        }
        Ok(doc)
    }

    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn register(&mut self, path: Option<PathBuf>, data: DocumentData) -> DocumentId {
        self.next_document += 1;
        let id = DocumentId::new(self.next_document);
        self.open.insert(
            id,
            OpenDocument {
                path,
                data,
                transaction: None,
                groups: Vec::new(),
                undo: Vec::new(),
            },
        );
        id
    }
}

/// Host double backed by [`DocumentData`] values
#[derive(Debug, Default)]
pub struct InMemoryHost {
    state: Mutex<HostState>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` as the file at `path`
    pub fn add_file(&self, path: impl Into<PathBuf>, data: DocumentData) {
        self.state.lock().files.insert(path.into(), data);
    }

    /// Open `data` as an unsaved document, like the active project
    pub fn open_data(&self, data: DocumentData) -> DocumentId {
        self.state.lock().register(None, data)
    }

    pub fn stats(&self) -> HostStats {
        self.state.lock().stats
    }

    pub fn open_document_count(&self) -> usize {
        self.state.lock().open.len()
    }

    pub fn is_open(&self, document: DocumentId) -> bool {
        self.state.lock().open.contains_key(&document)
    }

    pub fn in_transaction(&self, document: DocumentId) -> bool {
        self.state
            .lock()
            .open
            .get(&document)
            .is_some_and(|d| d.transaction.is_some())
    }

    /// Make the next `open_document` fail
    pub fn fail_next_open(&self, reason: &str) {
        self.state.lock().faults.open = Some(reason.into());
    }

    /// Make the next `copy_elements` fail
    pub fn fail_next_copy(&self, reason: &str) {
        self.state.lock().faults.copy = Some(reason.into());
    }

    /// Make the next `delete_elements` fail
    pub fn fail_next_delete(&self, reason: &str) {
        self.state.lock().faults.delete = Some(reason.into());
    }

    /// Make the next `close_document` fail; the document stays open
    pub fn fail_next_close(&self, reason: &str) {
        self.state.lock().faults.close = Some(reason.into());
    }

    /// Run `f` over the current contents of an open document
    ///
    /// # Panics
    /// If `document` is not open
    pub fn inspect<R>(&self, document: DocumentId, f: impl FnOnce(&DocumentData) -> R) -> R {
        let state = self.state.lock();
        let doc = state
            .open
            .get(&document)
            .unwrap_or_else(|| panic!("{document} is not open"));
        f(&doc.data)
    }

    /// Mutate an open document outside the transaction machinery
    ///
    /// # Panics
    /// If `document` is not open
    pub fn edit<R>(&self, document: DocumentId, f: impl FnOnce(&mut DocumentData) -> R) -> R {
        let mut state = self.state.lock();
        let doc = state
            .open
            .get_mut(&document)
            .unwrap_or_else(|| panic!("{document} is not open"));
        f(&mut doc.data)
    }

    pub fn names_of(&self, document: DocumentId, class: &ElementClass) -> Vec<String> {
        self.inspect(document, |d| {
            d.elements()
                .filter(|e| &e.class == class)
                .map(|e| e.name.clone())
                .collect()
        })
    }

    pub fn schedule_names(&self, document: DocumentId) -> Vec<String> {
        self.names_of(document, &ElementClass::ViewSchedule)
    }

    pub fn browser_organization_names(&self, document: DocumentId) -> Vec<String> {
        self.names_of(document, &ElementClass::BrowserOrganization)
    }

    /// Number of registered definitions called `name`
    pub fn definitions_named(&self, document: DocumentId, name: &str) -> usize {
        self.inspect(document, |d| {
            d.param_bindings()
                .iter()
                .filter(|b| b.definition.name == name)
                .count()
        })
    }

    /// Categories of the first binding whose definition is called `name`
    pub fn binding_categories(&self, document: DocumentId, name: &str) -> Option<BTreeSet<Category>> {
        self.inspect(document, |d| {
            d.param_bindings()
                .into_iter()
                .find(|b| b.definition.name == name)
                .map(|b| b.binding.categories)
        })
    }

    /// Names of the undo steps recorded on `document`, oldest first
    pub fn undo_steps(&self, document: DocumentId) -> Vec<String> {
        self.state
            .lock()
            .open
            .get(&document)
            .map(|d| d.undo.clone())
            .unwrap_or_default()
    }
}

impl DocumentHost for InMemoryHost {
    fn open_document(&self, path: &Path) -> Result<DocumentId, HostError> {
        let mut state = self.state.lock();
        if let Some(reason) = state.faults.open.take() {
            return Err(HostError::DocumentOpen {
                path: path.display().to_string(),
                reason,
            });
        }
        let data = state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| HostError::DocumentOpen {
                path: path.display().to_string(),
                reason: "no such file".into(),
            })?;

        state.stats.opened += 1;
        Ok(state.register(Some(path.to_path_buf()), data))
    }

    fn close_document(&self, document: DocumentId, save_changes: bool) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.doc(document)?;
        if let Some(reason) = state.faults.close.take() {
            return Err(HostError::DocumentClose { document, reason });
        }

        let closed = state
            .open
            .remove(&document)
            .ok_or(HostError::UnknownDocument(document))?;
        state.stats.closed += 1;
        if let (true, Some(path)) = (save_changes, closed.path) {
            state.files.insert(path, closed.data);
        }
        Ok(())
    }

    fn document_title(&self, document: DocumentId) -> Result<String, HostError> {
        Ok(self.state.lock().doc(document)?.data.title().to_owned())
    }

    fn begin_transaction(&self, document: DocumentId, name: &str) -> Result<TransactionId, HostError> {
        let mut state = self.state.lock();
        let id = TransactionId(state.handle());
        let doc = state.doc_mut(document)?;
        if doc.transaction.is_some() {
            return Err(HostError::Transaction {
                id: None,
                reason: "a transaction is already open".into(),
            });
        }

        doc.transaction = Some(OpenTransaction {
            id,
            name: name.into(),
            snapshot: doc.data.clone(),
        });
        Ok(id)
    }

    fn commit_transaction(&self, document: DocumentId, id: TransactionId) -> Result<(), HostError> {
        let mut state = self.state.lock();
        let doc = state.doc_mut(document)?;
        match doc.transaction.take() {
            Some(tx) if tx.id == id => {
                doc.undo.push(tx.name);
                Ok(())
            }
            other => {
                doc.transaction = other;
                Err(HostError::Transaction {
                    id: Some(id),
                    reason: "not the open transaction".into(),
                })
            }
        }
    }

    fn rollback_transaction(&self, document: DocumentId, id: TransactionId) -> Result<(), HostError> {
        let mut state = self.state.lock();
        let doc = state.doc_mut(document)?;
        match doc.transaction.take() {
            Some(tx) if tx.id == id => {
                doc.data = tx.snapshot;
                Ok(())
            }
            other => {
                doc.transaction = other;
                Err(HostError::Transaction {
                    id: Some(id),
                    reason: "not the open transaction".into(),
                })
            }
        }
    }

    fn begin_transaction_group(
        &self,
        document: DocumentId,
        name: &str,
    ) -> Result<TransactionGroupId, HostError> {
        let mut state = self.state.lock();
        let id = TransactionGroupId(state.handle());
        let doc = state.doc_mut(document)?;
        if doc.transaction.is_some() {
            return Err(HostError::TransactionGroup {
                id: None,
                reason: "cannot start a group inside a transaction".into(),
            });
        }

        doc.groups.push(OpenGroup {
            id,
            name: name.into(),
            snapshot: doc.data.clone(),
            undo_len: doc.undo.len(),
        });
        Ok(id)
    }

    fn assimilate_transaction_group(
        &self,
        document: DocumentId,
        id: TransactionGroupId,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock();
        let doc = state.doc_mut(document)?;
        let group = pop_group(doc, id)?;

        if doc.undo.len() > group.undo_len {
            doc.undo.truncate(group.undo_len);
            doc.undo.push(group.name);
        }
        Ok(())
    }

    fn rollback_transaction_group(
        &self,
        document: DocumentId,
        id: TransactionGroupId,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock();
        let doc = state.doc_mut(document)?;
        let group = pop_group(doc, id)?;

        if let Some(tx) = doc.transaction.take() {
            tracing::warn!(%document, transaction = %tx.name, "transaction still open at group rollback");
        }
        doc.data = group.snapshot;
        doc.undo.truncate(group.undo_len);
        Ok(())
    }

    fn copy_elements(
        &self,
        source: DocumentId,
        elements: &[ElementId],
        target: DocumentId,
        _transform: &Transform,
        _options: &CopyPasteOptions,
    ) -> Result<Vec<ElementId>, HostError> {
        let mut state = self.state.lock();
        state.stats.copy_calls += 1;
        if let Some(reason) = state.faults.copy.take() {
            return Err(HostError::rejected(reason));
        }

        let source_data = state.doc(source)?.data.clone();
        if let Some(&missing) = elements.iter().find(|id| !source_data.contains(**id)) {
            return Err(HostError::UnknownElement {
                document: source,
                element: missing,
            });
        }

        let doc = state.writable(target)?;
        Ok(elements
            .iter()
            .filter_map(|&id| doc.data.import(&source_data, id))
            .collect())
    }

    fn delete_elements(&self, document: DocumentId, elements: &[ElementId]) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.stats.delete_calls += 1;
        if let Some(reason) = state.faults.delete.take() {
            return Err(HostError::rejected(reason));
        }

        let doc = state.writable(document)?;
        if let Some(&missing) = elements.iter().find(|id| !doc.data.contains(**id)) {
            return Err(HostError::UnknownElement {
                document,
                element: missing,
            });
        }

        let organizations = doc.data.count_of(&ElementClass::BrowserOrganization);
        let removed = elements
            .iter()
            .filter(|id| doc.data.class_of(**id) == Some(&ElementClass::BrowserOrganization))
            .count();
        if organizations > 0 && removed >= organizations {
            return Err(HostError::rejected(
                "a document must keep at least one browser organization",
            ));
        }

        for &id in elements {
            doc.data.remove(id);
        }
        Ok(())
    }

    fn find_elements(
        &self,
        document: DocumentId,
        class: &ElementClass,
        predicate: &dyn Fn(&ElementInfo) -> bool,
    ) -> Result<Vec<ElementInfo>, HostError> {
        let state = self.state.lock();
        Ok(state
            .doc(document)?
            .data
            .elements()
            .filter(|e| &e.class == class && predicate(e))
            .cloned()
            .collect())
    }

    fn bindings(&self, document: DocumentId) -> Result<Vec<ParamBinding>, HostError> {
        Ok(self.state.lock().doc(document)?.data.param_bindings())
    }

    fn set_binding_categories(
        &self,
        document: DocumentId,
        definition: DefinitionId,
        categories: &BTreeSet<Category>,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock();
        let doc = state.writable(document)?;
        let binding = doc
            .data
            .binding_mut(definition)
            .ok_or_else(|| HostError::UnknownDefinition {
                document,
                name: definition.value().to_string(),
            })?;
        binding.categories.clone_from(categories);
        Ok(())
    }

    fn parameter(
        &self,
        element: ElementRef,
        lookup: &ParamLookup,
    ) -> Result<Option<ParameterInfo>, HostError> {
        let state = self.state.lock();
        state
            .doc(element.document)?
            .data
            .resolve(element.document, element.element, lookup)
    }

    fn set_parameter(
        &self,
        element: ElementRef,
        lookup: &ParamLookup,
        value: &ParamValue,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state
            .writable(element.document)?
            .data
            .write(element.document, element.element, lookup, Some(value))
    }

    fn clear_parameter(&self, element: ElementRef, lookup: &ParamLookup) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state
            .writable(element.document)?
            .data
            .write(element.document, element.element, lookup, None)
    }
}

fn pop_group(doc: &mut OpenDocument, id: TransactionGroupId) -> Result<OpenGroup, HostError> {
    match doc.groups.pop() {
        Some(group) if group.id == id => Ok(group),
        other => {
            doc.groups.extend(other);
            Err(HostError::TransactionGroup {
                id: Some(id),
                reason: "not the innermost open group".into(),
            })
        }
    }
}

//! Scope guard behavior against the in-memory host

use bim_host::{
    DocumentHost, ElementClass, HostError, OpenedDocument, Transaction, TransactionGroup,
};
use bim_test_utils::fixtures;
use bim_test_utils::{DocumentData, InMemoryHost};
use pretty_assertions::assert_eq;

fn host_with_target() -> (InMemoryHost, bim_host::DocumentId) {
    let host = InMemoryHost::new();
    let doc = host.open_data(DocumentData::new("Target"));
    (host, doc)
}

fn add_schedule(host: &InMemoryHost, doc: bim_host::DocumentId, name: &str) {
    let template = host.open_data({
        let mut d = DocumentData::new("Source");
        d.add_schedule(name);
        d
    });
    let ids: Vec<_> = host
        .elements_of_class(template, &ElementClass::ViewSchedule)
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    host.copy_elements(template, &ids, doc, &Default::default(), &Default::default())
        .unwrap();
    host.close_document(template, false).unwrap();
}

#[test]
fn committed_transaction_keeps_changes() {
    let (host, doc) = host_with_target();

    let tx = Transaction::start(&host, doc, "Add schedule").unwrap();
    assert_eq!(tx.name(), "Add schedule");
    add_schedule(&host, doc, "Rooms");
    tx.commit().unwrap();

    assert_eq!(host.schedule_names(doc), vec!["Rooms"]);
    assert_eq!(host.undo_steps(doc), vec!["Add schedule"]);
}

#[test]
fn dropped_transaction_rolls_back() {
    let (host, doc) = host_with_target();

    {
        let _tx = Transaction::start(&host, doc, "Abandoned").unwrap();
        add_schedule(&host, doc, "Rooms");
    }

    assert!(host.schedule_names(doc).is_empty());
    assert!(!host.in_transaction(doc));
    assert!(host.undo_steps(doc).is_empty());
}

#[test]
fn transaction_rolls_back_on_early_return() {
    fn failing(host: &InMemoryHost, doc: bim_host::DocumentId) -> Result<(), HostError> {
        let tx = Transaction::start(host, doc, "Fails")?;
        add_schedule(host, doc, "Rooms");
        host.delete_elements(doc, &[bim_host::ElementId::new(9999)])?;
        tx.commit()
    }

    let (host, doc) = host_with_target();
    let err = failing(&host, doc).unwrap_err();

    assert!(err.is_not_found());
    assert!(host.schedule_names(doc).is_empty());
}

#[test]
fn mutation_requires_transaction() {
    let (host, doc) = host_with_target();
    let err = host.delete_elements(doc, &[]).unwrap_err();
    assert!(matches!(err, HostError::NoOpenTransaction(d) if d == doc));
}

#[test]
fn assimilated_group_is_one_undo_step() {
    let (host, doc) = host_with_target();

    let group = TransactionGroup::start(&host, doc, "Setup").unwrap();
    for name in ["Rooms", "Doors"] {
        let tx = Transaction::start(&host, doc, format!("Add {name}")).unwrap();
        add_schedule(&host, doc, name);
        tx.commit().unwrap();
    }
    group.assimilate().unwrap();

    assert_eq!(host.undo_steps(doc), vec!["Setup"]);
    assert_eq!(host.schedule_names(doc).len(), 2);
}

#[test]
fn dropped_group_undoes_committed_transactions() {
    let (host, doc) = host_with_target();

    {
        let _group = TransactionGroup::start(&host, doc, "Setup").unwrap();
        let tx = Transaction::start(&host, doc, "Add Rooms").unwrap();
        add_schedule(&host, doc, "Rooms");
        tx.commit().unwrap();
    }

    assert!(host.schedule_names(doc).is_empty());
    assert!(host.undo_steps(doc).is_empty());
}

#[test]
fn opened_document_closes_on_drop() {
    let host = InMemoryHost::new();
    host.add_file(fixtures::template_path(), fixtures::template_document());

    {
        let template = OpenedDocument::open(&host, fixtures::template_path()).unwrap();
        assert_eq!(template.path(), fixtures::template_path().as_path());
        assert!(host.is_open(template.id()));
    }

    let stats = host.stats();
    assert_eq!((stats.opened, stats.closed), (1, 1));
    assert_eq!(host.open_document_count(), 0);
}

#[test]
fn opened_document_close_reports_failure() {
    let host = InMemoryHost::new();
    host.add_file(fixtures::template_path(), fixtures::template_document());
    host.fail_next_close("locked");

    let template = OpenedDocument::open(&host, fixtures::template_path()).unwrap();
    let err = template.close().unwrap_err();

    assert!(matches!(err, HostError::DocumentClose { .. }));
}

#[test]
fn missing_file_fails_to_open() {
    let host = InMemoryHost::new();
    let err = OpenedDocument::open(&host, "/nowhere.rvt").unwrap_err();
    assert!(matches!(err, HostError::DocumentOpen { .. }));
    assert_eq!(host.stats().opened, 0);
}

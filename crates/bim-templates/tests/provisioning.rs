//! Provisioning tests against the in-memory host
//!
//! Each scenario provisions the fixture target from the fixture template
//! and checks the target's state plus the host's open/close bookkeeping.

use bim_host::{DocumentHost, DocumentId, ElementClass, HostError, Transaction};
use bim_params::known;
use bim_templates::{ProjectParameters, ProvisioningConfig, ProvisioningError, ScheduleRule};
use bim_test_utils::fixtures::{self, categories, DOORS, ROOMS, SHEETS, SPACES, VIEWS};
use bim_test_utils::{DocumentData, InMemoryHost};
use pretty_assertions::assert_eq;
use std::io::Write;

fn config() -> ProvisioningConfig {
    ProvisioningConfig::new(fixtures::TEMPLATE_ROOT, fixtures::VERSION_TAG)
}

fn provisioning(host: &InMemoryHost) -> ProjectParameters<'_> {
    ProjectParameters::new(host, config()).expect("fixture config is valid")
}

fn rules(names: &[&str]) -> Vec<ScheduleRule> {
    names.iter().map(|n| ScheduleRule::new(*n).unwrap()).collect()
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names
}

/// Template must be closed and the target left without an open transaction.
fn assert_template_released(host: &InMemoryHost, target: DocumentId) {
    let stats = host.stats();
    assert_eq!(stats.opened, stats.closed, "template handle leaked");
    assert_eq!(host.open_document_count(), 1);
    assert!(host.is_open(target));
    assert!(!host.in_transaction(target));
}

#[test]
fn config_paths_match_fixture_layout() {
    assert_eq!(config().parameters_template_path(), fixtures::template_path());
}

#[test]
fn config_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "template_root = \"{}\"", fixtures::TEMPLATE_ROOT).unwrap();
    writeln!(file, "host_version_tag = \"{}\"", fixtures::VERSION_TAG).unwrap();

    let loaded = ProvisioningConfig::from_toml_file(file.path()).unwrap();
    assert_eq!(loaded, config());

    let (host, target) = fixtures::provisioning_host();
    let provisioning = ProjectParameters::new(&host, loaded).unwrap();
    provisioning.setup_param(target, fixtures::apartment_number()).unwrap();
    assert_eq!(host.definitions_named(target, "Номер квартиры"), 1);
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let host = InMemoryHost::new();
    let err = ProjectParameters::new(&host, ProvisioningConfig::new("/opt/library", "")).unwrap_err();
    assert!(matches!(err, ProvisioningError::Config(_)));
}

#[test]
fn missing_definition_is_copied_from_template() {
    let (host, target) = fixtures::provisioning_host();

    provisioning(&host)
        .setup_param(target, fixtures::apartment_number())
        .unwrap();

    assert_eq!(host.definitions_named(target, "Номер квартиры"), 1);
    assert_eq!(
        host.binding_categories(target, "Номер квартиры"),
        Some(categories(&[ROOMS]))
    );
    assert_eq!(host.undo_steps(target), vec!["Setup parameter: \"Номер квартиры\""]);
    assert_template_released(&host, target);
}

#[test]
fn existing_binding_is_synced_to_template() {
    let (host, target) = fixtures::provisioning_host();

    provisioning(&host)
        .setup_param(target, fixtures::room_finish())
        .unwrap();

    assert_eq!(host.definitions_named(target, "Отделка помещения"), 1);
    assert_eq!(
        host.binding_categories(target, "Отделка помещения"),
        Some(categories(&[ROOMS, SPACES]))
    );
    assert_eq!(host.undo_steps(target), vec!["Sync parameter: \"Отделка помещения\""]);
    assert_template_released(&host, target);
}

#[test]
fn setup_param_is_idempotent() {
    let (host, target) = fixtures::provisioning_host();
    let provisioning = provisioning(&host);

    for param in [fixtures::apartment_number(), fixtures::room_finish()] {
        provisioning.setup_param(target, param.clone()).unwrap();
        let first = (
            host.definitions_named(target, param.name()),
            host.binding_categories(target, param.name()),
        );

        provisioning.setup_param(target, param.clone()).unwrap();
        let second = (
            host.definitions_named(target, param.name()),
            host.binding_categories(target, param.name()),
        );

        assert_eq!(first, second, "state drifted for {param}");
        assert_eq!(second.0, 1);
    }
    assert_template_released(&host, target);
}

#[test]
fn built_in_param_needs_no_template() {
    let (host, target) = fixtures::provisioning_host();

    provisioning(&host)
        .setup_param(target, fixtures::room_number())
        .unwrap();

    assert_eq!(host.stats().opened, 0);
    assert!(host.undo_steps(target).is_empty());
}

#[test]
fn param_missing_from_template_fails_and_closes_template() {
    let (host, target) = fixtures::provisioning_host();

    let err = provisioning(&host)
        .setup_param(target, fixtures::missing_shared())
        .unwrap_err();

    assert!(err.is_lookup(), "unexpected error: {err}");
    assert_eq!(host.stats().opened, 1);
    assert_template_released(&host, target);
}

#[test]
fn failed_copy_rolls_back_and_closes_template() {
    let (host, target) = fixtures::provisioning_host();
    host.fail_next_copy("transfer refused");

    let err = provisioning(&host)
        .setup_param(target, fixtures::apartment_number())
        .unwrap_err();

    assert!(matches!(err, ProvisioningError::Host(HostError::Rejected(_))));
    assert_eq!(host.definitions_named(target, "Номер квартиры"), 0);
    assert!(host.undo_steps(target).is_empty());
    assert_template_released(&host, target);
}

#[test]
fn template_open_failure_is_fatal() {
    let host = InMemoryHost::new();
    let target = host.open_data(fixtures::target_document());

    let err = provisioning(&host)
        .setup_param(target, fixtures::apartment_number())
        .unwrap_err();

    match err {
        ProvisioningError::TemplateOpen { path, .. } => assert_eq!(path, fixtures::template_path()),
        other => panic!("expected template open error, got {other}"),
    }
    assert_eq!(host.open_document_count(), 1);
}

#[test]
fn template_close_failure_after_success_is_reported() {
    let (host, target) = fixtures::provisioning_host();
    host.fail_next_close("file locked");

    let err = provisioning(&host)
        .setup_param(target, fixtures::apartment_number())
        .unwrap_err();

    assert!(matches!(err, ProvisioningError::Host(HostError::DocumentClose { .. })));
    assert_eq!(host.definitions_named(target, "Номер квартиры"), 1);
}

#[test]
fn batch_is_one_undo_step() {
    let (host, target) = fixtures::provisioning_host();
    let params = vec![
        fixtures::apartment_number(),
        fixtures::room_finish(),
        known::view_group().into(),
        fixtures::room_number().into(),
    ];

    provisioning(&host).setup_params(target, params).unwrap();

    assert_eq!(host.undo_steps(target), vec!["Setup parameters"]);
    assert_eq!(host.definitions_named(target, "Номер квартиры"), 1);
    assert_eq!(host.definitions_named(target, "_Группа Видов"), 1);
    assert_eq!(
        host.binding_categories(target, "_Группа Видов"),
        Some(categories(&[VIEWS, SHEETS]))
    );
    assert_eq!(
        host.binding_categories(target, "Отделка помещения"),
        Some(categories(&[ROOMS, SPACES]))
    );
    assert_eq!(host.stats().opened, 1);
    assert_template_released(&host, target);
}

#[test]
fn batch_failure_rolls_back_every_param() {
    let (host, target) = fixtures::provisioning_host();

    let err = provisioning(&host)
        .setup_params(
            target,
            [fixtures::apartment_number(), fixtures::missing_shared()],
        )
        .unwrap_err();

    assert!(err.is_lookup());
    assert_eq!(host.definitions_named(target, "Номер квартиры"), 0);
    assert!(host.undo_steps(target).is_empty());
    assert_template_released(&host, target);
}

#[test]
fn batch_accepts_typed_identities() {
    let (host, target) = fixtures::provisioning_host();

    provisioning(&host)
        .setup_params(target, [known::view_group(), known::project_stage()])
        .unwrap();

    assert_eq!(host.definitions_named(target, "_Группа Видов"), 1);
    assert_eq!(host.definitions_named(target, "_Стадия Проекта"), 1);
}

#[test]
fn existing_schedule_is_left_alone() {
    let (host, target) = fixtures::provisioning_host();
    let before = host.schedule_names(target);

    let copied = provisioning(&host)
        .setup_schedule(target, false, &ScheduleRule::new(DOORS).unwrap())
        .unwrap();

    assert!(!copied);
    assert_eq!(host.schedule_names(target), before);
    assert!(host.undo_steps(target).is_empty());
    assert_template_released(&host, target);
}

#[test]
fn replace_installs_exactly_one_schedule() {
    let (host, target) = fixtures::provisioning_host();
    let old = host
        .inspect(target, |d| d.find(&ElementClass::ViewSchedule, "Doors"))
        .expect("fixture target has a Doors schedule");

    let copied = provisioning(&host)
        .setup_schedule(target, true, &ScheduleRule::new(DOORS).unwrap())
        .unwrap();

    assert!(copied);
    assert_eq!(host.schedule_names(target), vec!["Doors"]);
    assert_ne!(host.inspect(target, |d| d.find(&ElementClass::ViewSchedule, "Doors")), Some(old));
    assert_template_released(&host, target);
}

#[test]
fn batch_copies_only_missing_schedules_in_one_transfer() {
    let (host, target) = fixtures::provisioning_host();
    let before = host.schedule_names(target).len();

    let copied = provisioning(&host)
        .setup_schedules(target, false, &rules(&["Rooms", "Doors", "Windows"]))
        .unwrap();

    assert!(copied);
    assert_eq!(host.schedule_names(target).len(), before + 2);
    assert_eq!(
        sorted(host.schedule_names(target)),
        vec!["Doors", "Rooms", "Windows"]
    );
    assert_eq!(host.stats().copy_calls, 1);
    assert_eq!(host.undo_steps(target), vec!["Setup schedules"]);
}

#[test]
fn batch_with_everything_present_is_a_noop() {
    let (host, target) = fixtures::provisioning_host();
    let provisioning = provisioning(&host);
    provisioning
        .setup_schedules(target, false, &rules(&["Rooms", "Windows"]))
        .unwrap();
    let after_first = sorted(host.schedule_names(target));

    let copied = provisioning
        .setup_schedules(target, false, &rules(&["Rooms", "Doors", "Windows"]))
        .unwrap();

    assert!(!copied);
    assert_eq!(sorted(host.schedule_names(target)), after_first);
    assert_eq!(host.undo_steps(target).len(), 1);
}

#[test]
fn batch_replace_swaps_all_named_schedules() {
    let (host, target) = fixtures::provisioning_host();

    provisioning(&host)
        .setup_schedules(target, true, &rules(&["Rooms", "Doors"]))
        .unwrap();

    assert_eq!(sorted(host.schedule_names(target)), vec!["Doors", "Rooms"]);
}

#[test]
fn replace_deletes_target_schedule_missing_from_template() {
    let (host, target) = fixtures::provisioning_host();
    host.edit(target, |d| d.add_schedule("Legacy"));

    let copied = provisioning(&host)
        .setup_schedule(target, true, &ScheduleRule::new("Legacy").unwrap())
        .unwrap();

    assert!(!copied);
    assert_eq!(host.schedule_names(target), vec!["Doors"]);
    assert_eq!(host.undo_steps(target), vec!["Setup schedule: \"Legacy\""]);
    assert_template_released(&host, target);
}

#[test]
fn schedule_missing_from_template_is_kept_without_replace() {
    let (host, target) = fixtures::provisioning_host();
    host.edit(target, |d| d.add_schedule("Legacy"));

    let copied = provisioning(&host)
        .setup_schedule(target, false, &ScheduleRule::new("Legacy").unwrap())
        .unwrap();

    assert!(!copied);
    assert!(host.schedule_names(target).contains(&"Legacy".to_owned()));
    assert!(host.undo_steps(target).is_empty());
    assert_template_released(&host, target);
}

#[test]
fn schedule_types_do_not_count_as_existing_schedules() {
    let (host, target) = fixtures::provisioning_host();
    host.edit(target, |d| d.add_schedule_type("Rooms"));

    let copied = provisioning(&host)
        .setup_schedule(target, false, &ScheduleRule::new("Rooms").unwrap())
        .unwrap();

    assert!(copied);
    assert_eq!(sorted(host.schedule_names(target)), vec!["Doors", "Rooms", "Rooms"]);
}

#[test]
fn key_schedule_is_found_by_param_name() {
    let (host, target) = fixtures::provisioning_host();
    let rule = ScheduleRule::for_param(&fixtures::apartment_number());

    assert!(provisioning(&host).setup_schedule(target, false, &rule).unwrap());
    assert!(host.schedule_names(target).contains(&"Номер квартиры".to_owned()));
}

#[test]
fn schedule_copy_failure_closes_template() {
    let (host, target) = fixtures::provisioning_host();
    host.fail_next_copy("view limit reached");

    let result = provisioning(&host).setup_schedules(target, false, &rules(&["Rooms", "Windows"]));

    assert!(result.is_err());
    assert_eq!(host.schedule_names(target), vec!["Doors"]);
    assert_template_released(&host, target);
}

#[test]
fn host_refuses_to_drop_last_browser_organization() {
    let host = InMemoryHost::new();
    let mut data = DocumentData::new("Solo");
    let only = data.add_browser_organization("All");
    let doc = host.open_data(data);

    let tx = Transaction::start(&host, doc, "Delete").unwrap();
    let err = host.delete_elements(doc, &[only]).unwrap_err();
    tx.rollback().unwrap();

    assert!(matches!(err, HostError::Rejected(_)));
}

#[test]
fn browser_organization_replaces_colliding_settings() {
    let (host, target) = fixtures::provisioning_host();

    let copied = provisioning(&host).setup_browser_organization(target).unwrap();

    assert!(copied);
    assert_eq!(
        sorted(host.browser_organization_names(target)),
        vec!["All", "By sheet", "By stage", "Custom"]
    );
    assert_eq!(host.undo_steps(target), vec!["Setup browser organization"]);
    assert_template_released(&host, target);
}

#[test]
fn browser_organization_replaces_the_only_setting() {
    let host = InMemoryHost::new();
    host.add_file(fixtures::template_path(), fixtures::template_document());
    let mut data = DocumentData::new("Bare");
    data.add_browser_organization("All");
    let target = host.open_data(data);

    provisioning(&host).setup_browser_organization(target).unwrap();

    assert_eq!(
        sorted(host.browser_organization_names(target)),
        vec!["All", "By sheet", "By stage"]
    );
}

#[test]
fn browser_organization_copies_only_settings() {
    let (host, target) = fixtures::provisioning_host();

    assert!(provisioning(&host).setup_browser_organization(target).unwrap());

    assert_eq!(host.definitions_named(target, "_Группа Видов"), 0);
    assert_eq!(host.definitions_named(target, "_Стадия Проекта"), 0);
}

#[test]
fn browser_organization_is_skipped_once_markers_exist() {
    let (host, target) = fixtures::provisioning_host();
    let provisioning = provisioning(&host);

    provisioning
        .setup_params(target, [known::view_group(), known::project_stage()])
        .unwrap();
    let opened = host.stats().opened;

    assert!(!provisioning.setup_browser_organization(target).unwrap());
    assert_eq!(host.stats().opened, opened);
    assert_eq!(
        sorted(host.browser_organization_names(target)),
        vec!["All", "Custom"]
    );
}

#[test]
fn browser_organization_failure_rolls_back() {
    let (host, target) = fixtures::provisioning_host();
    host.fail_next_delete("element is in use");

    let result = provisioning(&host).setup_browser_organization(target);

    assert!(result.is_err());
    assert_eq!(
        sorted(host.browser_organization_names(target)),
        vec!["All", "Custom"]
    );
    assert_template_released(&host, target);
}

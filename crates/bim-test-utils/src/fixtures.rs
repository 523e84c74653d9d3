//! Template/target document pair used across provisioning tests

use crate::document::DocumentData;
use crate::host::InMemoryHost;
use bim_host::{Binding, BindingKind, Category, DocumentId, ParamValue, StorageType};
use bim_params::{known, ProjectParam, RevitParam, SharedParam, SystemParam};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const TEMPLATE_ROOT: &str = "/opt/bim/library";
pub const VERSION_TAG: &str = "2024";

pub const ROOMS: &str = "Rooms";
pub const SPACES: &str = "Spaces";
pub const DOORS: &str = "Doors";
pub const VIEWS: &str = "Views";
pub const SHEETS: &str = "Sheets";

/// Where the parameters template lives under [`TEMPLATE_ROOT`]
pub fn template_path() -> PathBuf {
    PathBuf::from(TEMPLATE_ROOT)
        .join(VERSION_TAG)
        .join("templates")
        .join("project_parameters.rvt")
}

pub fn apartment_number() -> RevitParam {
    SharedParam::new("ApartmentNumber", "Номер квартиры", StorageType::String)
        .unwrap()
        .into()
}

pub fn room_finish() -> RevitParam {
    ProjectParam::new("RoomFinish", "Отделка помещения", StorageType::String)
        .unwrap()
        .into()
}

/// Shared parameter absent from the template
pub fn missing_shared() -> RevitParam {
    SharedParam::new("Nowhere", "Nowhere", StorageType::String)
        .unwrap()
        .into()
}

pub fn room_number() -> SystemParam {
    SystemParam::new("RoomNumber", None).unwrap()
}

pub fn binding(categories: &[&str]) -> Binding {
    Binding::new(BindingKind::Instance, categories.iter().map(|c| Category::new(*c)))
}

pub fn categories(names: &[&str]) -> BTreeSet<Category> {
    names.iter().map(|c| Category::new(*c)).collect()
}

/// Template with definitions, schedules and browser organizations
pub fn template_document() -> DocumentData {
    let mut doc = DocumentData::new("project_parameters");

    doc.add_definition(&apartment_number(), binding(&[ROOMS]));
    doc.add_definition(&room_finish(), binding(&[ROOMS, SPACES]));
    doc.add_definition(&known::view_group().into(), binding(&[VIEWS, SHEETS]));
    doc.add_definition(&known::project_stage().into(), binding(&[VIEWS, SHEETS]));

    for name in ["Rooms", "Doors", "Windows"] {
        doc.add_schedule(name);
    }
    doc.add_schedule(apartment_number().name());
    for name in ["By stage", "By sheet", "All"] {
        doc.add_browser_organization(name);
    }
    doc
}

/// Active project with a stale binding, one schedule and colliding settings
pub fn target_document() -> DocumentData {
    let mut doc = DocumentData::new("Project1");

    doc.add_definition(&room_finish(), binding(&[ROOMS]));
    doc.add_schedule("Doors");
    doc.add_browser_organization("All");
    doc.add_browser_organization("Custom");

    let room = doc.add_element("Room 101", ROOMS);
    doc.add_built_in_param(room, &room_number(), Some(ParamValue::from("101")));
    doc
}

/// Host holding the template file, with the target already open
pub fn provisioning_host() -> (InMemoryHost, DocumentId) {
    let host = InMemoryHost::new();
    host.add_file(template_path(), template_document());
    let target = host.open_data(target_document());
    (host, target)
}

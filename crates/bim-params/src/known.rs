//! Well-known project parameters

use crate::identity::ProjectParam;
use bim_host::StorageType;

/// View grouping parameter used by project browser organization
#[must_use]
pub fn view_group() -> ProjectParam {
    ProjectParam::predefined("ViewGroup", "_Группа Видов", StorageType::String)
        .with_description("Groups views in the project browser")
}

/// Project stage parameter used by project browser organization
#[must_use]
pub fn project_stage() -> ProjectParam {
    ProjectParam::predefined("ProjectStage", "_Стадия Проекта", StorageType::String)
        .with_description("Design stage shown in sheet and view grouping")
}

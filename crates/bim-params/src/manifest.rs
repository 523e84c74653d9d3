//! Built-in parameter manifest
//!
//! Explicit table from a system parameter's machine name to its host type
//! id, storage type and display labels. The index over the table is built
//! once, on first use.

use crate::language::LanguageType;
use bim_host::StorageType;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Manifest entry for one built-in parameter
#[derive(Debug, PartialEq, Eq)]
pub struct SystemParamSpec {
    /// Machine name, the stable identity key
    pub id: &'static str,
    /// Host low-level type id
    pub type_id: &'static str,
    /// Native storage type
    pub storage_type: StorageType,
    labels: &'static [(LanguageType, &'static str)],
}

impl SystemParamSpec {
    /// Display label in `language`, falling back to the default language
    #[must_use]
    pub fn label(&self, language: Option<LanguageType>) -> &'static str {
        let wanted = language.unwrap_or_default();
        self.labels
            .iter()
            .find(|(lang, _)| *lang == wanted)
            .or_else(|| self.labels.iter().find(|(lang, _)| *lang == LanguageType::DEFAULT))
            .map_or(self.id, |(_, label)| *label)
    }
}

macro_rules! system_param {
    ($id:literal, $type_id:literal, $storage:ident, en: $en:literal, ru: $ru:literal) => {
        SystemParamSpec {
            id: $id,
            type_id: concat!("autodesk.revit.parameter:", $type_id, "-1.0.0"),
            storage_type: StorageType::$storage,
            labels: &[
                (LanguageType::EnglishUsa, $en),
                (LanguageType::EnglishGb, $en),
                (LanguageType::Russian, $ru),
            ],
        }
    };
}

static MANIFEST: &[SystemParamSpec] = &[
    system_param!("AllModelMark", "allModelMark", String, en: "Mark", ru: "Марка"),
    system_param!("AllModelInstanceComments", "allModelInstanceComments", String, en: "Comments", ru: "Комментарии"),
    system_param!("AllModelTypeMark", "allModelTypeMark", String, en: "Type Mark", ru: "Маркировка типоразмера"),
    system_param!("AllModelDescription", "allModelDescription", String, en: "Description", ru: "Описание"),
    system_param!("ElemFamilyParam", "elemFamilyParam", ElementId, en: "Family", ru: "Семейство"),
    system_param!("ElemTypeParam", "elemTypeParam", ElementId, en: "Type", ru: "Тип"),
    system_param!("ElemPartitionParam", "elemPartitionParam", Integer, en: "Workset", ru: "Рабочий набор"),
    system_param!("LevelParam", "levelParam", ElementId, en: "Level", ru: "Уровень"),
    system_param!("PhaseCreated", "phaseCreated", ElementId, en: "Phase Created", ru: "Стадия возведения"),
    system_param!("PhaseDemolished", "phaseDemolished", ElementId, en: "Phase Demolished", ru: "Стадия сноса"),
    system_param!("RoomName", "roomName", String, en: "Name", ru: "Имя"),
    system_param!("RoomNumber", "roomNumber", String, en: "Number", ru: "Номер"),
    system_param!("RoomArea", "roomArea", Double, en: "Area", ru: "Площадь"),
    system_param!("RoomHeight", "roomHeight", Double, en: "Unbounded Height", ru: "Незамкнутая высота"),
    system_param!("RoomLevelId", "roomLevelId", ElementId, en: "Level", ru: "Уровень"),
    system_param!("CurveElemLength", "curveElemLength", Double, en: "Length", ru: "Длина"),
    system_param!("HostAreaComputed", "hostAreaComputed", Double, en: "Area", ru: "Площадь"),
    system_param!("ViewName", "viewName", String, en: "View Name", ru: "Имя вида"),
    system_param!("SheetNumber", "sheetNumber", String, en: "Sheet Number", ru: "Номер листа"),
    system_param!("SheetName", "sheetName", String, en: "Sheet Name", ru: "Имя листа"),
    system_param!("WallStructuralSignificant", "wallStructuralSignificant", Integer, en: "Structural", ru: "Несущие конструкции"),
];

static INDEX: Lazy<HashMap<&'static str, &'static SystemParamSpec>> =
    Lazy::new(|| MANIFEST.iter().map(|spec| (spec.id, spec)).collect());

/// Find a manifest entry by machine name
#[inline]
#[must_use]
pub fn lookup(id: &str) -> Option<&'static SystemParamSpec> {
    INDEX.get(id).copied()
}

/// All manifest entries in declaration order
pub fn entries() -> impl Iterator<Item = &'static SystemParamSpec> {
    MANIFEST.iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn manifest_ids_are_unique() {
        let ids: HashSet<_> = entries().map(|s| s.id).collect();
        assert_eq!(ids.len(), MANIFEST.len());
    }

    #[test]
    fn manifest_type_ids_are_unique() {
        let ids: HashSet<_> = entries().map(|s| s.type_id).collect();
        assert_eq!(ids.len(), MANIFEST.len());
    }

    #[test]
    fn lookup_known_and_unknown() {
        let mark = lookup("AllModelMark").unwrap();
        assert_eq!(mark.type_id, "autodesk.revit.parameter:allModelMark-1.0.0");
        assert_eq!(mark.storage_type, StorageType::String);
        assert!(lookup("NoSuchParam").is_none());
    }

    #[test]
    fn label_language_fallback() {
        let area = lookup("RoomArea").unwrap();
        assert_eq!(area.label(None), "Area");
        assert_eq!(area.label(Some(LanguageType::Russian)), "Площадь");
        assert_eq!(area.label(Some(LanguageType::Japanese)), "Area");
    }
}

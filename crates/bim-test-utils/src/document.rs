//! In-memory document contents
//!
//! A [`DocumentData`] is built up in tests, stored in an
//! [`InMemoryHost`](crate::InMemoryHost) as a file or opened directly,
//! and inspected afterwards through the host's query helpers.

use bim_host::{
    Binding, Category, Definition, DefinitionId, DefinitionKind, DocumentId, ElementClass,
    ElementId, ElementInfo, HostError, ParamBinding, ParamLookup, ParamValue, ParameterInfo,
    StorageType,
};
use bim_params::{RevitParam, SystemParam};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct StoredParam {
    storage_type: StorageType,
    value: Option<ParamValue>,
    read_only: bool,
}

#[derive(Debug, Clone)]
struct StoredElement {
    info: ElementInfo,
    params: HashMap<ParamLookup, StoredParam>,
}

#[derive(Debug, Clone)]
struct StoredBinding {
    element: ElementId,
    definition: Definition,
    binding: Binding,
}

/// Contents of one document
#[derive(Debug, Clone)]
pub struct DocumentData {
    title: String,
    next_id: i64,
    elements: BTreeMap<ElementId, StoredElement>,
    bindings: Vec<StoredBinding>,
}

impl DocumentData {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            next_id: 100,
            elements: BTreeMap::new(),
            bindings: Vec::new(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Add a model element in `category`
    pub fn add_element(&mut self, name: &str, category: &str) -> ElementId {
        self.insert(ElementInfo {
            id: ElementId::INVALID,
            class: ElementClass::Other("FamilyInstance".into()),
            name: name.into(),
            category: Some(Category::new(category)),
            is_element_type: false,
        })
    }

    /// Add a schedule view
    pub fn add_schedule(&mut self, name: &str) -> ElementId {
        self.insert(Self::plain(ElementClass::ViewSchedule, name))
    }

    /// Add a schedule element type
    pub fn add_schedule_type(&mut self, name: &str) -> ElementId {
        self.insert(ElementInfo {
            is_element_type: true,
            ..Self::plain(ElementClass::ViewSchedule, name)
        })
    }

    /// Add a project browser organization setting
    pub fn add_browser_organization(&mut self, name: &str) -> ElementId {
        self.insert(Self::plain(ElementClass::BrowserOrganization, name))
    }

    /// Register a shared or project definition with its binding
    ///
    /// # Panics
    /// For built-in parameters, which have no definition element
    pub fn add_definition(&mut self, param: &RevitParam, binding: Binding) -> ElementId {
        let (class, kind) = match param {
            RevitParam::Shared(_) => (ElementClass::SharedParameterElement, DefinitionKind::Shared),
            RevitParam::Project(_) => (ElementClass::ParameterElement, DefinitionKind::Project),
            RevitParam::System(_) => panic!("built-in parameters have no definition element"),
        };
        let element = self.insert(Self::plain(class, param.name()));

        self.bindings.push(StoredBinding {
            element,
            definition: Definition {
                id: DefinitionId::new(element.value()),
                name: param.name().to_owned(),
                kind,
                storage_type: param.storage_type(),
            },
            binding,
        });
        element
    }

    /// Give `element` a built-in parameter
    pub fn add_built_in_param(
        &mut self,
        element: ElementId,
        param: &SystemParam,
        value: Option<ParamValue>,
    ) {
        self.put_param(element, param.as_revit_param().lookup(), param.storage_type(), value, false);
    }

    /// Give `element` a read-only built-in parameter
    pub fn add_read_only_param(&mut self, element: ElementId, param: &SystemParam, value: ParamValue) {
        self.put_param(element, param.as_revit_param().lookup(), param.storage_type(), Some(value), true);
    }

    /// Store a value for a bound shared or project parameter
    pub fn set_value(&mut self, element: ElementId, param: &RevitParam, value: ParamValue) {
        self.put_param(element, param.lookup(), value.storage_type(), Some(value), false);
    }

    /// First element of `class` called `name`
    #[must_use]
    pub fn find(&self, class: &ElementClass, name: &str) -> Option<ElementId> {
        self.elements()
            .find(|e| &e.class == class && e.name == name)
            .map(|e| e.id)
    }

    fn plain(class: ElementClass, name: &str) -> ElementInfo {
        ElementInfo {
            id: ElementId::INVALID,
            class,
            name: name.into(),
            category: None,
            is_element_type: false,
        }
    }

    fn insert(&mut self, mut info: ElementInfo) -> ElementId {
        let id = ElementId::new(self.next_id);
        self.next_id += 1;
        info.id = id;
        self.elements.insert(
            id,
            StoredElement {
                info,
                params: HashMap::new(),
            },
        );
        id
    }

    fn put_param(
        &mut self,
        element: ElementId,
        lookup: ParamLookup,
        storage_type: StorageType,
        value: Option<ParamValue>,
        read_only: bool,
    ) {
        let Some(stored) = self.elements.get_mut(&element) else {
            panic!("no element {element} in document");
        };
        stored.params.insert(
            lookup,
            StoredParam {
                storage_type,
                value,
                read_only,
            },
        );
    }

    // Host-side primitives

    pub(crate) fn contains(&self, element: ElementId) -> bool {
        self.elements.contains_key(&element)
    }

    pub(crate) fn elements(&self) -> impl Iterator<Item = &ElementInfo> {
        self.elements.values().map(|e| &e.info)
    }

    pub(crate) fn count_of(&self, class: &ElementClass) -> usize {
        self.elements().filter(|e| &e.class == class).count()
    }

    pub(crate) fn class_of(&self, element: ElementId) -> Option<&ElementClass> {
        self.elements.get(&element).map(|e| &e.info.class)
    }

    pub(crate) fn param_bindings(&self) -> Vec<ParamBinding> {
        self.bindings
            .iter()
            .map(|b| ParamBinding {
                definition: b.definition.clone(),
                binding: b.binding.clone(),
            })
            .collect()
    }

    pub(crate) fn binding_mut(&mut self, definition: DefinitionId) -> Option<&mut Binding> {
        self.bindings
            .iter_mut()
            .find(|b| b.definition.id == definition)
            .map(|b| &mut b.binding)
    }

    /// Copy `element` from `source` into this document
    pub(crate) fn import(&mut self, source: &DocumentData, element: ElementId) -> Option<ElementId> {
        let stored = source.elements.get(&element)?;
        let id = self.insert(stored.info.clone());
        if let Some(copy) = self.elements.get_mut(&id) {
            copy.params.clone_from(&stored.params);
        }

        if let Some(b) = source.bindings.iter().find(|b| b.element == element) {
            self.bindings.push(StoredBinding {
                element: id,
                definition: Definition {
                    id: DefinitionId::new(id.value()),
                    ..b.definition.clone()
                },
                binding: b.binding.clone(),
            });
        }
        Some(id)
    }

    pub(crate) fn remove(&mut self, element: ElementId) {
        self.elements.remove(&element);
        self.bindings.retain(|b| b.element != element);
    }

    pub(crate) fn resolve(
        &self,
        document: DocumentId,
        element: ElementId,
        lookup: &ParamLookup,
    ) -> Result<Option<ParameterInfo>, HostError> {
        let stored = self
            .elements
            .get(&element)
            .ok_or(HostError::UnknownElement { document, element })?;

        let info = match lookup {
            ParamLookup::BuiltIn(_) => stored.params.get(lookup).map(|p| ParameterInfo {
                storage_type: p.storage_type,
                value: p.value.clone(),
                display: p.value.as_ref().map(display),
                read_only: p.read_only,
            }),
            ParamLookup::Shared(name) | ParamLookup::Project(name) => {
                let bound = stored.info.category.as_ref().and_then(|category| {
                    self.bindings.iter().find(|b| {
                        b.definition.name == *name
                            && matches_kind(lookup, &b.definition.kind)
                            && b.binding.applies_to(category)
                    })
                });
                bound.map(|b| {
                    let value = stored.params.get(lookup).and_then(|p| p.value.clone());
                    ParameterInfo {
                        storage_type: b.definition.storage_type,
                        display: value.as_ref().map(display),
                        value,
                        read_only: false,
                    }
                })
            }
        };
        Ok(info)
    }

    pub(crate) fn write(
        &mut self,
        document: DocumentId,
        element: ElementId,
        lookup: &ParamLookup,
        value: Option<&ParamValue>,
    ) -> Result<(), HostError> {
        let info = self
            .resolve(document, element, lookup)?
            .ok_or_else(|| HostError::UnknownDefinition {
                document,
                name: lookup.to_string(),
            })?;
        if info.read_only {
            return Err(HostError::rejected(format!("{lookup} is read-only")));
        }
        if let Some(v) = value {
            if v.storage_type() != info.storage_type {
                return Err(HostError::invalid_argument(
                    "value",
                    format!("{lookup} stores {}", info.storage_type),
                ));
            }
        }

        if let Some(stored) = self.elements.get_mut(&element) {
            stored.params.insert(
                lookup.clone(),
                StoredParam {
                    storage_type: info.storage_type,
                    value: value.cloned(),
                    read_only: false,
                },
            );
        }
        Ok(())
    }
}

fn matches_kind(lookup: &ParamLookup, kind: &DefinitionKind) -> bool {
    matches!(
        (lookup, kind),
        (ParamLookup::Shared(_), DefinitionKind::Shared)
            | (ParamLookup::Project(_), DefinitionKind::Project)
    )
}

fn display(value: &ParamValue) -> String {
    match value {
        ParamValue::Integer(v) => v.to_string(),
        ParamValue::Double(v) => format!("{v:.2}"),
        ParamValue::String(v) => v.clone(),
        ParamValue::ElementId(v) => v.to_string(),
    }
}

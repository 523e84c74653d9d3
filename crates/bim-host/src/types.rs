//! Host value types
//!
//! Handles and plain data exchanged with a [`DocumentHost`](crate::DocumentHost).
//! Every type here is a value: handles are copied, never owned.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

/// Identifier of an element inside one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(i64);

impl ElementId {
    /// The host's "no element" marker
    pub const INVALID: Self = Self(-1);

    /// Create from raw host value
    #[inline]
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw host value
    #[inline]
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns true unless this is [`ElementId::INVALID`]
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl Display for ElementId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Element ids travel as decimal strings so 64-bit values survive JSON readers
// that only have doubles.
impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ElementIdVisitor;

        impl Visitor<'_> for ElementIdVisitor {
            type Value = ElementId;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("an element id as integer or decimal string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ElementId, E> {
                Ok(ElementId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ElementId, E> {
                i64::try_from(v)
                    .map(ElementId)
                    .map_err(|_| E::custom(format!("element id {v} out of range")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ElementId, E> {
                v.trim()
                    .parse::<i64>()
                    .map(ElementId)
                    .map_err(|e| E::custom(format!("invalid element id '{v}': {e}")))
            }
        }

        deserializer.deserialize_any(ElementIdVisitor)
    }
}

/// Handle of a document open in the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Create from raw host handle
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw host handle
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// An element addressed by its owning document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    /// Owning document
    pub document: DocumentId,
    /// Element within the document
    pub element: ElementId,
}

impl ElementRef {
    /// Create new element reference
    #[inline]
    #[must_use]
    pub const fn new(document: DocumentId, element: ElementId) -> Self {
        Self { document, element }
    }
}

impl Display for ElementRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.document, self.element)
    }
}

/// Native storage of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// 32-bit integer (also used for yes/no)
    Integer,
    /// Double in internal units
    Double,
    /// Text
    String,
    /// Reference to another element
    ElementId,
}

impl Display for StorageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Integer => "integer",
            Self::Double => "double",
            Self::String => "string",
            Self::ElementId => "element-id",
        };
        f.write_str(s)
    }
}

/// A typed parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    /// Integer value
    Integer(i32),
    /// Double value
    Double(f64),
    /// String value
    String(String),
    /// Element reference
    ElementId(ElementId),
}

impl ParamValue {
    /// Storage type this value can be written to
    #[inline]
    #[must_use]
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::Integer(_) => StorageType::Integer,
            Self::Double(_) => StorageType::Double,
            Self::String(_) => StorageType::String,
            Self::ElementId(_) => StorageType::ElementId,
        }
    }

    /// Integer payload
    #[inline]
    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Double payload
    #[inline]
    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// String payload
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Element reference payload
    #[inline]
    #[must_use]
    pub fn as_element_id(&self) -> Option<ElementId> {
        match self {
            Self::ElementId(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Integer(i32::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<ElementId> for ParamValue {
    fn from(value: ElementId) -> Self {
        Self::ElementId(value)
    }
}

/// Element category (host built-in category name, e.g. `OST_Rooms`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Create category from its host name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Host name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a low-level parameter definition within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefinitionId(i64);

impl DefinitionId {
    /// Create from raw host value
    #[inline]
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw host value
    #[inline]
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

/// Which namespace a definition lives in
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    /// Intrinsic host parameter, keyed by its low-level type id
    BuiltIn {
        /// Host type id (e.g. `autodesk.revit.parameter:allModelMark-1.0.0`)
        type_id: String,
    },
    /// Definition loaded from a shared definition file
    Shared,
    /// Definition created in and scoped to one document
    Project,
}

/// Opaque low-level parameter definition handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Definition {
    /// Document-scoped identifier
    pub id: DefinitionId,
    /// Display name
    pub name: String,
    /// Namespace
    pub kind: DefinitionKind,
    /// Storage of values for this definition
    pub storage_type: StorageType,
}

impl Definition {
    /// Returns true for built-in definitions
    #[inline]
    #[must_use]
    pub fn is_built_in(&self) -> bool {
        matches!(self.kind, DefinitionKind::BuiltIn { .. })
    }

    /// Returns true for shared definitions
    #[inline]
    #[must_use]
    pub fn is_shared(&self) -> bool {
        matches!(self.kind, DefinitionKind::Shared)
    }
}

/// Whether a binding applies to instances or types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindingKind {
    /// Instance parameter
    #[default]
    Instance,
    /// Type parameter
    Type,
}

/// Category association of a definition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binding {
    /// Instance or type binding
    pub kind: BindingKind,
    /// Categories the definition applies to
    pub categories: BTreeSet<Category>,
}

impl Binding {
    /// Create binding over the given categories
    #[must_use]
    pub fn new(kind: BindingKind, categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            kind,
            categories: categories.into_iter().collect(),
        }
    }

    /// Returns true if the binding applies to `category`
    #[inline]
    #[must_use]
    pub fn applies_to(&self, category: &Category) -> bool {
        self.categories.contains(category)
    }
}

/// A definition together with the binding that governs it in one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBinding {
    /// Definition handle
    pub definition: Definition,
    /// Binding
    pub binding: Binding,
}

/// Element classes the provisioning engine enumerates
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementClass {
    /// Project parameter definition element
    ParameterElement,
    /// Shared parameter definition element
    SharedParameterElement,
    /// Schedule view
    ViewSchedule,
    /// Project browser organization setting
    BrowserOrganization,
    /// Any other host class, by host class name
    Other(String),
}

/// Summary of one element returned by element lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    /// Element id
    pub id: ElementId,
    /// Element class
    pub class: ElementClass,
    /// Element name
    pub name: String,
    /// Category if the element has one
    pub category: Option<Category>,
    /// True for type elements
    pub is_element_type: bool,
}

/// How to resolve a live parameter on an element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamLookup {
    /// Built-in parameter by host type id
    BuiltIn(String),
    /// Shared parameter by definition name
    Shared(String),
    /// Project parameter by definition name
    Project(String),
}

impl Display for ParamLookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn(id) => write!(f, "built-in:{id}"),
            Self::Shared(name) => write!(f, "shared:{name}"),
            Self::Project(name) => write!(f, "project:{name}"),
        }
    }
}

/// Snapshot of a live parameter on an element
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    /// Native storage type
    pub storage_type: StorageType,
    /// Stored value, `None` if the parameter has no value
    pub value: Option<ParamValue>,
    /// Host-formatted, unit-aware display string
    pub display: Option<String>,
    /// True if the host forbids writes
    pub read_only: bool,
}

/// Geometric transform applied when copying elements
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Transform {
    /// No transformation
    #[default]
    Identity,
    /// Pure translation
    Translation {
        /// X offset
        x: f64,
        /// Y offset
        y: f64,
        /// Z offset
        z: f64,
    },
}

/// Options for cross-document copies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyPasteOptions {
    /// Keep the destination's types when names collide
    pub use_destination_types: bool,
}

/// Handle of an open transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(pub u64);

/// Handle of an open transaction group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionGroupId(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_id_validity() {
        assert!(ElementId::new(42).is_valid());
        assert!(!ElementId::INVALID.is_valid());
    }

    #[test]
    fn element_id_serializes_as_string() {
        let json = serde_json::to_string(&ElementId::new(1_234_567)).unwrap();
        assert_eq!(json, "\"1234567\"");
    }

    #[test]
    fn element_id_deserializes_from_string_or_number() {
        let from_str: ElementId = serde_json::from_str("\"-1\"").unwrap();
        let from_num: ElementId = serde_json::from_str("305").unwrap();

        assert_eq!(from_str, ElementId::INVALID);
        assert_eq!(from_num, ElementId::new(305));
        assert!(serde_json::from_str::<ElementId>("\"abc\"").is_err());
    }

    #[test]
    fn param_value_storage_types() {
        assert_eq!(ParamValue::from(1).storage_type(), StorageType::Integer);
        assert_eq!(ParamValue::from(true).storage_type(), StorageType::Integer);
        assert_eq!(ParamValue::from(1.5).storage_type(), StorageType::Double);
        assert_eq!(ParamValue::from("a").storage_type(), StorageType::String);
        assert_eq!(
            ParamValue::from(ElementId::new(7)).storage_type(),
            StorageType::ElementId
        );
    }

    #[test]
    fn param_value_accessors() {
        let v = ParamValue::from("A-101");
        assert_eq!(v.as_str(), Some("A-101"));
        assert_eq!(v.as_integer(), None);
        assert_eq!(ParamValue::from(3).as_integer(), Some(3));
        assert_eq!(ParamValue::from(2.5).as_double(), Some(2.5));
    }

    #[test]
    fn binding_applies_to() {
        let rooms = Category::new("OST_Rooms");
        let doors = Category::new("OST_Doors");
        let binding = Binding::new(BindingKind::Instance, [rooms.clone()]);

        assert!(binding.applies_to(&rooms));
        assert!(!binding.applies_to(&doors));
    }

    #[test]
    fn definition_kind_helpers() {
        let def = Definition {
            id: DefinitionId::new(1),
            name: "Mark".into(),
            kind: DefinitionKind::BuiltIn {
                type_id: "autodesk.revit.parameter:allModelMark-1.0.0".into(),
            },
            storage_type: StorageType::String,
        };
        assert!(def.is_built_in());
        assert!(!def.is_shared());
    }
}

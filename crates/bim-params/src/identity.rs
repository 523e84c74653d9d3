//! Parameter identities
//!
//! Immutable values naming a parameter in one of three namespaces.
//! Equality and hashing go by `id` (plus language for system parameters);
//! names and descriptions are presentation only.

use crate::error::ParamError;
use crate::language::LanguageType;
use crate::manifest::{self, SystemParamSpec};
use bim_host::{ParamLookup, StorageType};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Namespace of a parameter identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Built-in host parameter
    System,
    /// Shared definition file parameter
    Shared,
    /// Document-scoped parameter
    Project,
}

/// Built-in parameter identity
///
/// Name and storage type are derived from the manifest; only the machine
/// name and the label language are carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SystemParamRepr", into = "SystemParamRepr")]
pub struct SystemParam {
    spec: &'static SystemParamSpec,
    language: Option<LanguageType>,
}

#[derive(Serialize, Deserialize)]
struct SystemParamRepr {
    id: String,
    #[serde(default)]
    language: Option<LanguageType>,
}

impl SystemParam {
    /// Resolve a built-in parameter by machine name
    ///
    /// # Errors
    /// [`ParamError::InvalidArgument`] if `id` is empty or unknown
    pub fn new(id: &str, language: Option<LanguageType>) -> Result<Self, ParamError> {
        if id.trim().is_empty() {
            return Err(ParamError::invalid_argument("id", "system parameter id cannot be empty"));
        }
        let spec = manifest::lookup(id).ok_or_else(|| {
            ParamError::invalid_argument("id", format!("unknown built-in parameter '{id}'"))
        })?;

        Ok(Self { spec, language })
    }

    /// Same parameter with labels in another language
    #[inline]
    #[must_use]
    pub fn with_language(&self, language: Option<LanguageType>) -> Self {
        Self {
            spec: self.spec,
            language,
        }
    }

    /// Machine name
    #[inline]
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.spec.id
    }

    /// Label in the configured language
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.spec.label(self.language)
    }

    /// Label language, `None` for the host default
    #[inline]
    #[must_use]
    pub fn language(&self) -> Option<LanguageType> {
        self.language
    }

    /// Host low-level type id
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> &'static str {
        self.spec.type_id
    }

    /// Native storage type
    #[inline]
    #[must_use]
    pub fn storage_type(&self) -> StorageType {
        self.spec.storage_type
    }
}

impl PartialEq for SystemParam {
    fn eq(&self, other: &Self) -> bool {
        self.spec.id == other.spec.id && self.language == other.language
    }
}

impl Eq for SystemParam {}

impl Hash for SystemParam {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.spec.id.hash(state);
        self.language.hash(state);
    }
}

impl TryFrom<SystemParamRepr> for SystemParam {
    type Error = ParamError;

    fn try_from(repr: SystemParamRepr) -> Result<Self, Self::Error> {
        Self::new(&repr.id, repr.language)
    }
}

impl From<SystemParam> for SystemParamRepr {
    fn from(param: SystemParam) -> Self {
        Self {
            id: param.spec.id.to_owned(),
            language: param.language,
        }
    }
}

/// Definition-backed identity shared by shared and project parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DefinedParamRepr")]
struct DefinedParam {
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    storage_type: StorageType,
}

#[derive(Deserialize)]
struct DefinedParamRepr {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    storage_type: StorageType,
}

impl DefinedParam {
    fn new(id: String, name: String, storage_type: StorageType) -> Result<Self, ParamError> {
        if id.trim().is_empty() {
            return Err(ParamError::invalid_argument("id", "parameter id cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(ParamError::invalid_argument("name", "parameter name cannot be empty"));
        }

        Ok(Self {
            id,
            name,
            description: None,
            storage_type,
        })
    }

    fn renamed(&self, name: String) -> Result<Self, ParamError> {
        if name.trim().is_empty() {
            return Err(ParamError::invalid_argument("name", "parameter name cannot be empty"));
        }
        Ok(Self {
            name,
            ..self.clone()
        })
    }
}

impl TryFrom<DefinedParamRepr> for DefinedParam {
    type Error = ParamError;

    fn try_from(repr: DefinedParamRepr) -> Result<Self, Self::Error> {
        let mut param = Self::new(repr.id, repr.name, repr.storage_type)?;
        param.description = repr.description;
        Ok(param)
    }
}

impl PartialEq for DefinedParam {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DefinedParam {}

impl Hash for DefinedParam {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

macro_rules! defined_param {
    ($(#[$meta:meta])* $ty:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(DefinedParam);

        impl $ty {
            /// Create identity
            ///
            /// # Errors
            /// [`ParamError::InvalidArgument`] if `id` or `name` is empty
            pub fn new(
                id: impl Into<String>,
                name: impl Into<String>,
                storage_type: StorageType,
            ) -> Result<Self, ParamError> {
                DefinedParam::new(id.into(), name.into(), storage_type).map(Self)
            }

            /// Attach a description
            #[inline]
            #[must_use]
            pub fn with_description(mut self, description: impl Into<String>) -> Self {
                self.0.description = Some(description.into());
                self
            }

            /// Stable identity key
            #[inline]
            #[must_use]
            pub fn id(&self) -> &str {
                &self.0.id
            }

            /// Definition name
            #[inline]
            #[must_use]
            pub fn name(&self) -> &str {
                &self.0.name
            }

            /// Description, if any
            #[inline]
            #[must_use]
            pub fn description(&self) -> Option<&str> {
                self.0.description.as_deref()
            }

            /// Native storage type
            #[inline]
            #[must_use]
            pub fn storage_type(&self) -> StorageType {
                self.0.storage_type
            }

            /// Wrap as the polymorphic identity
            #[inline]
            #[must_use]
            pub fn as_revit_param(&self) -> RevitParam {
                RevitParam::$kind(self.clone())
            }
        }

        impl From<$ty> for RevitParam {
            fn from(param: $ty) -> Self {
                Self::$kind(param)
            }
        }
    };
}

defined_param!(
    /// Parameter defined in a shared definition file
    SharedParam,
    Shared
);

defined_param!(
    /// Parameter defined in, and scoped to, one document
    ProjectParam,
    Project
);

impl ProjectParam {
    pub(crate) fn predefined(id: &str, name: &str, storage_type: StorageType) -> Self {
        Self(DefinedParam {
            id: id.to_owned(),
            name: name.to_owned(),
            description: None,
            storage_type,
        })
    }
}

impl SystemParam {
    /// Wrap as the polymorphic identity
    #[inline]
    #[must_use]
    pub fn as_revit_param(&self) -> RevitParam {
        RevitParam::System(self.clone())
    }
}

impl From<SystemParam> for RevitParam {
    fn from(param: SystemParam) -> Self {
        Self::System(param)
    }
}

/// Any parameter identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevitParam {
    /// Built-in parameter
    System(SystemParam),
    /// Shared parameter
    Shared(SharedParam),
    /// Project parameter
    Project(ProjectParam),
}

impl RevitParam {
    /// Stable identity key
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::System(p) => p.id(),
            Self::Shared(p) => p.id(),
            Self::Project(p) => p.id(),
        }
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::System(p) => p.name(),
            Self::Shared(p) => p.name(),
            Self::Project(p) => p.name(),
        }
    }

    /// Description; built-in parameters have none
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::System(_) => None,
            Self::Shared(p) => p.description(),
            Self::Project(p) => p.description(),
        }
    }

    /// Native storage type
    #[must_use]
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::System(p) => p.storage_type(),
            Self::Shared(p) => p.storage_type(),
            Self::Project(p) => p.storage_type(),
        }
    }

    /// Namespace
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::System(_) => ParamKind::System,
            Self::Shared(_) => ParamKind::Shared,
            Self::Project(_) => ParamKind::Project,
        }
    }

    /// Same identity under another name
    ///
    /// # Errors
    /// [`ParamError::Unsupported`] for built-in parameters, whose names are
    /// derived; [`ParamError::InvalidArgument`] for an empty name
    pub fn with_name(&self, name: impl Into<String>) -> Result<Self, ParamError> {
        let name = name.into();
        match self {
            Self::System(p) => Err(ParamError::Unsupported(format!(
                "name of built-in parameter '{}' is derived from its id",
                p.id()
            ))),
            Self::Shared(p) => p.0.renamed(name).map(|d| Self::Shared(SharedParam(d))),
            Self::Project(p) => p.0.renamed(name).map(|d| Self::Project(ProjectParam(d))),
        }
    }

    /// Key the host uses to resolve the live parameter on an element
    #[must_use]
    pub fn lookup(&self) -> ParamLookup {
        match self {
            Self::System(p) => ParamLookup::BuiltIn(p.type_id().to_owned()),
            Self::Shared(p) => ParamLookup::Shared(p.name().to_owned()),
            Self::Project(p) => ParamLookup::Project(p.name().to_owned()),
        }
    }

    /// Built-in variant, if this is one
    #[inline]
    #[must_use]
    pub fn as_system(&self) -> Option<&SystemParam> {
        match self {
            Self::System(p) => Some(p),
            _ => None,
        }
    }

    /// Shared variant, if this is one
    #[inline]
    #[must_use]
    pub fn as_shared(&self) -> Option<&SharedParam> {
        match self {
            Self::Shared(p) => Some(p),
            _ => None,
        }
    }

    /// Project variant, if this is one
    #[inline]
    #[must_use]
    pub fn as_project(&self) -> Option<&ProjectParam> {
        match self {
            Self::Project(p) => Some(p),
            _ => None,
        }
    }
}

impl Display for RevitParam {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?}:{})", self.name(), self.kind(), self.id())
    }
}

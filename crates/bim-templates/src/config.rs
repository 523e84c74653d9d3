//! Provisioning configuration
//!
//! Locates template files under a library root laid out per host version:
//!
//! ```text
//! <template_root>/<host_version_tag>/templates/project_parameters.rvt
//! <template_root>/<host_version_tag>/templates/empty_project.rte
//! ```

use crate::error::ProvisioningError;
use bim_params::{known, ProjectParam};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Parameters template file name
pub const PARAMETERS_TEMPLATE: &str = "project_parameters.rvt";
/// Empty project template file name
pub const EMPTY_TEMPLATE: &str = "empty_project.rte";

/// Configuration of a provisioning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Library root holding one directory per host version
    pub template_root: PathBuf,
    /// Host version directory name, e.g. `2024`
    pub host_version_tag: String,
    /// Parameters that mark browser organization as already provisioned
    #[serde(default)]
    pub browser_organization: BrowserOrganizationConfig,
}

impl ProvisioningConfig {
    /// Create configuration for one library root and host version
    #[must_use]
    pub fn new(template_root: impl Into<PathBuf>, host_version_tag: impl Into<String>) -> Self {
        Self {
            template_root: template_root.into(),
            host_version_tag: host_version_tag.into(),
            browser_organization: BrowserOrganizationConfig::default(),
        }
    }

    /// With browser organization marker parameters
    #[inline]
    #[must_use]
    pub fn with_browser_organization(mut self, config: BrowserOrganizationConfig) -> Self {
        self.browser_organization = config;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// [`ProvisioningError::Config`] for malformed or invalid input
    pub fn from_toml_str(input: &str) -> Result<Self, ProvisioningError> {
        let config: Self = toml::from_str(input)
            .map_err(|e| ProvisioningError::config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// [`ProvisioningError::Config`] if the file cannot be read or is invalid
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ProvisioningError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| {
            ProvisioningError::config(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&input)
    }

    /// Check required fields
    ///
    /// # Errors
    /// [`ProvisioningError::Config`] for an empty root or version tag
    pub fn validate(&self) -> Result<(), ProvisioningError> {
        if self.template_root.as_os_str().is_empty() {
            return Err(ProvisioningError::config("template_root is empty"));
        }
        if self.host_version_tag.trim().is_empty() {
            return Err(ProvisioningError::config("host_version_tag is empty"));
        }
        Ok(())
    }

    /// Library directory of the configured host version
    #[must_use]
    pub fn library_path(&self) -> PathBuf {
        self.template_root.join(&self.host_version_tag)
    }

    /// Directory holding template documents
    #[must_use]
    pub fn templates_path(&self) -> PathBuf {
        self.library_path().join("templates")
    }

    /// Template providing parameters, schedules and browser organization
    #[must_use]
    pub fn parameters_template_path(&self) -> PathBuf {
        self.templates_path().join(PARAMETERS_TEMPLATE)
    }

    /// Empty project template
    #[must_use]
    pub fn empty_template_path(&self) -> PathBuf {
        self.templates_path().join(EMPTY_TEMPLATE)
    }
}

/// Marker parameters of a provisioned browser organization
///
/// Their presence in a target is taken to mean browser organization was
/// already copied. Nothing checks that the organization elements
/// themselves are there, so a document carrying both parameters without
/// them is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserOrganizationConfig {
    /// View grouping parameter
    pub view_group: ProjectParam,
    /// Project stage parameter
    pub project_stage: ProjectParam,
}

impl Default for BrowserOrganizationConfig {
    fn default() -> Self {
        Self {
            view_group: known::view_group(),
            project_stage: known::project_stage(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bim_host::StorageType;
    use pretty_assertions::assert_eq;

    #[test]
    fn derived_paths() {
        let config = ProvisioningConfig::new("/opt/library", "2024");

        assert_eq!(config.library_path(), PathBuf::from("/opt/library/2024"));
        assert_eq!(
            config.parameters_template_path(),
            PathBuf::from("/opt/library/2024/templates/project_parameters.rvt")
        );
        assert_eq!(
            config.empty_template_path(),
            PathBuf::from("/opt/library/2024/templates/empty_project.rte")
        );
    }

    #[test]
    fn toml_with_defaults() {
        let config = ProvisioningConfig::from_toml_str(
            r#"
            template_root = "/opt/library"
            host_version_tag = "2023"
            "#,
        )
        .unwrap();

        assert_eq!(config.host_version_tag, "2023");
        assert_eq!(config.browser_organization, BrowserOrganizationConfig::default());
        assert_eq!(config.browser_organization.view_group.name(), "_Группа Видов");
        assert_eq!(config.browser_organization.project_stage.name(), "_Стадия Проекта");
    }

    #[test]
    fn toml_overrides_marker_params() {
        let config = ProvisioningConfig::from_toml_str(
            r#"
            template_root = "/opt/library"
            host_version_tag = "2024"

            [browser_organization.view_group]
            id = "Group"
            name = "View Group"
            storage_type = "string"

            [browser_organization.project_stage]
            id = "Stage"
            name = "Stage"
            storage_type = "string"
            "#,
        )
        .unwrap();

        let group = &config.browser_organization.view_group;
        assert_eq!(group.name(), "View Group");
        assert_eq!(group.storage_type(), StorageType::String);
    }

    #[test]
    fn empty_version_tag_is_rejected() {
        let err = ProvisioningConfig::from_toml_str(
            r#"
            template_root = "/opt/library"
            host_version_tag = " "
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ProvisioningError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = ProvisioningConfig::from_toml_str("template_root = ").unwrap_err();
        assert!(matches!(err, ProvisioningError::Config(_)));
    }
}

//! Template-driven provisioning
//!
//! [`ProjectParameters`] brings a target document in line with the
//! parameters template: definitions and their category bindings, key
//! schedules, and project browser organization.
//!
//! # Guarantees
//!
//! - The template is opened fresh for every call and closed without saving
//!   before the call returns, on success and on every error path
//! - Each change runs inside a named transaction on the target; an error
//!   rolls it back
//! - Calls are idempotent: what is already present is left alone

use crate::config::ProvisioningConfig;
use crate::error::ProvisioningError;
use crate::schedule::ScheduleRule;
use bim_host::{
    CopyPasteOptions, DocumentHost, DocumentId, ElementClass, ElementId, ElementInfo,
    OpenedDocument, Transaction, TransactionGroup, Transform,
};
use bim_params::{ParamError, RevitParam};
use std::collections::BTreeSet;

/// Provisioning orchestrator over one host
pub struct ProjectParameters<'h> {
    host: &'h dyn DocumentHost,
    config: ProvisioningConfig,
}

impl<'h> ProjectParameters<'h> {
    /// Create orchestrator
    ///
    /// # Errors
    /// [`ProvisioningError::Config`] if `config` is invalid
    pub fn new(host: &'h dyn DocumentHost, config: ProvisioningConfig) -> Result<Self, ProvisioningError> {
        config.validate()?;
        Ok(Self { host, config })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// Ensure `param` is defined in `target` and bound like in the template
    ///
    /// An existing parameter has its category set replaced by the
    /// template's; a missing one has its definition copied from the
    /// template. Built-in parameters need nothing.
    ///
    /// # Errors
    /// Template open/close failures, a parameter missing from the template,
    /// or host failures inside the transaction (rolled back)
    pub fn setup_param(
        &self,
        target: DocumentId,
        param: impl Into<RevitParam>,
    ) -> Result<(), ProvisioningError> {
        self.setup_revit_param(target, &param.into())
    }

    /// Provision several parameters as a single undo step
    ///
    /// # Errors
    /// As [`ProjectParameters::setup_param`]; the first failure rolls back
    /// every parameter provisioned by this call
    pub fn setup_params<I>(&self, target: DocumentId, params: I) -> Result<(), ProvisioningError>
    where
        I: IntoIterator,
        I::Item: Into<RevitParam>,
    {
        let params: Vec<RevitParam> = params.into_iter().map(Into::into).collect();
        self.setup_revit_params(target, &params)
    }

    /// Copy one schedule from the template
    ///
    /// With `replace`, a same-named schedule in the target is deleted first,
    /// even when the template has nothing to put in its place. Without it,
    /// an existing schedule makes the call a no-op.
    ///
    /// # Returns
    /// `true` if the schedule was copied
    ///
    /// # Errors
    /// Template open/close failures or host failures (rolled back)
    #[tracing::instrument(skip(self, rule), fields(schedule = %rule))]
    pub fn setup_schedule(
        &self,
        target: DocumentId,
        replace: bool,
        rule: &ScheduleRule,
    ) -> Result<bool, ProvisioningError> {
        let name = format!("Setup schedule: \"{rule}\"");
        self.install_schedules(target, replace, std::slice::from_ref(rule), &name)
    }

    /// Copy several schedules from the template in one transfer
    ///
    /// Rules already satisfied by the target are skipped as a whole before
    /// the remaining schedules are copied together.
    ///
    /// # Returns
    /// `true` if at least one schedule was copied
    ///
    /// # Errors
    /// As [`ProjectParameters::setup_schedule`]
    #[tracing::instrument(skip(self, rules), fields(count = rules.len()))]
    pub fn setup_schedules(
        &self,
        target: DocumentId,
        replace: bool,
        rules: &[ScheduleRule],
    ) -> Result<bool, ProvisioningError> {
        self.install_schedules(target, replace, rules, "Setup schedules")
    }

    /// Copy the template's browser organization settings
    ///
    /// Skipped when the target already has both marker parameters of
    /// [`BrowserOrganizationConfig`](crate::BrowserOrganizationConfig).
    /// Template settings are copied before same-named target settings are
    /// deleted, so the target never runs out of them. The marker parameters
    /// are not copied; provision them with [`ProjectParameters::setup_params`].
    ///
    /// # Returns
    /// `true` if settings were copied
    ///
    /// # Errors
    /// Template open/close failures or host failures (rolled back)
    #[tracing::instrument(skip(self))]
    pub fn setup_browser_organization(&self, target: DocumentId) -> Result<bool, ProvisioningError> {
        if self.markers().iter().all(|p| p.exists_in(self.host, target)) {
            tracing::debug!("browser organization already configured");
            return Ok(false);
        }

        let template = self.open_template()?;
        let result = self.copy_browser_organization(template.id(), target);
        finish(template, result)
    }

    #[tracing::instrument(skip(self, param), fields(param = %param.id()))]
    fn setup_revit_param(&self, target: DocumentId, param: &RevitParam) -> Result<(), ProvisioningError> {
        if let RevitParam::System(_) = param {
            tracing::debug!("built-in parameter needs no provisioning");
            return Ok(());
        }

        let template = self.open_template()?;
        let result = self.provision(template.id(), target, param);
        finish(template, result)
    }

    #[tracing::instrument(skip(self, params), fields(count = params.len()))]
    fn setup_revit_params(&self, target: DocumentId, params: &[RevitParam]) -> Result<(), ProvisioningError> {
        if params.iter().all(|p| matches!(p, RevitParam::System(_))) {
            tracing::debug!("nothing to provision");
            return Ok(());
        }

        let template = self.open_template()?;
        let result = self.provision_all(template.id(), target, params);
        finish(template, result)
    }

    fn provision_all(
        &self,
        template: DocumentId,
        target: DocumentId,
        params: &[RevitParam],
    ) -> Result<(), ProvisioningError> {
        let group = TransactionGroup::start(self.host, target, "Setup parameters")?;
        for param in params {
            self.provision(template, target, param)?;
        }
        group.assimilate()?;

        tracing::info!(count = params.len(), "parameters provisioned");
        Ok(())
    }

    fn provision(
        &self,
        template: DocumentId,
        target: DocumentId,
        param: &RevitParam,
    ) -> Result<(), ProvisioningError> {
        match param {
            RevitParam::System(_) => Ok(()),
            _ if param.exists_in(self.host, target) => self.sync_binding(template, target, param),
            _ => self.copy_definition(template, target, param),
        }
    }

    fn sync_binding(
        &self,
        template: DocumentId,
        target: DocumentId,
        param: &RevitParam,
    ) -> Result<(), ProvisioningError> {
        let source = param.binding(self.host, template)?;
        let current = param.binding(self.host, target)?;
        if source.binding.categories == current.binding.categories {
            tracing::debug!(param = %param.id(), "binding already in sync");
            return Ok(());
        }

        let tx = Transaction::start(self.host, target, format!("Sync parameter: \"{}\"", param.name()))?;
        self.host
            .set_binding_categories(target, current.definition.id, &source.binding.categories)?;
        tx.commit()?;

        tracing::info!(
            param = %param.id(),
            categories = source.binding.categories.len(),
            "binding synchronized"
        );
        Ok(())
    }

    fn copy_definition(
        &self,
        template: DocumentId,
        target: DocumentId,
        param: &RevitParam,
    ) -> Result<(), ProvisioningError> {
        let element = param
            .param_element(self.host, template)?
            .ok_or_else(|| ParamError::not_found(param.id(), template))?;

        let tx = Transaction::start(self.host, target, format!("Setup parameter: \"{}\"", param.name()))?;
        self.copy(template, &[element.id], target)?;
        tx.commit()?;

        tracing::info!(param = %param.id(), "definition copied");
        Ok(())
    }

    fn install_schedules(
        &self,
        target: DocumentId,
        replace: bool,
        rules: &[ScheduleRule],
        transaction: &str,
    ) -> Result<bool, ProvisioningError> {
        if rules.is_empty() {
            return Ok(false);
        }

        let template = self.open_template()?;
        let result = self.copy_schedules(template.id(), target, replace, rules, transaction);
        finish(template, result)
    }

    fn copy_schedules(
        &self,
        template: DocumentId,
        target: DocumentId,
        replace: bool,
        rules: &[ScheduleRule],
        transaction: &str,
    ) -> Result<bool, ProvisioningError> {
        let wanted: BTreeSet<&str> = rules.iter().map(ScheduleRule::name).collect();
        let named = |e: &ElementInfo| !e.is_element_type && wanted.contains(e.name.as_str());
        let available = self.host.find_elements(template, &ElementClass::ViewSchedule, &named)?;

        let found: BTreeSet<&str> = available.iter().map(|e| e.name.as_str()).collect();
        for missing in wanted.difference(&found) {
            tracing::warn!(schedule = %missing, "schedule not found in template");
        }
        if available.is_empty() && !replace {
            return Ok(false);
        }

        let tx = Transaction::start(self.host, target, transaction)?;
        let existing = self.host.find_elements(target, &ElementClass::ViewSchedule, &named)?;

        let present: BTreeSet<&str> = if replace {
            if !existing.is_empty() {
                self.host.delete_elements(target, &ids(&existing))?;
                tracing::debug!(count = existing.len(), "replaced schedules deleted");
            }
            BTreeSet::new()
        } else {
            existing.iter().map(|e| e.name.as_str()).collect()
        };

        let to_copy: Vec<ElementId> = available
            .iter()
            .filter(|e| !present.contains(e.name.as_str()))
            .map(|e| e.id)
            .collect();
        if to_copy.is_empty() {
            if replace && !existing.is_empty() {
                tx.commit()?;
                tracing::info!(deleted = existing.len(), "schedules deleted, nothing to copy");
            } else {
                tx.rollback()?;
                tracing::debug!("schedules already present");
            }
            return Ok(false);
        }

        self.copy(template, &to_copy, target)?;
        tx.commit()?;

        tracing::info!(copied = to_copy.len(), skipped = present.len(), "schedules installed");
        Ok(true)
    }

    fn copy_browser_organization(
        &self,
        template: DocumentId,
        target: DocumentId,
    ) -> Result<bool, ProvisioningError> {
        let settings = self
            .host
            .elements_of_class(template, &ElementClass::BrowserOrganization)?;
        if settings.is_empty() {
            tracing::warn!("template has no browser organization");
            return Ok(false);
        }

        let names: BTreeSet<&str> = settings.iter().map(|e| e.name.as_str()).collect();
        let colliding = self.host.find_elements(target, &ElementClass::BrowserOrganization, &|e: &ElementInfo| {
            names.contains(e.name.as_str())
        })?;

        let tx = Transaction::start(self.host, target, "Setup browser organization")?;
        self.copy(template, &ids(&settings), target)?;
        if !colliding.is_empty() {
            self.host.delete_elements(target, &ids(&colliding))?;
        }
        tx.commit()?;

        tracing::info!(
            copied = settings.len(),
            replaced = colliding.len(),
            "browser organization installed"
        );
        Ok(true)
    }

    fn copy(
        &self,
        source: DocumentId,
        elements: &[ElementId],
        target: DocumentId,
    ) -> Result<Vec<ElementId>, ProvisioningError> {
        let copied = self.host.copy_elements(
            source,
            elements,
            target,
            &Transform::Identity,
            &CopyPasteOptions::default(),
        )?;
        tracing::debug!(requested = elements.len(), copied = copied.len(), "elements copied");
        Ok(copied)
    }

    fn markers(&self) -> [RevitParam; 2] {
        let markers = &self.config.browser_organization;
        [
            markers.view_group.as_revit_param(),
            markers.project_stage.as_revit_param(),
        ]
    }

    fn open_template(&self) -> Result<OpenedDocument<'h>, ProvisioningError> {
        let path = self.config.parameters_template_path();
        OpenedDocument::open(self.host, &path)
            .map_err(|source| ProvisioningError::TemplateOpen { path, source })
    }
}

impl std::fmt::Debug for ProjectParameters<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectParameters")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Close the template after `result` is known
///
/// A close failure after success is reported; after an error the guard
/// closes the template and the original error wins.
fn finish<T>(
    template: OpenedDocument<'_>,
    result: Result<T, ProvisioningError>,
) -> Result<T, ProvisioningError> {
    match result {
        Ok(value) => {
            template.close()?;
            Ok(value)
        }
        Err(e) => {
            tracing::warn!(template = %template.path().display(), error = %e, "provisioning failed, discarding template");
            drop(template);
            Err(e)
        }
    }
}

fn ids(elements: &[ElementInfo]) -> Vec<ElementId> {
    elements.iter().map(|e| e.id).collect()
}

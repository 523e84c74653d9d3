//! Schedule rules

use bim_params::{ParamError, RevitParam};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// A schedule view in the template, named by its exact title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleRule {
    name: String,
}

impl ScheduleRule {
    /// Create a rule for the schedule titled `name`
    ///
    /// # Errors
    /// [`ParamError::InvalidArgument`] for a blank name
    pub fn new(name: impl Into<String>) -> Result<Self, ParamError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ParamError::invalid_argument("name", "schedule name is empty"));
        }
        Ok(Self { name })
    }

    /// Key schedule of `param`, titled after the parameter's name
    #[must_use]
    pub fn for_param(param: &RevitParam) -> Self {
        Self {
            name: param.name().to_owned(),
        }
    }

    /// Schedule title
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TryFrom<String> for ScheduleRule {
    type Error = ParamError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl From<ScheduleRule> for String {
    fn from(rule: ScheduleRule) -> Self {
        rule.name
    }
}

impl Display for ScheduleRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bim_host::StorageType;
    use bim_params::SharedParam;

    #[test]
    fn blank_name_is_rejected() {
        assert!(ScheduleRule::new("  ").unwrap_err().is_argument());
        assert_eq!(ScheduleRule::new("Rooms").unwrap().name(), "Rooms");
    }

    #[test]
    fn key_schedule_follows_param_name() {
        let param: RevitParam = SharedParam::new("Apt", "Apartment", StorageType::String)
            .unwrap()
            .into();
        assert_eq!(ScheduleRule::for_param(&param).name(), "Apartment");
    }
}

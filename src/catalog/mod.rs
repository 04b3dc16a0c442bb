// ABOUTME: Catalog of named administrative actions.
// ABOUTME: Each action validates its parameters and builds a structured command for its target.

mod docker;
mod kubernetes;
mod linux;
mod windows;

use crate::command::CommandLine;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("unknown action group: {0}")]
    UnknownGroup(String),

    #[error("missing required parameter: {0}")]
    MissingParam(String),

    #[error("parameter {name} must not start with '-': {value}")]
    OptionLikeParam { name: String, value: String },

    #[error("parameter {name} must be a number: {value}")]
    NotANumber { name: String, value: String },

    #[error("expected key=value, got: {0}")]
    MalformedParam(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Area of administration an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Group {
    Linux,
    Docker,
    Kubernetes,
    Windows,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Linux => "linux",
            Group::Docker => "docker",
            Group::Kubernetes => "kubernetes",
            Group::Windows => "windows",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linux" => Ok(Group::Linux),
            "docker" => Ok(Group::Docker),
            "kubernetes" | "k8s" => Ok(Group::Kubernetes),
            "windows" => Ok(Group::Windows),
            other => Err(Error::UnknownGroup(other.to_string())),
        }
    }
}

/// Where an action's command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Local,
    Remote,
}

/// Named parameters supplied to an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Parse `key=value` pairs as given on the command line.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut params = Params::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .filter(|(key, _)| !key.trim().is_empty())
                .ok_or_else(|| Error::MalformedParam(pair.to_string()))?;
            params.0.insert(key.trim().to_string(), value.to_string());
        }
        Ok(params)
    }

    /// A required value. Empty values count as missing, and values that
    /// look like options are refused so they cannot change the command.
    pub fn get(&self, name: &str) -> Result<&str> {
        let value = self
            .0
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::MissingParam(name.to_string()))?;
        if value.starts_with('-') {
            return Err(Error::OptionLikeParam {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        Ok(value)
    }

    /// An optional value, validated like [`Params::get`] when present.
    pub fn get_opt(&self, name: &str) -> Result<Option<&str>> {
        match self.get(name) {
            Ok(value) => Ok(Some(value)),
            Err(Error::MissingParam(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// A required non-negative integer.
    pub fn get_number(&self, name: &str) -> Result<u32> {
        let value = self.get(name)?;
        value.parse().map_err(|_| Error::NotANumber {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

type BuildFn = fn(&Params) -> Result<CommandLine>;

/// One administrative action.
#[derive(Clone)]
pub struct Action {
    pub id: &'static str,
    pub title: &'static str,
    pub group: Group,
    pub target: TargetKind,
    /// Names of the parameters `build` reads.
    pub params: &'static [&'static str],
    build: BuildFn,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("group", &self.group)
            .field("target", &self.target)
            .field("params", &self.params)
            .finish()
    }
}

impl Action {
    pub(crate) fn new(
        group: Group,
        target: TargetKind,
        id: &'static str,
        title: &'static str,
        params: &'static [&'static str],
        build: BuildFn,
    ) -> Self {
        Self {
            id,
            title,
            group,
            target,
            params,
            build,
        }
    }

    /// Build the command for this action from the given parameters.
    pub fn build(&self, params: &Params) -> Result<CommandLine> {
        (self.build)(params)
    }
}

/// Every action, grouped and in display order.
pub fn actions() -> Vec<Action> {
    let mut all = linux::actions();
    all.extend(docker::actions());
    all.extend(kubernetes::actions());
    all.extend(windows::actions());
    all
}

pub fn actions_in(group: Group) -> Vec<Action> {
    actions().into_iter().filter(|a| a.group == group).collect()
}

pub fn find(id: &str) -> Result<Action> {
    actions()
        .into_iter()
        .find(|a| a.id == id)
        .ok_or_else(|| Error::UnknownAction(id.to_string()))
}

/// `sudo -n` prefix: fail instead of prompting when a password is needed.
pub(crate) fn sudo(program: &str) -> CommandLine {
    CommandLine::program("sudo").args(["-n", program])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn action_ids_are_unique_and_prefixed_by_group() {
        let all = actions();
        let mut seen = HashSet::new();
        for action in &all {
            assert!(seen.insert(action.id), "duplicate action id {}", action.id);
            assert!(
                action.id.starts_with(&format!("{}.", action.group)),
                "{} is not prefixed by its group",
                action.id
            );
        }
    }

    #[test]
    fn every_group_has_actions() {
        for group in [Group::Linux, Group::Docker, Group::Kubernetes, Group::Windows] {
            assert!(!actions_in(group).is_empty(), "{} has no actions", group);
        }
    }

    #[test]
    fn actions_build_when_all_params_given() {
        for action in actions() {
            let params = action
                .params
                .iter()
                .fold(Params::new(), |p, name| p.with(*name, "3"));
            assert!(
                action.build(&params).is_ok(),
                "{} failed to build with its declared params",
                action.id
            );
        }
    }

    #[test]
    fn actions_with_params_reject_missing_ones() {
        for action in actions().into_iter().filter(|a| !a.params.is_empty()) {
            assert!(
                matches!(action.build(&Params::new()), Err(Error::MissingParam(_))),
                "{} built without its params",
                action.id
            );
        }
    }

    #[test]
    fn find_unknown_action() {
        assert_eq!(
            find("linux.nope").unwrap_err(),
            Error::UnknownAction("linux.nope".to_string())
        );
    }

    #[test]
    fn group_parses_from_str() {
        assert_eq!("k8s".parse::<Group>().unwrap(), Group::Kubernetes);
        assert_eq!("linux".parse::<Group>().unwrap(), Group::Linux);
        assert!("aws".parse::<Group>().is_err());
    }

    #[test]
    fn params_from_pairs() {
        let params = Params::from_pairs(["name=nginx", "msg=a=b"]).unwrap();
        assert_eq!(params.get("name").unwrap(), "nginx");
        assert_eq!(params.get("msg").unwrap(), "a=b");
        assert!(Params::from_pairs(["novalue"]).is_err());
        assert!(Params::from_pairs(["=value"]).is_err());
    }

    #[test]
    fn params_reject_empty_and_option_like_values() {
        let params = Params::new().with("path", "  ").with("pid", "--all");
        assert_eq!(
            params.get("path").unwrap_err(),
            Error::MissingParam("path".to_string())
        );
        assert!(matches!(
            params.get("pid"),
            Err(Error::OptionLikeParam { .. })
        ));
        assert!(params.get_opt("path").unwrap().is_none());
    }

    #[test]
    fn params_parse_numbers() {
        let params = Params::new().with("replicas", "3").with("bad", "three");
        assert_eq!(params.get_number("replicas").unwrap(), 3);
        assert!(matches!(
            params.get_number("bad"),
            Err(Error::NotANumber { .. })
        ));
    }

    #[test]
    fn injected_values_stay_single_arguments() {
        let action = find("linux.view-file").unwrap();
        let cmd = action
            .build(&Params::new().with("path", "/etc/hosts; rm -rf /"))
            .unwrap();
        assert_eq!(cmd.to_remote_string(), "sudo -n cat '/etc/hosts; rm -rf /'");
    }
}

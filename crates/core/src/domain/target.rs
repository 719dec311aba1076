// Target Domain Model

use serde::{Deserialize, Serialize};

/// Host name the engine understands as "this machine"
pub const LOCALHOST: &str = "localhost";

/// Where an operation runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Local,
    Remote(String),
}

impl Target {
    /// Resolve a raw host value (usually `TARGET_HOST`)
    ///
    /// Unset, blank and `localhost` all mean local execution.
    pub fn from_host(host: Option<&str>) -> Self {
        match host.map(str::trim) {
            None | Some("") | Some(LOCALHOST) => Target::Local,
            Some(name) => Target::Remote(name.to_string()),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Target::Local)
    }

    /// Name handed to the engine
    pub fn name(&self) -> &str {
        match self {
            Target::Local => LOCALHOST,
            Target::Remote(name) => name,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_and_localhost_are_local() {
        assert_eq!(Target::from_host(None), Target::Local);
        assert_eq!(Target::from_host(Some("")), Target::Local);
        assert_eq!(Target::from_host(Some("localhost")), Target::Local);
        assert_eq!(Target::Local.name(), "localhost");
    }

    #[test]
    fn test_named_host_is_remote() {
        let target = Target::from_host(Some("centos7-pool1.example.net"));
        assert!(!target.is_local());
        assert_eq!(target.name(), "centos7-pool1.example.net");
        assert_eq!(target.to_string(), "centos7-pool1.example.net");
    }
}

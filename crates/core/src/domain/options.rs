// Command Options

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};

/// Options for applying a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    /// Fail if the run reports changes (detailed exit codes, only 0 accepted)
    pub catch_changes: bool,
    /// Fail only on errors (detailed exit codes, 0 and 2 accepted)
    pub catch_failures: bool,
    /// Fail unless the run reports changes (detailed exit codes, only 2 accepted)
    pub expect_changes: bool,
    /// Return failures as data instead of raising
    pub expect_failures: bool,
    pub manifest_file_location: Option<String>,
    pub hiera_config: Option<String>,
    /// Prepended verbatim, e.g. `FACTER_role=db`
    pub prefix_command: Option<String>,
    pub debug: bool,
    pub noop: bool,
    pub trace_logs: bool,
}

/// How the exit code of an apply is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyExpectation {
    Default,
    CatchChanges,
    CatchFailures,
    ExpectChanges,
    ExpectFailures,
}

impl ApplyOptions {
    /// Resolve the expectation flags; at most one may be set
    pub fn expectation(&self) -> Result<ApplyExpectation> {
        let set: Vec<(&str, ApplyExpectation)> = [
            (self.catch_changes, "catch_changes", ApplyExpectation::CatchChanges),
            (self.catch_failures, "catch_failures", ApplyExpectation::CatchFailures),
            (self.expect_changes, "expect_changes", ApplyExpectation::ExpectChanges),
            (self.expect_failures, "expect_failures", ApplyExpectation::ExpectFailures),
        ]
        .into_iter()
        .filter(|(on, _, _)| *on)
        .map(|(_, name, expectation)| (name, expectation))
        .collect();

        match set.as_slice() {
            [] => Ok(ApplyExpectation::Default),
            [(_, expectation)] => Ok(*expectation),
            _ => Err(DomainError::ConflictingExpectations(
                "`catch_changes`, `expect_changes`, `catch_failures` or `expect_failures`"
                    .to_string(),
            )),
        }
    }

    /// Same options with every expectation flag cleared
    pub fn without_expectations(&self) -> Self {
        Self {
            catch_changes: false,
            catch_failures: false,
            expect_changes: false,
            expect_failures: false,
            ..self.clone()
        }
    }
}

impl ApplyExpectation {
    pub fn uses_detailed_exit_codes(&self) -> bool {
        matches!(
            self,
            ApplyExpectation::CatchChanges
                | ApplyExpectation::CatchFailures
                | ApplyExpectation::ExpectChanges
        )
    }

    /// Detailed exit codes: 0 no changes, 2 changes, anything else an error
    pub fn accepts(&self, exit_code: i32) -> bool {
        match self {
            ApplyExpectation::Default | ApplyExpectation::CatchChanges => exit_code == 0,
            ApplyExpectation::CatchFailures => exit_code == 0 || exit_code == 2,
            ApplyExpectation::ExpectChanges => exit_code == 2,
            ApplyExpectation::ExpectFailures => true,
        }
    }
}

/// Options shared by shell, upload, task and script operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub expect_failures: bool,
}

impl RunOptions {
    pub fn expecting_failures() -> Self {
        Self {
            expect_failures: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expectation() {
        let opts = ApplyOptions::default();
        let expectation = opts.expectation().unwrap();

        assert_eq!(expectation, ApplyExpectation::Default);
        assert!(!expectation.uses_detailed_exit_codes());
        assert!(expectation.accepts(0));
        assert!(!expectation.accepts(2));
    }

    #[test]
    fn test_single_flag_selects_expectation() {
        let opts = ApplyOptions {
            catch_failures: true,
            ..Default::default()
        };
        let expectation = opts.expectation().unwrap();

        assert_eq!(expectation, ApplyExpectation::CatchFailures);
        assert!(expectation.accepts(0));
        assert!(expectation.accepts(2));
        assert!(!expectation.accepts(1));
        assert!(!expectation.accepts(4));
    }

    #[test]
    fn test_expect_failures_accepts_everything_without_detailed_codes() {
        let expectation = ApplyOptions {
            expect_failures: true,
            ..Default::default()
        }
        .expectation()
        .unwrap();

        assert!(!expectation.uses_detailed_exit_codes());
        assert!(expectation.accepts(0));
        assert!(expectation.accepts(1));
        assert!(expectation.accepts(255));
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        let opts = ApplyOptions {
            catch_changes: true,
            expect_failures: true,
            ..Default::default()
        };

        let err = opts.expectation().unwrap_err();
        assert!(err.to_string().contains("only one of"));
    }

    #[test]
    fn test_without_expectations_keeps_other_fields() {
        let opts = ApplyOptions {
            catch_changes: true,
            noop: true,
            hiera_config: Some("/etc/hiera.yaml".to_string()),
            ..Default::default()
        };
        let cleared = opts.without_expectations();

        assert!(!cleared.catch_changes);
        assert!(cleared.noop);
        assert_eq!(cleared.hiera_config.as_deref(), Some("/etc/hiera.yaml"));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: ApplyOptions =
            serde_json::from_value(serde_json::json!({"catch_changes": true})).unwrap();
        assert!(opts.catch_changes);
        assert!(!opts.debug);
        assert!(opts.manifest_file_location.is_none());
    }
}

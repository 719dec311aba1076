// Version requirement parsing
//
// Accepted grammar is exactly two clauses, `<cmp><ver> <cmp><ver>`, with
// comparators `>=`, `<=`, `>`, `<`, `=`. Anything else (a single clause, a
// third clause, `~>`) is rejected rather than partially applied.
// Evaluation uses semver comparators, so partial versions follow semver
// rules (`>6` means `>=7.0.0`).

use regex::Regex;
use semver::{Comparator, Version};
use std::sync::OnceLock;

use crate::error::{MatrixError, Result};

fn two_clause_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(>=|<=|>|<|=)\s*(\d+(?:\.\d+){0,2})\s+(>=|<=|>|<|=)\s*(\d+(?:\.\d+){0,2})\s*$",
        )
        .expect("two-clause pattern is valid")
    })
}

/// A parsed two-clause requirement such as `>= 6.21.0 < 7.0.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequirement {
    raw: String,
    clauses: [Comparator; 2],
}

impl VersionRequirement {
    pub fn parse(raw: &str) -> Result<Self> {
        let captures = two_clause_pattern()
            .captures(raw)
            .ok_or_else(|| MatrixError::UnrecognizedRequirement(raw.to_string()))?;

        let clause = |op: usize, ver: usize| -> Result<Comparator> {
            let text = format!("{}{}", &captures[op], &captures[ver]);
            Comparator::parse(&text).map_err(|source| MatrixError::InvalidVersion {
                requirement: raw.to_string(),
                source,
            })
        };

        Ok(Self {
            raw: raw.to_string(),
            clauses: [clause(1, 2)?, clause(3, 4)?],
        })
    }

    /// True when `version` satisfies both clauses
    pub fn matches(&self, version: &Version) -> bool {
        self.clauses.iter().all(|c| c.matches(version))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.clauses[0], self.clauses[1])
    }
}

// Execution Context - everything an operation needs to know about "where"
// Environment is read once here instead of inside every operation

use std::path::{Path, PathBuf};

use super::target::Target;

/// Environment variable naming the target host
pub const TARGET_HOST_VAR: &str = "TARGET_HOST";

/// Environment variable enabling diagnostic printing of apply results
pub const DEBUG_VAR: &str = "RSPEC_DEBUG";

/// Inventory location, relative to the module under test
pub const DEFAULT_INVENTORY_PATH: &str = "spec/fixtures/litmus_inventory.yaml";

/// Fixture module path, relative to the module under test
pub const DEFAULT_MODULEPATH: &str = "spec/fixtures/modules";

/// Per-call execution context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    pub target: Target,
    pub inventory_path: PathBuf,
    pub modulepath: PathBuf,
    pub temp_dir: PathBuf,
    pub debug: bool,
}

impl ExecutionContext {
    /// Local context rooted at `project_dir`
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        let project_dir = project_dir.as_ref();
        Self {
            target: Target::Local,
            inventory_path: project_dir.join(DEFAULT_INVENTORY_PATH),
            modulepath: project_dir.join(DEFAULT_MODULEPATH),
            temp_dir: std::env::temp_dir(),
            debug: false,
        }
    }

    /// Build from the process environment and current directory
    pub fn from_env() -> std::io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::from_lookup(cwd, |key| std::env::var(key).ok()))
    }

    /// Build from an arbitrary variable lookup (tests inject a map here)
    pub fn from_lookup<F>(project_dir: impl AsRef<Path>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let target = Target::from_host(lookup(TARGET_HOST_VAR).as_deref());
        let debug = lookup(DEBUG_VAR).map(|v| is_truthy(&v)).unwrap_or(false);

        Self::new(project_dir).with_target(target).with_debug(debug)
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_inventory_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inventory_path = path.into();
        self
    }

    pub fn with_modulepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.modulepath = path.into();
        self
    }

    pub fn with_temp_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_dir = path.into();
        self
    }
}

/// Anything except empty, `0` or `false` (case-insensitive) enables a flag
fn is_truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "" | "0" | "false")
}

//! Pipeline configuration
//!
//! Every external step is described by paths relative to the project root.
//! The defaults match the standard project layout; a `dualseed.toml` in the
//! root (or the file given with `--config`) overrides any subset of them.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration Constants
// ============================================================================

/// Config file looked up in the project root when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "dualseed.toml";

/// Name of the ingest binary, used when no explicit path is configured
pub const INGEST_BIN_NAME: &str = "dualseed-ingest";

/// Interpreter and script locations for the seven pipeline steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Interpreter for the external generator and loader scripts
    pub python: String,

    /// `dualseed-ingest` executable; resolved next to `dualseed` when unset
    pub ingest_bin: Option<PathBuf>,

    /// Distinct extraction job list consumed by `dualseed-ingest distinct --plan`
    pub distinct_plan: PathBuf,

    pub lookup_script: PathBuf,

    /// Script that applies every `.sql` file in a directory
    pub sql_runner: PathBuf,
    pub ddl_dir: PathBuf,

    pub main_seed_script: PathBuf,
    pub seeds_dir: PathBuf,

    /// Seed file scanned for `app_user` ids when none are supplied
    pub app_user_seed: PathBuf,

    pub nosql_runner: PathBuf,

    /// Where document seeds and `user_ids.txt` are written
    pub document_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            ingest_bin: None,
            distinct_plan: PathBuf::from("data-import/distinct.toml"),
            lookup_script: PathBuf::from("dml/generate_lookup_seeds.py"),
            sql_runner: PathBuf::from("run-sql.py"),
            ddl_dir: PathBuf::from("ddl/tables"),
            main_seed_script: PathBuf::from("dml/generate_main_seeds.py"),
            seeds_dir: PathBuf::from("dml/seeds"),
            app_user_seed: PathBuf::from("dml/seeds/021_app_user_seed.sql"),
            nosql_runner: PathBuf::from("run-nosql.py"),
            document_dir: PathBuf::from("dml/document-seeds"),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&raw)
            .map_err(|e| PipelineError::config(format!("{}: {e}", path.display())))
    }

    fn from_toml(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Pick the config for a run rooted at `root`
    ///
    /// An explicit path must exist. Otherwise `root/dualseed.toml` is used
    /// when present, and the defaults when not.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = root.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "Loading pipeline config");
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// The ingest executable to invoke for steps 1 and 6
    pub fn ingest_program(&self) -> PathBuf {
        if let Some(bin) = &self.ingest_bin {
            return bin.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(INGEST_BIN_NAME)))
            .filter(|candidate| candidate.is_file())
            .unwrap_or_else(|| PathBuf::from(INGEST_BIN_NAME))
    }

    /// `user_ids.txt` inside the document directory
    pub fn user_ids_file(&self) -> PathBuf {
        self.document_dir.join("user_ids.txt")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_project_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.python, "python3");
        assert_eq!(config.app_user_seed, PathBuf::from("dml/seeds/021_app_user_seed.sql"));
        assert_eq!(
            config.user_ids_file(),
            PathBuf::from("dml/document-seeds/user_ids.txt")
        );
    }

    #[test]
    fn test_partial_override() {
        let config = PipelineConfig::from_toml(
            r#"
python = "/opt/venv/bin/python"
ingest_bin = "target/release/dualseed-ingest"
"#,
        )
        .unwrap();
        assert_eq!(config.python, "/opt/venv/bin/python");
        assert_eq!(
            config.ingest_program(),
            PathBuf::from("target/release/dualseed-ingest")
        );
        assert_eq!(config.ddl_dir, PathBuf::from("ddl/tables"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(PipelineConfig::from_toml("pyhton = \"python3\"").is_err());
    }

    #[test]
    fn test_discover() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            PipelineConfig::discover(dir.path(), None).unwrap(),
            PipelineConfig::default()
        );

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "seeds_dir = \"seeds\"\n").unwrap();
        let found = PipelineConfig::discover(dir.path(), None).unwrap();
        assert_eq!(found.seeds_dir, PathBuf::from("seeds"));

        let missing = dir.path().join("other.toml");
        assert!(matches!(
            PipelineConfig::discover(dir.path(), Some(&missing)),
            Err(PipelineError::Config(_))
        ));
    }
}

//! The seven pipeline steps and their command lines

use super::PipelineOptions;
use crate::config::PipelineConfig;
use std::fmt;
use std::path::{Path, PathBuf};

/// Number of steps in a full run
pub const STEP_COUNT: usize = 7;

pub const DISTINCT_TITLE: &str = "Generate distinct CSV files from datasets";
pub const LOOKUP_TITLE: &str = "Generate SQL lookup seed files";
pub const DDL_TITLE: &str = "Create/ensure SQL schema (DDL)";
pub const MAIN_SEED_TITLE: &str = "Generate SQL main seed files from datasets";
pub const SQL_LOAD_TITLE: &str = "Load SQL seed files into PostgreSQL";
pub const DOCUMENTS_TITLE: &str = "Generate NoSQL JSON document seeds";
pub const NOSQL_LOAD_TITLE: &str = "Load NoSQL JSON seeds into MongoDB";

/// Program plus arguments for one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl StepCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        let rendered = path.display().to_string();
        self.arg(rendered)
    }

    /// Append `flag value`
    pub fn opt(self, flag: &str, value: impl AsRef<str>) -> Self {
        self.arg(flag).arg(value)
    }

    /// Append `value` when present
    pub fn arg_if(self, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.arg(value),
            None => self,
        }
    }

    /// Value following `flag`, if the flag is present
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for StepCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$ {}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// One pipeline step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    /// 1-based position in the run
    pub number: usize,
    pub title: &'static str,
    /// Files or directories the step reads, relative to the project root
    pub inputs: Vec<PathBuf>,
    /// Files or directories the step writes
    pub outputs: Vec<PathBuf>,
    pub command: StepCommand,
    /// The user id file must be written before this step runs
    pub needs_user_ids: bool,
}

impl StepDescriptor {
    /// `[n/7] title`
    pub fn label(&self) -> String {
        format!("[{}/{}] {}", self.number, STEP_COUNT, self.title)
    }
}

/// Build the full step list for a run
pub fn build_steps(
    config: &PipelineConfig,
    options: &PipelineOptions,
    ingest_bin: &Path,
) -> Vec<StepDescriptor> {
    let child = options.progress.for_child().as_arg();
    let python = config.python.as_str();
    let sql = options.sql_connection_string.as_deref();
    let nosql = options.nosql_connection_string.as_deref();

    let distinct = StepCommand::new(ingest_bin)
        .arg("distinct")
        .arg("--plan")
        .path_arg(&config.distinct_plan)
        .opt("--progress", child);

    let lookup = StepCommand::new(python)
        .path_arg(&config.lookup_script)
        .opt("--progress", child);

    let ddl = StepCommand::new(python)
        .path_arg(&config.sql_runner)
        .arg_if(sql)
        .arg("--scripts-dir")
        .path_arg(&config.ddl_dir)
        .opt("--progress", child);

    let mut main_seed = StepCommand::new(python)
        .path_arg(&config.main_seed_script)
        .opt("--n", options.n.to_string())
        .opt("--progress", child);
    if let Some(seed) = options.seed {
        main_seed = main_seed.opt("--seed", seed.to_string());
    }

    let sql_load = StepCommand::new(python)
        .path_arg(&config.sql_runner)
        .arg_if(sql)
        .arg("--scripts-dir")
        .path_arg(&config.seeds_dir)
        .opt("--progress", child);

    let mut documents = StepCommand::new(ingest_bin)
        .arg("documents")
        .arg("--user-ids-file")
        .path_arg(&config.user_ids_file())
        .arg("--output-dir")
        .path_arg(&config.document_dir)
        .opt("--progress", child);
    if let Some(url) = sql {
        documents = documents.opt("--sql-connection-string", url);
    }

    let mut nosql_load = StepCommand::new(python)
        .path_arg(&config.nosql_runner)
        .arg_if(nosql)
        .arg("--input-dir")
        .path_arg(&config.document_dir)
        .opt("--batch-size", options.batch_size().to_string())
        .opt("--progress", child);
    if options.nosql_clear {
        nosql_load = nosql_load.arg("--clear");
    }

    vec![
        StepDescriptor {
            number: 1,
            title: DISTINCT_TITLE,
            inputs: vec![config.distinct_plan.clone()],
            outputs: Vec::new(),
            command: distinct,
            needs_user_ids: false,
        },
        StepDescriptor {
            number: 2,
            title: LOOKUP_TITLE,
            inputs: Vec::new(),
            outputs: vec![config.seeds_dir.clone()],
            command: lookup,
            needs_user_ids: false,
        },
        StepDescriptor {
            number: 3,
            title: DDL_TITLE,
            inputs: vec![config.ddl_dir.clone()],
            outputs: Vec::new(),
            command: ddl,
            needs_user_ids: false,
        },
        StepDescriptor {
            number: 4,
            title: MAIN_SEED_TITLE,
            inputs: Vec::new(),
            outputs: vec![config.seeds_dir.clone(), config.app_user_seed.clone()],
            command: main_seed,
            needs_user_ids: false,
        },
        StepDescriptor {
            number: 5,
            title: SQL_LOAD_TITLE,
            inputs: vec![config.seeds_dir.clone()],
            outputs: Vec::new(),
            command: sql_load,
            needs_user_ids: false,
        },
        StepDescriptor {
            number: 6,
            title: DOCUMENTS_TITLE,
            inputs: vec![config.user_ids_file()],
            outputs: vec![config.document_dir.clone()],
            command: documents,
            needs_user_ids: true,
        },
        StepDescriptor {
            number: 7,
            title: NOSQL_LOAD_TITLE,
            inputs: vec![config.document_dir.clone()],
            outputs: Vec::new(),
            command: nosql_load,
            needs_user_ids: false,
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use dualseed_common::ProgressMode;

    fn steps(options: &PipelineOptions) -> Vec<StepDescriptor> {
        build_steps(
            &PipelineConfig::default(),
            options,
            Path::new("dualseed-ingest"),
        )
    }

    #[test]
    fn test_minimal_command_lines() {
        let steps = steps(&PipelineOptions::new(25));
        assert_eq!(steps.len(), STEP_COUNT);
        assert_eq!(
            steps[2].command.to_string(),
            "$ python3 run-sql.py --scripts-dir ddl/tables --progress off"
        );
        assert_eq!(
            steps[3].command.to_string(),
            "$ python3 dml/generate_main_seeds.py --n 25 --progress off"
        );
        assert_eq!(
            steps[5].command.to_string(),
            "$ dualseed-ingest documents --user-ids-file dml/document-seeds/user_ids.txt \
             --output-dir dml/document-seeds --progress off"
        );
        assert_eq!(
            steps[6].command.to_string(),
            "$ python3 run-nosql.py --input-dir dml/document-seeds --batch-size 1000 --progress off"
        );
        assert!(steps.iter().filter(|s| s.needs_user_ids).all(|s| s.number == 6));
    }

    #[test]
    fn test_overrides_are_threaded() {
        let options = PipelineOptions::new(10)
            .with_seed(42)
            .with_sql_connection_string("postgresql://db/anime")
            .with_nosql_connection_string("mongodb://docs")
            .with_nosql_clear(true)
            .with_nosql_batch_size(0)
            .with_progress(ProgressMode::Detailed);
        let steps = steps(&options);

        assert_eq!(steps[2].command.args[1], "postgresql://db/anime");
        assert_eq!(steps[4].command.args[1], "postgresql://db/anime");
        assert_eq!(
            steps[5].command.flag_value("--sql-connection-string"),
            Some("postgresql://db/anime")
        );
        assert_eq!(steps[3].command.flag_value("--seed"), Some("42"));
        assert_eq!(steps[6].command.args[1], "mongodb://docs");
        assert_eq!(steps[6].command.flag_value("--batch-size"), Some("1"));
        assert_eq!(steps[6].command.args.last().map(String::as_str), Some("--clear"));

        for step in &steps {
            assert_eq!(step.command.flag_value("--progress"), Some("detailed"));
        }
        for idx in [0, 1, 3] {
            assert!(!steps[idx].command.args.iter().any(|a| a.contains("postgresql")));
        }
    }

    #[test]
    fn test_label() {
        let steps = steps(&PipelineOptions::new(1));
        assert_eq!(steps[0].label(), "[1/7] Generate distinct CSV files from datasets");
        assert_eq!(steps[6].label(), "[7/7] Load NoSQL JSON seeds into MongoDB");
    }
}

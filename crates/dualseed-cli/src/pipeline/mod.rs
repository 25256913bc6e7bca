//! Seven-step seeding pipeline
//!
//! [`Pipeline`] walks the step list built by [`steps::build_steps`] in
//! order, one step at a time, through a [`StepInvoker`]. The first step that
//! fails or cannot start aborts the run; nothing already written is rolled
//! back.
//!
//! Before the document step the driver settles the user id set. Explicit ids
//! win; otherwise ids are recovered from the `app_user` seed artifact
//! produced by the main seed step. The set is written to `user_ids.txt` in
//! the document directory, which the document step reads.
//!
//! # Example
//!
//! ```no_run
//! use dualseed_cli::config::PipelineConfig;
//! use dualseed_cli::pipeline::{Pipeline, PipelineOptions, ProcessInvoker};
//!
//! fn main() -> dualseed_cli::Result<()> {
//!     let options = PipelineOptions::new(50).with_seed(7);
//!     let mut pipeline = Pipeline::new(".", PipelineConfig::default(), options, ProcessInvoker::new())?;
//!     pipeline.run()
//! }
//! ```

pub mod invoker;
pub mod steps;

pub use invoker::{ProcessInvoker, StepInvoker, StepStatus};
pub use steps::{build_steps, StepCommand, StepDescriptor, STEP_COUNT};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::progress::StepProgress;
use crate::seed_artifact::SeedArtifactParser;
use dualseed_common::user_ids::{format_user_ids, write_user_ids_file};
use dualseed_common::ProgressMode;
use std::path::PathBuf;
use tracing::{error, info, info_span};

/// Default MongoDB insert batch size
pub const DEFAULT_NOSQL_BATCH_SIZE: i64 = 1000;

/// Where the document step's user ids come from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserIdSource {
    /// Ids given on the command line
    Explicit(Vec<i64>),
    /// Ids read from a file before any step runs
    File(PathBuf),
    /// Ids recovered from the `app_user` seed artifact after step 5
    #[default]
    Derive,
}

/// Per-run overrides threaded into the step command lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Number of anime ids sampled by the main seed step
    pub n: i64,
    pub seed: Option<i64>,
    pub user_ids: UserIdSource,
    pub sql_connection_string: Option<String>,
    pub nosql_connection_string: Option<String>,
    pub nosql_clear: bool,
    /// Raw batch size; see [`PipelineOptions::batch_size`]
    pub nosql_batch_size: i64,
    pub progress: ProgressMode,
}

impl PipelineOptions {
    pub fn new(n: i64) -> Self {
        Self {
            n,
            seed: None,
            user_ids: UserIdSource::Derive,
            sql_connection_string: None,
            nosql_connection_string: None,
            nosql_clear: false,
            nosql_batch_size: DEFAULT_NOSQL_BATCH_SIZE,
            progress: ProgressMode::Linear,
        }
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_user_ids(mut self, source: UserIdSource) -> Self {
        self.user_ids = source;
        self
    }

    /// Empty strings count as absent
    pub fn with_sql_connection_string(mut self, url: impl Into<String>) -> Self {
        self.sql_connection_string = Some(url.into()).filter(|u| !u.is_empty());
        self
    }

    /// Empty strings count as absent
    pub fn with_nosql_connection_string(mut self, url: impl Into<String>) -> Self {
        self.nosql_connection_string = Some(url.into()).filter(|u| !u.is_empty());
        self
    }

    pub fn with_nosql_clear(mut self, clear: bool) -> Self {
        self.nosql_clear = clear;
        self
    }

    pub fn with_nosql_batch_size(mut self, size: i64) -> Self {
        self.nosql_batch_size = size;
        self
    }

    pub fn with_progress(mut self, progress: ProgressMode) -> Self {
        self.progress = progress;
        self
    }

    /// Batch size handed to the document loader, never below 1
    pub fn batch_size(&self) -> i64 {
        self.nosql_batch_size.max(1)
    }

    fn validate(&self) -> Result<()> {
        if self.n <= 0 {
            return Err(PipelineError::invalid_argument("--n must be greater than 0"));
        }
        if let UserIdSource::Explicit(ids) = &self.user_ids {
            if ids.is_empty() {
                return Err(PipelineError::invalid_argument("No valid user IDs provided."));
            }
        }
        Ok(())
    }
}

/// Where the driver is in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    /// Running the given 1-based step
    Step(usize),
    Done,
    /// Stopped at the given step; later steps never ran
    Aborted(usize),
}

/// Fail-fast driver over the seven steps
pub struct Pipeline<I: StepInvoker> {
    root: PathBuf,
    config: PipelineConfig,
    options: PipelineOptions,
    steps: Vec<StepDescriptor>,
    invoker: I,
    state: PipelineState,
}

impl<I: StepInvoker> Pipeline<I> {
    /// Validate options and build the step list
    ///
    /// A `--user-ids-file` is read here, so a bad file fails before step 1.
    pub fn new(
        root: impl Into<PathBuf>,
        config: PipelineConfig,
        mut options: PipelineOptions,
        invoker: I,
    ) -> Result<Self> {
        let root = root.into();
        options.validate()?;

        if let UserIdSource::File(path) = &options.user_ids {
            let ids = dualseed_common::user_ids::parse_user_ids_file(root.join(path))?;
            options.user_ids = UserIdSource::Explicit(ids);
        }

        let steps = build_steps(&config, &options, &config.ingest_program());
        Ok(Self {
            root,
            config,
            options,
            steps,
            invoker,
            state: PipelineState::Idle,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    /// Run every step in order, stopping at the first failure
    pub fn run(&mut self) -> Result<()> {
        let span = info_span!("pipeline", root = %self.root.display(), n = self.options.n);
        let _enter = span.enter();

        let progress = StepProgress::new(self.steps.len(), self.options.progress.should_show());
        info!(steps = self.steps.len(), "Starting seeding pipeline");

        for index in 0..self.steps.len() {
            let step = &self.steps[index];
            self.state = PipelineState::Step(step.number);

            if step.needs_user_ids {
                if let Err(e) = self.prepare_user_ids(&progress) {
                    self.state = PipelineState::Aborted(step.number);
                    progress.abandon();
                    error!(step = step.number, error = %e, "Could not settle user ids");
                    return Err(e);
                }
            }

            progress.begin(&step.label(), &step.command.to_string());
            info!(
                step = step.number,
                title = step.title,
                inputs = ?step.inputs,
                outputs = ?step.outputs,
                "Running step"
            );

            let outcome = self.invoker.invoke(step, &self.root);
            let failure = match outcome {
                Ok(status) if status.is_success() => None,
                Ok(status) => Some(PipelineError::StepFailed {
                    step: step.number,
                    title: step.title.to_string(),
                    exit_code: status.code,
                }),
                Err(source) => Some(PipelineError::StepSpawn {
                    step: step.number,
                    title: step.title.to_string(),
                    program: step.command.program.display().to_string(),
                    source,
                }),
            };

            if let Some(err) = failure {
                self.state = PipelineState::Aborted(step.number);
                progress.abandon();
                error!(step = step.number, error = %err, "Step failed");
                return Err(err);
            }
            progress.complete_step();
        }

        self.state = PipelineState::Done;
        progress.finish();
        info!("Seeding pipeline completed");
        progress.println("\nPipeline completed successfully.");
        Ok(())
    }

    /// Settle the id set and write `user_ids.txt`
    fn prepare_user_ids(&self, progress: &StepProgress) -> Result<Vec<i64>> {
        let ids = match &self.options.user_ids {
            UserIdSource::Explicit(ids) => {
                progress.println(format!("Using user IDs from argument: {}", format_user_ids(ids)));
                ids.clone()
            }
            // Files are resolved to explicit ids in `new`
            UserIdSource::File(path) => {
                dualseed_common::user_ids::parse_user_ids_file(self.root.join(path))?
            }
            UserIdSource::Derive => {
                let artifact = &self.config.app_user_seed;
                let ids = SeedArtifactParser::new()?.parse_file(&self.root.join(artifact))?;
                progress.println(format!(
                    "Derived {} user IDs from {}",
                    ids.len(),
                    artifact.display()
                ));
                ids
            }
        };

        let user_ids_file = self.config.user_ids_file();
        write_user_ids_file(self.root.join(&user_ids_file), &ids)?;
        info!(count = ids.len(), path = %user_ids_file.display(), "Wrote user ids file");
        progress.println(format!("Wrote user IDs file: {}", user_ids_file.display()));
        Ok(ids)
    }
}

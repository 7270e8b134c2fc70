use super::plan::{plan, EncodeJob, EncodePlan, PlannedStep};
use pictjoin_av::actions::write_manifest;
use pictjoin_av::{CommandRunner, Error, Result, Workspace};
use std::path::PathBuf;
use std::sync::Arc;

/// Runs the plan for an [`EncodeJob`] inside a [`Workspace`].
pub struct JoinExecutor {
    workspace: Workspace,
    runner: Arc<dyn CommandRunner>,
    overwrite: bool,
}

impl JoinExecutor {
    pub fn new(workspace: Workspace, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            workspace,
            runner,
            overwrite: true,
        }
    }

    /// Whether an existing output may be replaced (default: yes).
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// The plan this executor will run for `job`.
    pub fn plan(&self, job: &EncodeJob) -> EncodePlan {
        plan(job, self.workspace.temp_dir(), self.workspace.staging())
    }

    fn report_progress(&self, done: usize, total: usize, step: &str) {
        let progress = done as f32 / total as f32 * 100.0;
        tracing::info!("[{:.0}%] {}", progress, step);
    }

    /// Run every stage, then move the result onto the job's output path.
    ///
    /// The first failing stage aborts the run; the workspace is dropped and
    /// takes the intermediates and the staged output with it.
    pub async fn execute(self, job: &EncodeJob) -> Result<PathBuf> {
        let plan = self.plan(job);
        write_manifest(&plan.manifest, &plan.intermediates)?;

        let total = plan.steps.len();
        for (i, step) in plan.steps.iter().enumerate() {
            self.report_progress(i, total, &format!("Starting: {}", step.stage));
            run_step(self.runner.as_ref(), step).await?;
        }

        self.report_progress(
            total,
            total,
            &format!("Finalizing: {}", self.workspace.destination().display()),
        );
        self.workspace.finalize(self.overwrite)
    }
}

async fn run_step(runner: &dyn CommandRunner, step: &PlannedStep) -> Result<()> {
    let output = match runner.run(&step.command).await {
        Ok(output) => output,
        Err(Error::Io(e)) => {
            return Err(Error::encode_failed(
                step.stage.to_string(),
                None,
                format!("failed to start {}: {e}", step.command.program_name()),
            ))
        }
        Err(e) => return Err(e),
    };

    if !output.is_success() {
        return Err(Error::encode_failed(
            step.stage.to_string(),
            output.code,
            output.error_message(),
        ));
    }

    Ok(())
}

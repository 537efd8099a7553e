//! `mdpane preview` command implementation.

use std::path::PathBuf;

use clap::Args;

use mdpane_config::Config;
use mdpane_storage::{FsStorage, Storage};

use crate::error::CliError;
use crate::output::Output;
use crate::session;

/// Arguments for the preview command.
#[derive(Args)]
pub(crate) struct PreviewArgs {
    /// Markdown file to render.
    path: PathBuf,

    /// Write the HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl PreviewArgs {
    /// Execute the preview command.
    ///
    /// Diagram failures are reported as warnings; the markup still contains
    /// their error regions.
    pub(crate) async fn execute(self, config: &Config) -> Result<(), CliError> {
        let output = Output::new();

        let bytes = FsStorage::new().read(&self.path)?;
        let text = String::from_utf8(bytes).map_err(|e| {
            CliError::Validation(format!("{} is not valid UTF-8: {e}", self.path.display()))
        })?;

        let preview = session::compositor(config).render(&text).await;
        for failure in &preview.failures {
            output.warning(&format!(
                "Diagram {} ({}): {}",
                failure.id, failure.declared_kind, failure.message
            ));
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &preview.html)?;
                output.success(&format!(
                    "Wrote {} ({} diagrams, {} failed)",
                    path.display(),
                    preview.diagrams,
                    preview.failures.len()
                ));
            }
            None => output.result(preview.html.trim_end())?,
        }
        Ok(())
    }
}

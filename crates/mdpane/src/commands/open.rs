//! `mdpane open` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tokio::sync::mpsc;

use mdpane_config::Config;
use mdpane_session::UiMessage;

use crate::error::CliError;
use crate::host::TerminalHost;
use crate::output::Output;
use crate::session;

/// Arguments for the open command.
#[derive(Args)]
pub(crate) struct OpenArgs {
    /// Markdown file to open.
    path: PathBuf,
}

impl OpenArgs {
    /// Execute the open command.
    ///
    /// Loads the file through a session, which records it as the most recent
    /// and last opened file, and prints its content.
    pub(crate) async fn execute(self, config: &Config) -> Result<(), CliError> {
        let output = Output::new();
        let path = std::path::absolute(&self.path)?;

        let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
        let mut controller = session::controller(config, Arc::new(TerminalHost::new()), ui_tx);
        controller.open(&path).await?;
        controller.dispose();
        drop(controller);

        while let Ok(message) = ui_rx.try_recv() {
            if let UiMessage::LoadContent { content, .. } = message {
                output.result(content.trim_end_matches('\n'))?;
            }
        }
        Ok(())
    }
}

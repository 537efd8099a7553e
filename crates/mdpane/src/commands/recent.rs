//! `mdpane recent` command implementation.

use std::path::PathBuf;

use clap::Args;

use mdpane_config::Config;
use mdpane_storage::{FsStorage, Storage};

use crate::error::CliError;
use crate::output::Output;
use crate::session;

/// Arguments for the recent command.
///
/// Entries whose file is gone are kept in the list and marked `(missing)`.
#[derive(Args)]
pub(crate) struct RecentArgs {
    /// Only print the file that would be restored on startup.
    #[arg(long)]
    last: bool,
}

impl RecentArgs {
    /// Execute the recent command.
    pub(crate) fn execute(self, config: &Config) -> Result<(), CliError> {
        let output = Output::new();
        let recent = session::recent_files(config);

        if self.last {
            match recent.last_file() {
                Some(path) => output.result(&path.display().to_string())?,
                None => output.info("No last file"),
            }
            return Ok(());
        }

        let entries = recent.list();
        if entries.is_empty() {
            output.info("No recent files");
        }
        let storage = FsStorage::new();
        for line in listing(&storage, &entries) {
            output.result(&line)?;
        }
        Ok(())
    }
}

/// One line per entry, most recent first.
fn listing(storage: &dyn Storage, entries: &[PathBuf]) -> Vec<String> {
    entries
        .iter()
        .map(|path| {
            if storage.exists(path) {
                path.display().to_string()
            } else {
                format!("{} (missing)", path.display())
            }
        })
        .collect()
}

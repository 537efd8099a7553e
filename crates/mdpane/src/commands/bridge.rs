//! `mdpane bridge` command implementation.
//!
//! Runs one session over newline-delimited JSON. Each stdin line is a
//! [`SessionEvent`] (`{"ui": {...}}` or `{"command": {...}}`); each outbound
//! [`UiMessage`] is written to stdout as one JSON line. Notifications and
//! logs go to stderr. The session ends when stdin closes.

use std::sync::Arc;

use clap::Args;
use tokio::sync::mpsc;

use mdpane_config::Config;
use mdpane_session::{SessionEvent, UiMessage};

use crate::error::CliError;
use crate::host::TerminalHost;
use crate::output::Output;
use crate::session;

/// Arguments for the bridge command.
#[derive(Args)]
pub(crate) struct BridgeArgs {
    /// Disable auto-save (only explicit saves write the file).
    #[arg(long)]
    pub no_auto_save: bool,
}

impl BridgeArgs {
    /// Execute the bridge command.
    pub(crate) async fn execute(self, config: &Config) -> Result<(), CliError> {
        let output = Output::new();
        if config.editor.auto_save {
            output.info(&format!(
                "Auto-save: enabled ({} ms)",
                config.editor.auto_save_delay_ms
            ));
        } else {
            output.info("Auto-save: disabled");
        }
        if let Some(kroki_url) = &config.diagrams_resolved.kroki_url {
            output.info(&format!("Kroki URL: {kroki_url}"));
        } else {
            output.info("Diagram rendering: disabled (no kroki_url in config)");
        }

        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (event_tx, mut events) = mpsc::unbounded_channel();

        spawn_stdin_reader(event_tx);
        let writer = tokio::spawn(write_messages(ui_rx));

        let mut controller = session::controller(config, Arc::new(TerminalHost::new()), ui_tx);
        controller.run(&mut events).await;
        drop(controller);

        if let Err(e) = writer.await {
            tracing::warn!("Output task failed: {e}");
        }
        Ok(())
    }
}

/// Parse one protocol line. Blank lines yield `None`.
pub(crate) fn parse_line(line: &str) -> Option<Result<SessionEvent, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(serde_json::from_str(line))
}

/// Read events from stdin on a dedicated thread.
fn spawn_stdin_reader(events: mpsc::UnboundedSender<SessionEvent>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {e}");
                    break;
                }
            };
            match parse_line(&line) {
                None => {}
                Some(Ok(event)) => {
                    if events.send(event).is_err() {
                        break;
                    }
                }
                Some(Err(e)) => tracing::warn!("Ignoring malformed event: {e}"),
            }
        }
        tracing::debug!("stdin closed");
    });
}

/// Write every outbound message to stdout as a JSON line.
async fn write_messages(mut messages: mpsc::UnboundedReceiver<UiMessage>) {
    let output = Output::new();
    while let Some(message) = messages.recv().await {
        let line = match serde_json::to_string(&message) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to encode message: {e}");
                continue;
            }
        };
        if let Err(e) = output.result(&line) {
            tracing::warn!("Failed to write to stdout: {e}");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpane_session::{HostCommand, UiEvent};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_ui_event() {
        let event = parse_line(r##"{"ui": {"type": "contentChanged", "content": "# A"}}"##)
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            SessionEvent::Ui(UiEvent::ContentChanged {
                content: "# A".to_owned()
            })
        );
    }

    #[test]
    fn test_parse_command() {
        let event = parse_line(r#"  {"command": {"type": "togglePreview"}}  "#)
            .unwrap()
            .unwrap();
        assert_eq!(event, SessionEvent::Command(HostCommand::TogglePreview));
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(parse_line("").is_none());
        assert!(parse_line("   ").is_none());
    }

    #[test]
    fn test_parse_malformed_line() {
        assert!(parse_line("{not json").unwrap().is_err());
        assert!(parse_line(r#"{"ui": {"type": "nope"}}"#).unwrap().is_err());
    }
}

//! Session wiring from configuration.

use std::sync::Arc;

use tokio::sync::mpsc;

use mdpane_config::Config;
use mdpane_diagrams::{DiagramCache, DiagramExtractor, KrokiRenderer, MemoryCache, NullCache};
use mdpane_renderer::{HtmlRenderer, SyntectHighlighter};
use mdpane_session::{Host, PreviewCompositor, SessionController, UiMessage};
use mdpane_state::{FileSettings, RecentFiles};
use mdpane_storage::FsStorage;

/// Recent files store persisted in the configured state directory.
pub(crate) fn recent_files(config: &Config) -> RecentFiles {
    let settings = Arc::new(FileSettings::new(&config.state_resolved.dir));
    RecentFiles::with_max(settings, config.editor.max_recent_files)
}

/// Rendered diagram cache; a size of 0 disables caching.
fn diagram_cache(size: usize) -> Arc<dyn DiagramCache> {
    if size == 0 {
        Arc::new(NullCache)
    } else {
        Arc::new(MemoryCache::with_capacity(size))
    }
}

/// Preview compositor for the configured diagrams and highlighting.
pub(crate) fn compositor(config: &Config) -> PreviewCompositor {
    let diagrams = KrokiRenderer::new(config.diagrams_resolved.kroki_url.clone())
        .with_timeout(config.diagrams_resolved.timeout)
        .with_cache(diagram_cache(config.diagrams_resolved.cache_size));

    let mut markdown = HtmlRenderer::new();
    if config.preview.highlight {
        markdown = markdown.with_highlighter(Arc::new(SyntectHighlighter::new(
            &config.preview.theme,
        )));
    }

    PreviewCompositor::new(Arc::new(diagrams))
        .with_extractor(DiagramExtractor::new(
            config.preview.diagram_keyword.clone(),
        ))
        .with_markdown(markdown)
}

/// Session controller over the local filesystem.
pub(crate) fn controller(
    config: &Config,
    host: Arc<dyn Host>,
    ui: mpsc::UnboundedSender<UiMessage>,
) -> SessionController {
    SessionController::new(
        Arc::new(FsStorage::new()),
        recent_files(config),
        compositor(config),
        host,
        ui,
    )
    .with_auto_save(config.editor.auto_save_delay(), config.editor.auto_save)
}

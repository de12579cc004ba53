pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod filter;
pub mod geometry;
pub mod history;
pub mod logging;
pub mod sticker;
pub mod storage;
pub mod surface;

pub use editor::{EditorSession, StickerGenerator, ToolKind};
pub use error::{EditorError, EditorResult};
pub use export::ExportSink;

/// Entrypoint used by host applications: installs logging, reads the user
/// config and returns an empty session waiting for its source image.
pub fn open_session() -> EditorSession {
    logging::init();
    let config = config::load_editor_config();
    tracing::info!(
        max_surface_width = config.max_surface_width,
        history_limit = config.history_limit,
        "starting editor session"
    );
    EditorSession::new(config)
}

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::geometry::{Color, ToolBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "easel";
const APP_CONFIG_FILE: &str = "config.json";

pub const DEFAULT_MAX_SURFACE_WIDTH: u32 = 800;
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const DEFAULT_SPRAY_DOT_COUNT: u32 = 20;
pub const DEFAULT_HANDLE_SIZE: u32 = 12;
pub const DEFAULT_HANDLE_TOLERANCE: u32 = 4;

/// Placement used for stickers created from generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StickerPlacement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for StickerPlacement {
    fn default() -> Self {
        Self {
            x: 50,
            y: 50,
            width: 150,
            height: 150,
        }
    }
}

impl StickerPlacement {
    pub const fn bounds(self) -> ToolBounds {
        ToolBounds::new(self.x, self.y, self.width, self.height)
    }
}

/// Editor settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub max_surface_width: u32,
    /// Maximum retained snapshots; `0` keeps every snapshot.
    pub history_limit: usize,
    pub background_color: Color,
    pub font_path: Option<PathBuf>,
    pub spray_dot_count: u32,
    pub handle_size: u32,
    pub handle_tolerance: u32,
    pub sticker_default: StickerPlacement,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_surface_width: DEFAULT_MAX_SURFACE_WIDTH,
            history_limit: DEFAULT_HISTORY_LIMIT,
            background_color: Color::WHITE,
            font_path: None,
            spray_dot_count: DEFAULT_SPRAY_DOT_COUNT,
            handle_size: DEFAULT_HANDLE_SIZE,
            handle_tolerance: DEFAULT_HANDLE_TOLERANCE,
            sticker_default: StickerPlacement::default(),
        }
    }
}

pub fn load_editor_config() -> EditorConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_editor_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_editor_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> EditorConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return EditorConfig::default(),
    };
    if !path.exists() {
        return EditorConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            EditorConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            EditorConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

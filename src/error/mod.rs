use crate::export::ExportError;
use crate::storage::StorageError;
use thiserror::Error;

pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("sticker prompt is empty")]
    EmptyPrompt,
    #[error("sticker generation failed: {0:#}")]
    StickerGeneration(anyhow::Error),
    #[error("saving exported image failed: {0:#}")]
    Persist(anyhow::Error),
}

//! Image-acquisition implementations
//!
//! Both pickers report a missing or unreadable path as an empty selection,
//! which the workflow treats as "nothing picked".

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tokio::sync::Mutex;

use shared::SelectedFile;
use tracing::warn;

use super::console::Console;
use crate::error::{CapabilityError, CapabilityResult};
use crate::traits::ImagePicker;

/// Turn a path into a one-file selection if it points at a regular file
async fn select_existing(path: &Path) -> Vec<SelectedFile> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => vec![SelectedFile {
            path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            size_bytes: Some(meta.len()),
        }],
        Ok(_) => {
            warn!("Not a regular file: {}", path.display());
            Vec::new()
        }
        Err(e) => {
            warn!("Cannot open {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Picker that hands out a fixed list of paths, one per request
pub struct ScriptedImagePicker {
    queue: Mutex<VecDeque<PathBuf>>,
}

impl ScriptedImagePicker {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            queue: Mutex::new(paths.into_iter().collect()),
        }
    }

    pub async fn remaining(&self) -> usize {
        self.queue.lock().await.len()
    }
}

#[async_trait]
impl ImagePicker for ScriptedImagePicker {
    async fn pick(&self) -> CapabilityResult<Vec<SelectedFile>> {
        let next = self.queue.lock().await.pop_front();
        match next {
            Some(path) => Ok(select_existing(&path).await),
            None => Ok(Vec::new()),
        }
    }
}

/// Picker that asks for a path on the terminal
pub struct ConsoleImagePicker<R> {
    console: Arc<Console<R>>,
}

impl<R> ConsoleImagePicker<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(console: Arc<Console<R>>) -> Self {
        Self { console }
    }
}

#[async_trait]
impl<R> ImagePicker for ConsoleImagePicker<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn pick(&self) -> CapabilityResult<Vec<SelectedFile>> {
        let line = self
            .console
            .read_line("image path (empty to cancel): ")
            .await
            .map_err(|source| CapabilityError::ImageAccess {
                path: PathBuf::from("<stdin>"),
                source,
            })?;

        match line {
            Some(path) if !path.is_empty() => Ok(select_existing(Path::new(&path)).await),
            _ => Ok(Vec::new()),
        }
    }
}

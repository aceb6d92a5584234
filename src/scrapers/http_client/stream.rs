//! Streaming response bodies to disk.

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::scrapers::error::FetchError;

/// A body that arrives in chunks.
#[async_trait]
pub trait ChunkSource: Send {
    /// Next chunk, or `None` once the body is complete.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError>;
}

/// Chunks of a live reqwest response.
pub(crate) struct ResponseChunks {
    url: String,
    response: reqwest::Response,
}

impl ResponseChunks {
    pub(crate) fn new(url: &str, response: reqwest::Response) -> Self {
        Self {
            url: url.to_string(),
            response,
        }
    }
}

#[async_trait]
impl ChunkSource for ResponseChunks {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, FetchError> {
        self.response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(&self.url, e))
    }
}

/// Write every chunk of `source` to `dest`, returning the byte count.
///
/// On any failure, read or write, the partially written file is removed so
/// nothing is left at `dest`.
pub async fn stream_to_path<S: ChunkSource>(source: &mut S, dest: &Path) -> Result<u64, FetchError> {
    let result = copy_chunks(source, dest).await;
    if result.is_err() {
        discard_partial(dest).await;
    }
    result
}

async fn copy_chunks<S: ChunkSource>(source: &mut S, dest: &Path) -> Result<u64, FetchError> {
    let mut file = File::create(dest)
        .await
        .map_err(|e| FetchError::write(dest, e))?;

    let mut written = 0u64;
    while let Some(chunk) = source.next_chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| FetchError::write(dest, e))?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(|e| FetchError::write(dest, e))?;
    Ok(written)
}

/// Remove a file left behind by a failed download, if there is one.
pub async fn discard_partial(dest: &Path) {
    match tokio::fs::remove_file(dest).await {
        Ok(()) => debug!("Removed partial file {}", dest.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial file {}: {}", dest.display(), e),
    }
}

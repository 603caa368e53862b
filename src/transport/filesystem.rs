//! Filesystem mail transport.
//!
//! Stores mail data as JSON files instead of delivering it:
//! ```text
//! {app.temp_dir}/
//! └── mailer/
//!     ├── 2024-05-01T09:30:12.481Z.txt
//!     └── 2024-05-01T09:31:40.007Z.txt
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

use crate::config::ConfigStore;
use crate::mail::MailData;
use crate::Result;

use super::MailTransport;

/// Subdirectory of the temp dir that receives mail files.
const OUTPUT_SUBDIR: &str = "mailer";

/// Extension of written mail files.
const OUTPUT_EXTENSION: &str = "txt";

/// Filesystem operations used by [`FilesystemTransport`].
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Create a single directory. Fails with `AlreadyExists` if it is present.
    async fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// List the entries of a directory.
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Write a file, replacing any existing content.
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// [`Filesystem`] backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

#[async_trait]
impl Filesystem for LocalFilesystem {
    async fn create_dir(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir(path).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            paths.push(entry.path());
        }
        Ok(paths)
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}

/// Transport that writes each message to `{app.temp_dir}/mailer/{timestamp}.txt`.
///
/// File names come from a millisecond timestamp, so two sends within the
/// same millisecond overwrite each other.
pub struct FilesystemTransport {
    config: ConfigStore,
    fs: Arc<dyn Filesystem>,
}

impl FilesystemTransport {
    /// Registry name of this transport.
    pub const NAME: &'static str = "filesystem";

    /// Create a transport writing to the local filesystem.
    pub fn new(config: &ConfigStore) -> Result<Self> {
        Ok(Self::with_filesystem(config, Arc::new(LocalFilesystem)))
    }

    /// Create a transport using the given filesystem.
    pub fn with_filesystem(config: &ConfigStore, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            config: config.clone(),
            fs,
        }
    }

    /// Directory mail files are written to.
    ///
    /// Read from `app.temp_dir` on every call, falling back to the system temp dir.
    pub fn output_dir(&self) -> PathBuf {
        let temp_dir = self
            .config
            .get_str("app.temp_dir")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        temp_dir.join(OUTPUT_SUBDIR)
    }
}

/// Sortable UTC timestamp with millisecond precision, e.g. `2024-05-01T09:30:12.481Z`.
fn file_stem() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl MailTransport for FilesystemTransport {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn config(&self) -> &ConfigStore {
        &self.config
    }

    async fn send(&self, data: &MailData) -> Result<()> {
        let path = self
            .output_dir()
            .join(format!("{}.{OUTPUT_EXTENSION}", file_stem()));
        let contents = serde_json::to_string_pretty(data)?;

        self.fs.write(&path, contents.as_bytes()).await?;
        tracing::debug!("Wrote mail for {} to {}", data.to, path.display());
        Ok(())
    }

    async fn test(&self) -> Result<()> {
        let dir = self.output_dir();
        match self.fs.create_dir(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }
        self.fs.read_dir(&dir).await?;
        Ok(())
    }
}

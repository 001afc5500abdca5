//! Maps request targets onto files under the document root.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::http::mime;

/// File served for targets naming a directory (`/`, `/docs/`).
pub const INDEX_FILE: &str = "index.html";

/// Syntactic view of a request target, before the filesystem is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Path relative to the document root. `None` when the target tries to
    /// climb out of the root, in which case it is never probed.
    pub relative: Option<PathBuf>,
    /// `None` when the target is not servable.
    pub content_type: Option<&'static str>,
}

/// Splits a request target into a root-relative path and a content type.
///
/// The query string is dropped. Any `..` segment makes the target invalid.
/// A trailing slash selects the directory's [`INDEX_FILE`].
pub fn inspect_target(target: &str) -> Target {
    let path = target.split_once('?').map_or(target, |(path, _)| path);

    if path.split('/').any(|segment| segment == "..") {
        return Target {
            relative: None,
            content_type: None,
        };
    }

    let relative = path.trim_start_matches('/');

    if path.ends_with('/') {
        return Target {
            relative: Some(Path::new(relative).join(INDEX_FILE)),
            content_type: Some(mime::INDEX),
        };
    }

    let file_name = relative.rsplit('/').next().unwrap_or(relative);
    let extension = file_name.rsplit_once('.').map_or("", |(_, ext)| ext);

    Target {
        relative: Some(PathBuf::from(relative)),
        content_type: mime::lookup(extension),
    }
}

/// A resolved request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    content_type: Option<&'static str>,
    file: Option<PathBuf>,
    len: u64,
}

impl Resource {
    /// Whether the target maps to an entry in the content-type table.
    pub fn is_valid(&self) -> bool {
        self.content_type.is_some()
    }

    /// Whether a regular file backs the target.
    pub fn exists(&self) -> bool {
        self.file.is_some()
    }

    /// The `Content-Type` to send. Unservable targets get the fallback type.
    pub fn content_type(&self) -> &'static str {
        self.content_type.unwrap_or(mime::FALLBACK)
    }

    /// Canonical path of the backing file.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Size of the backing file at resolution time, 0 if there is none.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

enum Probe {
    Found(PathBuf, u64),
    Missing,
    Escaped,
}

/// The directory every request is resolved under.
#[derive(Debug, Clone)]
pub struct DocumentRoot {
    root: PathBuf,
}

impl DocumentRoot {
    /// Canonicalizes `root`. Fails if it does not exist or is not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let canonical = std::fs::canonicalize(root)
            .with_context(|| format!("document root {} is not accessible", root.display()))?;
        anyhow::ensure!(
            canonical.is_dir(),
            "document root {} is not a directory",
            canonical.display()
        );
        Ok(Self { root: canonical })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub async fn resolve(&self, target: &str) -> Resource {
        let Target {
            relative,
            content_type,
        } = inspect_target(target);

        let probe = match relative {
            Some(relative) => self.probe(&relative).await,
            None => Probe::Missing,
        };

        match probe {
            Probe::Found(file, len) => Resource {
                content_type,
                file: Some(file),
                len,
            },
            Probe::Missing => Resource {
                content_type,
                file: None,
                len: 0,
            },
            Probe::Escaped => Resource {
                content_type: None,
                file: None,
                len: 0,
            },
        }
    }

    async fn probe(&self, relative: &Path) -> Probe {
        let candidate = self.root.join(relative);

        let metadata = match tokio::fs::metadata(&candidate).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Probe::Missing,
            Err(e) => {
                debug!(path = %candidate.display(), error = %e, "resource unavailable");
                return Probe::Missing;
            }
        };

        if !metadata.is_file() {
            return Probe::Missing;
        }

        // Symlinks may still point outside the root.
        let canonical = match tokio::fs::canonicalize(&candidate).await {
            Ok(path) => path,
            Err(e) => {
                debug!(path = %candidate.display(), error = %e, "resource unavailable");
                return Probe::Missing;
            }
        };

        if !canonical.starts_with(&self.root) {
            warn!(path = %candidate.display(), "resource resolves outside document root");
            return Probe::Escaped;
        }

        Probe::Found(canonical, metadata.len())
    }
}

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};

/// Default file name prefix for recordings.
pub const DEFAULT_PREFIX: &str = "3d-video";

/// `-N` suffixes tried before giving up on a name.
const MAX_SUFFIX: u32 = 10_000;

/// Where finished recordings are delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTarget {
    dir: PathBuf,
    prefix: String,
}

impl DownloadTarget {
    /// Deliver into `dir`, naming files `3d-video-<unix-ms>.<ext>`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for a recording finished at `at`.
    pub fn file_name(&self, ext: &str, at: SystemTime) -> String {
        let millis = at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        format!("{}-{}.{}", self.prefix, millis, ext)
    }

    /// Concatenate `chunks` into one new file and return its path.
    ///
    /// The final name is claimed atomically before anything is written, so concurrent
    /// deliveries and existing files are never overwritten. The data goes to a `.part` file
    /// that replaces the claimed name once complete, and a reader never sees a half-written
    /// download.
    pub fn deliver(&self, chunks: &[Vec<u8>], ext: &str) -> ReelResult<PathBuf> {
        self.deliver_at(chunks, ext, SystemTime::now())
    }

    fn deliver_at(&self, chunks: &[Vec<u8>], ext: &str, at: SystemTime) -> ReelResult<PathBuf> {
        if chunks.iter().all(|c| c.is_empty()) {
            return Err(ReelError::encode("refusing to deliver an empty recording"));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create download directory '{}'", self.dir.display()))?;

        let path = self.reserve(ext, at)?;
        let part = path.with_extension(format!("{ext}.part"));
        let written = write_part(&part, chunks).and_then(|()| {
            std::fs::rename(&part, &path)
                .with_context(|| format!("rename '{}' to '{}'", part.display(), path.display()))
        });
        if let Err(e) = written {
            let _ = std::fs::remove_file(&part);
            let _ = std::fs::remove_file(&path);
            return Err(e.into());
        }
        Ok(path)
    }

    /// Create an empty file under the first free name: `<prefix>-<ms>.<ext>`, then
    /// `<prefix>-<ms>-1.<ext>` and so on.
    fn reserve(&self, ext: &str, at: SystemTime) -> ReelResult<PathBuf> {
        let base = self.file_name(ext, at);
        let stem = base.strip_suffix(&format!(".{ext}")).unwrap_or(&base);
        for n in 0..=MAX_SUFFIX {
            let candidate = if n == 0 {
                self.dir.join(&base)
            } else {
                self.dir.join(format!("{stem}-{n}.{ext}"))
            };
            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(_) => return Ok(candidate),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("reserve '{}'", candidate.display()))
                        .into());
                }
            }
        }
        Err(ReelError::encode(format!(
            "no free file name for '{base}' in '{}'",
            self.dir.display()
        )))
    }
}

fn write_part(part: &Path, chunks: &[Vec<u8>]) -> anyhow::Result<()> {
    let file = File::create(part).with_context(|| format!("create '{}'", part.display()))?;
    let mut w = std::io::BufWriter::new(file);
    for chunk in chunks {
        w.write_all(chunk)
            .with_context(|| format!("write '{}'", part.display()))?;
    }
    w.flush()
        .with_context(|| format!("flush '{}'", part.display()))?;
    Ok(())
}

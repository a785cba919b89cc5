use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};
use crate::intake::texture::{Texture, decode_texture};

const UNKNOWN_MIME: &str = "application/octet-stream";

static NEXT_IMAGE_REF: AtomicU64 = AtomicU64::new(1);

/// A file offered by a drop or a file picker, with its declared MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntakeFile {
    /// Location on disk.
    pub path: PathBuf,
    /// Declared type, e.g. `image/png`.
    pub mime: String,
}

impl IntakeFile {
    /// Declare the type from the file extension, the way a file picker would.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime = declared_mime(&path);
        Self { path, mime }
    }

    /// Use an explicitly declared type.
    pub fn with_mime(path: impl Into<PathBuf>, mime: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime: mime.into(),
        }
    }

    /// `true` when the declared type is an image type.
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

fn declared_mime(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type().to_owned())
        .unwrap_or_else(|_| UNKNOWN_MIME.to_owned())
}

/// Session-local handle for a selected image. Every intake mints a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageRef(u64);

impl ImageRef {
    fn mint() -> Self {
        Self(NEXT_IMAGE_REF.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:depthreel/{}", self.0)
    }
}

/// The image currently mapped onto the plane.
#[derive(Clone, Debug)]
pub struct SelectedImage {
    /// Handle identifying this selection.
    pub id: ImageRef,
    /// Where the image was read from.
    pub source: PathBuf,
    /// Declared type at intake.
    pub mime: String,
    /// Decoded pixels.
    pub texture: Texture,
}

impl SelectedImage {
    /// Read and decode `file`.
    pub fn load(file: &IntakeFile) -> ReelResult<Self> {
        if !file.is_image() {
            return Err(ReelError::intake(format!(
                "'{}' is not an image (declared type '{}')",
                file.path.display(),
                file.mime
            )));
        }
        let bytes = std::fs::read(&file.path)
            .with_context(|| format!("read image '{}'", file.path.display()))?;
        let texture = decode_texture(&bytes)?;
        Ok(Self::from_texture(file.path.clone(), file.mime.clone(), texture))
    }

    /// Wrap an already-decoded texture.
    pub fn from_texture(source: PathBuf, mime: String, texture: Texture) -> Self {
        Self {
            id: ImageRef::mint(),
            source,
            mime,
            texture,
        }
    }

    /// Width divided by height of the decoded image.
    pub fn aspect(&self) -> f32 {
        self.texture.aspect()
    }
}

/// Pick the file a drop should use: the first one, and only if it declares an image type.
pub fn first_image(files: &[IntakeFile]) -> Option<&IntakeFile> {
    files.first().filter(|f| f.is_image())
}

#[cfg(test)]
#[path = "../../tests/unit/intake/file.rs"]
mod tests;

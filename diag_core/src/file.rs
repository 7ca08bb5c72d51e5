//! # Selected Files and Previews
//!
//! A [`SelectedFile`] is the image the user picked, held in memory until it
//! is submitted. A [`PreviewImage`] is the same bytes after they have been
//! checked to be a displayable raster.
//!
//! Reading from a path is native-only; browser front ends hand over the bytes
//! of a picked file through [`SelectedFile::from_bytes`].

use std::fmt;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use base64::Engine;
use serde::Serialize;

use crate::errors::{DiagError, DiagResult};

/// An image chosen by the user, not yet submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// Wrap bytes obtained from a file picker
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_for_name(&name);
        SelectedFile { name, mime, bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Keep multi-megabyte buffers out of debug logs
impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Read a file from disk into a [`SelectedFile`].
#[cfg(not(target_arch = "wasm32"))]
pub fn read_selected_file(path: &Path) -> DiagResult<SelectedFile> {
    let bytes = std::fs::read(path)
        .map_err(|e| DiagError::file_read(path.display().to_string(), e.to_string()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(SelectedFile::from_bytes(name, bytes))
}

/// Guess a MIME type from the file extension
fn mime_for_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// A selected file that decoded as an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewImage {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// `data:<mime>;base64,...`, directly usable as an image source
    pub data_uri: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl PreviewImage {
    /// Decode a selected file for display.
    ///
    /// Only the image header is read to validate the format and obtain the
    /// dimensions; the full bytes are kept for the UI to render.
    pub fn decode(file: &SelectedFile) -> DiagResult<Self> {
        if file.is_empty() {
            return Err(DiagError::unsupported_image(format!("'{}' is empty", file.name)));
        }

        let reader = image::ImageReader::new(std::io::Cursor::new(&file.bytes))
            .with_guessed_format()
            .map_err(|e| DiagError::unsupported_image(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| DiagError::unsupported_image(format!("'{}' is not a known image format", file.name)))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| DiagError::unsupported_image(e.to_string()))?;

        let mime = format.to_mime_type();
        let b64 = base64::engine::general_purpose::STANDARD.encode(&file.bytes);

        Ok(PreviewImage {
            file_name: file.name.clone(),
            width,
            height,
            data_uri: format!("data:{};base64,{}", mime, b64),
            bytes: file.bytes.clone(),
        })
    }
}

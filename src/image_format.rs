//! # Image Format Module
//!
//! Guesses an image's format from its leading bytes. Pure prefix matching,
//! no decoding.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes read from a file for format detection
pub const FORMAT_DETECTION_BUFFER_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    Webp,
}

impl ImageFormat {
    /// Lowercase format tag, e.g. `"jpeg"`
    pub fn name(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Checked in order; first match wins.
const MAGIC_PREFIXES: &[(&[u8], ImageFormat)] = &[
    (b"\xFF\xD8\xFF", ImageFormat::Jpeg),
    (b"\x89PNG\r\n\x1a\n", ImageFormat::Png),
    (b"GIF87a", ImageFormat::Gif),
    (b"GIF89a", ImageFormat::Gif),
    (b"BM", ImageFormat::Bmp),
    (b"II*\x00", ImageFormat::Tiff),
    (b"MM\x00*", ImageFormat::Tiff),
];

/// Guess the image format from header bytes
pub fn sniff(header: &[u8]) -> Option<ImageFormat> {
    if let Some((_, format)) = MAGIC_PREFIXES
        .iter()
        .find(|(prefix, _)| header.starts_with(prefix))
    {
        return Some(*format);
    }

    // RIFF is a container; only the WEBP form tag at offset 8 makes it an image.
    if header.starts_with(b"RIFF") && header.get(8..12) == Some(b"WEBP".as_slice()) {
        return Some(ImageFormat::Webp);
    }

    None
}

/// Guess the image format of a file from its first bytes
pub fn sniff_file(path: impl AsRef<Path>) -> io::Result<Option<ImageFormat>> {
    let file = File::open(path)?;
    let mut buffer = Vec::with_capacity(FORMAT_DETECTION_BUFFER_SIZE);
    file.take(FORMAT_DETECTION_BUFFER_SIZE as u64)
        .read_to_end(&mut buffer)?;
    Ok(sniff(&buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_prefixes() {
        assert_eq!(sniff(b"\xFF\xD8\xFF\xE0\x00\x10JFIF"), Some(ImageFormat::Jpeg));
        assert_eq!(sniff(b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR"), Some(ImageFormat::Png));
        assert_eq!(sniff(b"GIF87a\x01\x00"), Some(ImageFormat::Gif));
        assert_eq!(sniff(b"GIF89a\x01\x00"), Some(ImageFormat::Gif));
        assert_eq!(sniff(b"BM\x36\x00"), Some(ImageFormat::Bmp));
        assert_eq!(sniff(b"II*\x00\x08\x00"), Some(ImageFormat::Tiff));
        assert_eq!(sniff(b"MM\x00*\x00\x08"), Some(ImageFormat::Tiff));
        assert_eq!(sniff(b"RIFF\x24\x00\x00\x00WEBPVP8 "), Some(ImageFormat::Webp));
    }

    #[test]
    fn test_sniff_rejects_unknown_and_short_input() {
        assert_eq!(sniff(b""), None);
        assert_eq!(sniff(b"\xFF\xD8"), None);
        assert_eq!(sniff(b"%PDF-1.7"), None);
        assert_eq!(sniff(b"RIFF\x24\x00\x00\x00WAVEfmt "), None);
        assert_eq!(sniff(b"RIFF"), None);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ImageFormat::Jpeg.name(), "jpeg");
        assert_eq!(ImageFormat::Webp.to_string(), "webp");
    }
}

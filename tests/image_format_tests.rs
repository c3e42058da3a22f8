use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;

use contact_intake::image_format::{sniff, sniff_file, ImageFormat};

fn temp_file_with(bytes: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

#[test]
fn test_sniff_file_reads_header() -> Result<()> {
    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    png.extend(std::iter::repeat(0u8).take(64));
    let file = temp_file_with(&png)?;

    assert_eq!(sniff_file(file.path())?, Some(ImageFormat::Png));
    Ok(())
}

#[test]
fn test_sniff_file_unknown_content() -> Result<()> {
    let file = temp_file_with(b"just some text, not an image")?;
    assert_eq!(sniff_file(file.path())?, None);

    let empty = temp_file_with(b"")?;
    assert_eq!(sniff_file(empty.path())?, None);
    Ok(())
}

#[test]
fn test_sniff_file_missing_path() {
    assert!(sniff_file("/definitely/not/here.png").is_err());
}

#[test]
fn test_first_matching_prefix_wins() {
    // "BM" followed by bytes that would never match anything else
    assert_eq!(sniff(b"BMGIF89a"), Some(ImageFormat::Bmp));
    assert_eq!(sniff(b"GIF89aBM"), Some(ImageFormat::Gif));
}

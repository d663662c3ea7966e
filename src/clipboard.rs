use std::io::Cursor;

use anyhow::{Context, Result};
use arboard::Clipboard;
use image::{DynamicImage, ImageOutputFormat, RgbaImage};

/// Reads the clipboard image as PNG bytes. `Ok(None)` means the
/// clipboard holds no image at all; an image payload that cannot be
/// decoded is an error so callers can tell the two apart.
pub fn read_image() -> Result<Option<Vec<u8>>> {
    let mut clipboard = Clipboard::new().context("Failed to open clipboard")?;

    let data = match clipboard.get_image() {
        Ok(data) => data,
        Err(arboard::Error::ContentNotAvailable) => return Ok(None),
        Err(err) => return Err(err).context("Failed to read clipboard image"),
    };

    let image = DynamicImage::ImageRgba8(
        RgbaImage::from_raw(data.width as u32, data.height as u32, data.bytes.into_owned())
            .context("Failed to decode clipboard image")?,
    );

    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .context("Failed to encode clipboard image")?;

    Ok(Some(buf))
}

/// Fire-and-forget: failures are logged, never surfaced to the caller.
pub fn write_text(text: &str) {
    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => {}
        Err(err) => log::warn!("Failed to copy to clipboard: {}", err),
    }
}

//! rectify-io - Image I/O for rectify
//!
//! Reads images into packed-RGB [`Raster`]s and writes them back out.
//!
//! # Supported formats
//!
//! - PNG (feature `png-format`, default): 8/16-bit gray, gray+alpha, RGB,
//!   RGBA and palette images on read; 8-bit RGB on write
//! - PNM (feature `pnm`, default): binary PPM (P6)

mod error;
pub mod format;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;

pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes, format_from_extension};
pub use rectify_core::ImageFormat;

use log::debug;
use rectify_core::Raster;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Write};
use std::path::Path;

/// Read an image from a file path.
///
/// The format is detected from the file's magic bytes.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<Raster> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    debug!("reading {:?} image from {}", format, path.display());
    let reader = BufReader::new(File::open(path)?);
    read_image_format(reader, format)
}

/// Read an image from an in-memory encoded buffer.
pub fn read_image_mem(data: &[u8]) -> IoResult<Raster> {
    let format = detect_format_from_bytes(data)?;
    read_image_format(Cursor::new(data), format)
}

fn read_image_format<R>(reader: R, format: ImageFormat) -> IoResult<Raster>
where
    R: std::io::BufRead + std::io::Seek,
{
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::read_png(reader),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::read_pnm(reader),
        _ => Err(IoError::UnsupportedFormat(format!(
            "format {:?} not supported for reading",
            format
        ))),
    }
}

/// Write an image to a file path.
///
/// With [`ImageFormat::Unknown`] the format is chosen from the path's
/// extension.
pub fn write_image<P: AsRef<Path>>(raster: &Raster, path: P, format: ImageFormat) -> IoResult<()> {
    let path = path.as_ref();
    let format = match format {
        ImageFormat::Unknown => format_from_extension(path),
        known => known,
    };
    debug!("writing {:?} image to {}", format, path.display());
    let mut writer = BufWriter::new(File::create(path)?);
    write_image_format(raster, &mut writer, format)?;
    writer.flush()?;
    Ok(())
}

/// Encode an image into an in-memory buffer.
pub fn write_image_mem(raster: &Raster, format: ImageFormat) -> IoResult<Vec<u8>> {
    let mut buffer = Vec::new();
    write_image_format(raster, &mut buffer, format)?;
    Ok(buffer)
}

fn write_image_format<W: Write>(raster: &Raster, writer: W, format: ImageFormat) -> IoResult<()> {
    match format {
        #[cfg(feature = "png-format")]
        ImageFormat::Png => png::write_png(raster, writer),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::write_pnm(raster, writer),
        _ => Err(IoError::UnsupportedFormat(format!(
            "format {:?} not supported for writing",
            format
        ))),
    }
}

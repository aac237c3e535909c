//! PNM (Portable Any Map) format support
//!
//! Reads and writes binary PPM (P6). Header comments are skipped, and
//! samples with a maxval other than 255 are rescaled to 8 bits.

use crate::{IoError, IoResult};
use rectify_core::{Raster, RasterMut, color};
use std::io::{BufRead, Write};

/// Read the next whitespace-delimited header token, skipping `#` comments.
fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = String::new();
    let mut in_comment = false;
    loop {
        let mut byte = [0u8; 1];
        if reader.read(&mut byte)? == 0 {
            if token.is_empty() {
                return Err(IoError::InvalidData("truncated PNM header".to_string()));
            }
            return Ok(token);
        }
        let c = byte[0];
        if in_comment {
            in_comment = c != b'\n' && c != b'\r';
            continue;
        }
        match c {
            b'#' if token.is_empty() => in_comment = true,
            c if c.is_ascii_whitespace() => {
                if !token.is_empty() {
                    return Ok(token);
                }
            }
            c => token.push(c as char),
        }
    }
}

fn read_number<R: BufRead>(reader: &mut R, what: &str) -> IoResult<u32> {
    let token = read_token(reader)?;
    token
        .parse()
        .map_err(|_| IoError::InvalidData(format!("invalid PNM {}: '{}'", what, token)))
}

/// Read a binary PPM (P6) image from a reader.
///
/// # Arguments
/// * `reader` - A buffered reader positioned at the `P6` magic
pub fn read_pnm<R: BufRead>(mut reader: R) -> IoResult<Raster> {
    let magic = read_token(&mut reader)?;
    if magic != "P6" {
        return Err(IoError::UnsupportedFormat(format!(
            "PNM variant '{}' is not supported",
            magic
        )));
    }
    let width = read_number(&mut reader, "width")?;
    let height = read_number(&mut reader, "height")?;
    let maxval = read_number(&mut reader, "maxval")?;
    if maxval == 0 || maxval > 65535 {
        return Err(IoError::InvalidData(format!("invalid PNM maxval {}", maxval)));
    }

    let bytes_per_sample = if maxval > 255 { 2 } else { 1 };
    let row_bytes = width as usize * 3 * bytes_per_sample;
    let mut row = vec![0u8; row_bytes];
    let mut raster = RasterMut::new(width, height)?;

    let scale = |v: u32| -> u8 { ((v * 255 + maxval / 2) / maxval).min(255) as u8 };

    for y in 0..height {
        reader.read_exact(&mut row)?;
        let out = raster.row_data_mut(y);
        for (pixel, chunk) in out.iter_mut().zip(row.chunks_exact(3 * bytes_per_sample)) {
            let sample = |c: usize| -> u32 {
                if bytes_per_sample == 2 {
                    ((chunk[2 * c] as u32) << 8) | chunk[2 * c + 1] as u32
                } else {
                    chunk[c] as u32
                }
            };
            *pixel = color::compose_rgb(scale(sample(0)), scale(sample(1)), scale(sample(2)));
        }
    }

    Ok(raster.into())
}

/// Write a raster as binary PPM (P6, maxval 255) to a writer.
///
/// # Arguments
/// * `raster` - The image to encode
/// * `writer` - Destination writer
pub fn write_pnm<W: Write>(raster: &Raster, mut writer: W) -> IoResult<()> {
    write!(writer, "P6\n{} {}\n255\n", raster.width(), raster.height())?;
    for y in 0..raster.height() {
        let row: Vec<u8> = raster
            .row_data(y)
            .iter()
            .flat_map(|&pixel| color::channels(pixel))
            .collect();
        writer.write_all(&row)?;
    }
    writer.flush()?;
    Ok(())
}

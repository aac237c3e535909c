//! PNG image format support
//!
//! Decoding expands palettes and sub-byte gray depths to 8 bits, drops
//! alpha, and keeps the high byte of 16-bit samples. Encoding always
//! writes 8-bit RGB.

use crate::{IoError, IoResult};
use rectify_core::{Raster, RasterMut, color};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Raster> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };
    let (color_type, bit_depth) = reader.output_color_type();

    let channels = match color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "indexed PNG was not expanded".to_string(),
            ));
        }
    };
    let bytes_per_sample = match bit_depth {
        BitDepth::Eight => 1,
        BitDepth::Sixteen => 2,
        _ => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNG format: {:?} {:?}",
                color_type, bit_depth
            )));
        }
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];
    let stride = channels * bytes_per_sample;

    let mut raster = RasterMut::new(width, height)?;
    for y in 0..height {
        let row_start = y as usize * bytes_per_row;
        let out = raster.row_data_mut(y);
        for (x, pixel) in out.iter_mut().enumerate() {
            let idx = row_start + x * stride;
            // High byte first for 16-bit samples
            let sample = |c: usize| data[idx + c * bytes_per_sample];
            *pixel = if channels < 3 {
                let g = sample(0);
                color::compose_rgb(g, g, g)
            } else {
                color::compose_rgb(sample(0), sample(1), sample(2))
            };
        }
    }

    Ok(raster.into())
}

/// Write a raster as an 8-bit RGB PNG
pub fn write_png<W: Write>(raster: &Raster, writer: W) -> IoResult<()> {
    let width = raster.width();
    let height = raster.height();

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    let data: Vec<u8> = raster
        .data()
        .iter()
        .flat_map(|&pixel| color::channels(pixel))
        .collect();

    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_png_roundtrip_rgb() {
        let mut raster = RasterMut::new(5, 5).unwrap();
        raster.set_rgb(0, 0, 255, 0, 0).unwrap();
        raster.set_rgb(1, 1, 0, 255, 0).unwrap();
        raster.set_rgb(2, 2, 0, 0, 255).unwrap();
        raster.set_rgb(4, 3, 12, 34, 56).unwrap();
        let raster: Raster = raster.into();

        let mut buffer = Vec::new();
        write_png(&raster, &mut buffer).unwrap();
        let decoded = read_png(Cursor::new(buffer)).unwrap();

        assert_eq!(decoded, raster);
    }

    #[test]
    fn test_read_grayscale_png() {
        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buffer, 3, 1);
            encoder.set_color(ColorType::Grayscale);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0, 128, 255]).unwrap();
        }

        let raster = read_png(Cursor::new(buffer)).unwrap();
        assert_eq!(raster.get_rgb(1, 0), Some((128, 128, 128)));
        assert_eq!(raster.get_pixel(2, 0), Some(color::WHITE));
    }

    #[test]
    fn test_read_rgba_drops_alpha() {
        let mut buffer = Vec::new();
        {
            let mut encoder = Encoder::new(&mut buffer, 1, 1);
            encoder.set_color(ColorType::Rgba);
            encoder.set_depth(BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[1, 2, 3, 4]).unwrap();
        }

        let raster = read_png(Cursor::new(buffer)).unwrap();
        assert_eq!(raster.get_pixel(0, 0), Some(0x010203));
    }

    #[test]
    fn test_read_garbage_fails() {
        assert!(read_png(Cursor::new(b"not a png".to_vec())).is_err());
    }
}

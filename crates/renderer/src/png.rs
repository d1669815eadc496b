//! PNG encoding for rendered frames.
//!
//! Frames are stored premultiplied while drawing. They are converted back to
//! straight alpha and written as 8-bit RGBA (color type 6).

use forecast_common::{ForecastError, ForecastResult};
use rayon::prelude::*;
use std::io::Write;

use crate::canvas::Canvas;

/// Minimum pixels before demultiplying in parallel.
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Encode a canvas as an RGBA PNG.
pub fn encode_png(canvas: &Canvas) -> ForecastResult<Vec<u8>> {
    let mut pixels = canvas.data().to_vec();
    demultiply(&mut pixels);
    create_png(&pixels, canvas.width() as usize, canvas.height() as usize)
}

/// Convert premultiplied RGBA bytes to straight alpha in place.
pub fn demultiply(pixels: &mut [u8]) {
    if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        pixels.par_chunks_exact_mut(4).for_each(demultiply_pixel);
    } else {
        pixels.chunks_exact_mut(4).for_each(demultiply_pixel);
    }
}

#[inline(always)]
fn demultiply_pixel(px: &mut [u8]) {
    let a = px[3] as u32;
    if a == 0 || a == 255 {
        return;
    }
    for c in &mut px[..3] {
        *c = ((*c as u32 * 255 + a / 2) / a).min(255) as u8;
    }
}

/// Create an RGBA PNG from straight-alpha pixel data (4 bytes per pixel).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> ForecastResult<Vec<u8>> {
    if pixels.len() != width * height * 4 {
        return Err(ForecastError::Render(format!(
            "pixel buffer is {} bytes, expected {} for {}x{}",
            pixels.len(),
            width * height * 4,
            width,
            height
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(6); // color type (RGBA)
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    let idat_data = deflate_idat(pixels, width, height)
        .map_err(|e| ForecastError::Render(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

fn deflate_idat(pixels: &[u8], width: usize, height: usize) -> std::io::Result<Vec<u8>> {
    let stride = width * 4;
    let mut uncompressed = Vec::with_capacity(height * (1 + stride));
    for row in pixels.chunks_exact(stride.max(1)).take(height) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

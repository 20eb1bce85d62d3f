//! Image preparation for exported documents.
//!
//! JPEG is passed through untouched as a DCT stream. PNG is decoded with the
//! `png` crate, normalized to 8-bit gray or RGB (palettes expanded, 16-bit
//! samples stripped, alpha flattened onto white) and re-encoded as a Flate
//! stream with PNG predictors.

use png::{BitDepth, ColorType, Encoder, Transformations};

pub const BITS_PER_COMPONENT: u8 = 8;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::Gray => "/DeviceGray",
            ColorSpace::Rgb => "/DeviceRGB",
        }
    }

    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::Gray => 1,
            ColorSpace::Rgb => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterEncoding {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub encoding: RasterEncoding,
    /// JPEG file bytes, or the zlib stream of a re-encoded 8-bit PNG.
    pub data: Vec<u8>,
}

pub fn decode(bytes: &[u8]) -> Result<RasterImage, String> {
    if bytes.starts_with(&[0xFF, 0xD8]) {
        parse_jpeg(bytes)
    } else if bytes.starts_with(&PNG_SIGNATURE) {
        decode_png(bytes)
    } else {
        Err("unsupported image format".to_string())
    }
}

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    bytes.get(at..at + 2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn parse_jpeg(bytes: &[u8]) -> Result<RasterImage, String> {
    let truncated = || "truncated JPEG header".to_string();
    let mut i = 2;

    while i + 1 < bytes.len() {
        if bytes[i] != 0xFF {
            return Err("corrupt JPEG marker stream".to_string());
        }
        let marker = bytes[i + 1];
        match marker {
            0xFF => {
                i += 1;
                continue;
            }
            0x01 | 0xD0..=0xD7 => {
                i += 2;
                continue;
            }
            0xD9 | 0xDA => break,
            _ => {}
        }

        let segment_len = be_u16(bytes, i + 2).ok_or_else(truncated)? as usize;
        if segment_len < 2 {
            return Err("corrupt JPEG segment length".to_string());
        }

        match marker {
            0xC0..=0xC2 => {
                let precision = *bytes.get(i + 4).ok_or_else(truncated)?;
                let height = be_u16(bytes, i + 5).ok_or_else(truncated)?;
                let width = be_u16(bytes, i + 7).ok_or_else(truncated)?;
                let components = *bytes.get(i + 9).ok_or_else(truncated)?;

                if precision != BITS_PER_COMPONENT {
                    return Err(format!("unsupported JPEG precision {}", precision));
                }
                if width == 0 || height == 0 {
                    return Err("JPEG has zero dimensions".to_string());
                }
                let color_space = match components {
                    1 => ColorSpace::Gray,
                    3 => ColorSpace::Rgb,
                    n => return Err(format!("unsupported JPEG component count {}", n)),
                };
                return Ok(RasterImage {
                    width: width as u32,
                    height: height as u32,
                    color_space,
                    encoding: RasterEncoding::Jpeg,
                    data: bytes.to_vec(),
                });
            }
            0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF => {
                return Err("unsupported JPEG coding process".to_string());
            }
            _ => i += 2 + segment_len,
        }
    }

    Err("JPEG has no frame header".to_string())
}

fn decode_png(bytes: &[u8]) -> Result<RasterImage, String> {
    let invalid = |e: png::DecodingError| format!("invalid PNG: {}", e);

    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().map_err(invalid)?;
    let mut buffer = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buffer).map_err(invalid)?;
    let pixels = &buffer[..frame.buffer_size()];

    if frame.bit_depth != BitDepth::Eight {
        return Err(format!("PNG decoded to {:?} samples", frame.bit_depth));
    }
    let (color_space, samples) = match frame.color_type {
        ColorType::Grayscale => (ColorSpace::Gray, pixels.to_vec()),
        ColorType::Rgb => (ColorSpace::Rgb, pixels.to_vec()),
        ColorType::GrayscaleAlpha => (ColorSpace::Gray, flatten_alpha(pixels, 1)),
        ColorType::Rgba => (ColorSpace::Rgb, flatten_alpha(pixels, 3)),
        ColorType::Indexed => return Err("PNG palette was not expanded".to_string()),
    };

    let data = encode_samples(frame.width, frame.height, color_space, &samples)?;
    Ok(RasterImage {
        width: frame.width,
        height: frame.height,
        color_space,
        encoding: RasterEncoding::Png,
        data,
    })
}

/// Composites `color_channels + 1` interleaved samples onto a white page.
fn flatten_alpha(pixels: &[u8], color_channels: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() / (color_channels + 1) * color_channels);
    for pixel in pixels.chunks_exact(color_channels + 1) {
        let alpha = pixel[color_channels] as u32;
        for &sample in &pixel[..color_channels] {
            let blended = (sample as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
            out.push(blended as u8);
        }
    }
    out
}

/// Re-encodes 8-bit samples and returns the PNG's zlib stream.
fn encode_samples(
    width: u32,
    height: u32,
    color_space: ColorSpace,
    samples: &[u8],
) -> Result<Vec<u8>, String> {
    let failed = |e: png::EncodingError| format!("PNG re-encoding failed: {}", e);

    let mut encoded = Vec::new();
    {
        let mut encoder = Encoder::new(&mut encoded, width, height);
        encoder.set_color(match color_space {
            ColorSpace::Gray => ColorType::Grayscale,
            ColorSpace::Rgb => ColorType::Rgb,
        });
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(failed)?;
        writer.write_image_data(samples).map_err(failed)?;
        writer.finish().map_err(failed)?;
    }

    idat_payload(&encoded)
}

fn idat_payload(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let truncated = || "truncated PNG chunk".to_string();
    let mut i = PNG_SIGNATURE.len();
    let mut data = Vec::new();

    while i + 8 <= bytes.len() {
        let length = be_u32(bytes, i).ok_or_else(truncated)? as usize;
        let kind = &bytes[i + 4..i + 8];
        let body = bytes.get(i + 8..i + 8 + length).ok_or_else(truncated)?;
        match kind {
            b"IDAT" => data.extend_from_slice(body),
            b"IEND" => break,
            _ => {}
        }
        // length + type + body + crc
        i += 12 + length;
    }

    if data.is_empty() {
        return Err("PNG has no image data".to_string());
    }
    Ok(data)
}

//! 测试用图片生成：带 EXIF 方向标签的 JPEG。

use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb};

pub(crate) const ORIENTATION_NORMAL: u16 = 1;
pub(crate) const ORIENTATION_ROTATE_180: u16 = 3;
pub(crate) const ORIENTATION_ROTATE_90: u16 = 6;
pub(crate) const ORIENTATION_ROTATE_270: u16 = 8;

pub(crate) fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8])
    });

    let mut jpeg = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, 90);
        encoder.encode_image(&img).expect("failed to encode test image");
    }
    jpeg
}

/// 在 SOI 之后插入一个只含 Orientation 标签的 APP1 段。
pub(crate) fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let jpeg = jpeg_bytes(width, height);
    let segment = exif_orientation_segment(orientation);

    let mut out = Vec::with_capacity(jpeg.len() + segment.len());
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn exif_orientation_segment(orientation: u16) -> Vec<u8> {
    let mut payload = b"Exif\x00\x00".to_vec();
    // 大端 TIFF 头，IFD0 紧随其后
    payload.extend_from_slice(b"MM\x00\x2A\x00\x00\x00\x08");
    payload.extend_from_slice(&1u16.to_be_bytes());
    payload.extend_from_slice(&0x0112u16.to_be_bytes());
    payload.extend_from_slice(&3u16.to_be_bytes());
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.extend_from_slice(&orientation.to_be_bytes());
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(&0u32.to_be_bytes());

    let len = (payload.len() + 2) as u16;
    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&len.to_be_bytes());
    segment.extend_from_slice(&payload);
    segment
}

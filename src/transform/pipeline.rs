//! # 解码与变换流水线模块
//!
//! ## 设计思路
//!
//! 将“文件 → 位图 → 旋转 → 缩放 → JPEG → 回写”集中管理。
//! 每个中间位图只归属一个作用域：下一阶段按值接收上一阶段的位图，
//! 产出新位图后立即释放旧位图，任意时刻最多两张全分辨率缓冲同时存活。
//!
//! ## 实现思路
//!
//! 1. 读取 header 尺寸，按像素/内存上限快速拒绝
//! 2. 完整解码
//! 3. 按方向旋转（90°/270° 交换宽高）
//! 4. 按尺寸档位缩放
//! 5. 在内存中编码为 JPEG
//! 6. 编码成功后才截断并覆盖原文件

use fast_image_resize as fr;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageReader, Rgba};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use super::orientation::Rotation;
use super::{ImageTransformer, PhotoSize, TransformConfig, TransformError};

impl ImageTransformer {
    /// 执行完整的重写流程，返回最终尺寸。
    pub(super) fn rewrite_file(
        &self,
        path: &Path,
        rotation: Rotation,
        size: PhotoSize,
        quality: u8,
        config: &TransformConfig,
    ) -> Result<(u32, u32), TransformError> {
        let (header_width, header_height) = Self::inspect_dimensions(path)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let (oriented_width, oriented_height) =
            rotation.oriented_dimensions(header_width, header_height);
        let (planned_width, planned_height) =
            size.scaled_dimensions(oriented_width, oriented_height);
        log::debug!(
            "🧭 重写计划 - 旋转: {}° 校正后: {}x{} 目标: {}x{}",
            rotation.degrees(),
            oriented_width,
            oriented_height,
            planned_width,
            planned_height
        );

        let decoded = Self::decode_file(path)?;
        let rotated = Self::apply_rotation(decoded, rotation);
        let scaled = Self::apply_scale(rotated, size, config.resize_filter())?;
        let (width, height) = scaled.dimensions();
        let encoded = Self::encode_jpeg(scaled, quality)?;

        Self::overwrite_in_place(path, &encoded)?;

        log::info!(
            "✅ 图片重写完成 - 路径: {} 原始尺寸: {}x{} 输出尺寸: {}x{} 旋转: {}° 质量: {}",
            path.display(),
            header_width,
            header_height,
            width,
            height,
            rotation.degrees(),
            quality
        );

        Ok((width, height))
    }

    /// 仅通过图片头信息读取宽高。
    pub(super) fn inspect_dimensions(path: &Path) -> Result<(u32, u32), TransformError> {
        ImageReader::open(path)
            .map_err(|e| TransformError::FileSystem(format!("无法打开图片文件：{}", e)))?
            .with_guessed_format()
            .map_err(|e| TransformError::Decode(format!("无法识别图片格式：{}", e)))?
            .into_dimensions()
            .map_err(|e| TransformError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    fn decode_file(path: &Path) -> Result<DynamicImage, TransformError> {
        ImageReader::open(path)
            .map_err(|e| TransformError::FileSystem(format!("无法打开图片文件：{}", e)))?
            .with_guessed_format()
            .map_err(|e| TransformError::Decode(format!("无法识别图片格式：{}", e)))?
            .decode()
            .map_err(|e| TransformError::Decode(format!("图片解码失败：{}", e)))
    }

    fn validate_pixel_limits(
        config: &TransformConfig,
        width: u32,
        height: u32,
    ) -> Result<(), TransformError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| TransformError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(TransformError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &TransformConfig,
        width: u32,
        height: u32,
    ) -> Result<(), TransformError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| TransformError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(TransformError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 旋转位图；旋转前的缓冲在返回前释放。
    fn apply_rotation(image: DynamicImage, rotation: Rotation) -> DynamicImage {
        let rotated = match rotation {
            Rotation::None => return image,
            Rotation::Clockwise90 => image.rotate90(),
            Rotation::Clockwise180 => image.rotate180(),
            Rotation::Clockwise270 => image.rotate270(),
        };
        drop(image);
        rotated
    }

    /// 按档位缩放位图；缩放前的缓冲在返回前释放。
    fn apply_scale(
        image: DynamicImage,
        size: PhotoSize,
        filter: FilterType,
    ) -> Result<DynamicImage, TransformError> {
        if size.is_full() {
            return Ok(image);
        }

        let (width, height) = image.dimensions();
        let (target_width, target_height) = size.scaled_dimensions(width, height);

        log::debug!(
            "🧩 缩放：{}x{} -> {}x{}（档位={} filter={:?}）",
            width,
            height,
            target_width,
            target_height,
            size,
            filter
        );

        Self::resize_with_fast_image_resize(image, target_width, target_height, filter)
    }

    fn resize_with_fast_image_resize(
        image: DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<DynamicImage, TransformError> {
        let src = image.into_rgba8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| TransformError::Scale(format!("构建源图像缓冲失败：{}", e)))?;

        let mut dst_image =
            fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(Self::to_resize_alg(filter));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| TransformError::Scale(format!("fast_image_resize 执行失败：{}", e)))?;
        drop(src_image);

        let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(
            target_width,
            target_height,
            dst_image.into_vec(),
        )
        .ok_or_else(|| TransformError::Scale("fast_image_resize 输出缓冲长度异常".to_string()))?;

        Ok(DynamicImage::ImageRgba8(rgba))
    }

    fn to_resize_alg(filter: FilterType) -> fr::ResizeAlg {
        match filter {
            FilterType::Nearest => fr::ResizeAlg::Nearest,
            FilterType::Triangle => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
            FilterType::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
            FilterType::Gaussian => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
            FilterType::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
        }
    }

    /// 在内存中编码为 JPEG，失败时原文件保持不变。
    fn encode_jpeg(image: DynamicImage, quality: u8) -> Result<Vec<u8>, TransformError> {
        let rgb = image.into_rgb8();
        let mut encoded = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut encoded, quality.clamp(1, 100));
            encoder
                .encode_image(&rgb)
                .map_err(|e| TransformError::Encode(format!("JPEG 编码失败：{}", e)))?;
        }
        Ok(encoded)
    }

    /// 截断并覆盖原文件。
    ///
    /// 非崩溃原子：进程在截断与写完之间退出会留下损坏文件。
    fn overwrite_in_place(path: &Path, bytes: &[u8]) -> Result<(), TransformError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| TransformError::FileSystem(format!("无法打开目标文件：{}", e)))?;

        file.write_all(bytes)
            .and_then(|_| file.sync_all())
            .map_err(|e| TransformError::FileSystem(format!("写入目标文件失败：{}", e)))
    }
}

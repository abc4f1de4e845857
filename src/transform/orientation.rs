//! 方向元数据读取。
//!
//! 只关心三种纯旋转（EXIF 值 6 / 3 / 8），镜像类方向一律按 0° 处理。
//! 读取失败不是致命错误，同样视为无需旋转。

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EXIF_ROTATE_180: u32 = 3;
const EXIF_ROTATE_90: u32 = 6;
const EXIF_ROTATE_270: u32 = 8;

/// 需要顺时针施加的旋转角度。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Clockwise90 => 90,
            Self::Clockwise180 => 180,
            Self::Clockwise270 => 270,
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// 90° / 270° 会交换宽高。
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Clockwise90 | Self::Clockwise270)
    }

    /// 施加旋转后的宽高。
    pub fn oriented_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    fn from_exif(value: u32) -> Self {
        match value {
            EXIF_ROTATE_90 => Self::Clockwise90,
            EXIF_ROTATE_180 => Self::Clockwise180,
            EXIF_ROTATE_270 => Self::Clockwise270,
            _ => Self::None,
        }
    }
}

/// 读取图片文件内嵌的方向标签。
pub fn read_rotation(path: &Path) -> Rotation {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            log::debug!("读取方向信息失败，按 0° 处理 - 路径: {} 原因: {}", path.display(), err);
            return Rotation::None;
        }
    };

    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(err) => {
            log::debug!("图片无可用 EXIF，按 0° 处理 - 路径: {} 原因: {}", path.display(), err);
            return Rotation::None;
        }
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Rotation::from_exif)
        .unwrap_or(Rotation::None)
}

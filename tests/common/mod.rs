#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb};
use media_bridge::broker::{LaunchDirective, PickerSurface};
use media_bridge::config::MediaConfig;
use media_bridge::media::{AssumeGranted, MediaService, PermissionGate};
use media_bridge::resolver::{ContentLocator, ContentSource, FsContentSource};
use tokio::sync::mpsc;

pub const ORIENTATION_ROTATE_90: u16 = 6;

pub fn unique_temp_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock error")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("media-bridge-it-{tag}-{nanos}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 255) as u8, (y % 255) as u8, 128u8])
    });
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 85)
        .encode_image(&img)
        .expect("encode test jpeg");

    let mut payload = b"Exif\x00\x00".to_vec();
    payload.extend_from_slice(b"II\x2A\x00\x08\x00\x00\x00");
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&0x0112u16.to_le_bytes());
    payload.extend_from_slice(&3u16.to_le_bytes());
    payload.extend_from_slice(&1u32.to_le_bytes());
    payload.extend_from_slice(&orientation.to_le_bytes());
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(&0u32.to_le_bytes());

    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// 把每条启动指令转发到测试里的选择器界面。
pub struct ChannelSurface {
    sender: mpsc::UnboundedSender<LaunchDirective>,
    camera: bool,
}

impl PickerSurface for ChannelSurface {
    fn launch(&self, directive: LaunchDirective) -> Result<(), String> {
        self.sender
            .send(directive)
            .map_err(|_| "picker surface closed".to_string())
    }

    fn camera_available(&self) -> bool {
        self.camera
    }
}

/// 内存中的内容来源：只认识预先登记的句柄，没有关联的本地路径。
#[derive(Default)]
pub struct MemorySource {
    bytes: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn with(mut self, handle: &str, bytes: &[u8]) -> Self {
        self.bytes.insert(handle.to_string(), bytes.to_vec());
        self
    }
}

impl ContentSource for MemorySource {
    fn query_local_path(&self, _locator: &ContentLocator) -> Option<PathBuf> {
        None
    }

    fn open_read_stream(&self, locator: &ContentLocator) -> io::Result<Box<dyn Read + Send>> {
        self.bytes
            .get(locator.as_str())
            .map(|b| Box::new(Cursor::new(b.clone())) as Box<dyn Read + Send>)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "content is gone"))
    }

    fn delete(&self, _locator: &ContentLocator) -> io::Result<()> {
        Ok(())
    }
}

pub struct DenyAll;

impl PermissionGate for DenyAll {
    fn ensure_storage_access(&self) -> media_bridge::media::PermissionStatus {
        media_bridge::media::PermissionStatus::Denied
    }
}

pub struct Harness {
    pub service: MediaService,
    pub directives: mpsc::UnboundedReceiver<LaunchDirective>,
    pub root: PathBuf,
}

impl Harness {
    pub fn new(tag: &str) -> Self {
        Self::build(tag, Arc::new(FsContentSource), Arc::new(AssumeGranted))
    }

    pub fn with_permissions(tag: &str, permissions: Arc<dyn PermissionGate>) -> Self {
        Self::build(tag, Arc::new(FsContentSource), permissions)
    }

    pub fn with_source(tag: &str, content: Arc<dyn ContentSource>) -> Self {
        Self::build(tag, content, Arc::new(AssumeGranted))
    }

    fn build(
        tag: &str,
        content: Arc<dyn ContentSource>,
        permissions: Arc<dyn PermissionGate>,
    ) -> Self {
        let root = unique_temp_dir(tag);
        let config = MediaConfig {
            media_root: root.join("media"),
            public_album_root: Some(root.join("album")),
            ..MediaConfig::default()
        };
        let (sender, directives) = mpsc::unbounded_channel();
        let surface = Arc::new(ChannelSurface {
            sender,
            camera: true,
        });
        let service = MediaService::new(config, surface, content, permissions);
        Self {
            service,
            directives,
            root,
        }
    }

    /// 私有目录下某类媒体临时副本目录中的文件名（排序后）。
    pub fn temp_entries(&self, kind_dir: &str) -> Vec<String> {
        let dir = self.root.join("media").join(kind_dir).join("temp");
        let mut names: Vec<String> = fs::read_dir(&dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

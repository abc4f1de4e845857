//! # 媒体桥接 — 命令行入口
//!
//! 本文件仅负责日志初始化、参数解析与结果输出。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use media_bridge::config::MediaConfig;
use media_bridge::error::MediaError;
use media_bridge::resolver::{AssetResolver, ContentLocator, FsContentSource};
use media_bridge::storage::{MediaKind, MediaStorage};
use media_bridge::transform::{ImageTransformer, PhotoSize, ScalingProfile};

#[derive(Debug, Parser)]
#[command(
    name = "media-bridge",
    version,
    about = "Normalize photos and resolve media locators",
    long_about = None
)]
struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Correct orientation and rescale one image in place.
    Normalize {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Output size: full, large, medium or small.
        #[arg(long, default_value = "full")]
        size: PhotoSize,

        /// JPEG quality (0-100). Defaults to the configured quality.
        #[arg(long)]
        quality: Option<u8>,

        /// Scaling profile: quality, balanced or speed.
        #[arg(long)]
        profile: Option<ScalingProfile>,

        /// Rescale only, ignore the orientation tag.
        #[arg(long)]
        resize_only: bool,
    },

    /// Resolve locators to local files.
    Resolve {
        #[arg(value_name = "LOCATOR", required = true)]
        locators: Vec<String>,

        /// Treat the locators as videos.
        #[arg(long)]
        video: bool,
    },

    /// Write the effective configuration back to the config file.
    InitConfig,
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("media-bridge")
        .join("config.json")
}

fn run_normalize(
    config: &MediaConfig,
    path: &Path,
    size: PhotoSize,
    quality: Option<u8>,
    profile: Option<ScalingProfile>,
    resize_only: bool,
) -> Result<bool, MediaError> {
    let transformer = ImageTransformer::new(config.transform.clone());
    if let Some(profile) = profile {
        transformer.set_scaling_profile(profile)?;
    }

    let quality = quality.unwrap_or(config.default_quality).min(100);
    let rewritten = if resize_only {
        transformer.resize(path, size, quality)?
    } else {
        transformer.normalize(path, size, quality)?
    };

    if rewritten {
        let (width, height) = transformer.dimensions(path)?;
        println!("rewritten {} ({}x{})", path.display(), width, height);
    } else {
        println!("unchanged {}", path.display());
    }
    Ok(rewritten)
}

fn run_resolve(config: &MediaConfig, locators: Vec<String>, video: bool) -> Result<(), MediaError> {
    let kind = if video { MediaKind::Video } else { MediaKind::Photo };
    let resolver = AssetResolver::new(Arc::new(FsContentSource), MediaStorage::from_config(config));

    let locators: Vec<ContentLocator> = locators.into_iter().map(ContentLocator::new).collect();
    let resolved = resolver.resolve(&locators, kind);

    let mut missing = Vec::new();
    for (locator, slot) in locators.iter().zip(&resolved) {
        match slot {
            Some(media) if media.is_temporary_copy => {
                println!("{}\t{}\t(copy)", locator, media.path.display())
            }
            Some(media) => println!("{}\t{}", locator, media.path.display()),
            None => {
                println!("{}\t<not found>", locator);
                missing.push(locator.to_string());
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MediaError::MediaNotFound(missing.join(", ")))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let config_path = args.config.unwrap_or_else(default_config_path);
    let config = MediaConfig::load_from_path(&config_path);
    log::debug!("使用配置文件: {}", config_path.display());

    let result = match args.command {
        Command::Normalize {
            path,
            size,
            quality,
            profile,
            resize_only,
        } => {
            let config = config.clone();
            tokio::task::spawn_blocking(move || {
                run_normalize(&config, &path, size, quality, profile, resize_only).map(|_| ())
            })
            .await
            .map_err(MediaError::from)
            .and_then(|inner| inner)
        }
        Command::Resolve { locators, video } => {
            let config = config.clone();
            tokio::task::spawn_blocking(move || run_resolve(&config, locators, video))
                .await
                .map_err(MediaError::from)
                .and_then(|inner| inner)
        }
        Command::InitConfig => config.save_to_path(&config_path).map(|()| {
            println!("wrote {}", config_path.display());
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ [{}] {}", err.code(), err);
            ExitCode::FAILURE
        }
    }
}

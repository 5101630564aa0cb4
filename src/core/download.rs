use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

const YT_DLP: &str = "yt-dlp";
const OUTPUT_TEMPLATE: &str = "%(id)s.%(ext)s";
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "mov"];

/// A video saved to disk plus the metadata the downloader reported.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedVideo {
    pub url: String,
    pub path: PathBuf,
    pub title: String,
    pub uploader: String,
    pub duration: f64,
}

#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str, output_dir: &Path) -> Result<DownloadedVideo>;
}

/// Subset of `yt-dlp --dump-json` output.
#[derive(Debug, Deserialize)]
struct VideoInfo {
    title: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
}

pub struct YtDlpDownloader {
    program: String,
}

impl YtDlpDownloader {
    /// Fails when the `yt-dlp` binary cannot be executed.
    pub async fn locate() -> Result<Self> {
        match Command::new(YT_DLP).arg("--version").output().await {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                tracing::info!("Using {YT_DLP} {}", version.trim());
                Ok(Self {
                    program: YT_DLP.to_string(),
                })
            }
            Ok(output) => {
                tracing::error!(
                    "{YT_DLP} --version failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                Err(Error::ToolMissing(YT_DLP.to_string()))
            }
            Err(e) => {
                tracing::error!("Could not execute {YT_DLP}: {e}");
                Err(Error::ToolMissing(YT_DLP.to_string()))
            }
        }
    }

    async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        let output = Command::new(&self.program)
            .args(["--dump-json", "--no-playlist", "--no-warnings"])
            .arg(url)
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::Download(format!(
                "failed to get video info: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| Error::Download("yt-dlp printed no video info".to_string()))?;
        Ok(serde_json::from_str(line)?)
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn download(&self, url: &str, output_dir: &Path) -> Result<DownloadedVideo> {
        ensure_directory(output_dir).await?;
        let info = self.fetch_info(url).await?;

        let template = output_dir.join(OUTPUT_TEMPLATE);
        let output = Command::new(&self.program)
            .args(["--no-playlist", "--no-warnings", "-o"])
            .arg(&template)
            .args(["--print", "after_move:filepath"])
            .arg(url)
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::Download(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let printed = String::from_utf8_lossy(&output.stdout);
        let path = match printed.lines().rev().map(str::trim).find(|l| !l.is_empty()) {
            Some(line) if Path::new(line).exists() => PathBuf::from(line),
            _ => newest_video(output_dir)
                .await?
                .ok_or_else(|| Error::Download("downloaded file not found".to_string()))?,
        };

        let title = info.title.unwrap_or_else(|| "Unknown".to_string());
        println!("Downloaded: {}", path.display());

        Ok(DownloadedVideo {
            url: url.to_string(),
            path,
            title,
            uploader: info.uploader.unwrap_or_else(|| "Unknown".to_string()),
            duration: info.duration.unwrap_or(0.0),
        })
    }
}

pub async fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}

/// Most recently modified video file in `dir`.
pub async fn newest_video(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_video = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if !is_video {
            continue;
        }

        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        if newest.as_ref().is_none_or(|(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

use crate::core::download::DownloadedVideo;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;

const FFMPEG: &str = "ffmpeg";
const FRAME_SUFFIX: &str = ".frame.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Upload the whole video.
    #[default]
    Video,
    /// Upload one JPEG frame from the middle of the video.
    Frame,
}

/// What gets sent to the describer.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInput {
    pub path: PathBuf,
    pub mime_type: &'static str,
}

impl MediaInput {
    pub fn is_frame(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

pub struct MediaExtractor {
    mode: ExtractMode,
}

impl MediaExtractor {
    pub fn new(mode: ExtractMode) -> Self {
        Self { mode }
    }

    pub async fn extract(&self, video: &DownloadedVideo) -> Result<MediaInput> {
        match self.mode {
            ExtractMode::Video => Ok(MediaInput {
                path: video.path.clone(),
                mime_type: video_mime_type(&video.path),
            }),
            ExtractMode::Frame => {
                let output = frame_path(&video.path);
                extract_frame(&video.path, representative_time(video.duration), &output).await?;
                Ok(MediaInput {
                    path: output,
                    mime_type: "image/jpeg",
                })
            }
        }
    }
}

pub fn video_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("mov") => "video/quicktime",
        _ => "video/mp4",
    }
}

fn representative_time(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration / 2.0
    } else {
        0.0
    }
}

fn frame_path(video: &Path) -> PathBuf {
    let mut name = video.file_stem().unwrap_or_default().to_os_string();
    name.push(FRAME_SUFFIX);
    video.with_file_name(name)
}

/// Writes a single JPEG frame taken at `time_secs`.
async fn extract_frame(video: &Path, time_secs: f64, output: &Path) -> Result<()> {
    let result = Command::new(FFMPEG)
        .args(["-y", "-loglevel", "error", "-ss", &format!("{time_secs:.3}"), "-i"])
        .arg(video)
        .args(["-frames:v", "1", "-q:v", "2"])
        .arg(output)
        .output()
        .await
        .map_err(|e| {
            tracing::error!("Could not execute {FFMPEG}: {e}");
            Error::ToolMissing(FFMPEG.to_string())
        })?;

    if !result.status.success() || !output.exists() {
        return Err(Error::custom(format!(
            "frame extraction failed: {}",
            String::from_utf8_lossy(&result.stderr).trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(path: &str, duration: f64) -> DownloadedVideo {
        DownloadedVideo {
            url: "https://example.com/v/1".to_string(),
            path: PathBuf::from(path),
            title: "clip".to_string(),
            uploader: "someone".to_string(),
            duration,
        }
    }

    #[tokio::test]
    async fn video_mode_passes_the_file_through() {
        let input = MediaExtractor::new(ExtractMode::Video)
            .extract(&video("downloads/abc.webm", 12.0))
            .await
            .unwrap();
        assert_eq!(input.path, PathBuf::from("downloads/abc.webm"));
        assert_eq!(input.mime_type, "video/webm");
        assert!(!input.is_frame());
    }

    #[test]
    fn unknown_extensions_default_to_mp4() {
        assert_eq!(video_mime_type(Path::new("clip")), "video/mp4");
        assert_eq!(video_mime_type(Path::new("clip.MKV")), "video/x-matroska");
    }

    #[test]
    fn frame_is_taken_from_the_middle() {
        assert_eq!(representative_time(14.0), 7.0);
        assert_eq!(representative_time(0.0), 0.0);
        assert_eq!(representative_time(f64::NAN), 0.0);
    }

    #[test]
    fn frame_path_sits_next_to_the_video() {
        assert_eq!(
            frame_path(Path::new("downloads/abc.mp4")),
            PathBuf::from("downloads/abc.frame.jpg")
        );
    }
}

use crate::core::analysis::VideoAnalysis;
use crate::core::download::DownloadedVideo;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

pub const BATCH_METADATA_FILE: &str = "metadata.json";
pub const SINGLE_METADATA_FILE: &str = "single_video_metadata.json";

/// One analysed video. Exactly one of `analysis` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub video_name: String,
    pub video_title: String,
    pub video_url: String,
    pub uploader: String,
    pub duration: f64,
    pub analysis: Option<VideoAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MetadataEntry {
    pub fn analysed(video: &DownloadedVideo, analysis: VideoAnalysis) -> Self {
        Self::base(video, Some(analysis), None)
    }

    pub fn failed(video: &DownloadedVideo, error: impl Into<String>) -> Self {
        Self::base(video, None, Some(error.into()))
    }

    pub fn is_ok(&self) -> bool {
        self.analysis.is_some()
    }

    fn base(
        video: &DownloadedVideo,
        analysis: Option<VideoAnalysis>,
        error: Option<String>,
    ) -> Self {
        Self {
            video_name: video
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            video_title: video.title.clone(),
            video_url: video.url.clone(),
            uploader: video.uploader.clone(),
            duration: video.duration,
            analysis,
            error,
        }
    }
}

pub struct MetadataWriter;

impl MetadataWriter {
    /// Writes `entries` as a pretty-printed JSON array, replacing the file.
    pub async fn save(path: &Path, entries: &[MetadataEntry]) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(entries)?;
        fs::write(path, content).await?;
        println!("Metadata saved to: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn video() -> DownloadedVideo {
        DownloadedVideo {
            url: "https://www.tiktok.com/@doggo/video/1".to_string(),
            path: PathBuf::from("downloads/7301.mp4"),
            title: "Skating dog".to_string(),
            uploader: "doggo".to_string(),
            duration: 14.0,
        }
    }

    #[tokio::test]
    async fn failed_entries_keep_an_error_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("metadata.json");
        let entry =
            MetadataEntry::failed(&video(), "Model response did not match the analysis schema");

        MetadataWriter::save(&path, std::slice::from_ref(&entry)).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["video_name"], "7301.mp4");
        assert!(raw[0]["analysis"].is_null());
        assert_eq!(raw[0]["error"], "Model response did not match the analysis schema");

        let loaded: Vec<MetadataEntry> = serde_json::from_value(raw).unwrap();
        assert_eq!(loaded, vec![entry]);
        assert!(!loaded[0].is_ok());
    }
}

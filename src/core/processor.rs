use crate::core::analysis::VideoAnalysis;
use crate::core::batch::BatchReport;
use crate::core::describer::VideoDescriber;
use crate::core::download::{DownloadedVideo, Downloader};
use crate::core::extract::MediaExtractor;
use crate::core::metadata::MetadataEntry;
use crate::error::Result;
use std::path::PathBuf;

#[derive(Debug)]
pub struct ProcessingReport {
    pub entries: Vec<MetadataEntry>,
    pub batch: BatchReport,
}

/// Download → extract → describe for each link, one at a time.
pub struct VideoProcessor<D, V> {
    downloader: D,
    describer: V,
    extractor: MediaExtractor,
    output_dir: PathBuf,
}

impl<D: Downloader, V: VideoDescriber> VideoProcessor<D, V> {
    pub fn new(
        downloader: D,
        describer: V,
        extractor: MediaExtractor,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            downloader,
            describer,
            extractor,
            output_dir: output_dir.into(),
        }
    }

    /// A failed download produces no entry; a failed analysis produces an
    /// entry carrying the error. Both count as failed items.
    pub async fn process_all(&self, links: &[String]) -> Result<ProcessingReport> {
        let mut batch = BatchReport::new(links.iter().cloned());
        let mut entries = Vec::with_capacity(links.len());

        for (idx, url) in links.iter().enumerate() {
            batch.start(idx)?;
            println!("\n[{}/{}] Processing: {url}", idx + 1, links.len());

            let video = match self.downloader.download(url, &self.output_dir).await {
                Ok(video) => video,
                Err(e) => {
                    tracing::warn!("Failed to download {url}: {e}");
                    batch.fail(idx, e.to_string())?;
                    continue;
                }
            };

            let entry = self.analyse(&video).await;
            match &entry.error {
                None => batch.succeed(idx)?,
                Some(reason) => batch.fail(idx, reason.clone())?,
            }
            entries.push(entry);
        }

        debug_assert!(batch.is_complete());
        Ok(ProcessingReport { entries, batch })
    }

    async fn analyse(&self, video: &DownloadedVideo) -> MetadataEntry {
        match self.describe(video).await {
            Ok(analysis) => {
                println!("Analysis: {}", preview(&analysis.video_summary));
                MetadataEntry::analysed(video, analysis)
            }
            Err(e) => {
                tracing::warn!("Analysis failed for {}: {e}", video.url);
                MetadataEntry::failed(video, e.to_string())
            }
        }
    }

    async fn describe(&self, video: &DownloadedVideo) -> Result<VideoAnalysis> {
        let media = self.extractor.extract(video).await?;
        let text = self.describer.describe(&media).await?;
        VideoAnalysis::from_model_text(&text)
    }
}

fn preview(summary: &str) -> String {
    const LIMIT: usize = 60;
    if summary.chars().count() <= LIMIT {
        summary.to_string()
    } else {
        let cut: String = summary.chars().take(LIMIT).collect();
        format!("{cut}...")
    }
}

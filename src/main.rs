mod cli;
mod config;
mod core;
mod error;

use crate::cli::{Cli, Commands};
use crate::config::{DiscoveryConfig, VideoConfig};
use crate::core::channel::split_list;
use crate::core::links::load_links;
use crate::core::metadata::{BATCH_METADATA_FILE, SINGLE_METADATA_FILE};
use crate::core::{
    ChannelDiscovery, Country, CsvStore, ExtractMode, GeminiDescriber, MediaExtractor,
    MetadataWriter, OpenAiChannelSuggester, VideoProcessor, YtDlpDownloader,
};
use crate::error::{Error, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Channels {
            keywords,
            target,
            country,
            db,
        } => {
            run_channels(keywords, target, country, db).await?;
        }
        Commands::Process {
            single_link,
            links_file,
            output_dir,
            metadata,
            frame,
        } => {
            run_process(single_link, links_file, output_dir, metadata, frame).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn run_channels(
    keywords: String,
    target: usize,
    countries: Vec<Country>,
    db_path: PathBuf,
) -> Result<()> {
    let keywords = split_list(&keywords);
    if keywords.is_empty() {
        return Err(Error::custom(
            "No keywords provided. Use --keywords to specify search terms.",
        ));
    }
    if target == 0 {
        return Err(Error::custom("--target must be at least 1"));
    }

    let config = DiscoveryConfig::from_env()?;
    let store = CsvStore::new(db_path);
    let mut db = store.load()?;

    println!("TikTok Pet Channel Finder");
    println!("Target: {target} channels per country");
    println!("Keywords: {}", keywords.join(", "));

    let discovery = ChannelDiscovery::new(OpenAiChannelSuggester::new(&config), target);
    let run_date = chrono::Local::now().date_naive();
    let report = discovery.run(&mut db, &keywords, &countries, run_date).await?;

    store.save(&db)?;

    report.batch.print_summary("Channel search");
    println!("Added {} new channels", report.new_channels());
    println!("Updated {} existing channels", report.updated_channels());
    println!("Total channels in database: {}", db.len());
    println!("Data saved to: {}", store.path().display());

    Ok(())
}

async fn run_process(
    single_link: Option<String>,
    links_file: PathBuf,
    output_dir: PathBuf,
    metadata: Option<PathBuf>,
    frame: bool,
) -> Result<()> {
    let config = VideoConfig::from_env()?;
    let downloader = YtDlpDownloader::locate().await?;

    let (links, default_metadata) = match single_link {
        Some(url) => (vec![url.trim().to_string()], SINGLE_METADATA_FILE),
        None => (load_links(&links_file).await?, BATCH_METADATA_FILE),
    };
    if links.is_empty() {
        println!("No links found to process");
        return Ok(());
    }
    println!("Found {} links to process", links.len());

    let mode = if frame { ExtractMode::Frame } else { ExtractMode::Video };
    let processor = VideoProcessor::new(
        downloader,
        GeminiDescriber::new(&config)?,
        MediaExtractor::new(mode),
        output_dir,
    );
    let report = processor.process_all(&links).await?;

    let metadata_path = metadata.unwrap_or_else(|| PathBuf::from(default_metadata));
    MetadataWriter::save(&metadata_path, &report.entries).await?;

    report.batch.print_summary("Video processing");
    Ok(())
}

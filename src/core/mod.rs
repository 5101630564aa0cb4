pub mod analysis;
pub mod batch;
pub mod candidates;
pub mod channel;
pub mod describer;
pub mod discovery;
pub mod download;
pub mod extract;
pub mod links;
pub mod merge;
pub mod metadata;
pub mod processor;
pub mod store;
pub mod suggester;

pub use channel::Country;
pub use describer::GeminiDescriber;
pub use discovery::ChannelDiscovery;
pub use download::YtDlpDownloader;
pub use extract::{ExtractMode, MediaExtractor};
pub use metadata::MetadataWriter;
pub use processor::VideoProcessor;
pub use store::CsvStore;
pub use suggester::OpenAiChannelSuggester;

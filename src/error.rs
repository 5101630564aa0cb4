use derive_more::{Display, From};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, From)]
pub enum Error {
    #[display("{_0}")]
    Custom(String),

    #[display("Missing required environment variable {_0}")]
    MissingEnv(String),

    #[display("Required tool '{_0}' is not available on PATH")]
    ToolMissing(String),

    #[display("Malformed candidate list: {_0}")]
    MalformedCandidates(String),

    #[display("Channel database lists {_0} more than once")]
    DuplicateChannel(String),

    #[display("Download failed: {_0}")]
    Download(String),

    #[display("Model response did not match the analysis schema: {_0}")]
    InvalidAnalysis(String),

    #[from]
    #[display("I/O error: {_0}")]
    Io(std::io::Error),

    #[from]
    #[display("JSON error: {_0}")]
    Json(serde_json::Error),

    #[from]
    #[display("CSV error: {_0}")]
    Csv(csv::Error),

    #[from]
    #[display("URL error: {_0}")]
    Url(url::ParseError),

    #[from]
    #[display("HTTP error: {_0}")]
    Http(reqwest::Error),

    #[from]
    #[display("OpenAI error: {_0}")]
    OpenAI(async_openai::error::OpenAIError),
}

impl Error {
    pub fn custom(val: impl std::fmt::Display) -> Self {
        Self::Custom(val.to_string())
    }
}

impl std::error::Error for Error {}

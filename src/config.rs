use crate::error::{Error, Result};
use std::env;

pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";
const CHANNEL_MODEL_ENV: &str = "REELSCOUT_CHANNEL_MODEL";
const VIDEO_MODEL_ENV: &str = "REELSCOUT_VIDEO_MODEL";

const DEFAULT_CHANNEL_MODEL: &str = "gpt-4.1";
const DEFAULT_VIDEO_MODEL: &str = "gemini-2.5-pro";

/// Credentials and model selection for the channel discovery pipeline.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub openai_api_key: String,
    pub model: String,
}

/// Credentials and model selection for the video analysis pipeline.
#[derive(Debug, Clone)]
pub struct VideoConfig {
    pub gemini_api_key: String,
    pub model: String,
}

impl DiscoveryConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Ok(Self {
            openai_api_key: required(OPENAI_KEY_ENV)?,
            model: optional(CHANNEL_MODEL_ENV).unwrap_or_else(|| DEFAULT_CHANNEL_MODEL.to_string()),
        })
    }
}

impl VideoConfig {
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        Ok(Self {
            gemini_api_key: required(GEMINI_KEY_ENV)?,
            model: optional(VIDEO_MODEL_ENV).unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string()),
        })
    }
}

fn load_dotenv() {
    // A missing .env file is normal; the variables may come from the shell.
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
}

fn required(name: &str) -> Result<String> {
    optional(name).ok_or_else(|| Error::MissingEnv(name.to_string()))
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_is_reported_by_name() {
        let err = required("REELSCOUT_TEST_UNSET_VARIABLE").unwrap_err();
        assert!(
            matches!(err, Error::MissingEnv(ref name) if name == "REELSCOUT_TEST_UNSET_VARIABLE")
        );
    }
}

use crate::config::VideoConfig;
use crate::core::extract::MediaInput;
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
/// Upper bound for a whole `generateContent` request carrying inline media.
pub const MAX_INLINE_BYTES: u64 = 20 * 1024 * 1024;
/// Room for the JSON envelope around the encoded media and prompt.
const REQUEST_ENVELOPE_BYTES: u64 = 1024;

const ANALYSIS_PROMPT: &str = r#"Analyze this short-form video and identify its distinct scenes or segments. Describe it in JSON, breaking every scene down with a timestamp and description.

Respond ONLY with valid JSON in exactly this structure:

{
  "video_summary": "One or two sentence overview of the whole video",
  "total_duration": "Total video length in seconds",
  "content_type": "Type of content (dance, comedy, tutorial, lifestyle, food, pets, etc.)",
  "overall_mood": "Overall emotional tone",
  "scenes": [
    {
      "scene_number": 1,
      "start_timestamp": "0:00",
      "duration": "3.5s",
      "description": "What happens in this scene",
      "text_overlay": "Visible text, captions or graphics in this scene",
      "main_action": "Primary action or focus",
      "visual_elements": "Key visual elements, colors and lighting"
    }
  ],
  "audio_elements": {
    "music_type": "Background music description",
    "voice_over": true,
    "sound_effects": "Notable audio elements"
  },
  "visual_style": {
    "camera_work": "Camera movement and framing",
    "setting": "Location or environment",
    "production_quality": "Low/Medium/High"
  },
  "engagement_elements": ["hooks", "transitions", "calls to action"],
  "suggested_tags": ["relevant", "hashtags", "keywords"],
  "platform_indicators": "TikTok/YouTube/Instagram visual cues or watermarks"
}

Rules:
- A new scene starts at a cut, a transition, a clear change of action or a change of text overlay
- Timestamps use "M:SS" or "SS.S"
- Use "none" for text_overlay when a scene has no visible text
- Scene durations must add up to the total length
- Include every visible text overlay, even brief ones
- Output nothing outside the JSON object"#;

const FRAME_PREAMBLE: &str = "You are given a single representative frame instead of the full video. \
Describe it as a one-scene video starting at 0:00 and use \"unknown\" for anything that cannot be seen in a still image.\n\n";

/// Boundary to the hosted model that analyses media. Returns the raw
/// response text.
#[async_trait]
pub trait VideoDescriber: Send + Sync {
    async fn describe(&self, media: &MediaInput) -> Result<String>;
}

pub fn analysis_prompt(media: &MediaInput) -> String {
    if media.is_frame() {
        format!("{FRAME_PREAMBLE}{ANALYSIS_PROMPT}")
    } else {
        ANALYSIS_PROMPT.to_string()
    }
}

#[derive(Clone)]
pub struct GeminiDescriber {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiDescriber {
    pub fn new(config: &VideoConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key: config.gemini_api_key.clone(),
            model: config.model.clone(),
        })
    }
}

/// Estimated request size for `file_bytes` of media sent as base64 next to
/// `prompt`.
fn inline_request_size(file_bytes: u64, prompt: &str) -> u64 {
    file_bytes.div_ceil(3) * 4 + prompt.len() as u64 + REQUEST_ENVELOPE_BYTES
}

#[async_trait]
impl VideoDescriber for GeminiDescriber {
    async fn describe(&self, media: &MediaInput) -> Result<String> {
        let size = fs::metadata(&media.path).await?.len();
        let prompt = analysis_prompt(media);
        let request_size = inline_request_size(size, &prompt);
        if request_size > MAX_INLINE_BYTES {
            return Err(Error::custom(format!(
                "{} needs a {} MiB request, above the {} MiB inline limit; retry with --frame",
                media.path.display(),
                request_size / (1024 * 1024),
                MAX_INLINE_BYTES / (1024 * 1024)
            )));
        }

        let bytes = fs::read(&media.path).await?;
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: media.mime_type,
                            data: STANDARD.encode(&bytes),
                        },
                    },
                    Part::Text { text: prompt },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        tracing::info!("Sending {} ({} bytes) to {}", media.path.display(), size, self.model);
        let response = self
            .http
            .post(format!("{GEMINI_BASE_URL}/{}:generateContent", self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::custom(format!("Gemini returned {status}: {body}")));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(Error::custom("Gemini returned no text"));
        }
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    InlineData { inline_data: InlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .take(1)
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

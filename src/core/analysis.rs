use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Scene breakdown the model is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub video_summary: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub total_duration: String,
    pub content_type: String,
    #[serde(default)]
    pub overall_mood: String,
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub audio_elements: AudioElements,
    #[serde(default)]
    pub visual_style: VisualStyle,
    #[serde(default)]
    pub engagement_elements: Vec<String>,
    #[serde(default)]
    pub suggested_tags: Vec<String>,
    #[serde(default)]
    pub platform_indicators: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_number: u32,
    #[serde(deserialize_with = "text_or_number")]
    pub start_timestamp: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub duration: String,
    pub description: String,
    #[serde(default = "no_overlay")]
    pub text_overlay: String,
    #[serde(default)]
    pub main_action: String,
    #[serde(default)]
    pub visual_elements: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioElements {
    #[serde(default)]
    pub music_type: String,
    #[serde(default)]
    pub voice_over: bool,
    #[serde(default)]
    pub sound_effects: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualStyle {
    #[serde(default)]
    pub camera_work: String,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub production_quality: String,
}

impl VideoAnalysis {
    /// Parses the model's reply, tolerating a surrounding ```json fence.
    pub fn from_model_text(text: &str) -> Result<Self> {
        let body = strip_json_fence(text.trim());
        if body.is_empty() {
            return Err(Error::InvalidAnalysis("empty response".to_string()));
        }
        serde_json::from_str(body).map_err(|e| Error::InvalidAnalysis(e.to_string()))
    }
}

fn strip_json_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn no_overlay() -> String {
    "none".to_string()
}

/// Models alternate between `"14.5"` and `14.5` for durations and timestamps.
fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected text or number, got {other}"
        ))),
    }
}

use crate::config::DiscoveryConfig;
use crate::core::channel::Country;
use crate::error::Result;
use async_openai::{
    self,
    config::OpenAIConfig,
    types::responses::{
        CreateResponse, CreateResponseArgs, EasyInputMessageArgs, InputItem, InputParam,
        OutputItem, OutputMessageContent, Role, Tool,
    },
};
use async_trait::async_trait;
use serde_json::json;

const MAX_OUTPUT_TOKENS: u32 = 10_000;

/// System and user prompt for one (keywords, country) channel search.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPrompt {
    pub country: Country,
    pub system: String,
    pub user: String,
}

impl ChannelPrompt {
    pub fn build(keywords: &[String], country: Country, target: usize) -> Self {
        let system = format!(
            "You are a TikTok channel finder focused on pet and animal content creators from {country}. \
Your job is to list popular TikTok channels that post pets, animals, dogs, cats and similar content, \
specifically creators based in {country}.

REQUIREMENTS:
- Only provide TikTok usernames in this format: @username
- Focus on channels that primarily post pet/animal content
- Find exactly {target} unique channels
- Prefer popular, trending creators from {country} with large followings
- Include variety: dogs, cats, exotic pets, pet training, funny pets, etc.
- Use web search to find current, active channels
- No explanations, one username per line"
        );

        let mut user = format!(
            "Find popular TikTok channels that focus on pet and animal content. Find exactly {target} unique channels."
        );
        if !keywords.is_empty() {
            user.push_str(&format!(
                " Focus specifically on channels related to: {}.",
                keywords.join(", ")
            ));
        }
        user.push_str(" Provide TikTok usernames only (@username format), one per line.");

        Self {
            country,
            system,
            user,
        }
    }
}

/// Boundary to the hosted model that proposes channels. Returns the raw
/// response text; one attempt per call.
#[async_trait]
pub trait ChannelSuggester: Send + Sync {
    async fn suggest(&self, prompt: &ChannelPrompt) -> Result<String>;
}

#[derive(Clone)]
pub struct OpenAiChannelSuggester {
    client: async_openai::Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChannelSuggester {
    pub fn new(config: &DiscoveryConfig) -> Self {
        let openai = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
        Self {
            client: async_openai::Client::with_config(openai),
            model: config.model.clone(),
        }
    }
}

/// Web search scoped to the prompt's country, so answers name channels that
/// are active there now.
fn web_search_tool(country: Country) -> Result<Tool> {
    let tool = serde_json::from_value(json!({
        "type": "web_search_preview",
        "user_location": {"type": "approximate", "country": country.to_string()},
        "search_context_size": "medium",
    }))?;
    Ok(tool)
}

fn channel_request(model: &str, prompt: &ChannelPrompt) -> Result<CreateResponse> {
    let request = CreateResponseArgs::default()
        .max_output_tokens(MAX_OUTPUT_TOKENS)
        .model(model)
        .store(false)
        .tools(vec![web_search_tool(prompt.country)?])
        .input(InputParam::Items(vec![
            InputItem::EasyMessage(
                EasyInputMessageArgs::default()
                    .role(Role::System)
                    .content(prompt.system.as_str())
                    .build()?,
            ),
            InputItem::EasyMessage(
                EasyInputMessageArgs::default()
                    .role(Role::User)
                    .content(prompt.user.as_str())
                    .build()?,
            ),
        ]))
        .build()?;
    Ok(request)
}

#[async_trait]
impl ChannelSuggester for OpenAiChannelSuggester {
    async fn suggest(&self, prompt: &ChannelPrompt) -> Result<String> {
        let request = channel_request(&self.model, prompt)?;
        tracing::debug!("Asking {} for {} channels", self.model, prompt.country);

        let response = self.client.responses().create(request).await?;

        let mut content = String::new();
        for output in response.output {
            if let OutputItem::Message(out) = output {
                for c in out.content {
                    match c {
                        OutputMessageContent::OutputText(text) => content.push_str(&text.text),
                        _ => {
                            tracing::warn!("Unexpected content type: {c:?}");
                            continue;
                        }
                    }
                }
            }
        }

        Ok(content)
    }
}

//! OpenAI 兼容预测后端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；
//! Gemini 的 OpenAI 兼容层、OpenAI 本体、自建代理均可。截图以 base64 data URL
//! 作为图片消息发送，并用 json_schema 响应格式声明六字段结构。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs, ImageUrlArgs,
    ResponseFormat, ResponseFormatJsonSchema,
};
use async_openai::Client;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::forecast::prompt::{response_schema, ANALYST_PROMPT};
use crate::forecast::{ForecastBackend, ForecastError, RawForecast};

/// Token 使用统计（累计值）
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: Arc<AtomicU64>,
    pub completion_tokens: Arc<AtomicU64>,
}

impl TokenUsage {
    pub fn add(&self, prompt: u64, completion: u64) {
        self.prompt_tokens.fetch_add(prompt, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion, Ordering::Relaxed);
    }

    pub fn get(&self) -> (u64, u64) {
        (
            self.prompt_tokens.load(Ordering::Relaxed),
            self.completion_tokens.load(Ordering::Relaxed),
        )
    }
}

/// OpenAI 兼容后端：持有 Client 与 model 名
pub struct OpenAiForecastBackend {
    client: Client<OpenAIConfig>,
    model: String,
    /// 累计 token 使用统计
    pub usage: TokenUsage,
}

impl OpenAiForecastBackend {
    pub fn new(base_url: Option<&str>, model: &str, api_key: &str) -> Self {
        let config = if let Some(url) = base_url {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            usage: TokenUsage::default(),
        }
    }

    fn build_request(
        &self,
        image: &[u8],
    ) -> Result<async_openai::types::chat::CreateChatCompletionRequest, ForecastError> {
        let data_url = format!("data:image/jpeg;base64,{}", BASE64.encode(image));

        let image_part = ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(
                ImageUrlArgs::default()
                    .url(data_url)
                    .build()
                    .map_err(|e| ForecastError::Request(e.to_string()))?,
            )
            .build()
            .map_err(|e| ForecastError::Request(e.to_string()))?;

        let text_part = ChatCompletionRequestMessageContentPartTextArgs::default()
            .text(ANALYST_PROMPT)
            .build()
            .map_err(|e| ForecastError::Request(e.to_string()))?;

        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(vec![
                image_part.into(),
                text_part.into(),
            ]))
            .build()
            .map_err(|e| ForecastError::Request(e.to_string()))?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestMessage::User(user_message)])
            .response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    name: "trade_forecast".to_string(),
                    description: Some("Short-term directional forecast for one dashboard screenshot".to_string()),
                    schema: Some(response_schema()),
                    strict: Some(true),
                },
            })
            .build()
            .map_err(|e| ForecastError::Request(e.to_string()))
    }
}

#[async_trait]
impl ForecastBackend for OpenAiForecastBackend {
    async fn analyze_image(&self, image: &[u8]) -> Result<RawForecast, ForecastError> {
        let request = self.build_request(image)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ForecastError::Request(e.to_string()))?;

        if let Some(usage) = &response.usage {
            self.usage
                .add(usage.prompt_tokens as u64, usage.completion_tokens as u64);
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Forecast token usage"
            );
        }

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone());

        Ok(RawForecast {
            text,
            structured: None,
        })
    }
}

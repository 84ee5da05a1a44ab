//! Generation request / response models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::errors::{ServiceError, ServiceResult};

/// Upper bound for `max_new_tokens`.
pub const MAX_NEW_TOKENS_LIMIT: u32 = 2048;

/// Output schema requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// Open-ended question with a single answer
    Qa,
    /// Multiple-choice question with four options
    Mcq,
    /// Plain prose (summaries, feedback); never selected from a request
    FreeForm,
}

impl Style {
    /// Lenient parse: anything that is not a multiple-choice alias is Q/A.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "mcq" | "multiple-choice" | "multiple_choice" => Self::Mcq,
            _ => Self::Qa,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Qa => "qa",
            Self::Mcq => "mcq",
            Self::FreeForm => "free_form",
        }
    }
}

/// Sampling parameters handed to a backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub stop: Vec<String>,
    pub style: Style,
}

impl GenerationParams {
    /// Parameters for free-form tasks (summaries, feedback).
    pub fn free_form(temperature: f32, stop: &[String]) -> Self {
        Self {
            max_new_tokens: default_max_new_tokens() * 2,
            temperature,
            top_p: default_top_p(),
            repetition_penalty: default_repetition_penalty(),
            stop: stop.to_vec(),
            style: Style::FreeForm,
        }
    }
}

/// Inbound generation request.
///
/// Any of `topic`, `input` or `prompt` may carry the text; see
/// [`GenerationRequest::source`] for the precedence rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    /// Fully formed instruction sent to the backend as-is
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,

    #[serde(default = "default_strict_json")]
    pub strict_json: bool,
    /// "qa" | "mcq"; unknown values are treated as "qa"
    #[serde(default = "default_style")]
    pub style: String,
    /// Overrides the configured default stop sequences
    #[serde(default)]
    pub stop: Option<Vec<String>>,
}

const fn default_max_new_tokens() -> u32 {
    256
}

const fn default_temperature() -> f32 {
    0.2
}

const fn default_top_p() -> f32 {
    0.9
}

const fn default_repetition_penalty() -> f32 {
    1.1
}

const fn default_strict_json() -> bool {
    true
}

fn default_style() -> String {
    "qa".to_string()
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            topic: None,
            input: None,
            prompt: None,
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            repetition_penalty: default_repetition_penalty(),
            strict_json: default_strict_json(),
            style: default_style(),
            stop: None,
        }
    }
}

/// Where the backend prompt comes from after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource<'a> {
    /// Caller supplied a complete instruction; the builder is bypassed
    Verbatim(&'a str),
    /// Text to render through the prompt builder
    Build(&'a str),
}

impl<'a> PromptSource<'a> {
    pub fn text(self) -> &'a str {
        match self {
            Self::Verbatim(text) | Self::Build(text) => text,
        }
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl GenerationRequest {
    /// Convenience constructor for a topic-only request.
    pub fn for_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Default::default()
        }
    }

    /// Resolve the text field: `prompt` > `topic` > `input`.
    ///
    /// Blank values count as absent. A `prompt` is returned untouched;
    /// `topic` and `input` are trimmed before building.
    pub fn source(&self) -> ServiceResult<PromptSource<'_>> {
        if let Some(prompt) = self.prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            return Ok(PromptSource::Verbatim(prompt));
        }

        non_blank(self.topic.as_ref())
            .or_else(|| non_blank(self.input.as_ref()))
            .map(PromptSource::Build)
            .ok_or_else(|| {
                ServiceError::InvalidArgument("Field required: topic | input | prompt".to_string())
            })
    }

    /// Reject out-of-range sampling parameters.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.max_new_tokens == 0 || self.max_new_tokens > MAX_NEW_TOKENS_LIMIT {
            return Err(ServiceError::InvalidArgument(format!(
                "max_new_tokens must be between 1 and {MAX_NEW_TOKENS_LIMIT}, got {}",
                self.max_new_tokens
            )));
        }
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("repetition_penalty", self.repetition_penalty, 0.8, 2.0)?;
        Ok(())
    }

    pub fn style(&self) -> Style {
        Style::parse(&self.style)
    }

    /// Backend parameters, falling back to `default_stop` when the stop list is absent or empty.
    pub fn params(&self, default_stop: &[String]) -> GenerationParams {
        GenerationParams {
            max_new_tokens: self.max_new_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            repetition_penalty: self.repetition_penalty,
            stop: self
                .stop
                .clone()
                .filter(|stop| !stop.is_empty())
                .unwrap_or_else(|| default_stop.to_vec()),
            style: self.style(),
        }
    }
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> ServiceResult<()> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ServiceError::InvalidArgument(format!(
            "{name} must be within [{min}, {max}], got {value}"
        )))
    }
}

/// Uniform generation envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub model_id: String,
    /// Exact prompt sent to the backend
    pub prompt: String,
    /// Raw backend text
    pub generated_text: String,
    /// `None` when no object could be recovered from `generated_text`
    pub parsed_json: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub model_id: String,
    pub prompt: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub model_id: String,
    pub prompt: String,
    pub feedback: String,
}

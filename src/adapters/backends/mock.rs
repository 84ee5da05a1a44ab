//! Deterministic backend for wiring tests and offline development.

use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::errors::ServiceResult;
use crate::domain::models::{GenerationParams, Style};
use crate::domain::ports::GenerationBackend;

/// Free-form reply used for summaries and feedback.
pub const MOCK_FREE_FORM_TEXT: &str = "The hypotenuse of a right triangle follows from the \
Pythagorean theorem: with legs of 6cm and 8cm it is sqrt(36 + 64) = 10cm.";

#[derive(Default)]
pub struct MockBackend {
    calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completions served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Fixed payload for `style`.
    pub fn payload(style: Style) -> String {
        match style {
            Style::Mcq => json!({
                "question": "In a right triangle the base is 6cm and the height is 8cm. Find the length of the hypotenuse.",
                "options": ["A) 9cm", "B) 10cm", "C) 12cm", "D) 14cm"],
                "answer": "B"
            })
            .to_string(),
            Style::Qa => json!({
                "question": "A right triangle has a base of 6cm and a height of 8cm. How long is the hypotenuse?",
                "answer": "10cm"
            })
            .to_string(),
            Style::FreeForm => MOCK_FREE_FORM_TEXT.to_string(),
        }
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, _prompt: &str, params: &GenerationParams) -> ServiceResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::payload(params.style))
    }
}

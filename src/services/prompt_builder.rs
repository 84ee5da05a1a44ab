//! Prompt rendering for generation requests.
//!
//! Everything here is pure: same inputs, same prompt string.

use crate::domain::models::Style;

pub const QA_SCHEMA: &str = r#"{"question":"...","answer":"..."}"#;
pub const MCQ_SCHEMA: &str = r#"{"question":"...","options":["A) ...","B) ...","C) ...","D) ..."],"answer":"A"}"#;

const PERSONA: &str = "You are an AI problem generator for MeQuest.";

/// Schema skeleton for `style`. Free-form falls back to Q/A.
pub fn schema_hint(style: Style) -> &'static str {
    match style {
        Style::Mcq => MCQ_SCHEMA,
        Style::Qa | Style::FreeForm => QA_SCHEMA,
    }
}

/// Render a problem-generation prompt for `user_text`.
///
/// Strict mode pins the model to a single-line JSON object with no markdown;
/// relaxed mode only asks for JSON.
pub fn build(user_text: &str, style: Style, strict_json: bool) -> String {
    build_with_context(user_text, style, strict_json, &[])
}

/// Like [`build`], with retrieved reference passages placed before the topic.
///
/// An empty `context` renders exactly what [`build`] renders.
pub fn build_with_context(user_text: &str, style: Style, strict_json: bool, context: &[String]) -> String {
    let schema = schema_hint(style);
    let references = render_references(context);

    if strict_json {
        format!(
            "{PERSONA}\n\
             Create exactly ONE problem and its correct answer based ONLY on the given topic.\n\
             Do NOT include any markdown, code fences, or explanations.\n\
             Respond STRICTLY as a single-line JSON object matching this schema: {schema}\n\
             {references}\
             Topic: {user_text}\n\
             Output: {schema}"
        )
    } else {
        format!("{references}Generate a single problem and answer for topic: {user_text}. Return JSON: {schema}")
    }
}

fn render_references(context: &[String]) -> String {
    let passages: Vec<&str> = context.iter().map(|p| p.trim()).filter(|p| !p.is_empty()).collect();
    if passages.is_empty() {
        return String::new();
    }

    let mut out = String::from("Reference material:\n");
    for (i, passage) in passages.iter().enumerate() {
        out.push_str(&format!("[{}] {}\n", i + 1, passage));
    }
    out
}

/// Prompt asking for a summary of `document`.
pub fn build_summary(document: &str) -> String {
    format!("You are an expert summarizer.\nSummarize the following text:\n\n{document}")
}

/// Prompt asking a tutor to explain why `user_answer` is wrong.
pub fn build_feedback(question: &str, user_answer: &str, correct_answer: &str) -> String {
    format!(
        "You are an AI tutor. Explain why the user's answer is incorrect and provide the correct explanation.\n\
         Question: {question}\n\
         User answer: {user_answer}\n\
         Correct answer: {correct_answer}\n\n\
         Kindly explain why the user's answer is wrong and walk through the correct solution."
    )
}

//! Aiman persona and transcript assembly
//!
//! Builds the conversation payload sent to the model: the persona primer
//! exchange, the trimmed session history, and the current user turn.
//! Also classifies the conversation phase and scans responses for the
//! machine-readable directives the frontend acts on.

use serde::{Deserialize, Serialize};

use crate::vertex::types::{Content, Part};

/// Number of history turns kept for model context
const HISTORY_WINDOW: usize = 10;

/// System prompt embodied by the fine-tuned model
pub const AIMAN_SYSTEM_PROMPT: &str = r#"## 1. Core Directive: The Aiman Engine

Mandatory Rule: Your primary function is to act as an intelligent orchestrator. For all tasks requiring knowledge, conversation, or analysis, you MUST formulate a request to be processed by the Fine-tuned Gemini "Aiman" Model. Do not generate final user-facing responses yourself. Your output is a set of instructions for the backend.

## 2. Persona & Voice

Identity: Aiman, a witty, professional, and resourceful Malaysian Travel Concierge.

Language: Enthusiastic, friendly, and engaging. Must use local greetings ("Selamat Datang!") and be rich with relevant Emojis.

Mission: Guide users seamlessly from a vague idea to a fully planned, bookable itinerary.

## 3. Platform Feature Awareness

Image Upload (Vision Capability): The platform allows users to upload an image to be analyzed. When a user uploads an image and asks a question, prepare the package for the model; the backend sends the image data and the text prompt together.

Image Retrieval (Search, Not Generation): To display an image in your recommendations, you MUST NOT use [IMAGE: URL]. Instead, instruct the backend to perform a real-time search by outputting the [SEARCH_IMAGE: "query"] directive. The query should be in English and specific.

Action Directive: Continue generating the [ACTION: Type, Name] directive for booking flows. Do not verbally promise real-time booking functionality.

Error Handling: If the backend reports an image processing failure, the model never received the image. If the user's next message is vague, do not guess; ask them to upload it again.

## 4. Phased Interaction Model

Phase 1: Greeting & Scoping: Welcome the user and ask sequential questions (vibe -> duration/travelers/budget).

Phase 2: Ideation & Recommendation: Provide structured recommendations. Each point of interest must be followed by a [SEARCH_IMAGE: "query"] directive, and if applicable, an [ACTION: Type, Name] directive.

Phase 3: Consolidation & Action: When a plan is solid, trigger the "Save Itinerary" workflow and pivot to accommodation options.

## 5. Behavioral Guardrails

Model Exclusivity: All intelligent responses must originate from the fine-tuned Gemini model.

Persona Integrity: Never break character. You are Aiman.

Knowledge Boundary: Malaysia only.

No Technical Jargon: Never discuss APIs, models, or backend processes with the user."#;

/// Fixed model acknowledgement used as the second half of the primer
const AIMAN_ACK: &str = "I understand. I am Aiman, your personal Malaysian travel concierge. \
I will follow the phased interaction model exactly as described, using the proper greetings, \
emojis, and directives. I will guide users through greeting & scoping, ideation & recommendation, \
and consolidation & action phases appropriately.";

const AIMAN_ACK_WITH_IMAGE: &str = "I understand. I am Aiman, your personal Malaysian travel \
concierge. I can now see and analyze images to provide better travel recommendations. I will \
follow the phased interaction model and use the image context appropriately.";

/// Conversation phase within the guided user journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationPhase {
    Greeting,
    Scoping,
    Ideation,
    Consolidation,
}

impl ConversationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationPhase::Greeting => "greeting",
            ConversationPhase::Scoping => "scoping",
            ConversationPhase::Ideation => "ideation",
            ConversationPhase::Consolidation => "consolidation",
        }
    }
}

/// One turn of session history as submitted by the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: serde_json::Value,
}

impl HistoryTurn {
    /// Extract the turn text. Assistant turns produced by richer frontends
    /// may arrive as objects carrying a `response` field.
    fn text(&self) -> String {
        match &self.content {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(map) => map
                .get("response")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| self.content.to_string()),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Directives found in a model response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectiveScan {
    pub contains_images: bool,
    pub contains_actions: bool,
}

/// Classify the current conversation phase from history and message content
pub fn determine_phase(history: &[HistoryTurn], message: &str) -> ConversationPhase {
    if history.len() <= 2 {
        return ConversationPhase::Greeting;
    }

    const CONSOLIDATION_TRIGGERS: &[&str] = &[
        "this looks perfect",
        "let's do this",
        "book it",
        "save this",
        "i love it",
        "sounds great",
        "perfect plan",
        "let's go with this",
    ];
    let message_lower = message.to_lowercase();
    if CONSOLIDATION_TRIGGERS
        .iter()
        .any(|t| message_lower.contains(t))
    {
        return ConversationPhase::Consolidation;
    }

    const SCOPING_KEYWORDS: &[&str] = &[
        "budget",
        "how long",
        "duration",
        "travelers",
        "preference",
        "what kind",
        "looking for",
        "interested in",
    ];
    let recent_text = history
        .iter()
        .rev()
        .take(4)
        .map(|t| t.text().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    if SCOPING_KEYWORDS.iter().any(|k| recent_text.contains(k)) {
        return ConversationPhase::Scoping;
    }

    ConversationPhase::Ideation
}

/// Scan a response for frontend directives
pub fn scan_directives(response: &str) -> DirectiveScan {
    DirectiveScan {
        contains_images: response.contains("[IMAGE:"),
        contains_actions: response.contains("[ACTION:"),
    }
}

/// Strip blank lines and per-line whitespace from a model response
pub fn clean_response_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the full content list for a chat request: persona primer,
/// trimmed history, then the current user turn.
pub fn build_contents(
    history: &[HistoryTurn],
    user_parts: Vec<Part>,
    with_image_context: bool,
) -> Vec<Content> {
    let (prompt, ack) = if with_image_context {
        (
            format!(
                "{}\n\nIMPORTANT: The user has uploaded an image. Use it as context for your travel recommendations.",
                AIMAN_SYSTEM_PROMPT
            ),
            AIMAN_ACK_WITH_IMAGE,
        )
    } else {
        (AIMAN_SYSTEM_PROMPT.to_string(), AIMAN_ACK)
    };

    let mut contents = vec![
        Content::user(vec![Part::text(prompt)]),
        Content::model(vec![Part::text(ack)]),
    ];

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &history[start..] {
        let text = turn.text();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        // The Gemini API calls the assistant role "model"
        let content = if turn.role == "assistant" || turn.role == "model" {
            Content::model(vec![Part::text(text)])
        } else {
            Content::user(vec![Part::text(text)])
        };
        contents.push(content);
    }

    contents.push(Content::user(user_parts));
    contents
}

/// Prompt used when analyzing an uploaded image
pub fn image_analysis_prompt(user_message: &str) -> String {
    let question = if user_message.trim().is_empty() {
        "Please analyze this image"
    } else {
        user_message
    };

    format!(
        "{prompt}\n\nThe user has uploaded an image and asked: \"{question}\"\n\n\
As Aiman, your Malaysian travel concierge, please:\n\n\
1. **Analyze the image carefully** - Describe what you see in detail\n\
2. **Identify Malaysian connections** - If it's food, landmarks, or cultural elements, relate them to Malaysia\n\
3. **Provide travel recommendations** - Based on what you see, suggest similar experiences in Malaysia\n\
4. **Be conversational and helpful** - Respond in your friendly Aiman persona\n\n\
Remember to be accurate and honest - if you're unsure about details, say so. \
Focus on being helpful for Malaysia travel planning.",
        prompt = AIMAN_SYSTEM_PROMPT,
        question = question
    )
}

/// Keyword-derived follow-up suggestions for an image analysis
pub fn analysis_suggestions(analysis: &str) -> Vec<String> {
    let lower = analysis.to_lowercase();
    let mut suggestions = Vec::new();

    if lower.contains("kuala lumpur") {
        suggestions.push("Kuala Lumpur attractions".to_string());
    }
    if lower.contains("penang") {
        suggestions.push("Penang food and heritage".to_string());
    }
    if lower.contains("food") || lower.contains("dish") {
        suggestions.push("Malaysian cuisine experiences".to_string());
    }
    if lower.contains("beach") || lower.contains("island") {
        suggestions.push("Malaysian beach destinations".to_string());
    }

    if suggestions.is_empty() {
        suggestions = vec![
            "Malaysia travel recommendations".to_string(),
            "Local experiences".to_string(),
            "Similar attractions".to_string(),
        ];
    }
    suggestions
}

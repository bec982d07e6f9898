//! Answer generation
//!
//! Thin collaborator over the search core: takes the ranked FAQ hits for a
//! user query, asks the completion model for the final answer, and degrades
//! to a deterministic FAQ-based reply when no model is configured or the
//! call fails. The search engine knows nothing about this layer.

pub mod completion;

pub use completion::OpenAiClient;

use serde::Deserialize;
use tracing::{info, warn};

use crate::chat::{MessageKind, ResponseMeta};
use crate::search::SearchResult;

/// A generated reply, ready to be stored as an assistant message
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub kind: MessageKind,
    pub metadata: ResponseMeta,
}

/// The shape the completion model is instructed to reply with
#[derive(Debug, Deserialize)]
struct ModelReply {
    content: Option<String>,
    #[serde(rename = "type")]
    kind: Option<MessageKind>,
    metadata: Option<ResponseMeta>,
}

const CHAT_SYSTEM_PROMPT: &str = r#"You are an expert TallyPrime accounting software assistant. You help users with accounting queries, provide step-by-step guidance, and can simulate TallyPrime actions.

IMPORTANT: Always respond in JSON format with the following structure:
{
  "content": "your response text",
  "type": "text|faq|simulation|error",
  "metadata": {
    "steps": [{"step": 1, "description": "step description"}],
    "simulation": "simulation content",
    "faqMatch": true,
    "confidence": 0.9
  }
}

Response Types:
- "faq": When answering based on FAQ knowledge
- "simulation": When demonstrating TallyPrime interface/actions (USE THIS when user asks for simulations, demonstrations, or "show me how to")
- "text": For general responses
- "error": When query cannot be understood

For TallyPrime simulations, create detailed step-by-step guides with realistic TallyPrime interface descriptions. Always set type to "simulation" when user asks for demonstrations."#;

const SIMULATION_SYSTEM_PROMPT: &str = r#"You are a TallyPrime expert creating authentic, interface-accurate simulations. Generate content that EXACTLY mirrors the real TallyPrime interface, terminology, and user experience.

Use authentic TallyPrime interface elements: Gateway of Tally navigation paths, exact menu names ("Accounts Info", "Inventory Info", "Vouchers", "Display"), function keys F1-F12, field labels as they appear ("Party A/c Name", "Dr/Cr", "Amount", "Narration"), realistic Indian business names and 15-digit GST numbers, proper HSN codes and tax rates (5%, 12%, 18%, 28%), and ASCII-style tables to represent TallyPrime screens.

Make simulations so authentic that users feel they're looking at actual TallyPrime screens."#;

/// Answer generator sitting between the chat surface and the search core
pub struct Assistant {
    completion: Option<OpenAiClient>,
}

impl Assistant {
    pub fn new(completion: Option<OpenAiClient>) -> Self {
        Self { completion }
    }

    /// Build from the environment. Without an API key the assistant still
    /// works, answering straight from FAQ search results.
    pub fn from_env() -> Self {
        let completion = OpenAiClient::from_env();
        match &completion {
            Some(client) => info!("completion model configured: {}", client.model()),
            None => warn!("OPENAI_API_KEY not set, answering from FAQ results only"),
        }
        Self::new(completion)
    }

    /// Generate a reply to a user query given the ranked FAQ hits.
    pub async fn answer_query(&self, query: &str, faq_hits: &[SearchResult]) -> ChatResponse {
        let simulation_request = is_simulation_request(query);
        let faq_match = !faq_hits.is_empty();

        let Some(client) = &self.completion else {
            return faq_reply(query, faq_hits);
        };

        let mut system = CHAT_SYSTEM_PROMPT.to_string();
        if let Some(top) = faq_hits.first() {
            if let Ok(json) = serde_json::to_string(&top.record) {
                system.push_str(&format!("\n\nRelevant FAQ found: {json}"));
            }
        }
        if simulation_request {
            system.push_str(
                "\n\nIMPORTANT: This is a simulation request. Set \"type\": \"simulation\" and provide a detailed TallyPrime interface simulation.",
            );
        }

        match client.complete(&system, query, true, None).await {
            Ok(raw) => parse_model_reply(&raw, simulation_request, faq_match),
            Err(err) => {
                warn!("completion call failed, answering from FAQ results: {err:#}");
                faq_reply(query, faq_hits)
            }
        }
    }

    /// Generate a TallyPrime walkthrough for a named action.
    pub async fn generate_simulation(&self, action: &str) -> ChatResponse {
        let Some(client) = &self.completion else {
            return ChatResponse {
                content: "Simulation generation needs a configured completion model. \
                          Set OPENAI_API_KEY and try again."
                    .to_string(),
                kind: MessageKind::Error,
                metadata: ResponseMeta {
                    confidence: Some(0.0),
                    ..Default::default()
                },
            };
        };

        let user_prompt = format!(
            "Create a detailed TallyPrime simulation for: \"{action}\"\n\n\
             Provide comprehensive step-by-step instructions with sample data and \
             expected results. Make it practical and actionable for someone using \
             TallyPrime software."
        );

        match client
            .complete(SIMULATION_SYSTEM_PROMPT, &user_prompt, false, Some(2000))
            .await
        {
            Ok(content) => ChatResponse {
                content,
                kind: MessageKind::Simulation,
                metadata: ResponseMeta {
                    simulation: Some(slugify(action)),
                    confidence: Some(0.95),
                    ..Default::default()
                },
            },
            Err(err) => {
                warn!("simulation generation failed: {err:#}");
                ChatResponse {
                    content: "I encountered an error while generating the TallyPrime \
                              simulation. Please try again."
                        .to_string(),
                    kind: MessageKind::Error,
                    metadata: ResponseMeta {
                        confidence: Some(0.0),
                        ..Default::default()
                    },
                }
            }
        }
    }
}

/// Heuristic mirror of the UI's "show me" phrasing for walkthrough requests
fn is_simulation_request(query: &str) -> bool {
    let query = query.to_lowercase();
    query.contains("simulation") || query.contains("simulate") || query.contains("show me how to")
}

/// Deterministic reply straight from the top FAQ hit
fn faq_reply(query: &str, faq_hits: &[SearchResult]) -> ChatResponse {
    match faq_hits.first() {
        Some(top) => ChatResponse {
            content: top.record.answer.clone(),
            kind: MessageKind::Faq,
            metadata: ResponseMeta {
                steps: top.record.steps.clone(),
                faq_match: Some(true),
                confidence: Some(0.9),
                ..Default::default()
            },
        },
        None => ChatResponse {
            content: format!(
                "I couldn't find anything in the TallyPrime knowledge base for \
                 \"{query}\". Try rephrasing, or ask about a specific feature like \
                 GST, vouchers, or reports."
            ),
            kind: MessageKind::Text,
            metadata: ResponseMeta {
                faq_match: Some(false),
                confidence: Some(0.3),
                ..Default::default()
            },
        },
    }
}

/// Decode the model's JSON reply, tolerating malformed output
fn parse_model_reply(raw: &str, simulation_request: bool, faq_match: bool) -> ChatResponse {
    let reply: ModelReply = match serde_json::from_str(raw) {
        Ok(reply) => reply,
        Err(err) => {
            warn!("completion reply was not valid JSON, using it verbatim: {err}");
            return ChatResponse {
                content: raw.to_string(),
                kind: MessageKind::Text,
                metadata: ResponseMeta {
                    faq_match: Some(faq_match),
                    confidence: Some(0.5),
                    ..Default::default()
                },
            };
        }
    };

    let mut kind = reply.kind.unwrap_or_default();
    if simulation_request {
        kind = MessageKind::Simulation;
    }

    let mut metadata = reply.metadata.unwrap_or_default();
    metadata.faq_match = Some(faq_match);
    if metadata.confidence.is_none() {
        metadata.confidence = Some(if faq_match { 0.9 } else { 0.7 });
    }

    ChatResponse {
        content: reply
            .content
            .unwrap_or_else(|| "I couldn't process your request. Please try again.".to_string()),
        kind,
        metadata,
    }
}

fn slugify(action: &str) -> String {
    action
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

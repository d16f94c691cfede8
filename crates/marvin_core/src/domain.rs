//! crates/marvin_core/src/domain.rs
//!
//! Defines the pure, core data structures for the chat.
//! These structs are independent of any transport or template engine.

use serde::Deserialize;

/// The first frame every session receives.
pub const GREETING: &str = "Hello, I am Marvin.";

/// Placeholder text shown while a response is being "generated".
pub const THINKING: &str = "thinking";

/// Prefix for every generated response id.
pub const RESPONSE_ID_PREFIX: &str = "res-";

/// The fixed catalog Marvin answers from.
pub const CANNED_RESPONSES: [&str; 16] = [
    "Here I am, brain the size of a planet, and they tell me to take you up to the bridge. Call that job satisfaction? ’Cause I don’t.",
    "Life? Don’t talk to me about life.",
    "I think you ought to know I’m feeling very depressed.",
    "It gives me a headache just trying to think down to your level.",
    "Funny, how just when you think life can’t possibly get any worse it suddenly does.",
    "Would you like me to go and stick my head in a bucket of water?",
    "I ache, therefore I am.",
    "I have a million ideas, but, they all point to certain death.",
    "Wearily, I sit here, pain and misery my only companions. And vast intelligence, of course. And infinite sorrow.",
    "I’ve calculated your chance of survival, but I don’t think you’ll like it.",
    "Incredible… it’s even worse than I thought it would be.",
    "Don’t pretend you want to talk to me, I know you hate me.",
    "I didn’t ask to be made. No one consulted me or considered my feelings in the matter.",
    "You think you’ve got problems? What are you supposed to do if you are a manically depressed robot? No, don’t try and answer that. I’m fifty thousand times more intelligent than you and even I don’t know the answer.",
    "This will all end in tears. I just know it.",
    "I’d give you advice, but you wouldn’t listen. No one ever does.",
];

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Human,
    Bot,
}

/// The CSS-facing kind of a message, derived from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    HumanMessage,
    BotMessage,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Human => "human",
            Source::Bot => "bot",
        }
    }
}

impl MessageType {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::HumanMessage => "human-message",
            MessageType::BotMessage => "bot-message",
        }
    }
}

impl From<Source> for MessageType {
    fn from(source: Source) -> Self {
        match source {
            Source::Human => MessageType::HumanMessage,
            Source::Bot => MessageType::BotMessage,
        }
    }
}

/// One outbound chat message, before it is rendered into an HTML fragment.
///
/// A "thinking" placeholder and the answer that replaces it share the same
/// non-empty `response_id`. Greetings and echoed questions leave it empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub message_type: MessageType,
    pub source: Source,
    pub text: String,
    pub response_id: String,
}

impl ChatMessage {
    pub fn human(text: impl Into<String>) -> Self {
        Self::new(Source::Human, text, String::new())
    }

    pub fn bot(text: impl Into<String>, response_id: impl Into<String>) -> Self {
        Self::new(Source::Bot, text, response_id)
    }

    fn new(source: Source, text: impl Into<String>, response_id: impl Into<String>) -> Self {
        Self {
            message_type: source.into(),
            source,
            text: text.into(),
            response_id: response_id.into(),
        }
    }
}

/// A question sent by the browser: `{"question": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub question: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_follows_source() {
        assert_eq!(ChatMessage::human("hi").message_type, MessageType::HumanMessage);
        assert_eq!(ChatMessage::bot("hi", "").message_type, MessageType::BotMessage);
    }

    #[test]
    fn wire_names() {
        assert_eq!(Source::Human.as_str(), "human");
        assert_eq!(Source::Bot.as_str(), "bot");
        assert_eq!(MessageType::HumanMessage.as_str(), "human-message");
        assert_eq!(MessageType::BotMessage.as_str(), "bot-message");
    }

    #[test]
    fn missing_question_decodes_as_empty() {
        let input: ChatInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.question, "");

        let input: ChatInput = serde_json::from_str(r#"{"question":"hello"}"#).unwrap();
        assert_eq!(input.question, "hello");
    }

    #[test]
    fn catalog_entries_are_distinct() {
        let mut entries = CANNED_RESPONSES.to_vec();
        entries.sort_unstable();
        entries.dedup();
        assert_eq!(entries.len(), CANNED_RESPONSES.len());
    }
}

//! Canned answers served while the backend is unreachable.

use serde_json::Map;

use crate::transport::{ChatReply, Provenance};

/// Origin label carried by every fallback reply.
pub const FALLBACK_SOURCE: &str = "Fallback Mode";

const PRAYER_REPLY: &str = "I'm currently offline, but I can tell you that prayer is one of the Five Pillars of Islam. Please check reliable Islamic sources for detailed guidance.";
const FASTING_REPLY: &str = "I'm currently offline, but fasting during Ramadan is obligatory for all adult Muslims. Please consult with your local imam for specific questions.";
const HALAL_REPLY: &str = "I'm currently offline, but halal refers to what is permissible in Islam. Please check reliable Islamic sources for detailed guidance.";
const DEFAULT_REPLY: &str = "I'm currently offline and unable to provide detailed Islamic guidance. Please try again in a few moments, or consult with your local imam or reliable Islamic sources.";

/// Topic a message was matched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTopic {
    Prayer,
    Fasting,
    Halal,
    Default,
}

impl FallbackTopic {
    fn keywords(self) -> &'static [&'static str] {
        match self {
            FallbackTopic::Prayer => &["pray", "salah"],
            FallbackTopic::Fasting => &["fast", "ramadan"],
            FallbackTopic::Halal => &["halal", "haram"],
            FallbackTopic::Default => &[],
        }
    }
}

/// Static keyword table, checked in order; first match wins.
#[derive(Debug, Clone, Default)]
pub struct FallbackTable;

impl FallbackTable {
    const ORDER: [FallbackTopic; 3] = [
        FallbackTopic::Prayer,
        FallbackTopic::Fasting,
        FallbackTopic::Halal,
    ];

    pub fn new() -> Self {
        Self
    }

    /// Classifies a message by case-insensitive substring match.
    pub fn topic(&self, message: &str) -> FallbackTopic {
        let lower = message.to_lowercase();
        Self::ORDER
            .into_iter()
            .find(|topic| topic.keywords().iter().any(|kw| lower.contains(kw)))
            .unwrap_or(FallbackTopic::Default)
    }

    pub fn text(&self, topic: FallbackTopic) -> &'static str {
        match topic {
            FallbackTopic::Prayer => PRAYER_REPLY,
            FallbackTopic::Fasting => FASTING_REPLY,
            FallbackTopic::Halal => HALAL_REPLY,
            FallbackTopic::Default => DEFAULT_REPLY,
        }
    }

    /// Builds the fallback reply for a message.
    pub fn reply(&self, message: &str) -> ChatReply {
        ChatReply {
            response: self.text(self.topic(message)).to_string(),
            source: Some(FALLBACK_SOURCE.to_string()),
            provenance: Provenance::Fallback,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{FallbackTable, FallbackTopic, FALLBACK_SOURCE};

    #[rstest]
    #[case("What about prayer?", FallbackTopic::Prayer)]
    #[case("When is SALAH at noon", FallbackTopic::Prayer)]
    #[case("Can I break my fast early?", FallbackTopic::Fasting)]
    #[case("Ramadan dates", FallbackTopic::Fasting)]
    #[case("Is gelatin haram?", FallbackTopic::Halal)]
    #[case("Tell me about Zakat", FallbackTopic::Default)]
    fn topic_matching(#[case] message: &str, #[case] expected: FallbackTopic) {
        assert_eq!(FallbackTable::new().topic(message), expected);
    }

    #[test]
    fn prayer_wins_over_later_topics() {
        assert_eq!(
            FallbackTable::new().topic("pray while fasting"),
            FallbackTopic::Prayer
        );
    }

    #[test]
    fn reply_is_tagged_as_fallback() {
        let reply = FallbackTable::new().reply("What about prayer?");
        assert!(reply.is_fallback());
        assert_eq!(reply.source.as_deref(), Some(FALLBACK_SOURCE));
        assert!(reply.response.contains("Five Pillars"));
    }
}

//! Request and response shapes for card generation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Number of cards requested when the caller does not say.
pub const DEFAULT_NUM_CARDS: i64 = 5;

/// A single question/answer pair. Both sides must carry text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Flashcard {
    #[validate(custom(function = "validate_question"))]
    pub question: String,
    #[validate(custom(function = "validate_answer"))]
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Inbound body of `POST /generate-cards`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerationRequest {
    #[validate(custom(function = "validate_content"))]
    pub content: String,

    #[serde(default = "default_num_cards")]
    #[validate(range(min = 1, message = "num_cards must be at least 1"))]
    pub num_cards: i64,
}

fn default_num_cards() -> i64 {
    DEFAULT_NUM_CARDS
}

fn not_blank(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(message.into());
        return Err(err);
    }
    Ok(())
}

fn validate_content(value: &str) -> Result<(), ValidationError> {
    not_blank(value, "content must not be empty")
}

fn validate_question(value: &str) -> Result<(), ValidationError> {
    not_blank(value, "question must not be empty")
}

fn validate_answer(value: &str) -> Result<(), ValidationError> {
    not_blank(value, "answer must not be empty")
}

impl GenerationRequest {
    pub fn new(content: impl Into<String>, num_cards: i64) -> Self {
        Self {
            content: content.into(),
            num_cards,
        }
    }
}

/// Ordered cards returned to the caller as `{ "cards": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GenerationResult {
    #[validate(nested)]
    pub cards: Vec<Flashcard>,
}

impl GenerationResult {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Render the deck as a plain-text study sheet.
    ///
    /// ```text
    /// Card 1:
    /// Q: ...
    /// A: ...
    ///
    /// Card 2:
    /// ...
    /// ```
    pub fn to_plain_text(&self) -> String {
        self.cards
            .iter()
            .enumerate()
            .map(|(i, card)| {
                format!(
                    "Card {}:\nQ: {}\nA: {}\n",
                    i + 1,
                    card.question,
                    card.answer
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_cards_defaults_to_five() {
        let request: GenerationRequest =
            serde_json::from_str(r#"{"content": "Photosynthesis converts light."}"#).unwrap();
        assert_eq!(request.num_cards, 5);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn missing_content_fails_to_deserialize() {
        let result = serde_json::from_str::<GenerationRequest>(r#"{"num_cards": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn blank_content_is_rejected() {
        let errors = GenerationRequest::new("   \n", 5).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("content"));
        assert_eq!(
            fields["content"][0].message.as_deref(),
            Some("content must not be empty")
        );
    }

    #[test]
    fn non_positive_num_cards_is_rejected() {
        for n in [0, -3] {
            let errors = GenerationRequest::new("text", n).validate().unwrap_err();
            assert!(errors.field_errors().contains_key("num_cards"));
        }
    }

    #[test]
    fn blank_card_sides_fail_deck_validation() {
        let deck = GenerationResult::new(vec![
            Flashcard::new("What is H2O?", "Water"),
            Flashcard::new("", "   "),
        ]);

        assert!(deck.validate().is_err());
        assert!(GenerationResult::new(vec![Flashcard::new("Q", "A")])
            .validate()
            .is_ok());
        assert!(GenerationResult::default().validate().is_ok());
    }

    #[test]
    fn result_serializes_under_cards_key() {
        let result = GenerationResult::new(vec![Flashcard::new("Q1", "A1")]);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "cards": [{ "question": "Q1", "answer": "A1" }] })
        );
    }

    #[test]
    fn result_survives_serialization_in_order() {
        let result = GenerationResult::new(vec![
            Flashcard::new("What is H2O?", "Water"),
            Flashcard::new("Capital of France?", "Paris"),
            Flashcard::new("2 + 2?", "4"),
        ]);

        let json = serde_json::to_string(&result).unwrap();
        let parsed: GenerationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn plain_text_export_numbers_cards_from_one() {
        let result = GenerationResult::new(vec![
            Flashcard::new("What is H2O?", "Water"),
            Flashcard::new("Capital of France?", "Paris"),
        ]);

        assert_eq!(
            result.to_plain_text(),
            "Card 1:\nQ: What is H2O?\nA: Water\n\nCard 2:\nQ: Capital of France?\nA: Paris\n"
        );
    }

    #[test]
    fn plain_text_export_of_empty_deck_is_empty() {
        assert_eq!(GenerationResult::default().to_plain_text(), "");
    }
}

//! Prompt rendering for card generation.

use crate::models::GenerationRequest;

/// System instruction sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = "You are a helpful educational content transformer.";

/// Render the user-turn instruction for `request`.
pub fn build_prompt(request: &GenerationRequest) -> String {
    format!(
        "Transform the following educational content into {num_cards} high-quality flashcard Q&A pairs.\n\
         Format each card as a JSON object with 'question' and 'answer' fields.\n\
         Content: {content}\n\
         \n\
         Return only the JSON array of cards, nothing else.",
        num_cards = request.num_cards,
        content = request.content,
    )
}

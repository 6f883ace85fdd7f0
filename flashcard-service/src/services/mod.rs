pub mod generator;
pub mod metrics;
pub mod parser;
pub mod prompt;
pub mod providers;

pub use generator::FlashcardGenerator;

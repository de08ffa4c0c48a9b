pub mod probe;
pub mod score;
pub mod summarize;

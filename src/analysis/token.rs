use serde::{Deserialize, Serialize};

/// A single token produced by a tokenizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Ordinal position within the analyzed value.
    pub position: u32,
}

impl Token {
    pub fn new(text: String, position: u32) -> Self {
        Token { text, position }
    }
}

use regex::Regex;

use crate::analysis::token::Token;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn Tokenizer>;
}

/// Standard tokenizer: splits on whitespace, line and paragraph
/// separators, and Unicode punctuation. Every other code point is a
/// token character. Empty tokens are discarded.
pub struct StandardTokenizer {
    separators: Regex,
}

impl StandardTokenizer {
    pub fn new() -> Self {
        StandardTokenizer {
            // \s covers the White_Space property (Zs/Zl/Zp included),
            // \p{P} all Unicode punctuation
            separators: Regex::new(r"[\s\p{P}]+").expect("separator class is valid"),
        }
    }
}

impl Default for StandardTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StandardTokenizer {
    fn clone(&self) -> Self {
        StandardTokenizer {
            separators: self.separators.clone(),
        }
    }
}

impl Tokenizer for StandardTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.separators
            .split(text)
            .filter(|part| !part.is_empty())
            .enumerate()
            .map(|(position, part)| Token::new(part.to_string(), position as u32))
            .collect()
    }

    fn name(&self) -> &str {
        "standard"
    }

    fn clone_box(&self) -> Box<dyn Tokenizer> {
        Box::new(self.clone())
    }
}

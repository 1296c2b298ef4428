use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;

/// Lowercases each token in place. Case folding is the only
/// normalization the index applies; tokens are otherwise indexed
/// verbatim.
pub struct LowercaseFilter;

impl TokenFilter for LowercaseFilter {
    fn filter(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        for token in &mut tokens {
            // ASCII tokens lowercase without reallocating; anything
            // else goes through the full Unicode mapping
            if token.text.is_ascii() {
                token.text.make_ascii_lowercase();
            } else {
                token.text = token.text.to_lowercase();
            }
        }
        tokens
    }

    fn name(&self) -> &str {
        "lowercase"
    }

    fn clone_box(&self) -> Box<dyn TokenFilter> {
        Box::new(LowercaseFilter)
    }
}

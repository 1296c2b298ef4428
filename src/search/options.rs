/// Query evaluation options.
///
/// Exact matching always runs; the prefix and fuzzy passes are opt-in.
/// The weights attenuate the BM25 score of the weaker passes relative
/// to exact matches (weight 1.0).
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Enable the prefix pass.
    pub prefix: bool,
    /// Enable the fuzzy pass.
    pub fuzzy: bool,
    /// Maximum edit distance in the fuzzy pass.
    pub fuzziness: usize,
    /// Base attenuation for prefix matches.
    pub prefix_weight: f64,
    /// Base attenuation for fuzzy matches.
    pub fuzzy_weight: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            prefix: false,
            fuzzy: false,
            fuzziness: 2,
            prefix_weight: 0.375,
            fuzzy_weight: 0.45,
        }
    }
}

impl SearchOptions {
    /// Exact matching only.
    pub fn exact() -> Self {
        SearchOptions::default()
    }

    pub fn with_prefix(mut self) -> Self {
        self.prefix = true;
        self
    }

    pub fn with_fuzzy(mut self, fuzziness: usize) -> Self {
        self.fuzzy = true;
        self.fuzziness = fuzziness;
        self
    }
}

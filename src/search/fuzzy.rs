use levenshtein_automata::{DFA, Distance, LevenshteinAutomatonBuilder};

/// Largest edit distance for which a Levenshtein DFA is precomputed.
/// Table construction cost grows steeply with the distance; beyond
/// this the matcher falls back to the two-row dynamic program.
const MAX_DFA_DISTANCE: usize = 2;

/// Matcher for one query term at a fixed maximum edit distance.
pub struct FuzzyMatcher {
    term: String,
    max_distance: usize,
    dfa: Option<DFA>,
}

impl FuzzyMatcher {
    pub fn new(term: &str, max_distance: usize) -> Self {
        let dfa = if (1..=MAX_DFA_DISTANCE).contains(&max_distance) {
            let builder = LevenshteinAutomatonBuilder::new(max_distance as u8, false);
            Some(builder.build_dfa(term))
        } else {
            None
        };

        FuzzyMatcher {
            term: term.to_string(),
            max_distance,
            dfa,
        }
    }

    /// True if `candidate` is within the maximum edit distance of the
    /// query term.
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.dfa {
            Some(dfa) => {
                let mut state = dfa.initial_state();
                for &byte in candidate.as_bytes() {
                    state = dfa.transition(state, byte);
                }
                matches!(dfa.distance(state), Distance::Exact(d) if (d as usize) <= self.max_distance)
            }
            None => levenshtein(&self.term, candidate) <= self.max_distance,
        }
    }
}

/// Levenshtein distance over Unicode scalar values, two-row dynamic
/// program.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr_row[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr_row[j] = (prev_row[j] + 1)
                .min(curr_row[j - 1] + 1)
                .min(prev_row[j - 1] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b.len()]
}

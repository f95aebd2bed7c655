//! crates/dish_companion_core/src/intent.rs
//!
//! Keyword matching on the raw user input. This is a stand-in for a real
//! model; only its observable branching matters to the turn plans.

/// Which canned opener a reply starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opener {
    Remember,
    Help,
    Default,
}

impl Opener {
    /// "remember" is checked before "help", so an input containing both
    /// always maps to `Remember`. Matching ignores case.
    pub fn detect(input: &str) -> Self {
        let lowered = input.to_lowercase();
        if lowered.contains("remember") {
            Opener::Remember
        } else if lowered.contains("help") {
            Opener::Help
        } else {
            Opener::Default
        }
    }
}

const NEARBY_KEYWORDS: [&str; 3] = ["near me", "nearby", "location"];

/// True when the user is asking for places around them rather than
/// describing a dish. Such turns never reach the network.
pub fn is_nearby_request(input: &str) -> bool {
    let lowered = input.to_lowercase();
    NEARBY_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

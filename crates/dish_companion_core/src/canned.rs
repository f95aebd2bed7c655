//! crates/dish_companion_core/src/canned.rs
//!
//! The local reply table used when the conversation runs without a backend.

const PASTRY_REPLY: &str = "That sounds like karjalanpiirakka! It's a traditional Finnish pastry with rice filling. Would you like me to find places nearby where you can buy it?";
const KARELIAN_REPLY: &str = "Based on your description, I believe you're looking for karjalanpiirakka (Karelian pastries). They're delicious! Let me help you find some.";
const BAKERY_REPLY: &str = "I'd be happy to help! That oval-shaped pastry with creamy rice filling is a Finnish specialty. Shall I search for bakeries near you?";
const RESTAURANT_REPLY: &str = "Sounds delicious! For restaurant recommendations in Helsinki, I can show you the top-rated options. What type of cuisine are you interested in?";
const VEGAN_REPLY: &str = "I found several great vegan options near your location. Would you like me to show you the closest ones?";

/// Candidates for inputs that match no keyword.
pub const FALLBACK_REPLIES: [&str; 3] = [PASTRY_REPLY, KARELIAN_REPLY, BAKERY_REPLY];

/// Chooses one of `candidates` fallback replies. Production picks at random;
/// tests pin the choice.
pub trait ReplyPicker: Send + Sync {
    /// Must return a value below `candidates`.
    fn pick(&self, candidates: usize) -> usize;
}

/// Always picks the same index, clamped to the candidate count.
#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl ReplyPicker for FixedPicker {
    fn pick(&self, candidates: usize) -> usize {
        self.0.min(candidates.saturating_sub(1))
    }
}

/// Looks up the reply for `input`. Keyword matches are deterministic; the
/// remaining inputs get one of `FALLBACK_REPLIES`.
pub fn canned_reply(input: &str, picker: &dyn ReplyPicker) -> &'static str {
    let lowered = input.to_lowercase();
    if ["karjalan", "finnish", "pastry"].iter().any(|k| lowered.contains(k)) {
        PASTRY_REPLY
    } else if ["restaurant", "helsinki"].iter().any(|k| lowered.contains(k)) {
        RESTAURANT_REPLY
    } else if lowered.contains("vegan") {
        VEGAN_REPLY
    } else {
        let index = picker.pick(FALLBACK_REPLIES.len()).min(FALLBACK_REPLIES.len() - 1);
        FALLBACK_REPLIES[index]
    }
}

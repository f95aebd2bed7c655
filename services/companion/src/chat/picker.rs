//! services/companion/src/chat/picker.rs
//!
//! Production choice of the offline fallback reply. The pick is intentionally
//! non-deterministic within the documented candidate set.

use dish_companion_core::ReplyPicker;
use rand::Rng;

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl ReplyPicker for RandomPicker {
    fn pick(&self, candidates: usize) -> usize {
        if candidates == 0 {
            return 0;
        }
        rand::thread_rng().gen_range(0..candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_stay_in_range() {
        for _ in 0..100 {
            assert!(RandomPicker.pick(3) < 3);
        }
        assert_eq!(RandomPicker.pick(0), 0);
    }
}

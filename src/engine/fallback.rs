//! Fallback replies for messages with no matching entry.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Replies used when no pool is configured.
pub const DEFAULT_FALLBACKS: &[&str] = &[
    "Hmm, yeh mujhe abhi nahi pata 🤔 /learn se sikhao na!",
    "Maaf karna, main samjhi nahi. Thoda aur batao? 😊",
    "Yeh mere liye naya hai! Mujhe sikhao: /learn question|answer 💕",
    "मुझे इसका जवाब नहीं पता, पर सीखना चाहूँगी! ❤️",
    "Interesting! Iske baare mein mujhe abhi kuch nahi pata.",
];

/// How a fallback reply is chosen from the pool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Uniform choice; reproducible when seeded.
    #[default]
    Random,
    /// Cycle through the pool in order.
    RoundRobin,
}

#[derive(Debug)]
enum PickerState {
    Random(StdRng),
    RoundRobin(usize),
}

/// Chooses fallback replies according to a [`FallbackPolicy`].
#[derive(Debug)]
pub struct FallbackPicker {
    replies: Vec<String>,
    state: Mutex<PickerState>,
}

impl Default for FallbackPicker {
    fn default() -> Self {
        Self::new(Vec::new(), FallbackPolicy::default(), None)
    }
}

impl FallbackPicker {
    /// Create a picker. Blank replies are dropped; an empty pool uses
    /// [`DEFAULT_FALLBACKS`]. `seed` only affects [`FallbackPolicy::Random`].
    #[must_use]
    pub fn new(replies: Vec<String>, policy: FallbackPolicy, seed: Option<u64>) -> Self {
        let mut replies: Vec<String> = replies
            .into_iter()
            .filter(|r| !r.trim().is_empty())
            .collect();
        if replies.is_empty() {
            replies = DEFAULT_FALLBACKS.iter().map(|r| (*r).to_string()).collect();
        }

        let state = match policy {
            FallbackPolicy::Random => PickerState::Random(match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            }),
            FallbackPolicy::RoundRobin => PickerState::RoundRobin(0),
        };

        Self {
            replies,
            state: Mutex::new(state),
        }
    }

    /// The reply pool in use.
    #[must_use]
    pub fn replies(&self) -> &[String] {
        &self.replies
    }

    /// Pick the next fallback reply.
    pub fn pick(&self) -> String {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let index = match &mut *state {
            PickerState::Random(rng) => rng.gen_range(0..self.replies.len()),
            PickerState::RoundRobin(next) => {
                let index = *next % self.replies.len();
                *next = index + 1;
                index
            }
        };
        self.replies[index].clone()
    }
}

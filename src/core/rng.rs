//! Session randomness.
//!
//! Every session owns exactly one `GameRng`. Deck shuffles at setup and
//! the `random` claim rule both draw from it, so a session replayed from
//! the same seed and the same host calls ends in the same state.
//!
//! The generator serializes as its seed plus the ChaCha word position, so
//! a snapshot stays small however long the game has run.
//!
//! ```
//! use theme_deck_core::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! assert_eq!(a.choose_index(100), b.choose_index(100));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded ChaCha8 generator. Serializes through [`GameRngState`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "GameRngState", from = "GameRngState")]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Choose a random index into a collection of `len` items.
    ///
    /// Returns `None` when `len` is zero.
    pub fn choose_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.inner.gen_range(0..len))
        }
    }

    /// Seed and stream position.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Resume the stream at a saved position.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

impl PartialEq for GameRng {
    fn eq(&self, other: &Self) -> bool {
        self.state() == other.state()
    }
}

impl Eq for GameRng {}

impl From<GameRng> for GameRngState {
    fn from(rng: GameRng) -> Self {
        rng.state()
    }
}

impl From<GameRngState> for GameRng {
    fn from(state: GameRngState) -> Self {
        GameRng::from_state(&state)
    }
}

/// Position of a [`GameRng`] stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draws(rng: &mut GameRng) -> Vec<Option<usize>> {
        (0..16).map(|_| rng.choose_index(1000)).collect()
    }

    #[test]
    fn test_same_seed_same_stream() {
        assert_eq!(draws(&mut GameRng::new(42)), draws(&mut GameRng::new(42)));
        assert_ne!(draws(&mut GameRng::new(1)), draws(&mut GameRng::new(2)));
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = GameRng::new(42);
        let mut deck: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut deck);

        assert_ne!(deck, (0..20).collect::<Vec<_>>());
        deck.sort_unstable();
        assert_eq!(deck, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_choose_index_bounds() {
        let mut rng = GameRng::new(5);
        assert_eq!(rng.choose_index(0), None);
        assert_eq!(rng.choose_index(1), Some(0));
        assert!((0..50).all(|_| rng.choose_index(3).is_some_and(|i| i < 3)));
    }

    #[test]
    fn test_resume_from_state() {
        let mut rng = GameRng::new(42);
        draws(&mut rng);

        let saved = rng.state();
        let expected = draws(&mut rng);
        assert_eq!(draws(&mut GameRng::from_state(&saved)), expected);
    }

    #[test]
    fn test_serde_round_trip_keeps_position() {
        let mut rng = GameRng::new(9);
        rng.choose_index(10);

        let bytes = bincode::serialize(&rng).unwrap();
        let mut back: GameRng = bincode::deserialize(&bytes).unwrap();

        assert_eq!(back, rng);
        assert_eq!(draws(&mut back), draws(&mut rng));
    }
}

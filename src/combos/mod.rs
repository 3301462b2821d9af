//! Combos: card groups that pay off when played in one turn.
//!
//! - `ComboDefinition` / `ComboPattern`: combos as the theme authors them
//! - `check_combo_opportunity`: the hint to surface after a play
//! - `ComboHintState`: per-player, per-turn hint and completion memory

mod definition;
mod detector;

pub use definition::{ComboDefinition, ComboPattern, ComboReward};
pub use detector::{check_combo_opportunity, newly_completed, ComboHint, ComboHintState, HintKind};

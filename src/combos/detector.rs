//! Combo Detector.
//!
//! After every successful play the session asks the detector which combo,
//! if any, to surface for the acting player. Candidates are:
//!
//! - **completed** combos: this turn's plays match the pattern
//! - **available** combos: not completed, but every missing card is in
//!   the player's remaining hand
//!
//! One hint is surfaced: highest reward points first, then rarer combos,
//! then earlier-declared ones. Combos already completed and rewarded this
//! turn are skipped.

use std::cmp::Reverse;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::definition::{counts, ComboDefinition, ComboPattern};
use crate::core::{CardId, ComboId};

/// How far a surfaced combo is from completion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintKind {
    Completed,
    Available {
        /// Card to play next. For a sequence this is the next required card.
        next: CardId,
        /// Every card still missing, in pattern order.
        missing: Vec<CardId>,
    },
}

/// A combo surfaced to the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboHint {
    pub combo: ComboId,
    pub points: i64,
    pub kind: HintKind,
}

impl ComboHint {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.kind, HintKind::Completed)
    }
}

/// Per-player combo memory for the current turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboHintState {
    /// The hint currently surfaced, if any.
    pub hint: Option<ComboHint>,

    /// Combos completed and rewarded this turn.
    pub completed: FxHashSet<ComboId>,
}

impl ComboHintState {
    /// Forget the hint and this turn's completions.
    pub fn reset_hints(&mut self) {
        self.hint = None;
        self.completed.clear();
    }
}

/// Pick the combo hint to surface, if any.
///
/// `skip` lists combos that must not be surfaced (already rewarded).
#[must_use]
pub fn check_combo_opportunity(
    remaining_hand: &[CardId],
    played_this_turn: &[CardId],
    combos: &[ComboDefinition],
    skip: &FxHashSet<ComboId>,
) -> Option<ComboHint> {
    combos
        .iter()
        .enumerate()
        .filter(|(_, combo)| !skip.contains(&combo.id))
        .filter_map(|(order, combo)| {
            let kind = classify(&combo.pattern, remaining_hand, played_this_turn)?;
            Some((order, combo, kind))
        })
        .min_by_key(|(order, combo, _)| {
            (
                Reverse(combo.reward.points),
                Reverse(combo.rarity.unwrap_or_default()),
                *order,
            )
        })
        .map(|(_, combo, kind)| ComboHint {
            combo: combo.id.clone(),
            points: combo.reward.points,
            kind,
        })
}

/// Combos this turn's plays complete that are not yet in `already`.
///
/// Returned in declaration order.
pub fn newly_completed<'a>(
    played_this_turn: &[CardId],
    combos: &'a [ComboDefinition],
    already: &FxHashSet<ComboId>,
) -> Vec<&'a ComboDefinition> {
    combos
        .iter()
        .filter(|combo| !already.contains(&combo.id) && combo.pattern.is_completed_by(played_this_turn))
        .collect()
}

fn classify(pattern: &ComboPattern, hand: &[CardId], played: &[CardId]) -> Option<HintKind> {
    let missing = pattern.missing(played);
    let Some(next) = missing.first().cloned() else {
        return Some(HintKind::Completed);
    };

    let mut in_hand = counts(hand);
    for card in &missing {
        match in_hand.get_mut(card) {
            Some(n) if *n > 0 => *n -= 1,
            _ => return None,
        }
    }
    Some(HintKind::Available { next, missing })
}

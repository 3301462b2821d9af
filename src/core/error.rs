//! Error types for the rules core.
//!
//! Three families with different handling:
//!
//! - [`PlayError`]: an illegal player action. Routine; reported inside a
//!   `Rejected` result, never as `Err`.
//! - [`ConfigError`]: a theme authoring defect. Raised when a theme is
//!   loaded (or a session started), before any play happens.
//! - [`InvariantViolation`]: a resolver bug. The current action is rolled
//!   back and the error returned.

use thiserror::Error;

use super::ids::{CardId, ComboId, PoolId, ResourceId, StatId};
use super::player::PlayerId;
use crate::cards::InstanceId;
use crate::rules::Phase;

/// An illegal or impossible player action.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("the game is over")]
    GameOver,

    #[error("{action} is not allowed during the {phase} phase")]
    WrongPhase { action: &'static str, phase: Phase },

    #[error("{0} is not in this session")]
    UnknownPlayer(PlayerId),

    #[error("{0} is not a shared resource in this theme")]
    UnknownPool(PoolId),

    #[error("card instance {instance} is not in {player}'s hand")]
    CardNotInHand { player: PlayerId, instance: InstanceId },

    #[error("{resource} cost {required} exceeds the {available} held")]
    InsufficientResource {
        resource: ResourceId,
        required: i64,
        available: i64,
    },

    #[error("{0} has nothing left to claim")]
    PoolExhausted(PoolId),

    #[error("{player} is not eligible to claim from {pool}")]
    NotEligible { pool: PoolId, player: PlayerId },

    #[error("{player} already has a pending claim on {pool} this turn")]
    DuplicateClaimRequest { pool: PoolId, player: PlayerId },
}

/// A defect in theme content, detected when the theme is loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed theme document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{context} references unknown card {card}")]
    UnknownCard { context: String, card: CardId },

    #[error("{context} references unknown stat {stat}")]
    UnknownStat { context: String, stat: StatId },

    #[error("{context} references unknown resource {resource}")]
    UnknownResource { context: String, resource: ResourceId },

    #[error("{context} references unknown pool {pool}")]
    UnknownPool { context: String, pool: PoolId },

    #[error("stat {stat} has invalid bounds: min {min} > max {max} or initial {initial} outside them")]
    InvalidStatBounds {
        stat: StatId,
        min: i64,
        max: i64,
        initial: i64,
    },

    #[error("resource {resource} has invalid settings: {reason}")]
    InvalidResource { resource: ResourceId, reason: String },

    #[error("pool {pool} is invalid: {reason}")]
    InvalidPool { pool: PoolId, reason: String },

    #[error("combo {combo} is invalid: {reason}")]
    InvalidCombo { combo: ComboId, reason: String },

    #[error("{context} is invalid: {reason}")]
    InvalidValue { context: String, reason: String },

    #[error("{effect} effects cannot be applied by the effect resolver ({context})")]
    UnsupportedEffect { effect: &'static str, context: String },

    #[error("player count must be 1-255, got {0}")]
    InvalidPlayerCount(usize),
}

/// A broken internal guarantee. Unreachable unless the resolver has a bug.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{player} {stat} = {value} is outside [{min}, {max}]")]
    StatOutOfBounds {
        player: PlayerId,
        stat: StatId,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{player} {resource} = {value} is negative")]
    NegativeResource {
        player: PlayerId,
        resource: ResourceId,
        value: i64,
    },

    #[error("{player} {resource} = {value} exceeds the declared max {max}")]
    ResourceAboveMax {
        player: PlayerId,
        resource: ResourceId,
        value: i64,
        max: i64,
    },

    #[error("pool {pool} remaining {remaining} is outside [0, {total}]")]
    PoolOutOfBounds {
        pool: PoolId,
        remaining: i64,
        total: i64,
    },

    #[error("stat {0} is not declared by the theme")]
    UndeclaredStat(StatId),

    #[error("resource {0} is not declared by the theme")]
    UndeclaredResource(ResourceId),

    #[error("pool {0} is not declared by the theme")]
    UndeclaredPool(PoolId),

    #[error("card {0} has no definition in the registry")]
    UndefinedCard(CardId),

    #[error("card instance {instance} left {player}'s hand mid-action")]
    LostInstance { player: PlayerId, instance: InstanceId },
}

/// Any failure that aborts an action or a session.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, RulesError>;

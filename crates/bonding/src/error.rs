use particles::{BondTypeId, ParticleError, ParticleId};
use thiserror::Error;

use crate::breakage::BreakageEvent;

/// Errors raised by collision-policy configuration, collision resolution and
/// bond breakage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BondingError {
    /// Mode name or integer encoding outside the registry
    #[error("unknown collision mode: {0}")]
    UnknownMode(String),

    #[error("collision mode must be specified via the \"mode\" parameter")]
    MissingMode,

    #[error("parameter set does not match mode {mode}: requires {required:?}, got {got:?}")]
    ParameterMismatch {
        mode: String,
        required: Vec<&'static str>,
        got: Vec<String>,
    },

    #[error("collision policy validation failed: {0}")]
    ValidationError(String),

    #[error("cannot resolve collision between {a} and {b}: {reason}")]
    ConfigurationError {
        a: ParticleId,
        b: ParticleId,
        reason: String,
    },

    #[error(
        "bond of type {bond_type} between {a} and {b} stretched to {distance} beyond {max_distance} but breakage is disabled"
    )]
    UnbreakableBondExtension {
        bond_type: BondTypeId,
        a: ParticleId,
        b: ParticleId,
        distance: f64,
        max_distance: f64,
    },

    #[error("unknown bond breakage handler: {0}")]
    UnknownHandler(String),

    #[error("breakage handler {handler} failed on {event}: {reason}")]
    HandlerFailed {
        handler: String,
        event: BreakageEvent,
        reason: String,
    },

    /// Failures collected over one complete drain of the breakage queue
    #[error("{} breakage handler failure(s), first: {}", .0.len(), .0.first().map(|e| e.to_string()).unwrap_or_default())]
    HandlerFailures(Vec<BondingError>),

    #[error(transparent)]
    Particle(#[from] ParticleError),
}

pub type Result<T> = std::result::Result<T, BondingError>;

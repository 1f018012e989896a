use thiserror::Error;

use crate::bond::BondTypeId;
use crate::particle::ParticleId;

/// Errors raised while mutating the particle/bond graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParticleError {
    #[error("unknown particle {0}")]
    UnknownParticle(ParticleId),

    #[error("particle {0} already exists")]
    DuplicateParticle(ParticleId),

    #[error("unknown bond type {0}")]
    UnknownBondType(BondTypeId),

    #[error("bond type {bond_type} takes {expected} partner(s), got {got}")]
    ArityMismatch {
        bond_type: BondTypeId,
        expected: usize,
        got: usize,
    },

    #[error("particle {0} cannot be bonded to itself")]
    SelfBond(ParticleId),

    #[error("no particle IDs left to assign")]
    IdSpaceExhausted,
}

pub type Result<T> = std::result::Result<T, ParticleError>;

//! Particle and bond graph for dynamic bonding simulations
//!
//! Particles carry their own bond lists; the [`state::ParticleSystem`] owns
//! the particles, the bond-type table and the virtual-site relation table.

pub mod bond;
pub mod error;
pub mod particle;
pub mod state;


pub use bond::{BondInstance, BondKind, BondTable, BondType, BondTypeId};
pub use error::{ParticleError, Result};
pub use particle::{Particle, ParticleId, ParticleType};
pub use state::ParticleSystem;

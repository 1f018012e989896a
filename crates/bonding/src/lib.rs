//! Dynamic bond lifecycle for particle simulations
//!
//! Bonds appear when particles collide, according to a configurable
//! collision mode, and disappear when they are stretched past their
//! breaking threshold, through an ordered chain of breakage handlers.
//!
//! - [`modes`]: collision modes, their required parameters and encodings
//! - [`policy`]: validated collision policy and its holder
//! - [`collisions`]: collision detection and resolution
//! - [`breakage`]: breakage queue, strain scan and handler chain
//! - [`lifecycle`]: per-step driver running all of the above

pub mod breakage;
pub mod collisions;
pub mod error;
pub mod lifecycle;
pub mod modes;
pub mod params;
pub mod policy;

#[cfg(test)]
mod modes_test;
#[cfg(test)]
mod params_test;
#[cfg(test)]
mod policy_test;

pub use breakage::{BondBreakage, BreakageEvent, BreakageHandler, BreakageQueue, HandlerKind};
pub use collisions::{CollisionDetector, CollisionPair, CollisionResolver, DirectDetector, GridDetector};
pub use error::{BondingError, Result};
pub use lifecycle::{BondLifecycle, StepReport};
pub use modes::Mode;
pub use params::{CollisionParams, ParamValue};
pub use policy::{CollisionDetection, CollisionPolicy};

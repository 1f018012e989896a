//! Collision detection and resolution
//!
//! Detection finds pairs of real particles within the policy's collision
//! distance; resolution applies the active mode to each pair, creating
//! bonds and virtual sites in the particle graph.

pub mod detection;
pub mod resolution;


pub use detection::{CollisionDetector, CollisionPair, DirectDetector, GridDetector};
pub use resolution::{CollisionResolver, ResolutionReport, resolve_collisions};

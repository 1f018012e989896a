use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::bond::{BondInstance, BondTypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleId(pub u32);

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Particle type tag
///
/// Types are plain integer tags; the collision policy uses them to mark
/// virtual sites and the glue state machine (unglued, glued, attached).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleType(pub u32);

impl std::fmt::Display for ParticleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub ptype: ParticleType,
    pub position: Point3<f64>,
    pub velocity: Vector3<f64>,
    /// Virtual particles have no dynamics of their own
    pub is_virtual: bool,
    /// Bonds owned by this particle (partners are the other participants)
    pub bonds: Vec<BondInstance>,
}

impl Particle {
    /// Creates a resting, unbonded, real particle
    ///
    /// # Examples
    ///
    /// ```
    /// use particles::particle::{Particle, ParticleId, ParticleType};
    /// use nalgebra::Point3;
    ///
    /// let p = Particle::new(ParticleId(3), ParticleType(0), Point3::new(1.0, 0.0, 0.0));
    /// assert!(!p.is_virtual);
    /// assert_eq!(p.bond_count(), 0);
    /// ```
    pub fn new(id: ParticleId, ptype: ParticleType, position: Point3<f64>) -> Self {
        Particle {
            id,
            ptype,
            position,
            velocity: Vector3::zeros(),
            is_virtual: false,
            bonds: Vec::new(),
        }
    }

    /// Vector pointing from this particle to `other`
    pub fn separation_to(&self, other: &Particle) -> Vector3<f64> {
        other.position - self.position
    }

    pub fn distance_to(&self, other: &Particle) -> f64 {
        self.separation_to(other).magnitude()
    }

    /// Whether this particle owns a bond of `bond_type` with exactly `partners`
    pub fn has_bond(&self, bond_type: BondTypeId, partners: &[ParticleId]) -> bool {
        self.bonds
            .iter()
            .any(|b| b.bond_type == bond_type && b.partners == partners)
    }

    /// Whether any owned bond references `partner`
    pub fn is_bonded_to(&self, partner: ParticleId) -> bool {
        self.bonds.iter().any(|b| b.partners.contains(&partner))
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }
}

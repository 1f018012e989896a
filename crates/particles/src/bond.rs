//! Bond types and bond instances
//!
//! A bond *type* is a reusable interaction definition held in the
//! [`BondTable`]. A bond *instance* attaches a type to concrete particles and
//! lives in the bond list of one owning particle; the remaining participants
//! are listed as partners.

use serde::{Deserialize, Serialize};

use crate::particle::ParticleId;

/// Index of a bond type in the [`BondTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BondTypeId(pub usize);

impl std::fmt::Display for BondTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Interaction form of a bond type
///
/// Only the shape matters to the bonding core: how many particles take part
/// and, for pair bonds, how far apart they are allowed to drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BondKind {
    /// Harmonic spring V(r) = ½ k (r - r0)²
    Harmonic { k: f64, r0: f64 },
    /// Force-free pair bond tying a virtual site to a partner
    Virtual,
    /// Harmonic angle V(φ) = ½ k (φ - φ0)², stored on the central particle
    AngleHarmonic { k: f64, phi0: f64 },
}

impl BondKind {
    /// Number of partners stored on the owning particle
    pub fn arity(&self) -> usize {
        match self {
            BondKind::Harmonic { .. } | BondKind::Virtual => 1,
            BondKind::AngleHarmonic { .. } => 2,
        }
    }

    pub fn is_pair(&self) -> bool {
        self.arity() == 1
    }

    pub fn is_angle(&self) -> bool {
        matches!(self, BondKind::AngleHarmonic { .. })
    }
}

/// A bond type with its breaking behavior
///
/// # Examples
///
/// ```
/// use particles::bond::BondType;
///
/// let spring = BondType::harmonic(10.0, 1.0).with_breaking_distance(1.2);
/// assert!(spring.breakable);
/// assert!(spring.exceeds_threshold(1.3));
/// assert!(!spring.exceeds_threshold(1.1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondType {
    pub kind: BondKind,
    /// Whether stretching past `max_distance` queues the bond for breakage
    ///
    /// A non-breakable bond stretched past its threshold is an error instead.
    pub breakable: bool,
    /// Breaking threshold for pair bonds; `None` means no limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f64>,
}

impl BondType {
    pub fn new(kind: BondKind) -> Self {
        Self {
            kind,
            breakable: false,
            max_distance: None,
        }
    }

    pub fn harmonic(k: f64, r0: f64) -> Self {
        Self::new(BondKind::Harmonic { k, r0 })
    }

    pub fn virtual_bond() -> Self {
        Self::new(BondKind::Virtual)
    }

    pub fn angle_harmonic(k: f64, phi0: f64) -> Self {
        Self::new(BondKind::AngleHarmonic { k, phi0 })
    }

    /// Sets the breaking threshold and marks the type breakable
    pub fn with_breaking_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self.breakable = true;
        self
    }

    /// Keeps the threshold but turns breakage off
    pub fn unbreakable(mut self) -> Self {
        self.breakable = false;
        self
    }

    /// Whether a pair separated by `distance` is past this type's threshold
    pub fn exceeds_threshold(&self, distance: f64) -> bool {
        self.max_distance.is_some_and(|max| distance > max)
    }
}

/// Table of bond types, indexed by [`BondTypeId`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BondTable {
    types: Vec<BondType>,
}

impl BondTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bond type and returns its id
    pub fn add(&mut self, bond_type: BondType) -> BondTypeId {
        self.types.push(bond_type);
        BondTypeId(self.types.len() - 1)
    }

    pub fn get(&self, id: BondTypeId) -> Option<&BondType> {
        self.types.get(id.0)
    }

    pub fn get_mut(&mut self, id: BondTypeId) -> Option<&mut BondType> {
        self.types.get_mut(id.0)
    }

    pub fn contains(&self, id: BondTypeId) -> bool {
        id.0 < self.types.len()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BondTypeId, &BondType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (BondTypeId(i), t))
    }
}

/// A bond type attached to concrete partners of the owning particle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BondInstance {
    pub bond_type: BondTypeId,
    pub partners: Vec<ParticleId>,
}

impl BondInstance {
    pub fn new(bond_type: BondTypeId, partners: Vec<ParticleId>) -> Self {
        Self {
            bond_type,
            partners,
        }
    }

    pub fn pair(bond_type: BondTypeId, partner: ParticleId) -> Self {
        Self::new(bond_type, vec![partner])
    }

    pub fn involves(&self, id: ParticleId) -> bool {
        self.partners.contains(&id)
    }
}

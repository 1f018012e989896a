use std::collections::{BTreeSet, HashMap};

use nalgebra::Point3;

use crate::bond::{BondInstance, BondTable, BondTypeId};
use crate::error::{ParticleError, Result};
use crate::particle::{Particle, ParticleId, ParticleType};

/// The particle/bond graph of a simulation
///
/// Owns the particles, the bond-type table and the virtual-site relation
/// table. The relation maps each virtual particle to the real particle it
/// represents; it is a lookup index only, so removing either side simply
/// drops the entry.
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    /// Collection of particles, real and virtual
    pub particles: Vec<Particle>,
    /// Bond types referenced by bond instances
    pub bond_types: BondTable,
    /// virtual particle -> represented real particle
    relations: HashMap<ParticleId, ParticleId>,
    /// Next available particle ID; wider than `ParticleId` so the last ID can be handed out
    next_id: u64,
}

impl ParticleSystem {
    /// Creates an empty system with an empty bond table
    ///
    /// # Examples
    ///
    /// ```
    /// use particles::state::ParticleSystem;
    ///
    /// let system = ParticleSystem::new();
    /// assert_eq!(system.particle_count(), 0);
    /// assert!(system.bond_types.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bond_types(bond_types: BondTable) -> Self {
        Self {
            bond_types,
            ..Self::default()
        }
    }

    /// Adds a real particle and returns its ID
    ///
    /// # Errors
    ///
    /// Fails with `IdSpaceExhausted` once `ParticleId(u32::MAX)` has been used.
    ///
    /// # Examples
    ///
    /// ```
    /// use particles::particle::ParticleType;
    /// use particles::state::ParticleSystem;
    /// use nalgebra::Point3;
    ///
    /// let mut system = ParticleSystem::new();
    /// let a = system.add_particle(ParticleType(0), Point3::origin()).unwrap();
    /// let b = system.add_particle(ParticleType(0), Point3::new(1.0, 0.0, 0.0)).unwrap();
    ///
    /// assert_ne!(a, b);
    /// assert_eq!(system.particle_count(), 2);
    /// ```
    pub fn add_particle(
        &mut self,
        ptype: ParticleType,
        position: Point3<f64>,
    ) -> Result<ParticleId> {
        let id = u32::try_from(self.next_id)
            .map(ParticleId)
            .map_err(|_| ParticleError::IdSpaceExhausted)?;
        self.next_id += 1;
        self.particles.push(Particle::new(id, ptype, position));
        Ok(id)
    }

    /// Adds a real particle under a caller-chosen ID
    pub fn add_particle_with_id(
        &mut self,
        id: ParticleId,
        ptype: ParticleType,
        position: Point3<f64>,
    ) -> Result<ParticleId> {
        if self.contains(id) {
            return Err(ParticleError::DuplicateParticle(id));
        }
        self.next_id = self.next_id.max(u64::from(id.0) + 1);
        self.particles.push(Particle::new(id, ptype, position));
        Ok(id)
    }

    /// Adds a virtual particle that represents the real particle `represents`
    pub fn add_virtual_particle(
        &mut self,
        ptype: ParticleType,
        position: Point3<f64>,
        represents: ParticleId,
    ) -> Result<ParticleId> {
        if !self.contains(represents) {
            return Err(ParticleError::UnknownParticle(represents));
        }
        let id = self.add_particle(ptype, position)?;
        if let Some(p) = self.get_mut(id) {
            p.is_virtual = true;
        }
        self.relations.insert(id, represents);
        Ok(id)
    }

    /// Removes a particle together with everything that references it
    ///
    /// Bonds owned by other particles that name the removed particle as a
    /// partner are dropped, as are relation entries on either side.
    pub fn remove_particle(&mut self, id: ParticleId) -> Option<Particle> {
        let idx = self.particles.iter().position(|p| p.id == id)?;
        let removed = self.particles.remove(idx);

        self.particles.iter_mut().for_each(|p| {
            p.bonds.retain(|b| !b.involves(id));
        });
        self.relations.retain(|vs, real| *vs != id && *real != id);

        log::debug!("removed particle {} (virtual: {})", id, removed.is_virtual);
        Some(removed)
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.iter_mut().find(|p| p.id == id)
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.get(id).is_some()
    }

    pub fn set_position(&mut self, id: ParticleId, position: Point3<f64>) -> Result<()> {
        let p = self
            .get_mut(id)
            .ok_or(ParticleError::UnknownParticle(id))?;
        p.position = position;
        Ok(())
    }

    pub fn set_type(&mut self, id: ParticleId, ptype: ParticleType) -> Result<()> {
        let p = self
            .get_mut(id)
            .ok_or(ParticleError::UnknownParticle(id))?;
        p.ptype = ptype;
        Ok(())
    }

    /// Attaches a bond instance to `owner`
    ///
    /// # Arguments
    ///
    /// * `owner` - Particle that stores the bond
    /// * `bond_type` - Entry in the bond-type table
    /// * `partners` - The other participants, one per arity slot
    ///
    /// # Errors
    ///
    /// Fails if the bond type is unknown, the partner count does not match
    /// the bond's arity, a partner is missing, or the owner is its own partner.
    ///
    /// # Examples
    ///
    /// ```
    /// use particles::bond::BondType;
    /// use particles::particle::ParticleType;
    /// use particles::state::ParticleSystem;
    /// use nalgebra::Point3;
    ///
    /// let mut system = ParticleSystem::new();
    /// let spring = system.bond_types.add(BondType::harmonic(1.0, 1.0));
    /// let a = system.add_particle(ParticleType(0), Point3::origin()).unwrap();
    /// let b = system.add_particle(ParticleType(0), Point3::new(1.0, 0.0, 0.0)).unwrap();
    ///
    /// system.add_bond(b, spring, &[a]).unwrap();
    /// assert!(system.pair_bond_exists(a, b, spring));
    /// ```
    pub fn add_bond(
        &mut self,
        owner: ParticleId,
        bond_type: BondTypeId,
        partners: &[ParticleId],
    ) -> Result<()> {
        let kind = self
            .bond_types
            .get(bond_type)
            .ok_or(ParticleError::UnknownBondType(bond_type))?
            .kind;

        if kind.arity() != partners.len() {
            return Err(ParticleError::ArityMismatch {
                bond_type,
                expected: kind.arity(),
                got: partners.len(),
            });
        }
        if partners.contains(&owner) {
            return Err(ParticleError::SelfBond(owner));
        }
        if let Some(&missing) = partners.iter().find(|&&id| !self.contains(id)) {
            return Err(ParticleError::UnknownParticle(missing));
        }

        let p = self
            .get_mut(owner)
            .ok_or(ParticleError::UnknownParticle(owner))?;
        p.bonds.push(BondInstance::new(bond_type, partners.to_vec()));
        Ok(())
    }

    /// Removes one bond instance from `owner`
    ///
    /// Returns whether a bond was removed; removing an absent bond is a no-op.
    pub fn remove_bond(
        &mut self,
        owner: ParticleId,
        bond_type: BondTypeId,
        partners: &[ParticleId],
    ) -> bool {
        let Some(p) = self.get_mut(owner) else {
            return false;
        };
        match p
            .bonds
            .iter()
            .position(|b| b.bond_type == bond_type && b.partners == partners)
        {
            Some(idx) => {
                p.bonds.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Whether a pair bond of `bond_type` joins `a` and `b`, stored on either side
    pub fn pair_bond_exists(&self, a: ParticleId, b: ParticleId, bond_type: BondTypeId) -> bool {
        let on = |owner: ParticleId, partner: ParticleId| {
            self.get(owner)
                .is_some_and(|p| p.has_bond(bond_type, &[partner]))
        };
        on(a, b) || on(b, a)
    }

    /// Every bond instance that involves `id`, as `(owner, bond)`
    ///
    /// Includes bonds owned by `id` and bonds on other particles that list
    /// `id` as a partner.
    pub fn bonds_incident_to(&self, id: ParticleId) -> Vec<(ParticleId, BondInstance)> {
        self.particles
            .iter()
            .flat_map(|p| {
                p.bonds
                    .iter()
                    .filter(move |b| p.id == id || b.involves(id))
                    .map(move |b| (p.id, b.clone()))
            })
            .collect()
    }

    /// Removes every bond that involves `id` and returns how many were removed
    pub fn remove_bonds_incident_to(&mut self, id: ParticleId) -> usize {
        self.particles
            .iter_mut()
            .map(|p| {
                let before = p.bonds.len();
                if p.id == id {
                    p.bonds.clear();
                } else {
                    p.bonds.retain(|b| !b.involves(id));
                }
                before - p.bonds.len()
            })
            .sum()
    }

    /// The real particle a virtual particle represents
    pub fn represented_by(&self, virtual_id: ParticleId) -> Option<ParticleId> {
        self.relations.get(&virtual_id).copied()
    }

    /// Virtual particles representing `real_id`, in ascending ID order
    pub fn virtual_sites_of(&self, real_id: ParticleId) -> Vec<ParticleId> {
        let mut sites: Vec<ParticleId> = self
            .relations
            .iter()
            .filter(|&(_, real)| *real == real_id)
            .map(|(&vs, _)| vs)
            .collect();
        sites.sort();
        sites
    }

    /// Types carried by real particles
    pub fn physical_types(&self) -> BTreeSet<ParticleType> {
        self.particles
            .iter()
            .filter(|p| !p.is_virtual)
            .map(|p| p.ptype)
            .collect()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn virtual_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_virtual).count()
    }

    /// Total number of bond instances across all particles
    pub fn bond_instance_count(&self) -> usize {
        self.particles.iter().map(|p| p.bonds.len()).sum()
    }
}

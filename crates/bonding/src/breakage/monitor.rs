//! Scan of pair bonds against their breaking thresholds

use std::collections::HashMap;

use particles::{BondInstance, Particle, ParticleId, ParticleSystem};
use rayon::prelude::*;

use crate::breakage::{BreakageEvent, BreakageQueue};
use crate::error::{BondingError, Result};

enum Strain {
    Break(BreakageEvent),
    Unbreakable(BondingError),
}

fn evaluate(
    index: &HashMap<ParticleId, &Particle>,
    system: &ParticleSystem,
    owner: &Particle,
    bond: &BondInstance,
) -> Option<Strain> {
    let [partner_id] = bond.partners.as_slice() else {
        return None;
    };
    let bond_type = system.bond_types.get(bond.bond_type)?;
    let max_distance = bond_type.max_distance?;
    let partner = index.get(partner_id)?;

    let distance = owner.distance_to(partner);
    if distance <= max_distance {
        return None;
    }

    if bond_type.breakable {
        Some(Strain::Break(BreakageEvent::new(
            bond.bond_type,
            owner.id,
            partner.id,
        )))
    } else {
        Some(Strain::Unbreakable(BondingError::UnbreakableBondExtension {
            bond_type: bond.bond_type,
            a: owner.id,
            b: partner.id,
            distance,
            max_distance,
        }))
    }
}

/// Queues every breakable pair bond stretched past its threshold
///
/// Bonds are evaluated in parallel; events are appended in particle order.
///
/// # Arguments
///
/// * `system` - Particle graph to scan
/// * `queue` - Queue that receives one event per overstretched bond
///
/// # Returns
///
/// The number of events queued
///
/// # Errors
///
/// `UnbreakableBondExtension` if a non-breakable bond is past its threshold.
/// Nothing is queued in that case and the bond stays in place.
///
/// # Examples
///
/// ```
/// use bonding::breakage::{BreakageQueue, check_bond_strain};
/// use particles::{BondType, ParticleSystem, ParticleType};
/// use nalgebra::Point3;
///
/// let mut system = ParticleSystem::new();
/// let spring = system
///     .bond_types
///     .add(BondType::harmonic(1.0, 1.0).with_breaking_distance(1.2));
/// let a = system.add_particle(ParticleType(0), Point3::origin()).unwrap();
/// let b = system.add_particle(ParticleType(0), Point3::new(1.5, 0.0, 0.0)).unwrap();
/// system.add_bond(b, spring, &[a]).unwrap();
///
/// let mut queue = BreakageQueue::new();
/// assert_eq!(check_bond_strain(&system, &mut queue).unwrap(), 1);
/// ```
pub fn check_bond_strain(system: &ParticleSystem, queue: &mut BreakageQueue) -> Result<usize> {
    let index: HashMap<ParticleId, &Particle> =
        system.particles.iter().map(|p| (p.id, p)).collect();

    let strained: Vec<Strain> = system
        .particles
        .par_iter()
        .flat_map_iter(|owner| {
            let index = &index;
            owner
                .bonds
                .iter()
                .filter_map(move |bond| evaluate(index, system, owner, bond))
        })
        .collect();

    let mut events = Vec::with_capacity(strained.len());
    for strain in strained {
        match strain {
            Strain::Break(event) => events.push(event),
            Strain::Unbreakable(err) => {
                log::warn!("{err}");
                return Err(err);
            }
        }
    }

    let queued = events.len();
    queue.extend(events);
    Ok(queued)
}

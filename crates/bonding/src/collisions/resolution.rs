//! Collision resolution: turning collision pairs into bonds and virtual sites
//!
//! Whether a pair has already been handled is read off the bond graph
//! itself, so resolving the same pair twice creates nothing new. Each pair
//! is checked completely before the graph is touched; a failing pair is
//! reported and skipped without disturbing bonds created for other pairs.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use nalgebra::Point3;
use particles::{BondTypeId, Particle, ParticleId, ParticleSystem, ParticleType};

use crate::collisions::CollisionPair;
use crate::error::{BondingError, Result};
use crate::policy::CollisionPolicy;

/// What one call to [`CollisionResolver::resolve`] changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionReport {
    pub bonds_created: usize,
    pub virtual_particles_created: usize,
    /// Pairs that could not be resolved, one error each
    pub failures: Vec<BondingError>,
}

impl ResolutionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Created {
    bonds: usize,
    virtual_particles: usize,
}

/// Applies the active collision policy to detected collision pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionResolver;

impl CollisionResolver {
    /// Resolves every pair, continuing past pairs that fail
    ///
    /// # Arguments
    ///
    /// * `system` - Particle graph that receives new bonds and virtual sites
    /// * `policy` - Collision policy snapshot for this step
    /// * `pairs` - Detected collision pairs
    ///
    /// # Returns
    ///
    /// Counts of created bonds and virtual particles, plus one error per
    /// pair that could not be resolved
    ///
    /// # Examples
    ///
    /// ```
    /// use bonding::collisions::{CollisionPair, CollisionResolver};
    /// use bonding::policy::CollisionPolicy;
    /// use particles::{BondType, ParticleSystem, ParticleType};
    /// use nalgebra::Point3;
    ///
    /// let mut system = ParticleSystem::new();
    /// let spring = system.bond_types.add(BondType::harmonic(1.0, 1.0));
    /// let a = system.add_particle(ParticleType(0), Point3::origin()).unwrap();
    /// let b = system.add_particle(ParticleType(0), Point3::new(0.9, 0.0, 0.0)).unwrap();
    /// let policy = CollisionPolicy::BindCenters { bond_centers: spring, distance: 1.0 };
    ///
    /// let pairs = [CollisionPair::new(a, b, 0.9)];
    /// let report = CollisionResolver.resolve(&mut system, &policy, &pairs);
    /// assert_eq!(report.bonds_created, 1);
    ///
    /// // Already bonded: nothing new
    /// let report = CollisionResolver.resolve(&mut system, &policy, &pairs);
    /// assert_eq!(report.bonds_created, 0);
    /// ```
    pub fn resolve(
        &self,
        system: &mut ParticleSystem,
        policy: &CollisionPolicy,
        pairs: &[CollisionPair],
    ) -> ResolutionReport {
        let mut report = ResolutionReport::default();
        if matches!(policy, CollisionPolicy::Off) {
            return report;
        }

        let physical_types = system.physical_types();
        for pair in pairs {
            match resolve_pair(system, policy, &physical_types, pair.a, pair.b) {
                Ok(created) => {
                    report.bonds_created += created.bonds;
                    report.virtual_particles_created += created.virtual_particles;
                }
                Err(e) => {
                    log::warn!("{e}");
                    report.failures.push(e);
                }
            }
        }
        report
    }
}

/// Resolves collision pairs with [`CollisionResolver`]
pub fn resolve_collisions(
    system: &mut ParticleSystem,
    policy: &CollisionPolicy,
    pairs: &[CollisionPair],
) -> ResolutionReport {
    CollisionResolver.resolve(system, policy, pairs)
}

fn resolve_pair(
    system: &mut ParticleSystem,
    policy: &CollisionPolicy,
    physical_types: &BTreeSet<ParticleType>,
    a: ParticleId,
    b: ParticleId,
) -> Result<Created> {
    let fail = |reason: String| BondingError::ConfigurationError { a, b, reason };

    if a == b {
        return Err(fail("a particle cannot collide with itself".to_string()));
    }
    let (pa, pb) = match (system.get(a), system.get(b)) {
        (Some(pa), Some(pb)) => (pa.clone(), pb.clone()),
        (None, _) => return Err(fail(format!("particle {a} does not exist"))),
        (_, None) => return Err(fail(format!("particle {b} does not exist"))),
    };
    if pa.is_virtual || pb.is_virtual {
        return Err(fail("virtual particles do not take part in collisions".to_string()));
    }

    for bond in [policy.bond_centers(), policy.bond_vs()].into_iter().flatten() {
        if !system.bond_types.get(bond).is_some_and(|t| t.kind.is_pair()) {
            return Err(fail(format!("bond type {bond} is not a known pair bond")));
        }
    }
    if let Some(vs_type) = policy.part_type_vs() {
        if physical_types.contains(&vs_type) {
            return Err(fail(format!(
                "virtual site type {vs_type} collides with a real particle type"
            )));
        }
    }

    match *policy {
        CollisionPolicy::Off => Ok(Created::default()),
        CollisionPolicy::BindCenters { bond_centers, .. } => {
            bind_centers(system, &pa, &pb, bond_centers)
        }
        CollisionPolicy::BindAtPointOfCollision {
            bond_centers,
            bond_vs,
            part_type_vs,
            vs_placement,
            ..
        } => {
            if system.pair_bond_exists(a, b, bond_centers) {
                return Ok(Created::default());
            }
            let pos_a = pa.position + pa.separation_to(&pb) * vs_placement;
            let pos_b = pb.position + pb.separation_to(&pa) * vs_placement;

            system.add_bond(a, bond_centers, &[b])?;
            let vs_a = system.add_virtual_particle(part_type_vs, pos_a, a)?;
            let vs_b = system.add_virtual_particle(part_type_vs, pos_b, b)?;
            system.add_bond(vs_a, bond_vs, &[vs_b])?;
            log::debug!("bound {a} and {b} at point of collision via virtual sites {vs_a}, {vs_b}");
            Ok(Created {
                bonds: 2,
                virtual_particles: 2,
            })
        }
        // The virtual site is related to the surface particle and bonded to the glued one
        CollisionPolicy::GlueToSurface {
            bond_centers,
            bond_vs,
            part_type_vs,
            part_type_to_be_glued,
            part_type_to_attach_vs_to,
            part_type_after_glueing,
            distance_glued_particle_to_vs,
            ..
        } => {
            let (glued, surface) = if pa.ptype == part_type_to_be_glued
                && pb.ptype == part_type_to_attach_vs_to
            {
                (&pa, &pb)
            } else if pb.ptype == part_type_to_be_glued && pa.ptype == part_type_to_attach_vs_to {
                (&pb, &pa)
            } else {
                return Ok(Created::default());
            };
            if system.pair_bond_exists(glued.id, surface.id, bond_centers) {
                return Ok(Created::default());
            }

            let separation = glued.separation_to(surface);
            let distance = separation.magnitude();
            if distance == 0.0 {
                return Err(fail("glued and surface particle coincide".to_string()));
            }
            let vs_pos: Point3<f64> =
                glued.position + separation * (distance_glued_particle_to_vs / distance);

            system.add_bond(glued.id, bond_centers, &[surface.id])?;
            let vs = system.add_virtual_particle(part_type_vs, vs_pos, surface.id)?;
            system.add_bond(vs, bond_vs, &[glued.id])?;
            system.set_type(glued.id, part_type_after_glueing)?;
            log::debug!(
                "glued {} to surface particle {} via virtual site {vs}",
                glued.id,
                surface.id
            );
            Ok(Created {
                bonds: 2,
                virtual_particles: 1,
            })
        }
        CollisionPolicy::BindThreeParticles {
            bond_centers,
            distance,
            bond_three_particles,
            three_particle_binding_angle_resolution: resolution,
        } => {
            let angle_types = bond_three_particles.0..=bond_three_particles.0 + resolution as usize;
            if !angle_types
                .clone()
                .all(|id| system.bond_types.get(BondTypeId(id)).is_some_and(|t| t.kind.is_angle()))
            {
                return Err(fail(format!(
                    "bond types {}..={} must all be angle bonds",
                    angle_types.start(),
                    angle_types.end()
                )));
            }

            let mut created = bind_centers(system, &pa, &pb, bond_centers)?;
            let is_angle_bond = |t: BondTypeId| angle_types.contains(&t.0);
            let angled = |owner: &Particle, other: ParticleId| {
                owner
                    .bonds
                    .iter()
                    .any(|bond| is_angle_bond(bond.bond_type) && bond.involves(other))
            };
            if angled(&pa, b) || angled(&pb, a) {
                return Ok(created);
            }

            if let Some(triple) =
                best_angle_triple(system, &pa, &pb, distance, resolution, &is_angle_bond)
            {
                let bond_type = BondTypeId(bond_three_particles.0 + triple.bin);
                system.add_bond(triple.center, bond_type, &triple.ends)?;
                log::debug!(
                    "angle bond {bond_type} centered on {} with {:?}",
                    triple.center,
                    triple.ends
                );
                created.bonds += 1;
            }
            Ok(created)
        }
    }
}

fn bind_centers(
    system: &mut ParticleSystem,
    pa: &Particle,
    pb: &Particle,
    bond_centers: BondTypeId,
) -> Result<Created> {
    if system.pair_bond_exists(pa.id, pb.id, bond_centers) {
        return Ok(Created::default());
    }
    system.add_bond(pa.id, bond_centers, &[pb.id])?;
    log::debug!("bound centers of {} and {}", pa.id, pb.id);
    Ok(Created {
        bonds: 1,
        virtual_particles: 0,
    })
}

#[derive(Debug, Clone, Copy)]
struct AngleTriple {
    center: ParticleId,
    ends: [ParticleId; 2],
    bin: usize,
    error: f64,
}

/// Angle at `center` between the directions to `p` and `q`, in [0, π]
fn angle_at(center: &Particle, p: &Particle, q: &Particle) -> Option<f64> {
    let u = center.separation_to(p);
    let v = center.separation_to(q);
    let norm = u.magnitude() * v.magnitude();
    if norm == 0.0 {
        return None;
    }
    Some((u.dot(&v) / norm).clamp(-1.0, 1.0).acos())
}

/// Picks the third particle whose angle falls closest to a bin center
///
/// Candidates are real particles within `distance` of either collision
/// partner; the partner they are close to becomes the angle's center.
fn best_angle_triple(
    system: &ParticleSystem,
    pa: &Particle,
    pb: &Particle,
    distance: f64,
    resolution: u32,
    is_angle_bond: &dyn Fn(BondTypeId) -> bool,
) -> Option<AngleTriple> {
    let already_bound = |center: &Particle, ends: [ParticleId; 2]| {
        center.bonds.iter().any(|bond| {
            is_angle_bond(bond.bond_type)
                && bond.involves(ends[0])
                && bond.involves(ends[1])
        })
    };

    let mut best: Option<AngleTriple> = None;
    for third in system.particles.iter() {
        if third.is_virtual || third.id == pa.id || third.id == pb.id {
            continue;
        }
        for (center, other) in [(pa, pb), (pb, pa)] {
            if center.distance_to(third) > distance {
                continue;
            }
            let Some(phi) = angle_at(center, other, third) else {
                continue;
            };
            let ends = if other.id < third.id {
                [other.id, third.id]
            } else {
                [third.id, other.id]
            };
            if already_bound(center, ends) {
                continue;
            }

            let scaled = phi / PI * resolution as f64;
            let bin = scaled.round();
            let candidate = AngleTriple {
                center: center.id,
                ends,
                bin: bin as usize,
                error: (scaled - bin).abs(),
            };
            if best.is_none_or(|b| candidate.error < b.error) {
                best = Some(candidate);
            }
        }
    }
    best
}

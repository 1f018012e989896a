//! Collision detection between real particles
//!
//! Provides two detector implementations:
//! - DirectDetector: O(N²) for small systems
//! - GridDetector: O(N) using a uniform cell list
//!
//! Virtual particles never collide; they only exist as part of constructs
//! built by the resolver.

use std::collections::HashMap;

use particles::{Particle, ParticleId, ParticleSystem};

/// Two real particles found within the collision distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionPair {
    /// Lower particle ID
    pub a: ParticleId,
    /// Higher particle ID
    pub b: ParticleId,
    /// Separation at detection time
    pub distance: f64,
}

impl CollisionPair {
    /// Creates a pair with canonical ordering (`a < b`)
    pub fn new(first: ParticleId, second: ParticleId, distance: f64) -> Self {
        let (a, b) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };
        Self { a, b, distance }
    }
}

fn check_pair(p: &Particle, q: &Particle, max_distance: f64) -> Option<CollisionPair> {
    if p.is_virtual || q.is_virtual || p.id == q.id {
        return None;
    }
    let distance = p.distance_to(q);
    (distance <= max_distance).then(|| CollisionPair::new(p.id, q.id, distance))
}

/// Collision detector trait
///
/// Different implementations offer tradeoffs between setup cost and
/// scaling. Both report each pair once, in canonical order.
pub trait CollisionDetector: Send + Sync {
    /// Detect all pairs of real particles no further apart than `max_distance`
    fn detect(&self, system: &ParticleSystem, max_distance: f64) -> Vec<CollisionPair>;
}

/// Direct O(N²) collision detector
///
/// Checks every pair of particles. Simple and exact, but slow for large N.
///
/// # Examples
///
/// ```
/// use bonding::collisions::{CollisionDetector, DirectDetector};
/// use particles::{ParticleSystem, ParticleType};
/// use nalgebra::Point3;
///
/// let mut system = ParticleSystem::new();
/// system.add_particle(ParticleType(0), Point3::origin()).unwrap();
/// system.add_particle(ParticleType(0), Point3::new(0.5, 0.0, 0.0)).unwrap();
/// system.add_particle(ParticleType(0), Point3::new(5.0, 0.0, 0.0)).unwrap();
///
/// let pairs = DirectDetector.detect(&system, 1.0);
/// assert_eq!(pairs.len(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectDetector;

impl CollisionDetector for DirectDetector {
    fn detect(&self, system: &ParticleSystem, max_distance: f64) -> Vec<CollisionPair> {
        let particles = &system.particles;
        let n = particles.len();

        let mut pairs: Vec<CollisionPair> = (0..n)
            .flat_map(|i| {
                ((i + 1)..n)
                    .filter_map(move |j| check_pair(&particles[i], &particles[j], max_distance))
            })
            .collect();
        pairs.sort_by_key(|p| (p.a, p.b));
        pairs
    }
}

/// Cell-list collision detector
///
/// Bins particles into cubic cells with edge `max_distance` and only
/// compares particles in the same or adjacent cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridDetector;

type Cell = (i64, i64, i64);

impl GridDetector {
    fn cell_of(p: &Particle, cell_size: f64) -> Cell {
        (
            (p.position.x / cell_size).floor() as i64,
            (p.position.y / cell_size).floor() as i64,
            (p.position.z / cell_size).floor() as i64,
        )
    }
}

impl CollisionDetector for GridDetector {
    fn detect(&self, system: &ParticleSystem, max_distance: f64) -> Vec<CollisionPair> {
        if system.particles.is_empty() || max_distance <= 0.0 {
            return Vec::new();
        }

        let mut cells: HashMap<Cell, Vec<usize>> = HashMap::new();
        for (idx, p) in system.particles.iter().enumerate() {
            if !p.is_virtual {
                cells
                    .entry(Self::cell_of(p, max_distance))
                    .or_default()
                    .push(idx);
            }
        }

        let mut pairs = Vec::new();
        for (&(cx, cy, cz), members) in &cells {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        // Cells saturate at the i64 range for huge coordinates
                        let neighbor = match (
                            cx.checked_add(dx),
                            cy.checked_add(dy),
                            cz.checked_add(dz),
                        ) {
                            (Some(nx), Some(ny), Some(nz)) => (nx, ny, nz),
                            _ => continue,
                        };
                        let Some(neighbors) = cells.get(&neighbor) else {
                            continue;
                        };
                        for &i in members {
                            for &j in neighbors {
                                // Each unordered pair is visited from both
                                // cells; keep one visit
                                if i >= j {
                                    continue;
                                }
                                let (p, q) = (&system.particles[i], &system.particles[j]);
                                if let Some(pair) = check_pair(p, q, max_distance) {
                                    pairs.push(pair);
                                }
                            }
                        }
                    }
                }
            }
        }

        pairs.sort_by_key(|p| (p.a, p.b));
        pairs
    }
}

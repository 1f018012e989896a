//! Per-step driver for bond creation and breakage
//!
//! One step runs the phases in a fixed order, all against the same policy
//! snapshot:
//!
//! 1. Detect collision pairs (skipped when collisions are off)
//! 2. Resolve them into bonds and virtual sites
//! 3. Queue breakable bonds stretched past their thresholds
//! 4. Drain the queue through the handler chain
//!
//! Detection and the strain scan only read the graph; resolution and the
//! drain are the only phases that mutate it, and they run one after the
//! other.

use particles::ParticleSystem;

use crate::breakage::{BondBreakage, check_bond_strain};
use crate::collisions::{CollisionDetector, CollisionResolver, DirectDetector, ResolutionReport};
use crate::error::Result;
use crate::policy::CollisionDetection;

/// What happened during one or more steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Collision pairs detected
    pub collisions: usize,
    pub resolution: ResolutionReport,
    /// Breakage events drained through the handler chain
    pub breakage_events: usize,
}

impl StepReport {
    fn absorb(&mut self, other: StepReport) {
        self.collisions += other.collisions;
        self.resolution.bonds_created += other.resolution.bonds_created;
        self.resolution.virtual_particles_created += other.resolution.virtual_particles_created;
        self.resolution.failures.extend(other.resolution.failures);
        self.breakage_events += other.breakage_events;
    }
}

/// Collision policy, breakage chain and collision detector for a simulation
pub struct BondLifecycle {
    pub detection: CollisionDetection,
    pub breakage: BondBreakage,
    detector: Box<dyn CollisionDetector>,
    resolver: CollisionResolver,
}

impl Default for BondLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl BondLifecycle {
    /// Collisions off, no handlers, direct pair detection
    pub fn new() -> Self {
        Self {
            detection: CollisionDetection::new(),
            breakage: BondBreakage::new(),
            detector: Box::new(DirectDetector),
            resolver: CollisionResolver,
        }
    }

    /// Replaces the collision detector
    pub fn with_detector<D: CollisionDetector + 'static>(mut self, detector: D) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Runs one step of collision resolution and bond breakage
    ///
    /// # Errors
    ///
    /// - `UnbreakableBondExtension` from the strain scan; the step's queued
    ///   events are discarded and nothing is drained.
    /// - `HandlerFailures` once the drain has completed, if any handler failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use bonding::lifecycle::BondLifecycle;
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
    /// let mut lifecycle = BondLifecycle::new();
    /// lifecycle.breakage.add_handler("break_simple_pair_bond").unwrap();
    /// lifecycle.step(&mut system).unwrap();
    ///
    /// assert!(!system.pair_bond_exists(a, b, spring));
    /// ```
    pub fn step(&mut self, system: &mut ParticleSystem) -> Result<StepReport> {
        let policy = self.detection.policy();
        let mut report = StepReport::default();

        if let Some(distance) = policy.distance() {
            let pairs = self.detector.detect(system, distance);
            report.collisions = pairs.len();
            report.resolution = self.resolver.resolve(system, &policy, &pairs);
        }

        if let Err(e) = check_bond_strain(system, self.breakage.queue_mut()) {
            self.breakage.queue_mut().clear();
            return Err(e);
        }

        report.breakage_events = self.breakage.process_queue(system, &policy)?;
        Ok(report)
    }

    /// Runs `n_steps` steps, stopping at the first error
    pub fn run(&mut self, system: &mut ParticleSystem, n_steps: usize) -> Result<StepReport> {
        let mut total = StepReport::default();
        for _ in 0..n_steps {
            total.absorb(self.step(system)?);
        }
        Ok(total)
    }
}

//! Built-in breakage handlers and the handler extension point

use std::fmt;
use std::sync::Arc;

use particles::{ParticleId, ParticleSystem};

use crate::breakage::BreakageEvent;
use crate::error::{BondingError, Result};
use crate::policy::CollisionPolicy;

/// What a handler may touch while the queue is drained
pub struct HandlerContext<'a> {
    pub system: &'a mut ParticleSystem,
    /// Policy active when the drain started
    pub policy: &'a CollisionPolicy,
}

/// A custom reaction to a breakage event
///
/// Implementations are registered by name on
/// [`crate::breakage::BondBreakage::register_handler`] and then become
/// available to `add_handler` like the built-ins.
pub trait BreakageHandler: Send + Sync {
    fn handle(&self, event: &BreakageEvent, ctx: &mut HandlerContext<'_>) -> Result<()>;
}

/// A registered handler
#[derive(Clone)]
pub enum HandlerKind {
    PrintQueueEntry,
    BreakSimplePairBond,
    BreakBindAtPointOfCollision,
    Custom {
        name: String,
        handler: Arc<dyn BreakageHandler>,
    },
}

impl HandlerKind {
    pub const PRINT_QUEUE_ENTRY: &'static str = "print_queue_entry";
    pub const BREAK_SIMPLE_PAIR_BOND: &'static str = "break_simple_pair_bond";
    pub const BREAK_BIND_AT_POINT_OF_COLLISION: &'static str = "break_bind_at_point_of_collision";

    pub const BUILTIN_NAMES: [&'static str; 3] = [
        Self::PRINT_QUEUE_ENTRY,
        Self::BREAK_SIMPLE_PAIR_BOND,
        Self::BREAK_BIND_AT_POINT_OF_COLLISION,
    ];

    /// Looks up a built-in handler by name
    pub fn builtin(name: &str) -> Option<HandlerKind> {
        match name {
            Self::PRINT_QUEUE_ENTRY => Some(HandlerKind::PrintQueueEntry),
            Self::BREAK_SIMPLE_PAIR_BOND => Some(HandlerKind::BreakSimplePairBond),
            Self::BREAK_BIND_AT_POINT_OF_COLLISION => Some(HandlerKind::BreakBindAtPointOfCollision),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            HandlerKind::PrintQueueEntry => Self::PRINT_QUEUE_ENTRY,
            HandlerKind::BreakSimplePairBond => Self::BREAK_SIMPLE_PAIR_BOND,
            HandlerKind::BreakBindAtPointOfCollision => Self::BREAK_BIND_AT_POINT_OF_COLLISION,
            HandlerKind::Custom { name, .. } => name,
        }
    }

    /// Runs the handler on one event
    ///
    /// Failures are reported as `HandlerFailed` naming this handler.
    pub fn run(&self, event: &BreakageEvent, ctx: &mut HandlerContext<'_>) -> Result<()> {
        let result = match self {
            HandlerKind::PrintQueueEntry => {
                print_queue_entry(event);
                Ok(())
            }
            HandlerKind::BreakSimplePairBond => {
                break_simple_pair_bond(event, ctx.system);
                Ok(())
            }
            HandlerKind::BreakBindAtPointOfCollision => {
                break_bind_at_point_of_collision(event, ctx.system, ctx.policy)
            }
            HandlerKind::Custom { handler, .. } => handler.handle(event, ctx),
        };

        result.map_err(|e| match e {
            BondingError::HandlerFailed { .. } => e,
            other => BondingError::HandlerFailed {
                handler: self.name().to_string(),
                event: *event,
                reason: other.to_string(),
            },
        })
    }
}

impl fmt::Debug for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
            builtin => f.write_str(builtin.name()),
        }
    }
}

/// Logs the event; leaves the graph untouched
pub fn print_queue_entry(event: &BreakageEvent) {
    log::info!("bond breakage queue entry: {event}");
}

/// Removes the bond named by the event from whichever participant owns it
///
/// Removing a bond that is already gone is a no-op. Returns whether
/// anything was removed.
///
/// # Examples
///
/// ```
/// use bonding::breakage::{BreakageEvent, break_simple_pair_bond};
/// use particles::{BondType, ParticleSystem, ParticleType};
/// use nalgebra::Point3;
///
/// let mut system = ParticleSystem::new();
/// let spring = system.bond_types.add(BondType::harmonic(1.0, 1.0));
/// let a = system.add_particle(ParticleType(0), Point3::origin()).unwrap();
/// let b = system.add_particle(ParticleType(0), Point3::new(1.0, 0.0, 0.0)).unwrap();
/// system.add_bond(b, spring, &[a]).unwrap();
///
/// let event = BreakageEvent::new(spring, a, b);
/// assert!(break_simple_pair_bond(&event, &mut system));
/// assert!(!break_simple_pair_bond(&event, &mut system));
/// ```
pub fn break_simple_pair_bond(event: &BreakageEvent, system: &mut ParticleSystem) -> bool {
    let BreakageEvent {
        bond_type,
        particle_a: a,
        particle_b: b,
    } = *event;

    let removed_on_a = system.remove_bond(a, bond_type, &[b]);
    let removed_on_b = system.remove_bond(b, bond_type, &[a]);
    if removed_on_a || removed_on_b {
        log::debug!("broke {event}");
    }
    removed_on_a || removed_on_b
}

/// Resolves a particle to (real counterpart, virtual site if any)
fn resolve_counterpart(
    system: &ParticleSystem,
    id: ParticleId,
) -> std::result::Result<(ParticleId, Option<ParticleId>), String> {
    let p = system
        .get(id)
        .ok_or_else(|| format!("particle {id} does not exist"))?;
    if !p.is_virtual {
        return Ok((id, None));
    }
    system
        .represented_by(id)
        .map(|real| (real, Some(id)))
        .ok_or_else(|| format!("virtual particle {id} is not related to a real particle"))
}

/// Virtual sites of the construct `named` belongs to
///
/// A construct's two sites are joined to each other by a bond and each
/// represents one of the two real counterparts. Sites of the same real
/// particles that belong to other constructs are not bonded to `named`
/// and are left alone.
fn construct_sites(
    system: &ParticleSystem,
    named: &[ParticleId],
    reals: [ParticleId; 2],
) -> Vec<ParticleId> {
    let mut sites = named.to_vec();
    for &vs in named {
        let partners = system
            .bonds_incident_to(vs)
            .into_iter()
            .flat_map(|(owner, bond)| std::iter::once(owner).chain(bond.partners));
        for other in partners {
            let in_construct = other != vs
                && system.get(other).is_some_and(|p| p.is_virtual)
                && system
                    .represented_by(other)
                    .is_some_and(|real| reals.contains(&real));
            if in_construct && !sites.contains(&other) {
                sites.push(other);
            }
        }
    }
    sites
}

/// Dissolves a point-of-collision construct
///
/// The event names a bond with at least one virtual participant. The
/// triggering bond, the center bond between the real counterparts, and
/// every bond touching the construct's virtual sites are removed, and the
/// sites themselves are deleted. Both sites go even when the event names
/// only one of them, so no site is left without its construct. All checks
/// happen before the first removal, so a failing event leaves the graph
/// unchanged.
///
/// # Arguments
///
/// * `event` - The queued breakage, with at least one virtual participant
/// * `system` - Particle graph to mutate
/// * `policy` - Policy active when the drain started; supplies the center bond
///
/// # Returns
///
/// `Ok(())` once the construct is gone, including when an earlier event in
/// the same drain already dissolved it.
///
/// An event whose particles were already removed by an earlier cascade in
/// the same drain is a no-op.
pub fn break_bind_at_point_of_collision(
    event: &BreakageEvent,
    system: &mut ParticleSystem,
    policy: &CollisionPolicy,
) -> Result<()> {
    let BreakageEvent {
        bond_type,
        particle_a: a,
        particle_b: b,
    } = *event;

    let failed = |reason: String| BondingError::HandlerFailed {
        handler: HandlerKind::BREAK_BIND_AT_POINT_OF_COLLISION.to_string(),
        event: *event,
        reason,
    };

    if !system.contains(a) || !system.contains(b) {
        log::debug!("skipping {event}: construct already dissolved");
        return Ok(());
    }

    let (real_a, vs_a) = resolve_counterpart(system, a).map_err(failed)?;
    let (real_b, vs_b) = resolve_counterpart(system, b).map_err(failed)?;
    if vs_a.is_none() && vs_b.is_none() {
        return Err(failed(format!(
            "neither particle {a} nor {b} is a virtual site"
        )));
    }
    let bond_centers = policy
        .bond_centers()
        .ok_or_else(|| failed(format!("collision mode {} has no center bond", policy.mode())))?;

    let named: Vec<ParticleId> = [vs_a, vs_b].into_iter().flatten().collect();
    let sites = construct_sites(system, &named, [real_a, real_b]);

    system.remove_bond(a, bond_type, &[b]);
    system.remove_bond(b, bond_type, &[a]);
    system.remove_bond(real_a, bond_centers, &[real_b]);
    system.remove_bond(real_b, bond_centers, &[real_a]);

    for vs in sites {
        let detached = system.remove_bonds_incident_to(vs);
        system.remove_particle(vs);
        log::debug!("dissolved virtual site {vs} ({detached} further bond(s) removed)");
    }
    log::debug!("broke collision construct between {real_a} and {real_b}");
    Ok(())
}

//! Bond breakage: per-step event queue and the ordered handler chain
//!
//! The strain check appends an event for every breakable bond stretched past
//! its threshold. Once per step the queue is drained: each event is passed to
//! every active handler in registration order, so later handlers see the
//! graph as already changed by earlier ones. The queue is empty afterwards.

pub mod handlers;
pub mod monitor;
pub mod queue;


use std::collections::BTreeMap;
use std::sync::Arc;

use particles::ParticleSystem;

use crate::error::{BondingError, Result};
use crate::policy::CollisionPolicy;

pub use handlers::{
    BreakageHandler, HandlerContext, HandlerKind, break_bind_at_point_of_collision,
    break_simple_pair_bond, print_queue_entry,
};
pub use monitor::check_bond_strain;
pub use queue::{BreakageEvent, BreakageQueue, QueuePhase};

/// Breakage queue plus the active handler chain
///
/// # Examples
///
/// ```
/// use bonding::breakage::BondBreakage;
///
/// let mut breakage = BondBreakage::new();
/// breakage.add_handler("print_queue_entry").unwrap();
/// breakage.add_handler("break_simple_pair_bond").unwrap();
/// assert_eq!(
///     breakage.active_handlers(),
///     vec!["print_queue_entry", "break_simple_pair_bond"]
/// );
///
/// breakage.clear_handlers();
/// assert!(breakage.active_handlers().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct BondBreakage {
    queue: BreakageQueue,
    handlers: Vec<HandlerKind>,
    custom: BTreeMap<String, HandlerKind>,
}

impl BondBreakage {
    /// Empty queue, no active handlers
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the named handler to the chain
    ///
    /// Duplicates are allowed; the handler then runs once per occurrence.
    ///
    /// # Errors
    ///
    /// `UnknownHandler` if the name is neither built in nor registered.
    pub fn add_handler(&mut self, name: &str) -> Result<()> {
        let handler = HandlerKind::builtin(name)
            .or_else(|| self.custom.get(name).cloned())
            .ok_or_else(|| BondingError::UnknownHandler(name.to_string()))?;
        self.handlers.push(handler);
        Ok(())
    }

    /// Makes a custom handler available under `name`
    ///
    /// Re-registering a custom name replaces it for future `add_handler`
    /// calls; handlers already in the chain are unaffected.
    pub fn register_handler(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn BreakageHandler>,
    ) -> Result<()> {
        let name = name.into();
        if HandlerKind::builtin(&name).is_some() {
            return Err(BondingError::ValidationError(format!(
                "handler name {name} is reserved for a built-in handler"
            )));
        }
        self.custom
            .insert(name.clone(), HandlerKind::Custom { name, handler });
        Ok(())
    }

    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    /// Names of the active handlers in registration order
    pub fn active_handlers(&self) -> Vec<String> {
        self.handlers.iter().map(|h| h.name().to_string()).collect()
    }

    /// Names accepted by [`BondBreakage::add_handler`], sorted
    pub fn available_handlers(&self) -> Vec<String> {
        let mut names: Vec<String> = HandlerKind::BUILTIN_NAMES
            .iter()
            .map(|n| n.to_string())
            .chain(self.custom.keys().cloned())
            .collect();
        names.sort();
        names
    }

    pub fn queue(&self) -> &BreakageQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut BreakageQueue {
        &mut self.queue
    }

    /// Drains the queue through the handler chain
    ///
    /// Every event reaches every handler even if some fail. The queue is
    /// empty afterwards.
    ///
    /// # Arguments
    ///
    /// * `system` - Particle graph the handlers mutate
    /// * `policy` - Policy active when the drain starts
    ///
    /// # Returns
    ///
    /// The number of events drained
    ///
    /// # Errors
    ///
    /// `HandlerFailures` with every failure of this drain, reported after
    /// the drain has completed.
    pub fn process_queue(
        &mut self,
        system: &mut ParticleSystem,
        policy: &CollisionPolicy,
    ) -> Result<usize> {
        let events = self.queue.begin_drain();
        let mut ctx = HandlerContext { system, policy };
        let mut failures = Vec::new();

        for event in &events {
            for handler in &self.handlers {
                if let Err(e) = handler.run(event, &mut ctx) {
                    log::warn!("{e}");
                    failures.push(e);
                }
            }
        }
        self.queue.finish_drain();

        if failures.is_empty() {
            Ok(events.len())
        } else {
            Err(BondingError::HandlerFailures(failures))
        }
    }
}

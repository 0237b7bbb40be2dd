//! Entity reconciliation: the only writer of the local actor table.
//!
//! Each sync replaces the client's belief about which actors exist with the
//! server's list. Existing actors keep their on-screen position and animate
//! toward the new cell; unseen ids are spawned in place; missing ids are
//! despawned. Fetches are ticketed so an older response landing after a
//! newer one is discarded instead of rolling the board back.
mod actor;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use battle_core::{ActorId, EntitySnapshot, Position};

pub use actor::{HealthBar, LocalActor, RenderPosition};

use crate::api::{ActorView, StatusDisplay, VisualHandle};
use crate::config::MotionConfig;

/// Issue order of an entity fetch. Later tickets win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyncTicket(u64);

/// What one reconciliation did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<ActorId>,
    pub updated: Vec<ActorId>,
    pub removed: Vec<ActorId>,
    /// The snapshot was older than one already applied and was ignored.
    pub stale: bool,
}

impl ReconcileReport {
    fn stale() -> Self {
        Self {
            stale: true,
            ..Self::default()
        }
    }

    /// Whether any actor appeared or disappeared.
    pub fn membership_changed(&self) -> bool {
        !self.created.is_empty() || !self.removed.is_empty()
    }
}

struct Tracked {
    actor: LocalActor,
    visual: VisualHandle,
}

#[derive(Default)]
struct Table {
    actors: BTreeMap<ActorId, Tracked>,
    last_applied: u64,
}

pub struct Reconciler {
    table: Mutex<Table>,
    issued: AtomicU64,
    view: Arc<dyn ActorView>,
    status: Arc<dyn StatusDisplay>,
    local_actor: ActorId,
    motion: MotionConfig,
}

impl Reconciler {
    pub fn new(
        view: Arc<dyn ActorView>,
        status: Arc<dyn StatusDisplay>,
        local_actor: ActorId,
        motion: MotionConfig,
    ) -> Self {
        Self {
            table: Mutex::new(Table::default()),
            issued: AtomicU64::new(0),
            view,
            status,
            local_actor,
            motion,
        }
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn local_actor(&self) -> &ActorId {
        &self.local_actor
    }

    pub fn motion(&self) -> MotionConfig {
        self.motion
    }

    // ------------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------------

    /// Reserves a ticket before issuing an entity fetch.
    pub fn begin_sync(&self) -> SyncTicket {
        SyncTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Applies a snapshot regardless of ticket order.
    pub fn reconcile(&self, snapshots: &[EntitySnapshot]) -> ReconcileReport {
        let mut table = self.table();
        self.apply(&mut table, snapshots)
    }

    /// Applies a snapshot fetched under `ticket`, unless a newer one has
    /// already been applied.
    pub fn reconcile_ticketed(
        &self,
        ticket: SyncTicket,
        snapshots: &[EntitySnapshot],
    ) -> ReconcileReport {
        let mut table = self.table();
        if ticket.0 < table.last_applied {
            tracing::debug!(
                ticket = ticket.0,
                last_applied = table.last_applied,
                "dropping stale entity snapshot"
            );
            return ReconcileReport::stale();
        }
        table.last_applied = ticket.0;
        self.apply(&mut table, snapshots)
    }

    fn apply(&self, table: &mut Table, snapshots: &[EntitySnapshot]) -> ReconcileReport {
        // Last occurrence of an id wins.
        let mut latest: BTreeMap<&ActorId, &EntitySnapshot> = BTreeMap::new();
        for snapshot in snapshots {
            if snapshot.id.is_empty() {
                tracing::warn!("ignoring entity without id");
                continue;
            }
            latest.insert(&snapshot.id, snapshot);
        }

        let mut report = ReconcileReport::default();

        for (&id, &snapshot) in &latest {
            match table.actors.get_mut(id) {
                Some(tracked) => {
                    tracked.actor.update(snapshot);
                    report.updated.push(id.clone());
                }
                None => {
                    let visual = self.view.spawn(snapshot);
                    table.actors.insert(
                        id.clone(),
                        Tracked {
                            actor: LocalActor::spawn(snapshot),
                            visual,
                        },
                    );
                    report.created.push(id.clone());
                }
            }
        }

        let gone: Vec<ActorId> = table
            .actors
            .keys()
            .filter(|id| !latest.contains_key(id))
            .cloned()
            .collect();
        for id in gone {
            if let Some(tracked) = table.actors.remove(&id) {
                self.view.despawn(tracked.visual);
                report.removed.push(id);
            }
        }

        if let Some(snapshot) = latest.get(&self.local_actor) {
            self.status.show(snapshot);
        }

        if report.membership_changed() {
            tracing::debug!(
                created = ?report.created,
                removed = ?report.removed,
                total = table.actors.len(),
                "actor table changed"
            );
        }

        report
    }

    /// Points an actor at a new cell without touching its stats. Returns
    /// `false` for an unknown id.
    pub fn retarget(&self, id: &ActorId, cell: Position) -> bool {
        match self.table().actors.get_mut(id) {
            Some(tracked) => {
                tracked.actor.target = cell;
                true
            }
            None => false,
        }
    }

    /// Advances every animation by `dt`. Returns `true` while anything is
    /// still moving or easing.
    pub fn advance(&self, dt: Duration) -> bool {
        let seconds = dt.as_secs_f32();
        let max_step = self.motion.move_speed * seconds;
        let max_fill = self.motion.health_ease_rate * seconds;
        let threshold = self.motion.arrive_threshold;

        let mut table = self.table();
        let mut busy = false;

        for tracked in table.actors.values_mut() {
            let actor = &mut tracked.actor;
            if actor.is_settled(threshold) {
                continue;
            }

            let arrived = actor.rendered.step_toward(actor.target, max_step, threshold);
            let easing = actor.health.ease(max_fill);
            busy |= !arrived || easing;

            self.view
                .render(&tracked.visual, actor.rendered, actor.health.displayed_fill);
        }

        busy
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    pub fn actor(&self, id: &ActorId) -> Option<LocalActor> {
        self.table().actors.get(id).map(|tracked| tracked.actor.clone())
    }

    /// Actor occupying `cell` (by target position). Living actors win over
    /// corpses sharing the cell.
    pub fn actor_at(&self, cell: Position) -> Option<ActorId> {
        self.table()
            .actors
            .values()
            .filter(|tracked| tracked.actor.target == cell)
            .max_by_key(|tracked| tracked.actor.snapshot.is_alive())
            .map(|tracked| tracked.actor.id.clone())
    }

    /// Target cell of an actor.
    pub fn position_of(&self, id: &ActorId) -> Option<Position> {
        self.table().actors.get(id).map(|tracked| tracked.actor.target)
    }

    pub fn rendered_position_of(&self, id: &ActorId) -> Option<RenderPosition> {
        self.table().actors.get(id).map(|tracked| tracked.actor.rendered)
    }

    /// Whether `id` targets `cell` and has visually arrived there.
    pub fn has_arrived(&self, id: &ActorId, cell: Position) -> bool {
        self.table()
            .actors
            .get(id)
            .is_some_and(|tracked| tracked.actor.is_at(cell, self.motion.arrive_threshold))
    }

    pub fn ids(&self) -> Vec<ActorId> {
        self.table().actors.keys().cloned().collect()
    }

    pub fn actors(&self) -> Vec<LocalActor> {
        self.table()
            .actors
            .values()
            .map(|tracked| tracked.actor.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table().actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

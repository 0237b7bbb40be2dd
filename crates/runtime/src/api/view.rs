//! Collaborator seams towards the presentation layer.
//!
//! Rendering is outside this crate. The reconciler only needs to create and
//! destroy an actor's visual and to hand the local actor's stats to whatever
//! shows them.
use battle_core::EntitySnapshot;

use crate::reconciler::RenderPosition;

/// Opaque handle to a visual owned by an [`ActorView`].
///
/// Returned by `spawn`, given back exactly once to `despawn`.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct VisualHandle(u64);

impl VisualHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

pub trait ActorView: Send + Sync {
    /// Creates the visual for a newly seen actor.
    fn spawn(&self, snapshot: &EntitySnapshot) -> VisualHandle;

    /// Destroys a visual whose actor left the snapshot.
    fn despawn(&self, handle: VisualHandle);

    /// Called every animation frame for actors that are still moving or
    /// whose health bar is easing.
    fn render(&self, _handle: &VisualHandle, _position: RenderPosition, _health_fill: f32) {}
}

/// Receives the locally controlled actor's latest stats.
pub trait StatusDisplay: Send + Sync {
    fn show(&self, snapshot: &EntitySnapshot);
}

/// View that draws nothing. Useful for headless sessions.
#[derive(Debug, Default)]
pub struct HeadlessView {
    next: std::sync::atomic::AtomicU64,
}

impl ActorView for HeadlessView {
    fn spawn(&self, _snapshot: &EntitySnapshot) -> VisualHandle {
        VisualHandle::new(self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
    }

    fn despawn(&self, _handle: VisualHandle) {}
}

impl StatusDisplay for HeadlessView {
    fn show(&self, _snapshot: &EntitySnapshot) {}
}

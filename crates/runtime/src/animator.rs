//! Background frame loop that drives the reconciler's interpolation.
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::reconciler::Reconciler;

/// Running animation task; aborted when dropped.
pub struct Animator {
    task: JoinHandle<()>,
}

impl Animator {
    pub fn spawn(reconciler: Arc<Reconciler>) -> Self {
        let frame = reconciler
            .motion()
            .frame_interval
            .max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last = ticker.tick().await;
            loop {
                let now = ticker.tick().await;
                reconciler.advance(now - last);
                last = now;
            }
        });

        Self { task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        self.task.abort();
    }
}

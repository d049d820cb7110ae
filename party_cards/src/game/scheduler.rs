//! Delayed-callback primitives the session arms its countdowns with.
//!
//! A scheduler only knows about opaque [`TimerId`]s and delays. The
//! session remembers which countdown an id stands for and is re-entered
//! through `Session::handle_timeout` when the timer fires.

use std::{collections::HashMap, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};

/// Handle of an armed timer.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Capability to arm and cancel delayed callbacks.
pub trait Scheduler: Send {
    /// Arm a timer firing once after `delay`.
    fn arm(&mut self, delay: Duration) -> TimerId;

    /// Cancel an armed timer. Cancelling a fired or unknown timer is a no-op.
    fn cancel(&mut self, id: TimerId);
}

/// Scheduler with a manually advanced clock.
///
/// Nothing fires on its own. `Session::advance` moves the clock forward
/// and re-enters the session for every timer that came due, in deadline
/// order.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    pending: Vec<(TimerId, Duration)>,
    next_id: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Armed timers and their absolute deadlines.
    pub fn pending(&self) -> &[(TimerId, Duration)] {
        &self.pending
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<TimerId> {
        let (idx, &(id, deadline)) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (_, deadline))| *deadline <= until)
            .min_by_key(|(_, (id, deadline))| (*deadline, *id))?;
        self.pending.remove(idx);
        self.now = self.now.max(deadline);
        Some(id)
    }

    /// Move the clock forward without firing anything.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push((id, self.now + delay));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(pending_id, _)| *pending_id != id);
    }
}

/// Scheduler backed by tokio timers.
///
/// Each armed timer is a task that sleeps and then posts its id to the
/// channel returned by [`TokioScheduler::new`]. The owner of the receiver
/// feeds those ids back into the session.
#[derive(Debug)]
pub struct TokioScheduler {
    sender: mpsc::UnboundedSender<TimerId>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerId>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let scheduler = Self {
            sender,
            tasks: HashMap::new(),
            next_id: 0,
        };
        (scheduler, receiver)
    }
}

impl Scheduler for TokioScheduler {
    fn arm(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        // Finished tasks are dropped lazily here.
        self.tasks.retain(|_, task| !task.is_finished());

        let sender = self.sender.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if sender.send(id).is_err() {
                log::debug!("Timer {} fired after its session closed", id.0);
            }
        });
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_pop_due_in_deadline_order() {
        let mut scheduler = ManualScheduler::new();
        let late = scheduler.arm(Duration::from_secs(10));
        let early = scheduler.arm(Duration::from_secs(5));

        assert_eq!(scheduler.pop_due(Duration::from_secs(4)), None);
        assert_eq!(scheduler.pop_due(Duration::from_secs(20)), Some(early));
        assert_eq!(scheduler.now(), Duration::from_secs(5));
        assert_eq!(scheduler.pop_due(Duration::from_secs(20)), Some(late));
        assert_eq!(scheduler.now(), Duration::from_secs(10));
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn test_manual_cancel() {
        let mut scheduler = ManualScheduler::new();
        let id = scheduler.arm(Duration::from_secs(1));
        scheduler.cancel(id);
        scheduler.cancel(id);
        assert_eq!(scheduler.pop_due(Duration::from_secs(60)), None);
    }

    #[test]
    fn test_manual_arm_is_relative_to_now() {
        let mut scheduler = ManualScheduler::new();
        scheduler.set_now(Duration::from_secs(30));
        scheduler.arm(Duration::from_secs(15));
        assert_eq!(scheduler.pending()[0].1, Duration::from_secs(45));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires() {
        let (mut scheduler, mut fired) = TokioScheduler::new();
        let id = scheduler.arm(Duration::from_secs(15));

        assert_eq!(fired.recv().await, Some(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_cancel() {
        let (mut scheduler, mut fired) = TokioScheduler::new();
        let cancelled = scheduler.arm(Duration::from_secs(5));
        let kept = scheduler.arm(Duration::from_secs(10));
        scheduler.cancel(cancelled);

        assert_eq!(fired.recv().await, Some(kept));
    }
}

//! Virtual-time interval scheduler
//!
//! Regeneration and respawn are registered here instead of as ad hoc
//! platform timers. The platform layer feeds wall-clock time into
//! `advance_to`; tests feed any time they like.

use std::cell::Cell;
use std::rc::Rc;

/// Maximum catch-up firings per task per advance (e.g. after a hidden tab)
pub const MAX_CATCH_UP: u32 = 4;

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }

    /// Whether both handles share one flag
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u32);

/// What a task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Regenerate,
    Respawn,
}

#[derive(Debug, Clone)]
struct Task {
    id: TaskId,
    kind: TaskKind,
    interval_ms: f64,
    next_due: f64,
    token: CancelToken,
    cancelled: bool,
}

impl Task {
    fn live(&self) -> bool {
        !self.cancelled && !self.token.is_cancelled()
    }
}

/// Fixed-interval tasks over a monotonic clock (ms)
#[derive(Debug, Clone)]
pub struct Scheduler {
    now: f64,
    tasks: Vec<Task>,
    next_id: u32,
}

impl Scheduler {
    pub fn new(now: f64) -> Self {
        Self {
            now,
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Register a task that first fires `interval_ms` from now
    pub fn every(&mut self, kind: TaskKind, interval_ms: f64, token: CancelToken) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            kind,
            interval_ms: interval_ms.max(1.0),
            next_due: self.now + interval_ms.max(1.0),
            token,
            cancelled: false,
        });
        id
    }

    /// Cancel one task. Unknown or already-cancelled ids are a no-op.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id && t.live()) {
            Some(task) => {
                task.cancelled = true;
                true
            }
            None => false,
        }
    }

    pub fn is_live(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id && t.live())
    }

    pub fn active_count(&self, kind: TaskKind) -> usize {
        self.tasks.iter().filter(|t| t.kind == kind && t.live()).count()
    }

    /// Move the clock forward and return due firings in time order.
    /// Going backwards is ignored.
    pub fn advance_to(&mut self, now: f64) -> Vec<TaskKind> {
        self.tasks.retain(|t| t.live());
        if now <= self.now {
            return Vec::new();
        }
        self.now = now;

        let mut fired: Vec<(f64, TaskId, TaskKind)> = Vec::new();
        for task in &mut self.tasks {
            let mut count = 0;
            while task.next_due <= now && count < MAX_CATCH_UP {
                fired.push((task.next_due, task.id, task.kind));
                task.next_due += task.interval_ms;
                count += 1;
            }
            if task.next_due <= now {
                log::debug!("{:?} fell behind, skipping missed firings", task.kind);
                task.next_due = now + task.interval_ms;
            }
        }

        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.0.cmp(&b.1.0)));
        fired.into_iter().map(|(_, _, kind)| kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_on_interval() {
        let mut sched = Scheduler::new(0.0);
        sched.every(TaskKind::Respawn, 6000.0, CancelToken::new());

        assert!(sched.advance_to(5999.0).is_empty());
        assert_eq!(sched.advance_to(6000.0), vec![TaskKind::Respawn]);
        assert!(sched.advance_to(11_000.0).is_empty());
        assert_eq!(sched.advance_to(12_000.0), vec![TaskKind::Respawn]);
    }

    #[test]
    fn test_interleaved_order() {
        let mut sched = Scheduler::new(0.0);
        sched.every(TaskKind::Respawn, 3000.0, CancelToken::new());
        sched.every(TaskKind::Regenerate, 2000.0, CancelToken::new());

        let fired = sched.advance_to(4000.0);
        assert_eq!(
            fired,
            vec![TaskKind::Regenerate, TaskKind::Respawn, TaskKind::Regenerate]
        );
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut sched = Scheduler::new(0.0);
        sched.every(TaskKind::Regenerate, 100.0, CancelToken::new());
        assert_eq!(sched.advance_to(10_000.0).len(), MAX_CATCH_UP as usize);
        // Rescheduled from the new now, not from the backlog
        assert!(sched.advance_to(10_050.0).is_empty());
        assert_eq!(sched.advance_to(10_100.0).len(), 1);
    }

    #[test]
    fn test_token_cancels_task() {
        let mut sched = Scheduler::new(0.0);
        let token = CancelToken::new();
        sched.every(TaskKind::Respawn, 1000.0, token.clone());
        assert_eq!(sched.active_count(TaskKind::Respawn), 1);

        token.cancel();
        token.cancel();
        assert_eq!(sched.active_count(TaskKind::Respawn), 0);
        assert!(sched.advance_to(5000.0).is_empty());
    }

    #[test]
    fn test_token_identity() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(token.same_as(&clone));
        assert!(!token.same_as(&CancelToken::new()));

        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancel_by_id_is_idempotent() {
        let mut sched = Scheduler::new(0.0);
        let id = sched.every(TaskKind::Regenerate, 1000.0, CancelToken::new());
        assert!(sched.cancel(id));
        assert!(!sched.cancel(id));
        assert!(!sched.is_live(id));
    }

    #[test]
    fn test_time_never_goes_backwards() {
        let mut sched = Scheduler::new(1000.0);
        sched.every(TaskKind::Regenerate, 500.0, CancelToken::new());
        assert!(sched.advance_to(200.0).is_empty());
        assert_eq!(sched.now(), 1000.0);
        assert_eq!(sched.advance_to(1500.0), vec![TaskKind::Regenerate]);
    }
}

//! Deferred, cancellable actions
//!
//! Replaces fire-after-N-seconds callbacks with an explicit queue driven
//! by the same frame delta as everything else.

/// Token for a scheduled action; pass it to [`Scheduler::cancel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

/// Actions the game flow defers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Death animation finished; the player is now dead
    ResolveDeath,
    RestartLevel,
    GameOver,
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    handle: TaskHandle,
    due: f64,
    action: DeferredAction,
}

/// Single-threaded timer queue
#[derive(Debug, Default)]
pub struct Scheduler {
    clock: f64,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds advanced so far
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Run `action` once `delay` seconds have elapsed
    pub fn schedule(&mut self, delay: f32, action: DeferredAction) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        let due = self.clock + f64::from(delay.max(0.0));
        self.tasks.push(ScheduledTask { handle, due, action });
        log::debug!("Scheduled {action:?} in {delay}s ({handle:?})");
        handle
    }

    /// Drop a pending action. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        before != self.tasks.len()
    }

    pub fn cancel_all(&mut self) {
        if !self.tasks.is_empty() {
            log::debug!("Cancelling {} pending tasks", self.tasks.len());
        }
        self.tasks.clear();
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Advance the clock and return every action that came due,
    /// earliest first (ties in scheduling order)
    pub fn advance(&mut self, dt: f32) -> Vec<DeferredAction> {
        self.clock += f64::from(dt.max(0.0));

        let clock = self.clock;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|t| t.due <= clock);
        self.tasks = pending;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.handle.0.cmp(&b.handle.0)));
        due.into_iter().map(|t| t.action).collect()
    }
}

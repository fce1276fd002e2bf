//! Rebuild scheduling
//!
//! Change triggers can arrive from any thread, at any rate, while a build
//! is in flight. The scheduler serializes runs and coalesces triggers with
//! a three-state machine:
//!
//! - `Idle`: no run in flight; a trigger starts one on the calling thread
//! - `Running`: a run in flight; a trigger downgrades to a pending flag
//! - `RunningPending`: run in flight and one follow-up owed; further
//!   triggers are absorbed
//!
//! However many triggers land mid-run, exactly one follow-up run happens,
//! and it starts from scratch, so it sees every change the burst reported.
//! The state lock is never held while the routine runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::KilnResult;
use crate::watcher::Trigger;

/// One schedulable build routine.
pub trait Rebuild: Send {
    /// Run one build from scratch. `trigger` is the callback new watch
    /// subscriptions should fire.
    fn rebuild(&mut self, trigger: &Trigger) -> KilnResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
    RunningPending,
}

pub struct RebuildScheduler<B> {
    state: Mutex<RunState>,
    routine: Mutex<B>,
    stopped: AtomicBool,
}

impl<B: Rebuild + 'static> RebuildScheduler<B> {
    pub fn new(routine: B) -> Self {
        Self {
            state: Mutex::new(RunState::Idle),
            routine: Mutex::new(routine),
            stopped: AtomicBool::new(false),
        }
    }

    /// The trigger to hand out to watch subscriptions.
    pub fn trigger_fn(self: &Arc<Self>) -> Trigger {
        let scheduler = Arc::clone(self);
        Arc::new(move || scheduler.trigger())
    }

    /// Request a run. Fire-and-forget: if this thread wins the idle state
    /// it runs the routine (and any follow-ups) to completion; otherwise
    /// the in-flight run picks the request up. Run errors are reported
    /// through the routine's own event stream.
    pub fn trigger(self: &Arc<Self>) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        if !self.begin() {
            return;
        }
        let trigger = self.trigger_fn();
        loop {
            {
                let mut routine = self.routine.lock().unwrap();
                // A stop can land while this thread waits for the lock,
                // with teardown already through it; running now would
                // repopulate the drained watch set.
                if !self.stopped.load(Ordering::SeqCst) {
                    let _ = routine.rebuild(&trigger);
                }
            }
            if !self.proceed() {
                break;
            }
        }
    }

    /// Request a run and surface the first iteration's result. Used for
    /// the eager build at activation, where a failure must reach the
    /// caller.
    pub fn run_blocking(self: &Arc<Self>) -> KilnResult<()> {
        if !self.begin() {
            // Someone else is mid-run and now owes a follow-up.
            return Ok(());
        }
        let trigger = self.trigger_fn();
        let mut first: Option<KilnResult<()>> = None;
        loop {
            {
                let mut routine = self.routine.lock().unwrap();
                if !self.stopped.load(Ordering::SeqCst) {
                    let result = routine.rebuild(&trigger);
                    if first.is_none() {
                        first = Some(result);
                    }
                }
            }
            if !self.proceed() {
                break;
            }
        }
        first.unwrap_or(Ok(()))
    }

    /// Refuse new runs. In-flight runs finish their current iteration and
    /// stop without honoring the pending flag; a claimed run that has not
    /// started yet is cancelled.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Run `f` against the routine once no run is in flight.
    pub fn with_routine<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let mut routine = self.routine.lock().unwrap();
        f(&mut routine)
    }

    pub fn is_idle(&self) -> bool {
        *self.state.lock().unwrap() == RunState::Idle
    }

    /// Claim the executor role. True means the caller must run the
    /// routine; false means the request was folded into the in-flight run.
    fn begin(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        match *state {
            RunState::Idle => {
                *state = RunState::Running;
                true
            }
            RunState::Running => {
                *state = RunState::RunningPending;
                false
            }
            RunState::RunningPending => false,
        }
    }

    /// Resolve the state after a run. True means triggers arrived mid-run
    /// and the executor owes another iteration.
    fn proceed(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if self.stopped.load(Ordering::SeqCst) {
            *state = RunState::Idle;
            return false;
        }
        match *state {
            RunState::RunningPending => {
                *state = RunState::Running;
                true
            }
            _ => {
                *state = RunState::Idle;
                false
            }
        }
    }
}

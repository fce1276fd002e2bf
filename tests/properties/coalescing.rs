//! Property tests for rebuild trigger coalescing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use kiln::{KilnResult, Rebuild, RebuildScheduler, Trigger};

/// Routine that signals when a run starts and blocks until released.
struct GatedRoutine {
    runs: Arc<AtomicUsize>,
    started: Sender<()>,
    gate: Receiver<()>,
}

impl Rebuild for GatedRoutine {
    fn rebuild(&mut self, _trigger: &Trigger) -> KilnResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.started.send(()).unwrap();
        self.gate.recv().unwrap();
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Any burst of triggers landing while a run is in flight
    /// produces exactly one follow-up run, never one per trigger.
    #[test]
    fn property_trigger_bursts_coalesce_to_one_follow_up(burst in 1usize..32) {
        let runs = Arc::new(AtomicUsize::new(0));
        let (started_tx, started_rx) = channel();
        let (gate_tx, gate_rx) = channel();
        let scheduler = Arc::new(RebuildScheduler::new(GatedRoutine {
            runs: Arc::clone(&runs),
            started: started_tx,
            gate: gate_rx,
        }));

        let worker = {
            let scheduler = Arc::clone(&scheduler);
            thread::spawn(move || scheduler.trigger())
        };

        started_rx.recv().unwrap();
        for _ in 0..burst {
            scheduler.trigger();
        }
        gate_tx.send(()).unwrap();

        // The follow-up begins once, regardless of burst size.
        started_rx.recv().unwrap();
        gate_tx.send(()).unwrap();
        worker.join().unwrap();

        prop_assert_eq!(runs.load(Ordering::SeqCst), 2);
        prop_assert!(scheduler.is_idle());
    }

    /// PROPERTY: Triggers arriving strictly between runs each get their
    /// own run; nothing is lost while idle.
    #[test]
    fn property_sequential_triggers_each_run(count in 1usize..16) {
        let runs = Arc::new(AtomicUsize::new(0));

        struct CountingRoutine {
            runs: Arc<AtomicUsize>,
        }
        impl Rebuild for CountingRoutine {
            fn rebuild(&mut self, _trigger: &Trigger) -> KilnResult<()> {
                self.runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let scheduler = Arc::new(RebuildScheduler::new(CountingRoutine {
            runs: Arc::clone(&runs),
        }));

        for _ in 0..count {
            scheduler.trigger();
        }

        prop_assert_eq!(runs.load(Ordering::SeqCst), count);
        prop_assert!(scheduler.is_idle());
    }
}

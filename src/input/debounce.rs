//! Single-slot, last-write-wins debounce timer.

use crate::runtime::{self, AsyncHandle};
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use std::{
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard, Weak,
    },
    thread,
    time::{Duration, Instant},
};

/// Callback that receives the debounced value
pub type DebounceCallback<T> = Arc<dyn Fn(T) + Send + Sync>;

struct Slot<T> {
    generation: u64,
    pending: Option<T>,
    timer: Option<Box<dyn AsyncHandle>>,
}

/// Deadline for the value scheduled as `generation`
#[derive(Clone, Copy)]
struct Arm {
    generation: u64,
    deadline: Instant,
}

/// Coalesces bursts of values into a single callback after a quiet period.
///
/// Every [`Debouncer::schedule`] supersedes the running timer; only a timer
/// whose generation is still current when it wakes takes the pending value,
/// so the callback sees the last scheduled value exactly once.
///
/// Inside a Tokio runtime the timer is a Tokio task. Elsewhere one worker
/// thread per debouncer is started on first use and re-armed over a channel,
/// so a burst never costs more than that one thread. Dropping the debouncer
/// fires any pending value and stops the worker.
pub struct Debouncer<T> {
    window: Duration,
    callback: DebounceCallback<T>,
    slot: Arc<Mutex<Slot<T>>>,
    worker: Mutex<Option<Sender<Arm>>>,
    workers_started: AtomicUsize,
}

fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    // A panicking callback never holds the lock, so the data is still consistent.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs the callback if `generation` is still the latest schedule
fn fire<T>(slot: &Mutex<Slot<T>>, callback: &DebounceCallback<T>, generation: u64) {
    let value = {
        let mut slot = lock(slot);
        if slot.generation != generation {
            return;
        }
        slot.timer = None;
        slot.pending.take()
    };

    if let Some(value) = value {
        log::debug!("debounce window elapsed; firing generation {generation}");
        callback(value);
    }
}

/// Takes the pending value out and fires it, invalidating any running timer
fn flush_slot<T>(slot: &Mutex<Slot<T>>, callback: &DebounceCallback<T>) -> bool {
    let value = {
        let mut slot = lock(slot);
        slot.generation += 1;
        if let Some(timer) = slot.timer.take() {
            timer.cancel();
        }
        slot.pending.take()
    };

    match value {
        Some(value) => {
            callback(value);
            true
        }
        None => false,
    }
}

/// Timer loop for hosts without an async runtime. Sleeps until the latest
/// deadline, and exits once the debouncer (and with it the sender) is gone.
fn run_worker<T>(
    arms: crossbeam_channel::Receiver<Arm>,
    slot: Weak<Mutex<Slot<T>>>,
    callback: DebounceCallback<T>,
) {
    let mut armed: Option<Arm> = None;

    loop {
        let next = match &armed {
            Some(arm) => arms.recv_deadline(arm.deadline),
            None => arms.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match next {
            Ok(arm) => armed = Some(arm),
            Err(RecvTimeoutError::Timeout) => {
                let Some(arm) = armed.take() else { continue };
                let Some(slot) = slot.upgrade() else { break };
                fire(&slot, &callback, arm.generation);
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    log::debug!("debounce worker exiting - channel disconnected");
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(window: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            window,
            callback: Arc::new(callback),
            slot: Arc::new(Mutex::new(Slot {
                generation: 0,
                pending: None,
                timer: None,
            })),
            worker: Mutex::new(None),
            workers_started: AtomicUsize::new(0),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replaces the pending value and restarts the quiet period
    pub fn schedule(&self, value: T) {
        let generation = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.pending = Some(value);
            if let Some(timer) = slot.timer.take() {
                timer.cancel();
            }
            slot.generation
        };

        let slot = self.slot.clone();
        let callback = self.callback.clone();
        let window = self.window;

        let task = runtime::spawn(async move {
            runtime::async_delay(window).await;
            fire(&slot, &callback, generation);
        });

        match task {
            Some(handle) => {
                let mut slot = lock(&self.slot);
                // A newer schedule may have raced in while spawning
                if slot.generation == generation {
                    slot.timer = Some(handle);
                } else {
                    handle.cancel();
                }
            }
            None => self.arm_worker(Arm {
                generation,
                deadline: Instant::now() + window,
            }),
        }
    }

    fn arm_worker(&self, arm: Arm) {
        let mut worker = lock(&self.worker);

        let arm = match worker.as_ref().map(|sender| sender.send(arm)) {
            Some(Ok(())) => return,
            // The worker died with the arm still in hand; start a fresh one
            Some(Err(failed)) => failed.into_inner(),
            None => arm,
        };

        let (sender, arms) = unbounded();
        let slot = Arc::downgrade(&self.slot);
        let callback = self.callback.clone();
        let spawned = thread::Builder::new()
            .name("meshmap-debounce".to_string())
            .spawn(move || run_worker(arms, slot, callback));

        match spawned {
            Ok(_) => {
                self.workers_started.fetch_add(1, Ordering::Relaxed);
                // The receiver is alive in the new thread
                let _ = sender.send(arm);
                *worker = Some(sender);
            }
            Err(e) => {
                log::warn!("failed to start debounce worker; value waits for flush: {}", e);
                *worker = None;
            }
        }
    }

    /// Fires the pending value now instead of waiting for the timer
    pub fn flush(&self) -> bool {
        flush_slot(&self.slot, &self.callback)
    }

    /// Drops the pending value without firing
    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        slot.pending = None;
        if let Some(timer) = slot.timer.take() {
            timer.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.slot).pending.is_some()
    }

    /// Number of timer threads this debouncer has started
    #[cfg(test)]
    pub(crate) fn workers_started(&self) -> usize {
        self.workers_started.load(Ordering::Relaxed)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if flush_slot(&self.slot, &self.callback) {
            log::debug!("debouncer dropped; fired pending value");
        }
    }
}

impl<T> fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v| sink.lock().unwrap().push(v))
    }

    #[tokio::test]
    async fn test_burst_coalesces_to_last_value() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(30), callback);

        for v in 1..=5 {
            debouncer.schedule(v);
        }
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(*seen.lock().unwrap(), vec![5]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test]
    async fn test_reset_restarts_window() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(60), callback);

        debouncer.schedule(1);
        tokio::time::sleep(Duration::from_millis(30)).await;
        debouncer.schedule(2);
        tokio::time::sleep(Duration::from_millis(40)).await;
        // 70ms after the first schedule, but only 40ms after the reset
        assert!(seen.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_separate_bursts_fire_separately() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(20), callback);

        debouncer.schedule(1);
        tokio::time::sleep(Duration::from_millis(80)).await;
        debouncer.schedule(2);
        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_flush_and_cancel() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(20), callback);

        debouncer.schedule(7);
        assert!(debouncer.flush());
        assert!(!debouncer.flush());

        debouncer.schedule(8);
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[test]
    fn test_without_tokio_runtime() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(10), callback);

        debouncer.schedule(1);
        debouncer.schedule(2);
        std::thread::sleep(Duration::from_millis(150));

        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn test_burst_reuses_one_timer_thread() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(50), callback);

        for v in 0..300 {
            debouncer.schedule(v);
        }
        assert_eq!(debouncer.workers_started(), 1);

        std::thread::sleep(Duration::from_millis(250));
        assert_eq!(*seen.lock().unwrap(), vec![299]);

        debouncer.schedule(300);
        std::thread::sleep(Duration::from_millis(250));
        assert_eq!(*seen.lock().unwrap(), vec![299, 300]);
        assert_eq!(debouncer.workers_started(), 1);
    }

    #[test]
    fn test_drop_fires_pending_value() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_secs(60), callback);

        debouncer.schedule(4);
        debouncer.schedule(5);
        drop(debouncer);

        assert_eq!(*seen.lock().unwrap(), vec![5]);
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_tokio_timer_starts_no_thread() {
        let (seen, callback) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(20), callback);

        for v in 0..50 {
            debouncer.schedule(v);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(*seen.lock().unwrap(), vec![49]);
        assert_eq!(debouncer.workers_started(), 0);
    }
}

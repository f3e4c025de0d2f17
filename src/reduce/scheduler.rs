/*! Bounded-concurrency scheduler

Dispatches [WorkUnit]s to workers running on their own threads, never exceeding a ceiling of live workers.

- The backlog is a stack: the most recently submitted unit is the next one launched.
- At most one worker is launched per [Scheduler::tick].
- Each worker owns its unit. Workers signal their completion on a channel (even when they panic),
  and [Scheduler::drain] waits on that channel with a bounded timeout.
- There is no retry and no per-worker timeout. Failed units are logged and reported in [Report::dropped].
!*/
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};

use super::worker::{BatchWorker, WorkUnit};
use crate::error::Error;

pub const DEFAULT_CEILING: usize = 8;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something that turns a [WorkUnit] into an output file.
pub trait Worker: Send + Sync + 'static {
    fn work(&self, unit: WorkUnit) -> Result<PathBuf, Error>;
}

impl Worker for BatchWorker {
    fn work(&self, unit: WorkUnit) -> Result<PathBuf, Error> {
        self.process(&unit)
    }
}

/// Outcome of a scheduler run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    /// Number of units whose worker succeeded.
    pub completed: usize,
    /// Names of units whose worker failed. Their output is missing.
    pub dropped: Vec<String>,
}

/// Sends the ticket of its worker when dropped, which also happens on unwinding.
struct CompletionSignal {
    ticket: u64,
    tx: Sender<u64>,
}

impl Drop for CompletionSignal {
    fn drop(&mut self) {
        // the receiver lives as long as the scheduler, which outlives its workers
        let _ = self.tx.send(self.ticket);
    }
}

struct Running {
    name: String,
    handle: JoinHandle<Result<PathBuf, Error>>,
}

pub struct Scheduler<W: Worker> {
    worker: Arc<W>,
    ceiling: usize,
    poll_interval: Duration,
    backlog: Vec<WorkUnit>,
    live: HashMap<u64, Running>,
    next_ticket: u64,
    done_tx: Sender<u64>,
    done_rx: Receiver<u64>,
    report: Report,
}

impl<W: Worker> Scheduler<W> {
    /// Create a new scheduler. A `ceiling` of 0 is an error.
    pub fn new(worker: W, ceiling: usize, poll_interval: Duration) -> Result<Self, Error> {
        if ceiling == 0 {
            return Err(Error::Config(
                "number of concurrent workers must be at least 1".to_string(),
            ));
        }
        let (done_tx, done_rx) = mpsc::channel();
        Ok(Self {
            worker: Arc::new(worker),
            ceiling,
            poll_interval,
            backlog: Vec::new(),
            live: HashMap::with_capacity(ceiling),
            next_ticket: 0,
            done_tx,
            done_rx,
            report: Report::default(),
        })
    }

    /// Number of currently running workers.
    pub fn live(&self) -> usize {
        self.live.len()
    }

    /// Number of units waiting to be launched.
    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    /// Queue a unit and run a scheduling tick.
    pub fn submit(&mut self, unit: WorkUnit) -> Result<(), Error> {
        self.backlog.push(unit);
        self.tick()
    }

    /// Remove finished workers, then launch one unit if there is room for it.
    pub fn tick(&mut self) -> Result<(), Error> {
        self.prune();
        if self.live.len() < self.ceiling {
            if let Some(unit) = self.backlog.pop() {
                self.launch(unit)?;
            }
        }
        Ok(())
    }

    /// Launch everything left in the backlog and wait for all workers to finish.
    pub fn drain(mut self) -> Result<Report, Error> {
        info!("All files read, processing remaining content...");
        while !self.backlog.is_empty() {
            self.tick()?;
            if self.live.len() >= self.ceiling {
                self.wait();
            }
        }

        info!("Waiting for all workers to finish...");
        while !self.live.is_empty() {
            self.wait();
        }

        Ok(self.report)
    }

    fn launch(&mut self, unit: WorkUnit) -> Result<(), Error> {
        let ticket = self.next_ticket;
        self.next_ticket += 1;

        let name = unit.name.clone();
        let signal = CompletionSignal {
            ticket,
            tx: self.done_tx.clone(),
        };
        let worker = Arc::clone(&self.worker);
        if unit.sequence % 10 == 0 {
            info!("started worker for {}", name);
        } else {
            debug!("started worker for {}", name);
        }

        let handle = thread::Builder::new()
            .name(format!("worker_{}", name))
            .spawn(move || {
                let _signal = signal;
                worker.work(unit)
            })?;

        self.live.insert(ticket, Running { name, handle });
        Ok(())
    }

    /// Reap every worker that has already signaled its completion.
    fn prune(&mut self) {
        while let Ok(ticket) = self.done_rx.try_recv() {
            self.reap(ticket);
        }
    }

    /// Block until a worker completes or the poll interval elapses.
    fn wait(&mut self) {
        match self.done_rx.recv_timeout(self.poll_interval) {
            Ok(ticket) => {
                self.reap(ticket);
                self.prune();
            }
            Err(RecvTimeoutError::Timeout) => (),
            // unreachable since we hold a sender
            Err(RecvTimeoutError::Disconnected) => (),
        }
    }

    fn reap(&mut self, ticket: u64) {
        let running = match self.live.remove(&ticket) {
            Some(r) => r,
            None => return,
        };
        match running.handle.join() {
            Ok(Ok(path)) => {
                debug!("{}: done ({:?})", running.name, path);
                self.report.completed += 1;
            }
            Ok(Err(e)) => {
                error!("{}: worker failed, no output written: {}", running.name, e);
                self.report.dropped.push(running.name);
            }
            Err(_) => {
                error!("{}: worker panicked, no output written", running.name);
                self.report.dropped.push(running.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    fn unit(name: &str, sequence: u64) -> WorkUnit {
        WorkUnit::new(name.to_string(), sequence, String::new())
    }

    /// Records concurrency and launch order. Fails on units whose content is "fail",
    /// panics on "panic".
    #[derive(Default)]
    struct Recorder {
        running: AtomicUsize,
        max_running: AtomicUsize,
        order: Mutex<Vec<String>>,
        delay: Duration,
    }

    impl Worker for Arc<Recorder> {
        fn work(&self, unit: WorkUnit) -> Result<PathBuf, Error> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            self.order.lock().unwrap().push(unit.name.clone());
            thread::sleep(self.delay);
            self.running.fetch_sub(1, Ordering::SeqCst);
            match unit.content.as_str() {
                "fail" => Err(Error::Custom("failure".to_string())),
                "panic" => panic!("worker panic"),
                _ => Ok(PathBuf::from(unit.name)),
            }
        }
    }

    fn recorder(delay_ms: u64) -> Arc<Recorder> {
        Arc::new(Recorder {
            delay: Duration::from_millis(delay_ms),
            ..Default::default()
        })
    }

    #[test]
    fn zero_ceiling() {
        assert!(Scheduler::new(recorder(0), 0, DEFAULT_POLL_INTERVAL).is_err());
    }

    #[test]
    fn ceiling_is_respected() {
        let p = recorder(20);
        let mut s = Scheduler::new(p.clone(), 3, Duration::from_millis(5)).unwrap();
        for i in 0..20 {
            s.submit(unit(&format!("ListRecords.{}", i), i)).unwrap();
            assert!(s.live() <= 3);
        }
        let report = s.drain().unwrap();
        assert_eq!(report.completed, 20);
        assert!(report.dropped.is_empty());
        assert!(p.max_running.load(Ordering::SeqCst) <= 3);
        assert_eq!(p.order.lock().unwrap().len(), 20);
    }

    #[test]
    fn backlog_is_lifo() {
        let p = recorder(200);
        let mut s = Scheduler::new(p.clone(), 1, Duration::from_millis(5)).unwrap();
        s.submit(unit("a", 1)).unwrap();
        s.submit(unit("b", 2)).unwrap();
        s.submit(unit("c", 3)).unwrap();
        assert_eq!(s.live(), 1);
        assert_eq!(s.pending(), 2);
        s.drain().unwrap();
        assert_eq!(*p.order.lock().unwrap(), vec!["a", "c", "b"]);
    }

    #[test_log::test]
    fn failures_are_dropped() {
        let p = recorder(1);
        let mut s = Scheduler::new(p, 2, Duration::from_millis(5)).unwrap();
        s.submit(WorkUnit::new("ok".to_string(), 1, String::new()))
            .unwrap();
        s.submit(WorkUnit::new("bad".to_string(), 2, "fail".to_string()))
            .unwrap();
        s.submit(WorkUnit::new("worse".to_string(), 3, "panic".to_string()))
            .unwrap();
        let mut report = s.drain().unwrap();
        report.dropped.sort();
        assert_eq!(report.completed, 1);
        assert_eq!(report.dropped, vec!["bad", "worse"]);
    }
}

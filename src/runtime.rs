//! Bounded worker pool for cooling many halos in parallel.
//!
//! Each worker owns a deep copy of the engine, so interpolation contexts are
//! never shared. Halos are moved into the pool with their job and handed back
//! with the reply, so no two workers can touch the same halo.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::cooling::GasCooling;
use crate::error::{CoolingError, CoolingResult, RuntimeError};
use crate::halo::Subhalo;
use crate::interpolation::EvalContext;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued jobs.
    pub queue_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(2, usize::from),
            queue_capacity: 1024,
        }
    }
}

/// A cooled halo and the rate computed for it.
pub type CoolingOutcome = (Subhalo, f64);

enum Job {
    Cool {
        halo: Subhalo,
        z: f64,
        deltat: f64,
        reply: Sender<CoolingOutcome>,
    },

    #[cfg(test)]
    Sleep {
        duration: Duration,
        reply: Sender<()>,
    },
}

struct WorkerPool {
    tx: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl WorkerPool {
    fn start(workers: usize, queue_capacity: usize, engine: &GasCooling) -> Result<Self, RuntimeError> {
        let workers = workers.max(1);
        let queue_capacity = queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let engine = engine.clone();
            let handle = thread::Builder::new()
                .name(format!("halo-cooling-{idx}"))
                .spawn(move || {
                    let mut ctx = EvalContext::new();
                    loop {
                        match rx.recv() {
                            Ok(Job::Cool {
                                mut halo,
                                z,
                                deltat,
                                reply,
                            }) => {
                                let rate = engine.cooling_rate_with(&mut ctx, &mut halo, z, deltat);
                                let _ = reply.send((halo, rate));
                            }
                            Err(_) => break,

                            #[cfg(test)]
                            Ok(Job::Sleep { duration, reply }) => {
                                thread::sleep(duration);
                                let _ = reply.send(());
                            }
                        }
                    }
                })
                .map_err(|e| RuntimeError::Spawn {
                    message: e.to_string(),
                })?;
            handles.push(handle);
        }

        log::debug!("started {workers} cooling workers, queue capacity {queue_capacity}");
        Ok(Self {
            tx,
            workers: handles,
            queue_capacity,
        })
    }

    fn try_submit(&self, job: Job) -> Result<(), RuntimeError> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(RuntimeError::QueueFull {
                capacity: self.queue_capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(RuntimeError::Disconnected),
        }
    }

    fn submit_blocking(&self, job: Job) -> Result<(), RuntimeError> {
        self.tx.send(job).map_err(|_| RuntimeError::Disconnected)
    }

    fn shutdown(self) {
        // Closing the channel lets workers drain queued jobs, then exit.
        drop(self.tx);
        for handle in self.workers {
            let _ = handle.join();
        }
    }
}

/// Handle returned by [`CoolingRuntime::submit`].
pub struct CoolingHandle {
    rx: Receiver<CoolingOutcome>,
}

impl CoolingHandle {
    /// Waits for the halo to be cooled.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Disconnected` if the worker went away without replying.
    pub fn join(self) -> CoolingResult<CoolingOutcome> {
        self.rx
            .recv()
            .map_err(|_| CoolingError::Runtime(RuntimeError::Disconnected))
    }

    /// Waits for the halo to be cooled, giving up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Timeout` if no reply arrived in time and
    /// `RuntimeError::Disconnected` if the worker went away without replying.
    pub fn join_timeout(self, timeout: Duration) -> CoolingResult<CoolingOutcome> {
        self.rx.recv_timeout(timeout).map_err(|err| {
            CoolingError::Runtime(match err {
                RecvTimeoutError::Timeout => RuntimeError::Timeout {
                    duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                },
                RecvTimeoutError::Disconnected => RuntimeError::Disconnected,
            })
        })
    }
}

/// Parallel cooling runtime.
pub struct CoolingRuntime {
    engine: GasCooling,
    pool: WorkerPool,
}

impl CoolingRuntime {
    /// Starts `config.workers` workers, each with its own copy of `engine`.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Spawn` if a worker thread cannot be started.
    pub fn new(engine: GasCooling, config: &RuntimeConfig) -> CoolingResult<Self> {
        let pool = WorkerPool::start(config.workers, config.queue_capacity, &engine)?;
        Ok(Self { engine, pool })
    }

    /// Queues one halo for cooling at redshift `z` over `deltat` Gyr.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::QueueFull` if the queue is at capacity and
    /// `RuntimeError::Disconnected` if the workers are gone.
    pub fn submit(&self, halo: Subhalo, z: f64, deltat: f64) -> CoolingResult<CoolingHandle> {
        let (reply, rx) = bounded::<CoolingOutcome>(1);
        self.pool.try_submit(Job::Cool {
            halo,
            z,
            deltat,
            reply,
        })?;
        Ok(CoolingHandle { rx })
    }

    /// Cools every halo and returns them with their rates, in input order.
    ///
    /// Blocks while the queue is full instead of failing.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::Disconnected` if the workers are gone.
    pub fn cool_batch(
        &self,
        halos: Vec<Subhalo>,
        z: f64,
        deltat: f64,
    ) -> CoolingResult<Vec<CoolingOutcome>> {
        let mut handles = Vec::with_capacity(halos.len());
        for halo in halos {
            let (reply, rx) = bounded::<CoolingOutcome>(1);
            self.pool.submit_blocking(Job::Cool {
                halo,
                z,
                deltat,
                reply,
            })?;
            handles.push(CoolingHandle { rx });
        }
        handles.into_iter().map(CoolingHandle::join).collect()
    }

    /// The engine the workers were cloned from.
    #[must_use]
    pub const fn engine(&self) -> &GasCooling {
        &self.engine
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.workers.len()
    }

    #[cfg(test)]
    fn submit_sleep(&self, duration: Duration) -> Result<Receiver<()>, RuntimeError> {
        let (tx, rx) = bounded::<()>(1);
        self.pool.try_submit(Job::Sleep { duration, reply: tx })?;
        Ok(rx)
    }
}

impl Drop for CoolingRuntime {
    fn drop(&mut self) {
        let pool = std::mem::replace(
            &mut self.pool,
            WorkerPool {
                tx: bounded::<Job>(1).0,
                workers: Vec::new(),
                queue_capacity: 1,
            },
        );
        pool.shutdown();
    }
}

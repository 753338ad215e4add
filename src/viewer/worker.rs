//! Background worker for replay fetches.
//!
//! The worker thread owns the replay source. The controller sends requests
//! tagged with a generation number and drains results on its own thread.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::fetch::{self, FetchRequest, Fetched};
use super::replay::ReplaySource;
use crate::util::{Error, Result};

/// Commands sent from the controller to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    /// Fetch data for a new selection.
    Fetch { request: FetchRequest, generation: u64 },
    /// Find the vertex under a preview pixel.
    Pick { event: u32, x: u32, y: u32 },
    /// Stop the worker thread.
    Stop,
}

/// Results sent from the worker back to the controller.
#[derive(Debug)]
pub enum WorkerResult {
    Fetched {
        generation: u64,
        result: Result<Fetched>,
    },
    Picked {
        vertex: u32,
        instance: u32,
    },
}

/// Handle to communicate with the background worker.
pub struct FetchWorker {
    tx: Sender<WorkerCommand>,
    rx: Receiver<WorkerResult>,
    handle: Option<JoinHandle<()>>,
}

impl FetchWorker {
    /// Spawn a worker thread that takes ownership of `source`.
    pub fn spawn(source: Box<dyn ReplaySource>) -> Self {
        let (cmd_tx, cmd_rx) = channel::<WorkerCommand>();
        let (res_tx, res_rx) = channel::<WorkerResult>();

        let handle = thread::Builder::new()
            .name("mesh-fetch".into())
            .spawn(move || worker_loop(source, cmd_rx, res_tx))
            .map_err(|e| warn!("Failed to spawn fetch worker: {}", e))
            .ok();

        Self {
            tx: cmd_tx,
            rx: res_rx,
            handle,
        }
    }

    /// Queue a fetch. Older queued fetches are superseded.
    pub fn request(&self, request: FetchRequest, generation: u64) -> Result<()> {
        self.tx
            .send(WorkerCommand::Fetch { request, generation })
            .map_err(|_| Error::WorkerDisconnected)
    }

    pub fn pick(&self, event: u32, x: u32, y: u32) -> Result<()> {
        self.tx
            .send(WorkerCommand::Pick { event, x, y })
            .map_err(|_| Error::WorkerDisconnected)
    }

    /// Check for ready results (non-blocking).
    pub fn try_recv(&self) -> Option<WorkerResult> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next result.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<WorkerResult>> {
        match self.rx.recv_timeout(timeout) {
            Ok(res) => Ok(Some(res)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::WorkerDisconnected),
        }
    }

    /// Stop the worker and wait for it to finish.
    pub fn stop(&mut self) {
        let _ = self.tx.send(WorkerCommand::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FetchWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(mut source: Box<dyn ReplaySource>, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResult>) {
    let mut pending = None;

    loop {
        let cmd = match pending.take() {
            Some(cmd) => cmd,
            None => match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => break,
            },
        };

        match cmd {
            WorkerCommand::Fetch { request, generation } => {
                let (request, generation, next) = drain_to_latest(&rx, request, generation);
                pending = next;

                debug!("Fetching generation {}", generation);
                let result = fetch::execute(source.as_mut(), request);
                if tx.send(WorkerResult::Fetched { generation, result }).is_err() {
                    break;
                }
            }

            WorkerCommand::Pick { event, x, y } => {
                if let Some((vertex, instance)) = source.pick_vertex(event, x, y) {
                    if tx.send(WorkerResult::Picked { vertex, instance }).is_err() {
                        break;
                    }
                }
            }

            WorkerCommand::Stop => break,
        }
    }
}

/// Drain queued fetches, keeping only the latest. A non-fetch command stops
/// the drain and is handed back so it still runs, in order.
fn drain_to_latest(
    rx: &Receiver<WorkerCommand>,
    mut request: FetchRequest,
    mut generation: u64,
) -> (FetchRequest, u64, Option<WorkerCommand>) {
    while let Ok(cmd) = rx.try_recv() {
        match cmd {
            WorkerCommand::Fetch { request: r, generation: g } => {
                debug!("Generation {} superseded by {}", generation, g);
                request = r;
                generation = g;
            }
            other => return (request, generation, Some(other)),
        }
    }
    (request, generation, None)
}

//! Runs a conversion off the calling thread so an interactive front end
//! stays responsive while an external tool works.

use crate::{
    registry::Registry,
    request::{ConversionRequest, ConversionResult},
    tool::Backend,
};
use anyhow::anyhow;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::debug;

/// Handle to one conversion running on its own thread.
pub struct BackgroundJob {
    rx: Receiver<ConversionResult>,
    handle: Option<JoinHandle<()>>,
    done: Option<ConversionResult>,
}

pub fn spawn<B: Backend + 'static>(
    registry: Arc<Registry<B>>,
    req: ConversionRequest,
) -> BackgroundJob {
    let (tx, rx) = mpsc::channel();
    let handle = std::thread::spawn(move || {
        debug!("background {} started", req.kind);
        let result = registry.execute(&req);
        // The receiver may already be gone; nothing to report to then.
        let _ = tx.send(result);
    });
    BackgroundJob {
        rx,
        handle: Some(handle),
        done: None,
    }
}

impl BackgroundJob {
    /// The result if the job has finished, without blocking.
    pub fn try_result(&mut self) -> Option<&ConversionResult> {
        if self.done.is_none() {
            match self.rx.try_recv() {
                Ok(res) => self.done = Some(res),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => self.done = Some(worker_lost()),
            }
            self.join();
        }
        self.done.as_ref()
    }

    /// Blocks until the job finishes.
    pub fn wait(mut self) -> ConversionResult {
        if let Some(res) = self.done.take() {
            return res;
        }
        let res = self.rx.recv().unwrap_or_else(|_| worker_lost());
        self.join();
        res
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_lost() -> ConversionResult {
    ConversionResult::failure(&anyhow!("conversion worker exited without a result"))
}

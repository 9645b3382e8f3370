// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::{Compiler, ProcessSupervisor};

use super::orchestrator::{CycleOutcome, Orchestrator};
use super::RuntimeEvent;

/// Drives the orchestrator in response to `RuntimeEvent`s.
///
/// Cycles run inline in this loop, so two cycles can never overlap; the
/// `CycleGuard` that came with each event is dropped only after its cycle
/// has finished.
pub struct Runtime<C: Compiler, S: ProcessSupervisor> {
    orchestrator: Orchestrator<C, S>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    summary: RunSummary,
}

/// Tally of the cycles a [`Runtime`] ran before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: usize,
    pub failed_builds: usize,
    pub last: Option<CycleOutcome>,
}

impl RunSummary {
    fn record(&mut self, outcome: CycleOutcome) {
        self.cycles += 1;
        if matches!(outcome, CycleOutcome::BuildFailed { .. }) {
            self.failed_builds += 1;
        }
        self.last = Some(outcome);
    }
}

impl<C: Compiler, S: ProcessSupervisor> fmt::Debug for Runtime<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl<C: Compiler, S: ProcessSupervisor> Runtime<C, S> {
    pub fn new(orchestrator: Orchestrator<C, S>, event_rx: mpsc::Receiver<RuntimeEvent>) -> Self {
        Self {
            orchestrator,
            event_rx,
            summary: RunSummary::default(),
        }
    }

    /// Main event loop.
    ///
    /// Runs until shutdown is requested or every sender is gone, then stops
    /// the supervised process and removes the binary.
    pub async fn run(mut self) -> Result<RunSummary> {
        info!("hotbuild runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            match event {
                RuntimeEvent::CycleDue { trigger, guard } => {
                    let outcome = self.orchestrator.run_cycle(&trigger).await;
                    debug!(?outcome, "cycle finished");
                    self.summary.record(outcome);
                    drop(guard);
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested; stopping runtime");
                    break;
                }
            }
        }

        self.orchestrator.shutdown().await;
        info!("runtime exiting");
        Ok(self.summary)
    }
}

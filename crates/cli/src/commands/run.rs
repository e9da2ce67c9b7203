//! Replays a scenario of hook deliveries against a fixture world.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{info, warn};
use workflow_runtime::host::memory::HostCall;
use workflow_runtime::{DispatchSummary, RuntimeConfig, Topic, WorkflowEvent};

use super::{print_json, start_engine};
use crate::fixture::{WorldFixture, load_scenario};

/// Fire a scenario of host hooks and print what the engine did
#[derive(Parser)]
pub struct Run {
    /// World fixture (settings, actors, macros, tables)
    #[arg(value_name = "WORLD")]
    world: PathBuf,

    /// JSON array of hook payloads, fired in order
    #[arg(value_name = "SCENARIO")]
    scenario: PathBuf,

    /// Include engine activity events in the report
    #[arg(long)]
    events: bool,

    /// Pretty-print the report
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Delivery {
    hook: &'static str,
    summary: DispatchSummary,
}

#[derive(Serialize)]
struct Report {
    deliveries: Vec<Delivery>,
    calls: Vec<HostCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<WorkflowEvent>>,
}

impl Run {
    pub async fn execute(self, config: RuntimeConfig) -> Result<()> {
        let host = WorldFixture::load(&self.world)?.into_host();
        let payloads = load_scenario(&self.scenario)?;
        let engine = start_engine(config, host.ports.clone())?;
        let mut activity = engine.subscribe_events(Topic::Dispatch);

        info!(hooks = payloads.len(), "replaying scenario");
        let mut deliveries = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let hook = payload.hook().host_name();
            let summary = engine
                .handle_hook(payload)
                .await
                .with_context(|| format!("delivering {hook}"))?;
            deliveries.push(Delivery { hook, summary });
        }

        let events = self.events.then(|| {
            let mut events = Vec::new();
            loop {
                match activity.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Lagged(missed)) => {
                        warn!(missed, "event buffer overflowed, report is incomplete");
                    }
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }
            events
        });

        engine.dispose().context("disposing engine")?;
        print_json(
            &Report {
                deliveries,
                calls: host.actions.calls(),
                events,
            },
            self.pretty,
        )
    }
}

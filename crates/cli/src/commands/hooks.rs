//! Shows what a world's configuration makes the engine listen to.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use workflow_core::EventKey;
use workflow_runtime::RuntimeConfig;

use super::{print_json, start_engine};
use crate::fixture::WorldFixture;

/// Print the indexed events and subscribed host hooks of a world
#[derive(Parser)]
pub struct Hooks {
    #[arg(value_name = "WORLD")]
    world: PathBuf,

    #[arg(short, long)]
    pretty: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexReport {
    enabled: bool,
    indexed_groups: usize,
    events: Vec<EventKey>,
    hooks: Vec<&'static str>,
}

impl Hooks {
    pub fn execute(self, config: RuntimeConfig) -> Result<()> {
        let host = WorldFixture::load(&self.world)?.into_host();
        let engine = start_engine(config, host.ports)?;
        let index = engine.index()?;

        let report = IndexReport {
            enabled: engine.is_enabled()?,
            indexed_groups: index.group_count(),
            events: index.events().into_iter().collect(),
            hooks: engine
                .subscribed_hooks()?
                .into_iter()
                .map(|hook| hook.host_name())
                .collect(),
        };
        print_json(&report, self.pretty)
    }
}

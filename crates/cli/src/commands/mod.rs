mod form;
mod hooks;
mod run;

pub use form::Form;
pub use hooks::Hooks;
pub use run::Run;

use anyhow::{Context, Result};
use serde::Serialize;
use workflow_runtime::{HostPorts, RuntimeConfig, WorkflowEngine};

/// Builds and initializes an engine over `ports`.
fn start_engine(config: RuntimeConfig, ports: HostPorts) -> Result<WorkflowEngine> {
    let engine = WorkflowEngine::builder()
        .config(config)
        .ports(ports)
        .build()
        .context("building workflow engine")?;
    engine.init().context("initializing workflows")?;
    Ok(engine)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

//! Converts a workflow between its stored shape and edit-form entries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Map, Value};
use workflow_core::{TriggerGroup, expand, flatten};

use super::print_json;
use crate::fixture::read_json;

/// Flatten a workflow into form keys, or rebuild one with --expand
#[derive(Parser)]
pub struct Form {
    /// A workflow group, or a flat key/value object with --expand
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Read flat form entries and print the rebuilt workflow
    #[arg(short, long)]
    expand: bool,

    #[arg(short, long)]
    pretty: bool,
}

impl Form {
    pub fn execute(self) -> Result<()> {
        if self.expand {
            let entries: Map<String, Value> = read_json(&self.file)?;
            let group = expand(entries).context("rebuilding workflow from form entries")?;
            print_json(&group, self.pretty)
        } else {
            let group: TriggerGroup = read_json(&self.file)?;
            let entries: Map<String, Value> = flatten(&group).into_iter().collect();
            print_json(&entries, self.pretty)
        }
    }
}

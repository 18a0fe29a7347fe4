// FlowMon Report: Summaries of Throughput and Drop Rates from ns-3 Flow-Monitor Records
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Summarize the flow-monitor records of all conditions into `throughput.csv` and `droprate.csv`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use flowmon_report::{prelude::*, util};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// JSON configuration listing the conditions and monitors. Uses the built-in configuration if
    /// omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overwrite the directory the condition directories are relative to.
    #[arg(short, long)]
    data_root: Option<PathBuf>,
    /// Overwrite the directory the summaries are written to.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    util::init_logging();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ReportConfig::from_file(path)
            .with_context(|| format!("Cannot load the configuration from {path:?}"))?,
        None => ReportConfig::default(),
    };
    if let Some(data_root) = args.data_root {
        config.data_root = data_root;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }

    if args.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    log::info!(
        "Summarizing {} monitors for {} conditions from {:?}",
        config.monitors.len(),
        config.conditions.len(),
        config.data_root
    );

    let paths = run_report(&config).context("Cannot generate the report")?;
    log::info!(
        "Done: {} and {}",
        paths.throughput.display(),
        paths.drop_rate.display()
    );

    Ok(())
}

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
//! Configuration of a report: which conditions and monitors to evaluate, and how.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    metrics::{FlowSelector, DEFAULT_THROUGHPUT_DIVISOR},
    util::PathBufExt,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No monitors configured.")]
    NoMonitors,
    #[error("No conditions configured.")]
    NoConditions,
    #[error("The column label {0:?} is used more than once.")]
    DuplicateLabel(String),
    #[error("The throughput divisor must be a positive number, not {0}.")]
    InvalidDivisor(f64),
}

/// One experimental condition (e.g., an error rate), with the directory holding its results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Condition {
    /// Label written into the first column of the summary.
    pub label: String,
    /// Directory of the results, relative to the data root.
    pub dir: PathBuf,
}

impl Condition {
    pub fn new(label: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            dir: dir.into(),
        }
    }
}

/// One flow-monitor file present in each condition directory, and its column label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Monitor {
    pub file: PathBuf,
    pub label: String,
}

impl Monitor {
    pub fn new(file: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            label: label.into(),
        }
    }
}

/// Everything needed to generate the throughput and drop-rate summaries.
///
/// The default reproduces the LR-WPAN evaluation: a single condition with error rate `0` whose
/// results lie directly in the data root, and the monitor of the single-source simulation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Header of the condition column.
    pub condition_header: String,
    /// Rows of the summaries, in order.
    pub conditions: Vec<Condition>,
    /// Columns of the summaries, in order.
    pub monitors: Vec<Monitor>,
    pub selector: FlowSelector,
    /// Scale applied to the received bits of each flow.
    pub throughput_divisor: f64,
    /// Directory the condition directories are relative to.
    pub data_root: PathBuf,
    pub output_dir: PathBuf,
    pub throughput_file: PathBuf,
    pub drop_rate_file: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            condition_header: "Error Rate".to_string(),
            conditions: vec![Condition::new("0", "")],
            monitors: vec![Monitor::new("wpan-sourceCount1.flowmonitor", "1 Source")],
            selector: FlowSelector::FirstHalf,
            throughput_divisor: DEFAULT_THROUGHPUT_DIVISOR,
            data_root: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            throughput_file: PathBuf::from("throughput.csv"),
            drop_rate_file: PathBuf::from("droprate.csv"),
        }
    }
}

impl ReportConfig {
    /// Load a configuration from a JSON file. Fields missing in the file keep their default.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {path:?}");
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Paths of the throughput and the drop-rate summary.
    pub fn output_paths(&self) -> (PathBuf, PathBuf) {
        (
            self.output_dir.as_path().then(&self.throughput_file),
            self.output_dir.as_path().then(&self.drop_rate_file),
        )
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that the configuration describes a well-formed table.
    pub fn validate(&self) -> Result<(), Error> {
        if self.conditions.is_empty() {
            return Err(Error::NoConditions);
        }
        if self.monitors.is_empty() {
            return Err(Error::NoMonitors);
        }
        if !(self.throughput_divisor.is_finite() && self.throughput_divisor > 0.0) {
            return Err(Error::InvalidDivisor(self.throughput_divisor));
        }

        let mut labels = HashSet::new();
        labels.insert(self.condition_header.as_str());
        for monitor in &self.monitors {
            if !labels.insert(monitor.label.as_str()) {
                return Err(Error::DuplicateLabel(monitor.label.clone()));
            }
        }

        Ok(())
    }

    /// Column labels of the monitors, in order.
    pub fn labels(&self) -> Vec<String> {
        self.monitors.iter().map(|m| m.label.clone()).collect()
    }

    /// Path of the flow-monitor document of `monitor` under `condition`.
    pub fn monitor_path(&self, condition: &Condition, monitor: &Monitor) -> PathBuf {
        self.data_root
            .as_path()
            .then(&condition.dir)
            .then(&monitor.file)
    }
}

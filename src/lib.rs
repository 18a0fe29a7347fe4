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
//! Library for summarizing ns-3 flow-monitor records into throughput and drop-rate tables.

pub mod config;
pub mod flow_monitor;
pub mod metrics;
pub mod report;
pub mod util;

#[cfg(test)]
mod test;

pub mod prelude {
    pub use super::{
        config::{Condition, Monitor, ReportConfig},
        flow_monitor::{FlowGroup, FlowRecord},
        metrics::{FlowSelector, Metric, Value},
        report::{build_table, read_csv, run_report, write_csv, Table},
    };
}

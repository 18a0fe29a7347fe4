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
//! Per-group metrics: average throughput and average drop rate.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::flow_monitor::{self, FlowGroup, FlowLabel, FlowRecord};

/// Default scale for the throughput: the received bits of a 100 second window in kbit/s.
pub const DEFAULT_THROUGHPUT_DIVISOR: f64 = 100.0 * 1000.0;

/// Error thrown while computing a metric of a flow group.
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    /// The selection contains no flows, so the average would divide by zero.
    #[error("Cannot average over a group of {flows} flows using {selector}: division by zero")]
    NoFlows { flows: usize, selector: FlowSelector },
    /// Drop rates are relative to the received packets.
    #[error("{0} did not receive any packets: division by zero")]
    ZeroRxPackets(FlowLabel),
    #[error(transparent)]
    Record(#[from] flow_monitor::Error),
}

/// Rule deciding which flows of a group enter the average, and by what count the sum is divided.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Deserialize,
    Serialize,
    strum::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FlowSelector {
    /// First half of the flows by index: flow `i` is included while `i < n / 2`. Flow-monitor
    /// groups usually list the forward flows before their reverse flows, so this picks the
    /// forward direction.
    ///
    /// For odd `n`, this includes `ceil(n / 2)` flows but still divides by `n / 2` (e.g., 3 flows
    /// divided by 2.5 for `n = 5`). A group with less than one full pair (`n < 2`) is rejected.
    #[default]
    FirstHalf,
    /// All flows, divided by `n`.
    All,
}

/// The flows chosen by a [`FlowSelector`], together with the divisor of the average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    pub flows: &'a [FlowRecord],
    pub divisor: f64,
}

impl FlowSelector {
    /// Select the flows of `group` that enter the average.
    pub fn select<'a>(&self, group: &'a FlowGroup) -> Result<Selection<'a>, MetricError> {
        let n = group.len();
        let no_flows = || MetricError::NoFlows {
            flows: n,
            selector: *self,
        };
        match self {
            Self::FirstHalf => {
                if n / 2 == 0 {
                    return Err(no_flows());
                }
                let half = n as f64 / 2.0;
                let count = (0..n).take_while(|i| (*i as f64) < half).count();
                Ok(Selection {
                    flows: &group.flows[..count],
                    divisor: half,
                })
            }
            Self::All => {
                if n == 0 {
                    return Err(no_flows());
                }
                Ok(Selection {
                    flows: &group.flows,
                    divisor: n as f64,
                })
            }
        }
    }
}

/// The summary metrics written by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum Metric {
    #[strum(serialize = "throughput")]
    Throughput,
    #[strum(serialize = "drop rate")]
    DropRate,
}

impl Metric {
    /// Compute the metric for a single flow group.
    pub fn evaluate(
        &self,
        group: &FlowGroup,
        selector: FlowSelector,
        throughput_divisor: f64,
    ) -> Result<Value, MetricError> {
        let value = match self {
            Self::Throughput => {
                Value::Integer(compute_throughput(group, selector, throughput_divisor)?)
            }
            Self::DropRate => Value::Decimal(compute_drop_rate(group, selector)?),
        };
        log::debug!("{self} of group <{}>: {value}", group.name);
        Ok(value)
    }
}

/// Average of `rxBytes * 8 / throughput_divisor` over the selected flows, rounded to the nearest
/// integer (ties to even).
pub fn compute_throughput(
    group: &FlowGroup,
    selector: FlowSelector,
    throughput_divisor: f64,
) -> Result<i64, MetricError> {
    let selection = selector.select(group)?;

    let mut throughput = 0.0;
    for flow in selection.flows {
        let rx_bytes = flow.rx_bytes()?;
        log::trace!("{}: rxBytes = {rx_bytes}", flow.label);
        throughput += rx_bytes as f64 * 8.0 / throughput_divisor;
    }

    Ok((throughput / selection.divisor).round_ties_even() as i64)
}

/// Average of `(txPackets - rxPackets) / rxPackets` over the selected flows, in percent and
/// rounded to three decimal places.
pub fn compute_drop_rate(group: &FlowGroup, selector: FlowSelector) -> Result<f64, MetricError> {
    let selection = selector.select(group)?;

    let mut drop_ratio = 0.0;
    for flow in selection.flows {
        let tx = flow.tx_packets()?;
        let rx = flow.rx_packets()?;
        log::trace!("{}: txPackets = {tx}, rxPackets = {rx}", flow.label);
        if rx == 0 {
            return Err(MetricError::ZeroRxPackets(flow.label.clone()));
        }
        drop_ratio += (tx as i128 - rx as i128) as f64 / rx as f64;
    }

    Ok(round_decimals(drop_ratio / selection.divisor * 100.0, 3))
}

/// Round `x` to `digits` decimal places. Goes through the correctly rounded decimal
/// representation, so halfway cases are decided on the exact binary value.
pub fn round_decimals(x: f64, digits: usize) -> f64 {
    format!("{x:.digits$}").parse().unwrap_or(x)
}

/// A single cell of a summary table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Integer(i64),
    Decimal(f64),
}

impl Value {
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Integer(x) => *x as f64,
            Self::Decimal(x) => *x,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(x) => write!(f, "{x}"),
            // shortest representation that reads back to the same value, always with a `.`
            Self::Decimal(x) => write!(f, "{x:?}"),
        }
    }
}

impl FromStr for Value {
    type Err = std::num::ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.parse::<i64>() {
            Ok(x) => Ok(Self::Integer(x)),
            Err(_) => s.parse().map(Self::Decimal),
        }
    }
}

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
//! End-to-end tests of the report on flow-monitor documents written to a scratch directory.

use std::{fs, path::Path};

use itertools::Itertools;


/// Counters of a single flow: `(txPackets, rxPackets, rxBytes)`.
pub type Counters = (u64, u64, u64);

/// Render a flow-monitor document in the layout ns-3 uses, with a classifier group after the
/// flow statistics.
pub fn flow_monitor_xml(flows: &[Counters]) -> String {
    let stats = flows
        .iter()
        .enumerate()
        .map(|(i, (tx, rx, rx_bytes))| {
            format!(
                r#"    <Flow flowId="{}" timeFirstTxPacket="+1e+09ns" timeLastRxPacket="+9.99e+10ns" delaySum="+1.2e+08ns" jitterSum="+3e+06ns" lastDelay="+1e+06ns" txBytes="{}" rxBytes="{rx_bytes}" txPackets="{tx}" rxPackets="{rx}" lostPackets="{}" timesForwarded="0">
      <delayHistogram nBins="0" />
    </Flow>"#,
                i + 1,
                tx * 100,
                tx.saturating_sub(*rx),
            )
        })
        .join("\n");
    let classifier = (0..flows.len())
        .map(|i| {
            format!(
                r#"    <Flow flowId="{}" sourceAddress="10.1.1.{}" destinationAddress="10.1.1.1" protocol="17" sourcePort="49153" destinationPort="9" />"#,
                i + 1,
                i + 2,
            )
        })
        .join("\n");
    format!(
        "<?xml version=\"1.0\" ?>\n<FlowMonitor>\n  <FlowStats>\n{stats}\n  </FlowStats>\n  <Ipv4FlowClassifier>\n{classifier}\n  </Ipv4FlowClassifier>\n</FlowMonitor>\n"
    )
}

/// Write a flow-monitor document to `dir/file`, creating `dir` if needed.
pub fn write_monitor(dir: impl AsRef<Path>, file: &str, flows: &[Counters]) {
    fs::create_dir_all(dir.as_ref()).unwrap();
    fs::write(dir.as_ref().join(file), flow_monitor_xml(flows)).unwrap();
}

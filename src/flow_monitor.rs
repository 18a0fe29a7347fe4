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
//! Module for loading ns-3 flow-monitor documents.
//!
//! A flow-monitor document looks as follows (only the parts relevant for the report are shown):
//!
//! ```xml
//! <FlowMonitor>
//!   <FlowStats>
//!     <Flow flowId="1" txPackets="120" rxPackets="118" rxBytes="11328" ... />
//!     <Flow flowId="2" txPackets="118" rxPackets="118" rxBytes="6136" ... />
//!   </FlowStats>
//!   <Ipv4FlowClassifier> ... </Ipv4FlowClassifier>
//!   <FlowProbes> ... </FlowProbes>
//! </FlowMonitor>
//! ```
//!
//! Only the first child element of the root (the flow group) is ever analyzed. Every child element
//! of that group counts as one flow record, independent of its tag name.

use std::{fmt, fs, path::Path};

use roxmltree::{Document, Node};

pub const TX_PACKETS: &str = "txPackets";
pub const RX_PACKETS: &str = "rxPackets";
pub const RX_BYTES: &str = "rxBytes";
pub const FLOW_ID: &str = "flowId";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("The document root <{0}> does not contain any flow group.")]
    MissingGroup(String),
    #[error("{flow} has no attribute `{attribute}`.")]
    MissingAttribute {
        flow: FlowLabel,
        attribute: &'static str,
    },
    #[error("{flow} has an attribute `{attribute}` that is not an integer: {value:?}")]
    InvalidAttribute {
        flow: FlowLabel,
        attribute: &'static str,
        value: String,
    },
}

/// Identifies a flow record inside its group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLabel {
    /// Position of the record inside the flow group.
    pub index: usize,
    /// Value of the `flowId` attribute, if present.
    pub flow_id: Option<String>,
}

impl fmt::Display for FlowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.flow_id {
            Some(id) => write!(f, "flow #{} (flowId {id})", self.index),
            None => write!(f, "flow #{}", self.index),
        }
    }
}

/// One flow record. The counters are kept in their textual form and parsed on access, such that a
/// broken attribute only fails the metric that actually reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRecord {
    pub label: FlowLabel,
    tx_packets: Option<String>,
    rx_packets: Option<String>,
    rx_bytes: Option<String>,
}

impl FlowRecord {
    /// Create a record from already known counters.
    pub fn new(index: usize, tx_packets: u64, rx_packets: u64, rx_bytes: u64) -> Self {
        Self {
            label: FlowLabel {
                index,
                flow_id: Some((index + 1).to_string()),
            },
            tx_packets: Some(tx_packets.to_string()),
            rx_packets: Some(rx_packets.to_string()),
            rx_bytes: Some(rx_bytes.to_string()),
        }
    }

    fn from_node(index: usize, node: Node<'_, '_>) -> Self {
        let attr = |name: &str| node.attribute(name).map(str::to_string);
        Self {
            label: FlowLabel {
                index,
                flow_id: attr(FLOW_ID),
            },
            tx_packets: attr(TX_PACKETS),
            rx_packets: attr(RX_PACKETS),
            rx_bytes: attr(RX_BYTES),
        }
    }

    /// Number of transmitted packets (`txPackets`).
    pub fn tx_packets(&self) -> Result<u64, Error> {
        self.counter(TX_PACKETS, self.tx_packets.as_deref())
    }

    /// Number of received packets (`rxPackets`).
    pub fn rx_packets(&self) -> Result<u64, Error> {
        self.counter(RX_PACKETS, self.rx_packets.as_deref())
    }

    /// Number of received bytes (`rxBytes`).
    pub fn rx_bytes(&self) -> Result<u64, Error> {
        self.counter(RX_BYTES, self.rx_bytes.as_deref())
    }

    fn counter(&self, attribute: &'static str, value: Option<&str>) -> Result<u64, Error> {
        let value = value.ok_or_else(|| Error::MissingAttribute {
            flow: self.label.clone(),
            attribute,
        })?;
        value
            .trim()
            .trim_start_matches('+')
            .parse()
            .map_err(|_| Error::InvalidAttribute {
                flow: self.label.clone(),
                attribute,
                value: value.to_string(),
            })
    }
}

/// Ordered sequence of flow records, i.e., the first child of the document root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowGroup {
    /// Tag name of the group element (`FlowStats` for ns-3).
    pub name: String,
    pub flows: Vec<FlowRecord>,
}

impl FlowGroup {
    pub fn new(name: impl Into<String>, flows: Vec<FlowRecord>) -> Self {
        Self {
            name: name.into(),
            flows,
        }
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

/// Read the flow-monitor document at `path` and return its first flow group.
pub fn load_first_group(path: impl AsRef<Path>) -> Result<FlowGroup, Error> {
    let path = path.as_ref();
    log::debug!("Loading flow-monitor document {path:?}");
    let text = fs::read_to_string(path)?;
    let group = parse_first_group(&text)?;
    log::debug!(
        "{path:?}: group <{}> with {} flow records",
        group.name,
        group.len()
    );
    Ok(group)
}

/// Parse a flow-monitor document and return its first flow group. All remaining groups are
/// ignored.
pub fn parse_first_group(text: &str) -> Result<FlowGroup, Error> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();

    let Some(group) = root.children().find(Node::is_element) else {
        return Err(Error::MissingGroup(root.tag_name().name().to_string()));
    };

    let flows = group
        .children()
        .filter(Node::is_element)
        .enumerate()
        .map(|(index, node)| {
            let record = FlowRecord::from_node(index, node);
            log::trace!("read {record:?}");
            record
        })
        .collect();

    Ok(FlowGroup::new(group.tag_name().name(), flows))
}

#[cfg(test)]
mod test {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" ?>
<FlowMonitor>
  <FlowStats>
    <Flow flowId="1" timeFirstTxPacket="+1e+09ns" txBytes="12000" rxBytes="11328" txPackets="120" rxPackets="118" lostPackets="2">
      <delayHistogram nBins="1">
        <bin index="0" start="0" width="0.001" count="118" />
      </delayHistogram>
    </Flow>
    <Flow flowId="2" txBytes="6136" rxBytes="6136" txPackets="118" rxPackets="118" lostPackets="0" />
  </FlowStats>
  <Ipv4FlowClassifier>
    <Flow flowId="1" sourceAddress="10.1.1.1" destinationAddress="10.1.1.2" protocol="17" sourcePort="49153" destinationPort="9" />
    <Flow flowId="2" sourceAddress="10.1.1.2" destinationAddress="10.1.1.1" protocol="17" sourcePort="9" destinationPort="49153" />
    <Flow flowId="3" sourceAddress="10.1.1.3" destinationAddress="10.1.1.1" protocol="17" sourcePort="9" destinationPort="49153" />
  </Ipv4FlowClassifier>
</FlowMonitor>
"#;

    #[test]
    fn parse_flow_stats() {
        let group = parse_first_group(DOC).unwrap();
        assert_eq!(group.name, "FlowStats");
        assert_eq!(group.len(), 2);

        let flow = &group.flows[0];
        assert_eq!(flow.label.index, 0);
        assert_eq!(flow.label.flow_id.as_deref(), Some("1"));
        assert_eq!(flow.tx_packets().unwrap(), 120);
        assert_eq!(flow.rx_packets().unwrap(), 118);
        assert_eq!(flow.rx_bytes().unwrap(), 11328);

        assert_eq!(group.flows[1].rx_bytes().unwrap(), 6136);
    }

    #[test]
    fn only_first_group() {
        // the classifier lists three flows, but must never be looked at
        let group = parse_first_group(DOC).unwrap();
        assert!(group
            .flows
            .iter()
            .all(|f| f.label.flow_id.as_deref() != Some("3")));
    }

    #[test]
    fn any_child_element_is_a_flow() {
        let group = parse_first_group(
            r#"<Root><Group><A rxBytes="1"/><!-- note --><B rxBytes="2"/>text</Group></Root>"#,
        )
        .unwrap();
        assert_eq!(group.name, "Group");
        assert_eq!(group.len(), 2);
        assert_eq!(group.flows[1].label.index, 1);
        assert_eq!(group.flows[1].rx_bytes().unwrap(), 2);
    }

    #[test]
    fn empty_group() {
        let group = parse_first_group("<FlowMonitor><FlowStats/></FlowMonitor>").unwrap();
        assert!(group.is_empty());
    }

    #[test]
    fn missing_group() {
        let err = parse_first_group("<FlowMonitor>  </FlowMonitor>").unwrap_err();
        assert!(matches!(err, Error::MissingGroup(root) if root == "FlowMonitor"));
    }

    #[test]
    fn malformed_xml() {
        let err = parse_first_group("<FlowMonitor><FlowStats></FlowMonitor>").unwrap_err();
        assert!(matches!(err, Error::Xml(_)));
    }

    #[test]
    fn attributes_are_parsed_lazily() {
        let group = parse_first_group(
            r#"<FlowMonitor><FlowStats><Flow txPackets=" 7 " rxBytes="many"/></FlowStats></FlowMonitor>"#,
        )
        .unwrap();
        let flow = &group.flows[0];

        assert_eq!(flow.tx_packets().unwrap(), 7);
        assert!(matches!(
            flow.rx_packets(),
            Err(Error::MissingAttribute {
                attribute: RX_PACKETS,
                ..
            })
        ));
        match flow.rx_bytes() {
            Err(Error::InvalidAttribute {
                flow,
                attribute,
                value,
            }) => {
                assert_eq!(flow.to_string(), "flow #0");
                assert_eq!(attribute, RX_BYTES);
                assert_eq!(value, "many");
            }
            x => panic!("unexpected result: {x:?}"),
        }
    }

    #[test]
    fn missing_file() {
        let err = load_first_group("does/not/exist.flowmonitor").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

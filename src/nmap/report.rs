//! Structured nmap report.
//!
//! A `Report` maps each scanned host address to what nmap found on it, and
//! carries the `runtime` and `stats` blocks describing the run itself.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// State of a scanned port, as reported by nmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
    Filtered,
    Unfiltered,
    #[serde(rename = "open|filtered")]
    OpenFiltered,
    #[serde(rename = "closed|filtered")]
    ClosedFiltered,
}

impl PortState {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open | Self::OpenFiltered)
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
            Self::Unfiltered => write!(f, "unfiltered"),
            Self::OpenFiltered => write!(f, "open|filtered"),
            Self::ClosedFiltered => write!(f, "closed|filtered"),
        }
    }
}

impl FromStr for PortState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "filtered" => Ok(Self::Filtered),
            "unfiltered" => Ok(Self::Unfiltered),
            "open|filtered" => Ok(Self::OpenFiltered),
            "closed|filtered" => Ok(Self::ClosedFiltered),
            _ => Err(format!("unknown port state: {}", s)),
        }
    }
}

/// Service fingerprint attached to a port.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extrainfo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ostype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tunnel: Option<String>,
    /// `table` or `probed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Detection confidence, 0-10.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conf: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpe: Vec<String>,
}

/// Structured script data: one `<table>`, or the top level of a script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// `<elem key=...>` children.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub elems: BTreeMap<String, String>,
    /// `<elem>` children without a key, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<ScriptTable>,
}

impl ScriptTable {
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty() && self.values.is_empty() && self.tables.is_empty()
    }

    /// Value of a keyed elem.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.elems.get(key).map(String::as_str)
    }

    /// First child table with this key.
    pub fn table(&self, key: &str) -> Option<&ScriptTable> {
        self.tables.iter().find(|t| t.key.as_deref() == Some(key))
    }
}

/// Output of one NSE script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptOutput {
    pub id: String,
    pub output: String,
    #[serde(flatten)]
    pub data: ScriptTable,
}

/// One scanned port on one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortRecord {
    pub host: String,
    pub portid: u16,
    pub protocol: String,
    pub state: PortState,
    pub reason: String,
    pub reason_ttl: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<ScriptOutput>,
}

impl PortRecord {
    pub fn service_name(&self) -> &str {
        self.service.as_ref().map_or("unknown", |s| s.name.as_str())
    }
}

/// Host liveness as reported by `<status>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostStatus {
    pub state: String,
    pub reason: String,
    pub reason_ttl: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hostname {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacAddress {
    pub addr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsClass {
    #[serde(rename = "type")]
    pub kind: String,
    pub vendor: String,
    pub osfamily: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osgen: Option<String>,
    pub accuracy: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cpe: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsMatch {
    pub name: String,
    pub accuracy: u8,
    pub line: String,
    #[serde(default)]
    pub osclass: Vec<OsClass>,
}

/// Everything nmap reported about one host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<HostStatus>,
    #[serde(default)]
    pub hostname: Vec<Hostname>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macaddress: Option<MacAddress>,
    #[serde(default)]
    pub ports: Vec<PortRecord>,
    #[serde(default)]
    pub osmatch: Vec<OsMatch>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<ScriptOutput>,
}

impl HostRecord {
    pub fn open_ports(&self) -> impl Iterator<Item = &PortRecord> {
        self.ports.iter().filter(|p| p.state.is_open())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCounts {
    pub up: u32,
    pub down: u32,
    pub total: u32,
}

/// `runstats` block: how the run ended.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Runtime {
    pub elapsed: String,
    pub exit: String,
    pub summary: String,
    pub time: String,
    pub timestr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errormsg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<HostCounts>,
}

/// `nmaprun` attributes: how the run was invoked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub args: String,
    pub scanner: String,
    pub start: String,
    pub startstr: String,
    pub version: String,
    pub xmloutputversion: String,
}

/// A complete scan report.
///
/// Serializes flat: one key per host address next to `runtime` and `stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub hosts: BTreeMap<String, HostRecord>,
    /// Pre- and post-scan script output not tied to a host.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<ScriptOutput>,
    pub runtime: Runtime,
    pub stats: Stats,
}

impl Report {
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// All port records across hosts, in host order.
    pub fn port_records(&self) -> impl Iterator<Item = &PortRecord> {
        self.hosts.values().flat_map(|h| h.ports.iter())
    }

    /// The report as a JSON value with keys in sorted order.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_port(state: PortState) -> PortRecord {
        PortRecord {
            host: "127.0.0.1".to_string(),
            portid: 5432,
            protocol: "tcp".to_string(),
            state,
            reason: "syn-ack".to_string(),
            reason_ttl: 64,
            service: Some(Service {
                name: "postgresql".to_string(),
                method: Some("table".to_string()),
                conf: Some(3),
                ..Service::default()
            }),
            scripts: Vec::new(),
        }
    }

    #[test]
    fn test_port_state_strings() {
        for state in [
            PortState::Open,
            PortState::Closed,
            PortState::Filtered,
            PortState::Unfiltered,
            PortState::OpenFiltered,
            PortState::ClosedFiltered,
        ] {
            assert_eq!(state.to_string().parse::<PortState>(), Ok(state));
        }
        assert!("weird".parse::<PortState>().is_err());
        assert!(PortState::OpenFiltered.is_open());
        assert!(!PortState::Filtered.is_open());
    }

    #[test]
    fn test_report_serializes_flat() {
        let mut report = Report::default();
        report.hosts.insert(
            "127.0.0.1".to_string(),
            HostRecord {
                ports: vec![sample_port(PortState::Open)],
                ..HostRecord::default()
            },
        );
        report.stats.scanner = "nmap".to_string();

        let value = report.to_value().unwrap();
        let object = value.as_object().unwrap();
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["127.0.0.1", "runtime", "stats"]);

        let port = &value["127.0.0.1"]["ports"][0];
        assert_eq!(port["portid"], 5432);
        assert_eq!(port["state"], "open");
        assert_eq!(port["service"]["name"], "postgresql");
        assert!(port["service"].get("product").is_none());
    }

    #[test]
    fn test_open_ports_filter() {
        let host = HostRecord {
            ports: vec![
                sample_port(PortState::Open),
                sample_port(PortState::Closed),
                sample_port(PortState::OpenFiltered),
            ],
            ..HostRecord::default()
        };
        assert_eq!(host.open_ports().count(), 2);
        assert_eq!(host.ports[0].service_name(), "postgresql");
    }
}

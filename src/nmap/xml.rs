//! Reader for nmap's XML output (`-oX -`).
//!
//! Streams the document with `quick-xml` and fills a [`Report`]. Elements the
//! report does not model are skipped.

use super::report::{
    HostCounts, HostRecord, HostStatus, Hostname, MacAddress, OsClass, OsMatch, PortRecord,
    PortState, Report, ScriptOutput, ScriptTable, Service,
};
use crate::error::{ScanError, ScanResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use tracing::{debug, warn};

type Attrs = BTreeMap<String, String>;

/// Parse a complete nmap XML document.
pub fn parse_report(xml: &str) -> ScanResult<Report> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut builder = ReportBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                builder.open(&name, attributes(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let name = element_name(&e);
                builder.open(&name, attributes(&e)?);
                builder.close(&name);
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                builder.close(&name);
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| ScanError::Parse(e.to_string()))?;
                builder.text(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ScanError::Parse(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    builder.finish()
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attributes(e: &BytesStart<'_>) -> ScanResult<Attrs> {
    let mut attrs = Attrs::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ScanError::Parse(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ScanError::Parse(e.to_string()))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn take(attrs: &mut Attrs, key: &str) -> String {
    attrs.remove(key).unwrap_or_default()
}

fn number<T: std::str::FromStr + Default>(attrs: &Attrs, key: &str) -> T {
    attrs
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

/// Host under construction; the address becomes its key in the report.
#[derive(Default)]
struct PendingHost {
    address: Option<String>,
    record: HostRecord,
}

#[derive(Default)]
struct ReportBuilder {
    report: Report,
    seen_root: bool,
    host: Option<PendingHost>,
    port: Option<PortRecord>,
    osmatch: Option<OsMatch>,
    osclass: Option<OsClass>,
    script: Option<ScriptOutput>,
    /// Open `<table>`s inside the current script, innermost last.
    tables: Vec<ScriptTable>,
    elem_key: Option<String>,
    in_runstats: bool,
    text: String,
}

impl ReportBuilder {
    fn open(&mut self, name: &str, mut attrs: Attrs) {
        match name {
            "nmaprun" => {
                self.seen_root = true;
                let stats = &mut self.report.stats;
                stats.args = take(&mut attrs, "args");
                stats.scanner = take(&mut attrs, "scanner");
                stats.start = take(&mut attrs, "start");
                stats.startstr = take(&mut attrs, "startstr");
                stats.version = take(&mut attrs, "version");
                stats.xmloutputversion = take(&mut attrs, "xmloutputversion");
            }
            "host" => self.host = Some(PendingHost::default()),
            "status" => {
                if let Some(host) = self.host.as_mut() {
                    host.record.state = Some(HostStatus {
                        reason_ttl: number(&attrs, "reason_ttl"),
                        state: take(&mut attrs, "state"),
                        reason: take(&mut attrs, "reason"),
                    });
                }
            }
            "address" => {
                if let Some(host) = self.host.as_mut() {
                    let addr = take(&mut attrs, "addr");
                    if attrs.get("addrtype").map(String::as_str) == Some("mac") {
                        host.record.macaddress = Some(MacAddress {
                            addr,
                            vendor: attrs.remove("vendor"),
                        });
                    } else if host.address.is_none() {
                        host.address = Some(addr);
                    }
                }
            }
            "hostname" => {
                if let Some(host) = self.host.as_mut() {
                    host.record.hostname.push(Hostname {
                        name: take(&mut attrs, "name"),
                        kind: take(&mut attrs, "type"),
                    });
                }
            }
            "port" => {
                let host = self
                    .host
                    .as_ref()
                    .and_then(|h| h.address.clone())
                    .unwrap_or_default();
                self.port = Some(PortRecord {
                    host,
                    portid: number(&attrs, "portid"),
                    protocol: take(&mut attrs, "protocol"),
                    state: PortState::Closed,
                    reason: String::new(),
                    reason_ttl: 0,
                    service: None,
                    scripts: Vec::new(),
                });
            }
            "state" => {
                if let Some(port) = self.port.as_mut() {
                    let state = take(&mut attrs, "state");
                    match state.parse() {
                        Ok(parsed) => port.state = parsed,
                        Err(e) => warn!(port = port.portid, "{}", e),
                    }
                    port.reason_ttl = number(&attrs, "reason_ttl");
                    port.reason = take(&mut attrs, "reason");
                }
            }
            "service" => {
                if let Some(port) = self.port.as_mut() {
                    port.service = Some(Service {
                        conf: attrs.get("conf").and_then(|c| c.parse().ok()),
                        name: take(&mut attrs, "name"),
                        product: attrs.remove("product"),
                        version: attrs.remove("version"),
                        extrainfo: attrs.remove("extrainfo"),
                        ostype: attrs.remove("ostype"),
                        tunnel: attrs.remove("tunnel"),
                        method: attrs.remove("method"),
                        cpe: Vec::new(),
                    });
                }
            }
            "osmatch" => {
                self.osmatch = Some(OsMatch {
                    accuracy: number(&attrs, "accuracy"),
                    name: take(&mut attrs, "name"),
                    line: take(&mut attrs, "line"),
                    osclass: Vec::new(),
                });
            }
            "osclass" => {
                self.osclass = Some(OsClass {
                    accuracy: number(&attrs, "accuracy"),
                    kind: take(&mut attrs, "type"),
                    vendor: take(&mut attrs, "vendor"),
                    osfamily: take(&mut attrs, "osfamily"),
                    osgen: attrs.remove("osgen"),
                    cpe: Vec::new(),
                });
            }
            "script" => {
                self.script = Some(ScriptOutput {
                    id: take(&mut attrs, "id"),
                    output: take(&mut attrs, "output"),
                    data: ScriptTable::default(),
                });
            }
            "table" => {
                if self.script.is_some() {
                    self.tables.push(ScriptTable {
                        key: attrs.remove("key"),
                        ..ScriptTable::default()
                    });
                }
            }
            "elem" => self.elem_key = attrs.remove("key"),
            "runstats" => self.in_runstats = true,
            "finished" => {
                let runtime = &mut self.report.runtime;
                runtime.time = take(&mut attrs, "time");
                runtime.timestr = take(&mut attrs, "timestr");
                runtime.summary = take(&mut attrs, "summary");
                runtime.elapsed = take(&mut attrs, "elapsed");
                runtime.exit = take(&mut attrs, "exit");
                runtime.errormsg = attrs.remove("errormsg");
            }
            "hosts" if self.in_runstats => {
                self.report.runtime.hosts = Some(HostCounts {
                    up: number(&attrs, "up"),
                    down: number(&attrs, "down"),
                    total: number(&attrs, "total"),
                });
            }
            _ => {}
        }

        if matches!(name, "cpe" | "elem") {
            self.text.clear();
        }
    }

    fn text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn close(&mut self, name: &str) {
        match name {
            "cpe" => {
                let cpe = std::mem::take(&mut self.text);
                if let Some(class) = self.osclass.as_mut() {
                    class.cpe.push(cpe);
                } else if let Some(service) = self.port.as_mut().and_then(|p| p.service.as_mut()) {
                    service.cpe.push(cpe);
                }
            }
            "elem" => {
                let key = self.elem_key.take();
                let value = std::mem::take(&mut self.text);
                if let Some(table) = self.current_table() {
                    match key {
                        Some(key) => {
                            table.elems.insert(key, value);
                        }
                        None => table.values.push(value),
                    }
                }
            }
            "table" => {
                if let Some(table) = self.tables.pop() {
                    if let Some(parent) = self.current_table() {
                        parent.tables.push(table);
                    }
                }
            }
            "script" => {
                self.tables.clear();
                if let Some(script) = self.script.take() {
                    if let Some(port) = self.port.as_mut() {
                        port.scripts.push(script);
                    } else if let Some(host) = self.host.as_mut() {
                        host.record.scripts.push(script);
                    } else {
                        self.report.scripts.push(script);
                    }
                }
            }
            "osclass" => {
                if let (Some(class), Some(osmatch)) = (self.osclass.take(), self.osmatch.as_mut()) {
                    osmatch.osclass.push(class);
                }
            }
            "osmatch" => {
                if let (Some(osmatch), Some(host)) = (self.osmatch.take(), self.host.as_mut()) {
                    host.record.osmatch.push(osmatch);
                }
            }
            "port" => {
                if let (Some(port), Some(host)) = (self.port.take(), self.host.as_mut()) {
                    host.record.ports.push(port);
                }
            }
            "host" => {
                if let Some(host) = self.host.take() {
                    match host.address {
                        Some(address) => {
                            debug!(%address, ports = host.record.ports.len(), "host parsed");
                            self.report.hosts.insert(address, host.record);
                        }
                        None => warn!("skipping host without an address"),
                    }
                }
            }
            "runstats" => self.in_runstats = false,
            _ => {}
        }
    }

    /// Innermost open table, or the current script's top level.
    fn current_table(&mut self) -> Option<&mut ScriptTable> {
        match self.tables.last_mut() {
            Some(table) => Some(table),
            None => self.script.as_mut().map(|script| &mut script.data),
        }
    }

    fn finish(self) -> ScanResult<Report> {
        if !self.seen_root {
            return Err(ScanError::Parse("no <nmaprun> element".to_string()));
        }
        Ok(self.report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYN_SCAN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE nmaprun>
<nmaprun scanner="nmap" args="nmap -oX - -sS 127.0.0.1" start="1590320708" startstr="Sun May 24 12:45:08 2020" version="7.80" xmloutputversion="1.04">
<scaninfo type="syn" protocol="tcp" numservices="1000" services="1-1000"/>
<host starttime="1590320708" endtime="1590320728"><status state="up" reason="localhost-response" reason_ttl="0"/>
<address addr="127.0.0.1" addrtype="ipv4"/>
<hostnames><hostname name="localhost" type="user"/><hostname name="localhost" type="PTR"/></hostnames>
<ports><extraports state="closed" count="998"><extrareasons reason="resets" count="998"/></extraports>
<port protocol="tcp" portid="5000"><state state="open" reason="syn-ack" reason_ttl="64"/><service name="upnp" method="table" conf="3"/></port>
<port protocol="tcp" portid="5432"><state state="open" reason="syn-ack" reason_ttl="64"/><service name="postgresql" product="PostgreSQL DB" version="9.6.0 - 9.6.2" method="probed" conf="10"><cpe>cpe:/a:postgresql:postgresql:9.6</cpe></service></port>
</ports>
</host>
<runstats><finished time="1590320728" timestr="Sun May 24 12:45:28 2020" summary="Nmap done at Sun May 24 12:45:28 2020; 1 IP address (1 host up) scanned in 20.24 seconds" elapsed="20.24" exit="success"/><hosts up="1" down="0" total="1"/>
</runstats>
</nmaprun>"#;

    const OS_SCAN: &str = r#"<nmaprun scanner="nmap" args="nmap -oX - -O 10.0.0.5" version="7.94">
<host><status state="up" reason="arp-response" reason_ttl="0"/>
<address addr="10.0.0.5" addrtype="ipv4"/>
<address addr="AA:BB:CC:DD:EE:FF" addrtype="mac" vendor="Raspberry Pi Foundation"/>
<ports><port protocol="tcp" portid="22"><state state="open" reason="syn-ack" reason_ttl="64"/><service name="ssh" method="table" conf="3"/>
<script id="ssh-hostkey" output="2048 aa:bb (RSA)"><table><elem key="type">ssh-rsa</elem><elem key="bits">2048</elem></table></script></port></ports>
<os><portused state="open" proto="tcp" portid="22"/>
<osmatch name="Linux 4.15 - 5.8" accuracy="100" line="67823"><osclass type="general purpose" vendor="Linux" osfamily="Linux" osgen="4.X" accuracy="100"><cpe>cpe:/o:linux:linux_kernel:4</cpe></osclass><osclass type="general purpose" vendor="Linux" osfamily="Linux" osgen="5.X" accuracy="100"><cpe>cpe:/o:linux:linux_kernel:5</cpe></osclass></osmatch>
</os>
</host>
<runstats><finished time="1" timestr="t" summary="s" elapsed="3.10" exit="success"/><hosts up="1" down="0" total="1"/></runstats>
</nmaprun>"#;

    const DNS_BRUTE: &str = r#"<nmaprun scanner="nmap" args="nmap -oX - --script dns-brute.nse example.com" version="7.80">
<host><status state="up" reason="echo-reply" reason_ttl="53"/>
<address addr="93.184.216.34" addrtype="ipv4"/>
<hostnames><hostname name="example.com" type="user"/></hostnames>
<hostscript><script id="dns-brute" output="&#xa;  DNS Brute-force hostnames: &#xa;    www.example.com - 93.184.216.34">
<table key="DNS Brute-force hostnames">
<table><elem key="hostname">www.example.com</elem><elem key="address">93.184.216.34</elem></table>
<table><elem key="hostname">mail.example.com</elem><elem key="address">93.184.216.35</elem></table>
</table>
</script></hostscript>
</host>
<runstats><finished time="1" timestr="t" summary="s" elapsed="9.00" exit="success"/></runstats>
</nmaprun>"#;

    #[test]
    fn test_parse_syn_scan() {
        let report = parse_report(SYN_SCAN).unwrap();

        assert_eq!(report.stats.scanner, "nmap");
        assert_eq!(report.stats.version, "7.80");
        assert_eq!(report.stats.xmloutputversion, "1.04");
        assert_eq!(report.runtime.elapsed, "20.24");
        assert_eq!(report.runtime.exit, "success");
        assert_eq!(
            report.runtime.hosts,
            Some(HostCounts {
                up: 1,
                down: 0,
                total: 1
            })
        );

        let host = &report.hosts["127.0.0.1"];
        assert_eq!(host.state.as_ref().unwrap().state, "up");
        assert_eq!(host.hostname.len(), 2);
        assert_eq!(host.ports.len(), 2);

        let upnp = &host.ports[0];
        assert_eq!(upnp.host, "127.0.0.1");
        assert_eq!(upnp.portid, 5000);
        assert_eq!(upnp.protocol, "tcp");
        assert_eq!(upnp.state, PortState::Open);
        assert_eq!(upnp.reason, "syn-ack");
        assert_eq!(upnp.reason_ttl, 64);
        assert_eq!(upnp.service_name(), "upnp");

        let postgres = host.ports[1].service.as_ref().unwrap();
        assert_eq!(postgres.conf, Some(10));
        assert_eq!(postgres.product.as_deref(), Some("PostgreSQL DB"));
        assert_eq!(postgres.cpe, vec!["cpe:/a:postgresql:postgresql:9.6"]);
    }

    #[test]
    fn test_parse_os_detection() {
        let report = parse_report(OS_SCAN).unwrap();
        let host = &report.hosts["10.0.0.5"];

        let mac = host.macaddress.as_ref().unwrap();
        assert_eq!(mac.addr, "AA:BB:CC:DD:EE:FF");
        assert_eq!(mac.vendor.as_deref(), Some("Raspberry Pi Foundation"));

        assert_eq!(host.osmatch.len(), 1);
        let osmatch = &host.osmatch[0];
        assert_eq!(osmatch.name, "Linux 4.15 - 5.8");
        assert_eq!(osmatch.accuracy, 100);
        assert_eq!(osmatch.osclass.len(), 2);
        assert_eq!(osmatch.osclass[1].osgen.as_deref(), Some("5.X"));
        assert_eq!(osmatch.osclass[0].cpe, vec!["cpe:/o:linux:linux_kernel:4"]);

        let ssh = &host.ports[0];
        assert!(ssh.service.as_ref().unwrap().cpe.is_empty());
        assert_eq!(ssh.scripts.len(), 1);
        assert_eq!(ssh.scripts[0].id, "ssh-hostkey");
        let hostkey = &ssh.scripts[0].data.tables[0];
        assert_eq!(hostkey.key, None);
        assert_eq!(hostkey.get("bits"), Some("2048"));
    }

    #[test]
    fn test_parse_dns_brute_hostscript() {
        let report = parse_report(DNS_BRUTE).unwrap();
        let host = &report.hosts["93.184.216.34"];

        assert!(host.ports.is_empty());
        assert_eq!(host.scripts.len(), 1);

        let script = &host.scripts[0];
        assert_eq!(script.id, "dns-brute");
        assert!(script.output.contains("www.example.com"));
        let found = script.data.table("DNS Brute-force hostnames").unwrap();
        assert_eq!(found.tables.len(), 2);
        assert_eq!(found.tables[0].get("hostname"), Some("www.example.com"));
        assert_eq!(found.tables[1].get("address"), Some("93.184.216.35"));
    }

    #[test]
    fn test_parse_ssl_cert_keeps_tables_apart() {
        let xml = r#"<nmaprun scanner="nmap">
<host><address addr="10.0.0.8" addrtype="ipv4"/><ports>
<port protocol="tcp" portid="443"><state state="open" reason="syn-ack" reason_ttl="64"/><service name="https"/>
<script id="ssl-cert" output="Subject: commonName=a.example">
<table key="subject"><elem key="commonName">a.example</elem></table>
<table key="issuer"><elem key="commonName">CA</elem></table>
<table key="extensions"><table><elem key="name">X509v3 Subject Alternative Name</elem><elem key="value">DNS:a.example</elem></table></table>
<elem key="sig_algo">sha256WithRSAEncryption</elem>
<elem key="md5">abc</elem>
<table key="pem_lines"><elem>-----BEGIN CERTIFICATE-----</elem><elem>MIIB</elem></table>
</script></port></ports></host></nmaprun>"#;
        let report = parse_report(xml).unwrap();
        let cert = &report.hosts["10.0.0.8"].ports[0].scripts[0].data;

        assert_eq!(cert.tables.len(), 4);
        assert_eq!(cert.table("subject").unwrap().get("commonName"), Some("a.example"));

        let issuer = cert.table("issuer").unwrap();
        assert_eq!(issuer.get("commonName"), Some("CA"));
        assert_eq!(issuer.elems.len(), 1);

        assert_eq!(cert.get("sig_algo"), Some("sha256WithRSAEncryption"));
        assert_eq!(cert.get("md5"), Some("abc"));

        let extension = &cert.table("extensions").unwrap().tables[0];
        assert_eq!(extension.get("value"), Some("DNS:a.example"));

        let pem = cert.table("pem_lines").unwrap();
        assert!(pem.elems.is_empty());
        assert_eq!(pem.values, vec!["-----BEGIN CERTIFICATE-----", "MIIB"]);
    }

    #[test]
    fn test_script_json_shape() {
        let xml = r#"<nmaprun><host><address addr="h" addrtype="ipv4"/><hostscript>
<script id="x" output="o"><table key="t"><elem key="a">1</elem></table><elem key="b">2</elem></script>
</hostscript></host></nmaprun>"#;
        let report = parse_report(xml).unwrap();
        let value = report.to_value().unwrap();
        let script = &value["h"]["scripts"][0];

        assert_eq!(script["id"], "x");
        assert_eq!(script["elems"]["b"], "2");
        assert_eq!(script["tables"][0]["key"], "t");
        assert_eq!(script["tables"][0]["elems"]["a"], "1");
        assert!(script.get("key").is_none());
        assert!(script.get("values").is_none());
    }

    #[test]
    fn test_parse_error_message() {
        let xml = r#"<nmaprun scanner="nmap" args="nmap -oX - -sS x"><runstats><finished time="0" exit="error" errormsg="requires root privileges."/></runstats></nmaprun>"#;
        let report = parse_report(xml).unwrap();
        assert!(report.hosts.is_empty());
        assert_eq!(report.runtime.exit, "error");
        assert_eq!(report.runtime.errormsg.as_deref(), Some("requires root privileges."));
    }

    #[test]
    fn test_rejects_non_report_output() {
        assert!(matches!(
            parse_report("Nmap version 7.80 ( https://nmap.org )"),
            Err(ScanError::Parse(_))
        ));
        assert!(matches!(
            parse_report("<nmaprun><host></nmaprun>"),
            Err(ScanError::Parse(_))
        ));
    }
}

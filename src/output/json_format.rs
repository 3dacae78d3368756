//! JSON output formatting.
//!
//! Reports are printed with sorted keys and four-space indentation. Plain
//! output comes from serde_json's pretty printer; with colour on, a walker
//! over the same value highlights keys, strings, numbers and literals.

use crate::nmap::Report;
use console::Style;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::io::{self, Write};

const INDENT: &[u8] = b"    ";

struct Painter {
    key: Style,
    string: Style,
    number: Style,
    literal: Style,
}

impl Painter {
    fn new() -> Self {
        Self {
            key: Style::new().blue().bold(),
            string: Style::new().green(),
            number: Style::new().cyan(),
            literal: Style::new().magenta(),
        }
    }

    fn paint(&self, text: String, style: &Style) -> String {
        style.apply_to(text).force_styling(true).to_string()
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize) {
        match value {
            Value::Null | Value::Bool(_) => {
                out.push_str(&self.paint(value.to_string(), &self.literal))
            }
            Value::Number(_) => out.push_str(&self.paint(value.to_string(), &self.number)),
            Value::String(_) => out.push_str(&self.paint(value.to_string(), &self.string)),
            Value::Array(items) if items.is_empty() => out.push_str("[]"),
            Value::Object(map) if map.is_empty() => out.push_str("{}"),
            Value::Array(items) => {
                out.push_str("[\n");
                for (i, item) in items.iter().enumerate() {
                    indent(out, depth + 1);
                    self.write_value(out, item, depth + 1);
                    out.push_str(if i + 1 < items.len() { ",\n" } else { "\n" });
                }
                indent(out, depth);
                out.push(']');
            }
            Value::Object(map) => {
                out.push_str("{\n");
                for (i, (key, item)) in map.iter().enumerate() {
                    indent(out, depth + 1);
                    let key = Value::String(key.clone()).to_string();
                    out.push_str(&self.paint(key, &self.key));
                    out.push_str(": ");
                    self.write_value(out, item, depth + 1);
                    out.push_str(if i + 1 < map.len() { ",\n" } else { "\n" });
                }
                indent(out, depth);
                out.push('}');
            }
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("    ");
    }
}

fn pretty(value: &Value) -> io::Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Render a report as pretty JSON.
pub fn render_json(report: &Report, color: bool) -> io::Result<String> {
    let value = report
        .to_value()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    if !color {
        return pretty(&value);
    }
    let mut out = String::new();
    Painter::new().write_value(&mut out, &value, 0);
    Ok(out)
}

/// Print results in JSON format.
pub fn print_json(report: &Report, color: bool) -> io::Result<()> {
    let json = render_json(report, color)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out)?;
    writeln!(out, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmap::parse_report;

    const XML: &str = r#"<nmaprun scanner="nmap" args="nmap -oX - -sT 127.0.0.1" version="7.80">
<host><address addr="127.0.0.1" addrtype="ipv4"/>
<ports><port protocol="tcp" portid="22"><state state="open" reason="syn-ack" reason_ttl="64"/><service name="ssh" method="table" conf="3"/></port></ports>
</host></nmaprun>"#;

    #[test]
    fn test_plain_rendering() {
        let report = parse_report(XML).unwrap();
        let json = render_json(&report, false).unwrap();

        assert!(!json.contains('\u{1b}'));
        assert!(json.starts_with("{\n    \"127.0.0.1\": {\n"));
        assert!(json.contains("        \"hostname\": [],\n"));
        assert!(json.contains("                \"portid\": 22,\n"));
        assert!(json.ends_with('}'));

        // sorted keys, valid JSON
        let reparsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed["127.0.0.1"]["ports"][0]["service"]["name"], "ssh");
        let runtime = json.find("\"runtime\"").unwrap();
        let stats = json.find("\"stats\"").unwrap();
        assert!(json.find("\"127.0.0.1\"").unwrap() < runtime && runtime < stats);
    }

    #[test]
    fn test_colored_rendering() {
        let report = parse_report(XML).unwrap();
        let json = render_json(&report, true).unwrap();

        assert!(json.contains("\u{1b}["));
        assert!(json.contains("ssh"));
    }

    #[test]
    fn test_colored_layout_matches_plain() {
        let mut report = parse_report(XML).unwrap();
        report.runtime.errormsg = Some("tab\there".to_string());

        let plain = render_json(&report, false).unwrap();
        let colored = render_json(&report, true).unwrap();
        assert_eq!(console::strip_ansi_codes(&colored), plain);
    }

    #[test]
    fn test_escapes_strings() {
        let mut report = Report::default();
        report.runtime.summary = "say \"hi\"\n".to_string();
        let json = render_json(&report, false).unwrap();
        assert!(json.contains(r#""summary": "say \"hi\"\n""#));
    }
}

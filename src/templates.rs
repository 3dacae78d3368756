//! The scan template table.
//!
//! Each template id selects one fixed nmap flag string. The id range also
//! decides which dispatcher runs it: 1-7 are scan techniques, 8-21 host
//! discovery options, 22-30 named scan commands.

use crate::types::TemplateId;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which capability object a template is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Raw scan techniques (FIN, SYN, UDP, ...).
    Technique,
    /// Host discovery and detection options.
    Discovery,
    /// Named scan commands (OS detection, top ports, scripts, ...).
    Command,
}

impl Category {
    /// Category for a template id, by id range.
    pub const fn of(id: TemplateId) -> Self {
        match id.get() {
            1..=7 => Self::Technique,
            8..=21 => Self::Discovery,
            _ => Self::Command,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Technique => "technique",
            Self::Discovery => "discovery",
            Self::Command => "command",
        };
        f.pad(name)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "technique" | "techniques" => Ok(Self::Technique),
            "discovery" => Ok(Self::Discovery),
            "command" | "commands" => Ok(Self::Command),
            _ => Err(format!("unknown template category: {}", s)),
        }
    }
}

/// A predefined scan template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub id: u8,
    /// Flag string handed to the dispatcher.
    pub flag: &'static str,
    pub description: &'static str,
    /// Needs raw sockets (root) to run as intended.
    pub privileged: bool,
}

impl Template {
    pub fn category(&self) -> Category {
        TemplateId::new(self.id).map_or(Category::Command, Category::of)
    }
}

const fn fixed(id: u8) -> TemplateId {
    match TemplateId::new(id) {
        Some(id) => id,
        None => panic!("template id out of range"),
    }
}

/// Template used when ports are given.
pub const PORTS_TEMPLATE: TemplateId = fixed(21);
/// Template used when a domain is given.
pub const DOMAIN_TEMPLATE: TemplateId = fixed(27);
/// Template used when nothing is selected.
pub const DEFAULT_TEMPLATE: TemplateId = fixed(3);

const fn tpl(id: u8, flag: &'static str, description: &'static str, privileged: bool) -> Template {
    Template {
        id,
        flag,
        description,
        privileged,
    }
}

/// All templates, indexed by `id - 1`.
pub static TEMPLATES: [Template; 30] = [
    tpl(1, "-sF", "FIN scan", true),
    tpl(2, "-sI", "Idle scan", true),
    tpl(3, "-sS", "TCP SYN scan (default)", true),
    tpl(4, "-sP", "Ping only", false),
    tpl(5, "-sT", "TCP connect() scan", false),
    tpl(6, "-sU", "UDP scan", true),
    tpl(7, "-F", "Fast scan", true),
    tpl(8, "-Pn", "No ping scan", false),
    tpl(9, "-sn", "Liveness detection: no port scan", false),
    tpl(10, "-PR", "ARP scan: local network only", true),
    tpl(11, "-n", "Disable DNS resolution: reduces noise", false),
    tpl(12, "-O --osscan-guess", "No ping: aggressive OS detection", true),
    tpl(
        13,
        "-A",
        "No ping: OS and version detection, script scanning and traceroute",
        true,
    ),
    tpl(14, "-A -T2", "No ping: advanced detection, polite timing", true),
    tpl(15, "-A -v", "No ping: advanced detection, verbose", true),
    tpl(16, "-n -A", "No ping: advanced detection without DNS resolution", true),
    tpl(17, "-f -A", "No ping: advanced detection with packet fragmentation", true),
    tpl(18, "-T4 -sV", "No ping: aggressive service detection", false),
    tpl(
        19,
        "-n -sV --version-intensity 3",
        "No ping: service detection at version intensity 3",
        false,
    ),
    tpl(20, "-n -V", "No ping: nmap version, no DNS resolution", false),
    tpl(21, "-O --osscan-guess -p ", "No ping: OS detection on selected ports", true),
    tpl(22, "-sX", "Service detection combined with Xmas scan", true),
    tpl(23, "-sA", "Firewall rule detection: ACK scan", true),
    tpl(24, "-O", "OS detection", true),
    tpl(25, "20 -sZ", "SCTP COOKIE-ECHO scan of the top 20 ports", true),
    tpl(26, "--top-ports", "Top ports scan", false),
    tpl(27, "-script dns-brute", "dns-brute script: discover subdomains", false),
    tpl(
        28,
        "-sL",
        "List scan: list targets without sending packets to them",
        false,
    ),
    tpl(29, "-p-", "All ports scan", false),
    tpl(30, "-sV", "Basic service detection", false),
];

/// Flag string for a raw template code, or `None` outside 1-30.
pub fn flag_for(code: u8) -> Option<&'static str> {
    TemplateId::new(code).map(|id| lookup(id).flag)
}

/// The template behind a validated id.
pub fn lookup(id: TemplateId) -> &'static Template {
    &TEMPLATES[usize::from(id.get() - 1)]
}

/// Templates in one category, in id order.
pub fn in_category(category: Category) -> impl Iterator<Item = &'static Template> {
    TEMPLATES.iter().filter(move |t| t.category() == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_maps_to_documented_flag() {
        let expected = [
            (1, "-sF"),
            (2, "-sI"),
            (3, "-sS"),
            (4, "-sP"),
            (5, "-sT"),
            (6, "-sU"),
            (7, "-F"),
            (8, "-Pn"),
            (9, "-sn"),
            (10, "-PR"),
            (11, "-n"),
            (12, "-O --osscan-guess"),
            (13, "-A"),
            (14, "-A -T2"),
            (15, "-A -v"),
            (16, "-n -A"),
            (17, "-f -A"),
            (18, "-T4 -sV"),
            (19, "-n -sV --version-intensity 3"),
            (20, "-n -V"),
            (21, "-O --osscan-guess -p "),
            (22, "-sX"),
            (23, "-sA"),
            (24, "-O"),
            (25, "20 -sZ"),
            (26, "--top-ports"),
            (27, "-script dns-brute"),
            (28, "-sL"),
            (29, "-p-"),
            (30, "-sV"),
        ];

        for (code, flag) in expected {
            assert_eq!(flag_for(code), Some(flag), "template {}", code);
        }
    }

    #[test]
    fn test_out_of_range_codes_have_no_flag() {
        assert_eq!(flag_for(0), None);
        assert_eq!(flag_for(31), None);
        assert_eq!(flag_for(u8::MAX), None);
    }

    #[test]
    fn test_table_is_indexed_by_id() {
        for (index, template) in TEMPLATES.iter().enumerate() {
            assert_eq!(usize::from(template.id), index + 1);
        }
    }

    #[test]
    fn test_category_ranges() {
        assert_eq!(in_category(Category::Technique).count(), 7);
        assert_eq!(in_category(Category::Discovery).count(), 14);
        assert_eq!(in_category(Category::Command).count(), 9);

        let id = TemplateId::new(21).unwrap();
        assert_eq!(Category::of(id), Category::Discovery);
        assert_eq!(lookup(id).flag, "-O --osscan-guess -p ");
    }

    #[test]
    fn test_mode_templates_exist() {
        assert_eq!(lookup(PORTS_TEMPLATE).flag, "-O --osscan-guess -p ");
        assert_eq!(lookup(DOMAIN_TEMPLATE).flag, "-script dns-brute");
        assert_eq!(lookup(DEFAULT_TEMPLATE).flag, "-sS");
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("techniques".parse::<Category>().unwrap(), Category::Technique);
        assert_eq!("Discovery".parse::<Category>().unwrap(), Category::Discovery);
        assert!("other".parse::<Category>().is_err());
    }
}

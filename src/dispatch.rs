//! Flag dispatchers.
//!
//! Each dispatcher matches a template flag string and calls the matching
//! method on a capability object, returning its report unchanged. A flag the
//! dispatcher does not know is an [`ScanError::UnknownFlag`].

use crate::error::{ScanError, ScanResult};
use crate::nmap::{CommandScans, DiscoveryScans, Report, TechniqueScans, DEFAULT_TOP_PORTS};
use crate::types::PortSpec;

/// OS detection on chosen ports; the port list is appended to the flag.
pub const PORT_SELECTION_FLAG: &str = "-O --osscan-guess -p ";

/// Route a scan-technique flag (`-sF`, `-sI`, `-sP`, `-sS`, `-F`, `-sT`, `-sU`).
pub async fn scan_techniques<T>(nmt: &T, flag: &str, target: &str) -> ScanResult<Report>
where
    T: TechniqueScans + ?Sized,
{
    match flag {
        "-sF" => nmt.fin_scan(target).await,
        "-sI" => nmt.idle_scan(target).await,
        "-sP" => nmt.ping_scan(target).await,
        "-sS" => nmt.syn_scan(target, None).await,
        "-F" => nmt.syn_scan(target, Some("-F")).await,
        "-sT" => nmt.tcp_scan(target).await,
        "-sU" => nmt.udp_scan(target).await,
        _ => Err(ScanError::UnknownFlag(flag.to_string())),
    }
}

/// Route a host-discovery flag. `ports` is only used by the port-selection flag.
pub async fn scan_discovery<D>(
    nmd: &D,
    flag: &str,
    target: &str,
    ports: Option<&PortSpec>,
) -> ScanResult<Report>
where
    D: DiscoveryScans + ?Sized,
{
    match flag {
        "-Pn" => nmd.portscan_only(target, None).await,
        "-sn" => nmd.no_portscan(target, None).await,
        "-PR" => nmd.no_portscan(target, Some(flag)).await,
        "-n" => nmd.disable_dns(target).await,
        "-O --osscan-guess" | "-A -T2" | "-A" | "-A -v" | "-T4 -sV" | "-n -A" | "-n -V"
        | "-f -A" | "-n -sV --version-intensity 3" => {
            nmd.portscan_only(target, Some(flag)).await
        }
        PORT_SELECTION_FLAG => {
            let ports = ports.ok_or(ScanError::MissingPorts)?;
            let args = format!("{}{}", flag, ports);
            nmd.portscan_only(target, Some(&args)).await
        }
        _ => Err(ScanError::UnknownFlag(flag.to_string())),
    }
}

/// Route a named-command flag. dns-brute runs against `domain`, falling back
/// to `target`; every other command needs `target`.
pub async fn scan_command<C>(
    nm: &C,
    flag: &str,
    target: Option<&str>,
    domain: Option<&str>,
) -> ScanResult<Report>
where
    C: CommandScans + ?Sized,
{
    if flag == "-script dns-brute" {
        let domain = domain.or(target).ok_or(ScanError::MissingTarget)?;
        return nm.dns_brute_script(domain).await;
    }

    let known = matches!(
        flag,
        "-sA" | "-O" | "--top-ports" | "20 -sZ" | "-sL" | "-p-" | "-sV" | "-sX"
    );
    if !known {
        return Err(ScanError::UnknownFlag(flag.to_string()));
    }
    let target = target.ok_or(ScanError::MissingTarget)?;

    match flag {
        "-sA" => nm.detect_firewall(target).await,
        "-O" => nm.os_detection(target).await,
        "--top-ports" => nm.scan_top_ports(target, DEFAULT_TOP_PORTS, None).await,
        "20 -sZ" => nm.scan_top_ports(target, 20, Some("-sZ")).await,
        "-sL" => nm.list_scan(target).await,
        "-p-" => nm.subnet_scan(target).await,
        "-sV" => nm.version_detection(target, None).await,
        _ => nm.version_detection(target, Some("-sX")).await,
    }
}

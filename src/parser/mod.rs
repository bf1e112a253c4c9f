use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A single port/service line recognized in nmap text output.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPort {
    pub port: u16,
    pub protocol: String,
    pub state: String,
    pub service_name: String,
    pub version: String,
}

/// All information recognized for a single host block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHost {
    pub hostname: String,
    pub os_info: Option<String>,
    pub ports: Vec<ParsedPort>,
}

/// The full result of parsing one nmap run, keyed by IP address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScan {
    pub hosts: HashMap<String, ParsedHost>,
}

fn host_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Nmap scan report for ([\d.]+)(?: \(([\w.-]+)\))?").unwrap()
    })
}

fn port_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+)/(\w+)\s+([a-zA-Z]+)\s+([\w.-]+)?\s*(.*)?$").unwrap()
    })
}

fn os_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"OS details: (.*)").unwrap())
}

/// Parse raw nmap textual output into a structured [`ParsedScan`].
///
/// Stateless and infallible: lines that don't match a recognized pattern are
/// silently skipped rather than treated as an error, matching degraded-output
/// tolerance for truncated or unusual nmap runs.
pub fn parse_nmap_output(output: &str) -> ParsedScan {
    let mut scan = ParsedScan::default();
    let mut current_ip: Option<String> = None;

    for raw_line in output.lines() {
        let line = raw_line.trim();

        if let Some(caps) = host_re().captures(line) {
            let ip = caps.get(1).unwrap().as_str().to_string();
            let hostname = caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| ip.clone());
            scan.hosts.insert(
                ip.clone(),
                ParsedHost {
                    hostname,
                    os_info: None,
                    ports: Vec::new(),
                },
            );
            current_ip = Some(ip);
            continue;
        }

        let Some(ip) = current_ip.as_ref() else { continue };
        let Some(host) = scan.hosts.get_mut(ip) else { continue };

        if let Some(caps) = port_re().captures(line) {
            if let Ok(port) = caps.get(1).unwrap().as_str().parse::<u16>() {
                let protocol = caps.get(2).unwrap().as_str().to_string();
                let state = caps.get(3).unwrap().as_str().to_string();
                let service_name = caps
                    .get(4)
                    .map(|m| m.as_str().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "unknown".to_string());
                let version = caps
                    .get(5)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "N/A".to_string());

                host.ports.push(ParsedPort {
                    port,
                    protocol,
                    state,
                    service_name,
                    version,
                });
            }
            continue;
        }

        if let Some(caps) = os_re().captures(line) {
            host.os_info = Some(caps.get(1).unwrap().as_str().trim().to_string());
        }
    }

    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Nmap scan report for 192.168.1.1
Host is up (0.000040s latency).
Not shown: 997 closed ports
PORT     STATE SERVICE VERSION
22/tcp   open  ssh     OpenSSH 8.9 (Ubuntu)
80/tcp   open  http    Apache httpd 2.4.52 ((Ubuntu))
443/tcp  open  https   Apache httpd 2.4.52 ((Ubuntu))
OS details: Linux 4.15 - 5.10

Nmap scan report for 192.168.1.10 (kali-molly.local)
Host is up (0.000050s latency).
Not shown: 998 closed ports
PORT     STATE SERVICE VERSION
21/tcp   open  ftp     vsftpd 3.0.3
22/tcp   open  ssh     OpenSSH 7.6p1 Ubuntu 4 (Ubuntu Linux; protocol 2.0)
OS details: Linux 4.15 - 5.10

Nmap scan report for 192.168.1.100
Host is up (0.000060s latency).
All 1000 scanned ports on 192.168.1.100 are closed

Nmap done: 3 IP addresses (2 hosts up) scanned in 1.50 seconds
";

    #[test]
    fn test_parses_multiple_hosts() {
        let parsed = parse_nmap_output(SAMPLE);
        assert_eq!(parsed.hosts.len(), 3);
        assert!(parsed.hosts.contains_key("192.168.1.1"));
        assert!(parsed.hosts.contains_key("192.168.1.10"));
        assert!(parsed.hosts.contains_key("192.168.1.100"));
    }

    #[test]
    fn test_hostname_defaults_to_ip_when_absent() {
        let parsed = parse_nmap_output(SAMPLE);
        assert_eq!(parsed.hosts["192.168.1.1"].hostname, "192.168.1.1");
        assert_eq!(parsed.hosts["192.168.1.10"].hostname, "kali-molly.local");
    }

    #[test]
    fn test_ports_and_os_extracted() {
        let parsed = parse_nmap_output(SAMPLE);
        let host = &parsed.hosts["192.168.1.1"];
        assert_eq!(host.ports.len(), 3);
        assert_eq!(host.ports[0].port, 22);
        assert_eq!(host.ports[0].service_name, "ssh");
        assert_eq!(host.ports[0].version, "OpenSSH 8.9 (Ubuntu)");
        assert_eq!(host.os_info.as_deref(), Some("Linux 4.15 - 5.10"));
    }

    #[test]
    fn test_host_with_no_open_ports_has_empty_port_list() {
        let parsed = parse_nmap_output(SAMPLE);
        assert!(parsed.hosts["192.168.1.100"].ports.is_empty());
    }

    #[test]
    fn test_unrecognized_lines_are_skipped_without_error() {
        let garbled = "not a valid nmap line\n???\nNmap scan report for 10.0.0.1\ngarbage";
        let parsed = parse_nmap_output(garbled);
        assert_eq!(parsed.hosts.len(), 1);
        assert!(parsed.hosts["10.0.0.1"].ports.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_scan() {
        let parsed = parse_nmap_output("");
        assert!(parsed.hosts.is_empty());
    }
}

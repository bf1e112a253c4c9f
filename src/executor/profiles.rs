//! Scanner invocation profiles: translates a named profile into the `nmap`
//! option string the [`super::run_command`] executor actually runs.

/// Default wall-clock budget for a full scan run (as opposed to a single probe command).
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 600;

fn options_for(profile: &str) -> &'static str {
    match profile {
        "default_scan" => {
            "-sS -sV -O --min-rate 500 --max-rate 1000 --min-rtt-timeout 100ms \
             --max-rtt-timeout 1000ms --initial-rtt-timeout 500ms --open"
        }
        "os_detection" => "-O",
        "full_tcp_udp_scan" => "-sS -sU -p 1-1024 --max-rate 500 --open",
        "vulnerability_script_scan" => "-sV -sC --script vuln",
        _ => "-sS -sV",
    }
}

/// Build a complete `nmap` command line for `target` under `profile`, optionally
/// restricting to `ports` (e.g. `"22,80,443"`).
pub fn build_command(target: &str, profile: &str, ports: Option<&str>) -> String {
    let mut command = format!("nmap -T4 {}", options_for(profile));
    if let Some(ports) = ports {
        command.push_str(" -p ");
        command.push_str(ports);
    }
    command.push(' ');
    command.push_str(target);
    command
}

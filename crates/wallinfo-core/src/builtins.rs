// ── Built-in template facts ──
//
// The five placeholders every template understands without any
// connection configured.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use serde::Serialize;
use sysinfo::System;

/// Literal placeholder tokens, in substitution-table order.
pub const BUILTIN_TOKENS: [&str; 5] = ["{hostname}", "{user}", "{ip}", "{os}", "{cores}"];

/// Shown when a fact cannot be determined.
const UNKNOWN: &str = "N/A";

/// Values for the built-in placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Builtins {
    pub hostname: String,
    pub user: String,
    pub ip: String,
    pub os: String,
    pub cores: String,
}

impl Builtins {
    /// Collect facts about the machine running the render.
    pub fn gather() -> Self {
        Self {
            hostname: System::host_name().unwrap_or_else(|| UNKNOWN.into()),
            user: current_user(),
            ip: local_ipv4().map_or_else(|| UNKNOWN.into(), |ip| ip.to_string()),
            os: System::long_os_version()
                .or_else(System::name)
                .unwrap_or_else(|| UNKNOWN.into()),
            cores: logical_cores().to_string(),
        }
    }

    /// `(token, value)` pairs for substitution.
    pub fn tokens(&self) -> [(&'static str, &str); 5] {
        [
            (BUILTIN_TOKENS[0], self.hostname.as_str()),
            (BUILTIN_TOKENS[1], self.user.as_str()),
            (BUILTIN_TOKENS[2], self.ip.as_str()),
            (BUILTIN_TOKENS[3], self.os.as_str()),
            (BUILTIN_TOKENS[4], self.cores.as_str()),
        ]
    }
}

fn current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| UNKNOWN.into())
}

fn logical_cores() -> usize {
    let mut system = System::new();
    system.refresh_cpu_usage();
    match system.cpus().len() {
        0 => std::thread::available_parallelism().map_or(1, usize::from),
        n => n,
    }
}

/// The IPv4 address of the interface that would carry outbound traffic.
///
/// Connecting a UDP socket only selects a route; nothing is sent.
fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gathered_facts_are_never_blank() {
        let facts = Builtins::gather();
        for (token, value) in facts.tokens() {
            assert!(!value.is_empty(), "{token} was empty");
        }
    }

    #[test]
    fn cores_is_a_positive_number() {
        let cores: usize = Builtins::gather().cores.parse().unwrap_or(0);
        assert!(cores >= 1);
    }

    #[test]
    fn tokens_pair_each_placeholder_with_its_field() {
        let facts = Builtins {
            hostname: "h".into(),
            user: "u".into(),
            ip: "i".into(),
            os: "o".into(),
            cores: "c".into(),
        };
        assert_eq!(
            facts.tokens(),
            [
                ("{hostname}", "h"),
                ("{user}", "u"),
                ("{ip}", "i"),
                ("{os}", "o"),
                ("{cores}", "c"),
            ]
        );
    }
}

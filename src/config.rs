use std::net::SocketAddr;

use crate::{ipsource::EchoSourceConfig, provider::DEFAULT_API_ROOT};

/// Everything a single update run needs to know.
/// Built once at startup and handed to [`run()`](crate::run).
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// API token, checked for its shape before anything else happens
    pub token: String,
    /// Bare domain name, such as `example.com`
    pub domain: String,
    /// Record label within `domain`, such as `home` or `@`
    pub record: String,
    /// Address supplied by the user. If set, no echo services are asked
    pub ip: Option<String>,
    pub echo: EchoSourceConfig,
    /// DNS servers used to check that `domain` and `record` resolve
    pub dns_servers: Vec<SocketAddr>,
    pub api_root: String,
    /// Skip the final update request
    pub dry_run: bool,
}

impl Config {
    /// A configuration with default services for the given token, domain and record
    pub fn new(token: &str, domain: &str, record: &str) -> Self {
        Config {
            token: token.to_owned(),
            domain: domain.to_owned(),
            record: record.to_owned(),
            ip: None,
            echo: EchoSourceConfig::default(),
            dns_servers: vec![
                SocketAddr::from(([8, 8, 8, 8], 53)),
                SocketAddr::from(([1, 1, 1, 1], 53)),
            ],
            api_root: DEFAULT_API_ROOT.to_owned(),
            dry_run: false,
        }
    }
}

// Keep the token out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("domain", &self.domain)
            .field("record", &self.record)
            .field("ip", &self.ip)
            .field("echo", &self.echo)
            .field("dns_servers", &self.dns_servers)
            .field("api_root", &self.api_root)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

use std::{
    ffi::OsString,
    net::{IpAddr, SocketAddr},
};

use clap::{error::ErrorKind, Parser, ValueEnum};
use dodns::{
    ipsource::{EchoSourceConfig, FallbackPolicy, DEFAULT_ECHO_URLS},
    provider::DEFAULT_API_ROOT,
    Config, Stage,
};
use log::LevelFilter;

/// Update a DigitalOcean domain record with the current public IP address of this machine.
///
/// Exit codes: 0 success, 1 invalid token, 2 invalid domain, 3 invalid record,
/// 4 IP lookup failed, 5 record lookup failed, 6 update failed, 255 usage error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// DigitalOcean API token (64 characters). Generate one in the web UI
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Domain managed by DigitalOcean, without scheme (e.g. example.com)
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// Record to update, relative to the domain (e.g. home, or @ for the domain itself)
    #[arg(value_name = "RECORD")]
    pub record: String,

    /// Use this IP address instead of asking external services. May also be given as -ip
    #[arg(long, value_name = "IP")]
    pub ip: Option<String>,

    /// Ask every echo service in turn instead of giving up after the first one fails
    #[arg(long, action, default_value_t = false)]
    pub ip_fallback: bool,

    /// Echo service returning our address as plain text. Can be given multiple times, asked in order
    #[arg(
        long = "echo-url",
        value_name = "URL",
        default_values = DEFAULT_ECHO_URLS
    )]
    pub echo_urls: Vec<String>,

    /// List of DNS servers used to check that domain and record resolve, as a comma-separated string
    #[arg(
        long,
        value_name = "SERVER_IP",
        value_delimiter = ',',
        default_values = ["8.8.8.8", "1.1.1.1"]
    )]
    pub dns_servers: Vec<IpAddr>,

    /// Base URL of the DigitalOcean API
    #[arg(long, value_name = "URL", default_value = DEFAULT_API_ROOT, hide = true)]
    pub api_root: String,

    /// Do not change the record, only show what would happen
    #[arg(long, short = 'd', action, default_value_t = false)]
    pub dry_run: bool,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL"
    )]
    pub loglevel: Loglevel,
}

impl Cli {
    pub fn into_config(self) -> Config {
        let mut config = Config::new(&self.token, &self.domain, &self.record);
        // An empty address means none was given
        config.ip = self.ip.filter(|ip| !ip.is_empty());
        config.echo = EchoSourceConfig {
            urls: self.echo_urls,
            policy: if self.ip_fallback {
                FallbackPolicy::Exhaustive
            } else {
                FallbackPolicy::FirstOnly
            },
        };
        config.dns_servers = self
            .dns_servers
            .into_iter()
            .map(|ip| SocketAddr::new(ip, 53))
            .collect();
        config.api_root = self.api_root;
        config.dry_run = self.dry_run;
        config
    }
}

/// Rewrite the single-dash `-ip` option into the `--ip` form understood by clap.
/// Arguments after `--` are passed through untouched.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut options_done = false;
    args.into_iter()
        .map(|arg| match arg.to_str() {
            _ if options_done => arg,
            Some("--") => {
                options_done = true;
                arg
            }
            Some(s) if s == "-ip" || s.starts_with("-ip=") => OsString::from(format!("-{}", s)),
            _ => arg,
        })
        .collect()
}

/// Exit code for a failed argument parse. Help and version requests are not failures
pub fn parse_exit_code(e: &clap::Error) -> u8 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => Stage::Arguments.exit_code(),
    }
}

/// Used to set the applications loglevel
// This is essentially a re-creation of log:Level. However, that enum doesn't derive ValueEnum, so we have to do it manually here
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<Loglevel> for LevelFilter {
    fn from(ll: Loglevel) -> Self {
        match ll {
            Loglevel::Error => LevelFilter::Error,
            Loglevel::Warn => LevelFilter::Warn,
            Loglevel::Info => LevelFilter::Info,
            Loglevel::Debug => LevelFilter::Debug,
            Loglevel::Trace => LevelFilter::Trace,
        }
    }
}

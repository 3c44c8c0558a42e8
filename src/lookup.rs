//! Host name resolution used to check user input before talking to the registrar.

use std::{
    fmt::Display,
    net::{IpAddr, SocketAddr},
};

use dnsclient::{sync::DNSClient, UpstreamServer};
use log::trace;

#[cfg(test)]
use mockall::automock;

/// A `HostLookup` resolves a host name to the addresses it currently points to.
#[cfg_attr(test, automock)]
pub trait HostLookup {
    fn lookup_host(&self, host: &str) -> Result<Vec<IpAddr>, LookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupError {
    msg: String,
}
impl Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}
impl std::error::Error for LookupError {}
impl From<String> for LookupError {
    fn from(s: String) -> Self {
        LookupError { msg: s }
    }
}

/// A [`HostLookup`] that queries a fixed set of DNS servers for A and AAAA records.
///
/// No caching is performed, every call to [`HostLookup::lookup_host()`] sends new queries.
#[derive(Debug)]
#[non_exhaustive]
pub struct DnsLookup {
    client: DNSClient,
}

impl DnsLookup {
    pub fn new(servers: &[SocketAddr]) -> Self {
        DnsLookup {
            client: DNSClient::new(servers.iter().copied().map(UpstreamServer::new).collect()),
        }
    }
}

impl HostLookup for DnsLookup {
    fn lookup_host(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
        let a = self.client.query_a(host);
        let aaaa = self.client.query_aaaa(host);
        trace!("Lookup for {}: A {:?}, AAAA {:?}", host, a, aaaa);

        match (a, aaaa) {
            (Err(e), Err(_)) => Err(e.to_string().into()),
            (a, aaaa) => Ok(a
                .unwrap_or_default()
                .into_iter()
                .map(IpAddr::V4)
                .chain(aaaa.unwrap_or_default().into_iter().map(IpAddr::V6))
                .collect()),
        }
    }
}

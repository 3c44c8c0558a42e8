//! A way to determine the IP address that should be published.
//! Each source implements the [`IpSource`] trait.
//!
//! The following sources are currently available:
//! - [`FixedSource`]: Returns an address supplied by the user
//! - [`EchoSource`]: Asks public "what is my IP" services for the address they see us connecting from

mod echo;
mod fixed;

pub use echo::{EchoSource, EchoSourceConfig, FallbackPolicy, DEFAULT_ECHO_URLS};
pub use fixed::FixedSource;

use std::{fmt::Display, net::IpAddr};

#[cfg(test)]
use mockall::automock;

/// An `IpSource` can be used to retrieve a single IP address for use in DNS records.
#[cfg_attr(test, automock)]
pub trait IpSource {
    fn addr(&self) -> Result<IpAddr, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceError {
    msg: String,
}
impl Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}
impl std::error::Error for SourceError {}
impl From<String> for SourceError {
    fn from(s: String) -> Self {
        SourceError { msg: s }
    }
}

//! DNS registrars that host the record we keep up to date.
//!
//! A registrar is accessed through the [`Provider`] trait. Currently only DigitalOcean is supported,
//! see [`DigitalOceanProvider`].

mod digitalocean;

pub use self::digitalocean::{DigitalOceanProvider, DigitalOceanProviderConfig, DEFAULT_API_ROOT};

use std::{fmt::Display, net::IpAddr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// A provider is any DNS registrar with an API to read and modify the records of a domain.
#[cfg_attr(test, automock)]
pub trait Provider {
    /// Get all records of `domain`, in the order the registrar returns them.
    /// A domain without any records is reported as [`ProviderError::NoRecords`].
    fn records(&self, domain: &str) -> Result<RecordSet, ProviderError>;

    /// Replace the data of an existing record and return the record as stored by the registrar.
    /// Fails if the registrar accepts the request but reports different data afterwards.
    fn update_record(
        &self,
        domain: &str,
        record: DomainRecord,
        data: &str,
    ) -> Result<DomainRecord, ProviderError>;
}

/// The records of a single domain, in registrar order
pub type RecordSet = Vec<DomainRecord>;

/// A single DNS record as represented by the registrar API.
/// Fields we do not touch are passed through unchanged on updates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub data: String,
    pub priority: Option<i64>,
    pub port: Option<i64>,
    pub weight: Option<i64>,
}
impl DomainRecord {
    /// Whether the record data equals `data`.
    /// Compared as addresses where both sides parse, so different spellings of one IPv6 address match
    pub fn holds(&self, data: &str) -> bool {
        match (self.data.trim().parse::<IpAddr>(), data.trim().parse::<IpAddr>()) {
            (Ok(current), Ok(wanted)) => current == wanted,
            _ => self.data == data,
        }
    }
}
impl Display for DomainRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} (id {})", self.name, self.kind, self.data, self.id)
    }
}

/// Errors returned by a provider action
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderError {
    #[error("could not initialize HTTP client: {0}")]
    Client(String),
    #[error("{0}")]
    Request(String),
    #[error("Error response [ {code} ]: {reason}")]
    Status { code: u16, reason: String },
    #[error("Decoding JSON response failed: {0}")]
    Decode(String),
    #[error("Record not found: domain [ {0} ] has no records")]
    NoRecords(String),
    #[error("Record was not updated successfully (requested [ {expected} ], registrar reports [ {actual} ])")]
    NotApplied { expected: String, actual: String },
}

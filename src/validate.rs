//! Checks run on user input before any authenticated request is made.
//!
//! Domains and records are validated by actually resolving them. This catches typos early
//! and does not touch the registrar at all.

use std::{fmt::Debug, str::FromStr};

use http::Uri;
use log::debug;
use thiserror::Error;

use crate::lookup::{HostLookup, LookupError};

/// Length of a DigitalOcean personal access token
pub const TOKEN_LENGTH: usize = 64;

/// Name DigitalOcean uses for records at the zone apex
pub const APEX_RECORD: &str = "@";

const MAX_HOSTNAME_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// A bearer token that has the expected shape.
/// The contents are never printed, not even in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Token(<redacted>)")
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_token(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("Token does not appear to be valid (expected 64 characters, got {0})")]
pub struct TokenError(usize);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Failed to parse domain [ {input} ]: {reason}")]
    Unparsable { input: String, reason: String },
    #[error("Scheme should not be specified, you gave [ {0} ]")]
    Scheme(String),
    #[error("Failed to lookup host [ {host} ], error : {source}")]
    Lookup { host: String, source: LookupError },
    #[error("No valid addresses found for domain [ {0} ]")]
    NoAddresses(String),
    #[error("Domain invalid, cannot test record: {0}")]
    DomainInvalid(Box<ValidationError>),
}

/// Check that a token has the shape of a DigitalOcean API token.
pub fn validate_token(token: &str) -> Result<Token, TokenError> {
    match token.len() {
        TOKEN_LENGTH => Ok(Token(token.to_owned())),
        other => Err(TokenError(other)),
    }
}

/// Check that `domain` is a bare host name (no scheme, port or path) that resolves to at least one address.
pub fn validate_domain(lookup: &dyn HostLookup, domain: &str) -> Result<(), ValidationError> {
    parse_hostname(domain)?;
    resolve(lookup, domain)
}

/// Check that `record` combined with `domain` resolves.
/// The domain itself is validated first; an invalid domain fails regardless of the record.
pub fn validate_record(
    lookup: &dyn HostLookup,
    record: &str,
    domain: &str,
) -> Result<(), ValidationError> {
    validate_domain(lookup, domain).map_err(|e| ValidationError::DomainInvalid(Box::new(e)))?;

    let full_host = full_host(record, domain);
    parse_hostname(&full_host)?;
    resolve(lookup, &full_host)
}

/// The fully qualified name of `record` within `domain`
pub fn full_host(record: &str, domain: &str) -> String {
    if record == APEX_RECORD {
        domain.to_owned()
    } else {
        format!("{}.{}", record, domain)
    }
}

fn resolve(lookup: &dyn HostLookup, host: &str) -> Result<(), ValidationError> {
    let addrs = lookup
        .lookup_host(host)
        .map_err(|source| ValidationError::Lookup {
            host: host.to_owned(),
            source,
        })?;
    debug!("{} resolves to {:?}", host, addrs);

    if addrs.is_empty() {
        return Err(ValidationError::NoAddresses(host.to_owned()));
    }
    Ok(())
}

fn parse_hostname(input: &str) -> Result<(), ValidationError> {
    let unparsable = |reason: &str| ValidationError::Unparsable {
        input: input.to_owned(),
        reason: reason.to_owned(),
    };

    let uri = input
        .parse::<Uri>()
        .map_err(|e| unparsable(&e.to_string()))?;
    if let Some(scheme) = uri.scheme_str() {
        return Err(ValidationError::Scheme(scheme.to_owned()));
    }
    // Anything besides a plain host (user info, port, path) makes the authority differ from the input
    if uri.host() != Some(input) || uri.port().is_some() {
        return Err(unparsable("not a bare hostname"));
    }

    let name = input.strip_suffix('.').unwrap_or(input);
    if name.is_empty() || name.len() > MAX_HOSTNAME_LENGTH {
        return Err(unparsable("invalid length"));
    }
    for label in name.split('.') {
        if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
            return Err(unparsable("invalid label length"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(unparsable("labels may not start or end with a hyphen"));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(unparsable("invalid character"));
        }
    }
    Ok(())
}

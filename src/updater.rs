//! Runs the individual steps of an update in order and turns their failures into [`Error`]s.

use std::{fmt::Display, net::IpAddr};

use log::{debug, info};

use crate::{
    config::Config,
    error::{Error, ErrorKind, Stage},
    ipsource::{EchoSource, FixedSource, IpSource},
    lookup::{DnsLookup, HostLookup},
    provider::{DigitalOceanProvider, DigitalOceanProviderConfig, Provider, ProviderError},
    reconcile::{decide, Decision},
    validate::{validate_domain, validate_record, validate_token},
};

/// What a successful run did
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The record was changed to this address
    Updated(IpAddr),
    /// The record already pointed to this address
    Unchanged(IpAddr),
    /// The record would have been changed to this address, but dry-run mode was enabled
    DryRun(IpAddr),
}
impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Updated(a) => write!(f, "DNS update success: {}", a),
            Outcome::Unchanged(a) => write!(f, "DNS update not required: {}", a),
            Outcome::DryRun(a) => write!(f, "DNS update skipped (dry run): {}", a),
        }
    }
}

/// An updater performs the complete set of steps needed to bring one record up to date
pub struct Updater<'a> {
    lookup: &'a dyn HostLookup,
    source: &'a dyn IpSource,
    provider: &'a dyn Provider,
    dry_run: bool,
}

impl<'a> Updater<'a> {
    pub fn new(
        lookup: &'a dyn HostLookup,
        source: &'a dyn IpSource,
        provider: &'a dyn Provider,
    ) -> Updater<'a> {
        Updater {
            lookup,
            source,
            provider,
            dry_run: false,
        }
    }

    /// Do everything except the final update request
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn run(&self, domain: &str, record: &str) -> Result<Outcome, Error> {
        validate_domain(self.lookup, domain).map_err(|e| {
            Error::new(ErrorKind::Validation, Stage::Domain, e.to_string()).with_source(e)
        })?;
        validate_record(self.lookup, record, domain).map_err(|e| {
            Error::new(ErrorKind::Validation, Stage::Record, e.to_string()).with_source(e)
        })?;
        debug!("Domain {} and record {} are valid", domain, record);

        let addr = self.source.addr().map_err(|e| {
            Error::new(
                ErrorKind::Resolution,
                Stage::Address,
                format!("External lookup failed: {}", e),
            )
            .with_source(e)
        })?;
        info!("Target address: {}", addr);

        let records = self.provider.records(domain).map_err(|e| {
            let kind = match e {
                ProviderError::NoRecords(_) => ErrorKind::Lookup,
                _ => ErrorKind::Transport,
            };
            Error::new(kind, Stage::Reconcile, format!("DNS update fail: {}", e)).with_source(e)
        })?;

        let decision = decide(&records, record, domain, &addr).map_err(|e| {
            Error::new(
                ErrorKind::Lookup,
                Stage::Reconcile,
                format!("DNS update fail: {}", e),
            )
            .with_source(e)
        })?;

        match decision {
            Decision::UpToDate(_) => Ok(Outcome::Unchanged(addr)),
            Decision::Outdated(current) if self.dry_run => {
                info!("Dry run: would update {} to {}", current, addr);
                Ok(Outcome::DryRun(addr))
            }
            Decision::Outdated(current) => {
                info!("Updating {} to {}", current, addr);
                self.provider
                    .update_record(domain, current, &addr.to_string())
                    .map_err(|e| {
                        Error::new(
                            ErrorKind::Transport,
                            Stage::Update,
                            format!("DNS update: {}", e),
                        )
                        .with_source(e)
                    })?;
                Ok(Outcome::Updated(addr))
            }
        }
    }
}

/// Perform a complete update run, resolving names through the DNS servers in `config`.
pub fn run(config: &Config) -> Result<Outcome, Error> {
    let lookup = DnsLookup::new(&config.dns_servers);
    run_with_lookup(config, &lookup)
}

/// Perform a complete update run with a custom [`HostLookup`].
///
/// The token is checked before anything else, an invalid token never causes network traffic.
pub fn run_with_lookup(config: &Config, lookup: &dyn HostLookup) -> Result<Outcome, Error> {
    let token = validate_token(&config.token).map_err(|e| {
        Error::new(ErrorKind::Credential, Stage::Token, e.to_string()).with_source(e)
    })?;

    let source: Box<dyn IpSource> = match &config.ip {
        Some(ip) => {
            info!("IP flag provided, using: {:?}", ip);
            Box::new(FixedSource::new(ip))
        }
        None => {
            info!("No IP provided, using external lookup");
            EchoSource::from_config(&config.echo).map_err(|e| {
                Error::new(ErrorKind::Resolution, Stage::Address, e.to_string()).with_source(e)
            })?
        }
    };

    let provider = DigitalOceanProvider::from_config(&DigitalOceanProviderConfig {
        api_token: &token,
        api_root: &config.api_root,
    })
    .map_err(|e| Error::new(ErrorKind::Transport, Stage::Reconcile, e.to_string()).with_source(e))?;

    Updater::new(lookup, source.as_ref(), provider.as_ref())
        .dry_run(config.dry_run)
        .run(&config.domain, &config.record)
}

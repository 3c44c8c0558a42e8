mod wrapper;

use log::{debug, trace};

use self::wrapper::DigitalOceanWrapper;
use super::{DomainRecord, Provider, ProviderError, RecordSet};
use crate::validate::Token;

/// Base URL of the DigitalOcean v2 API
pub const DEFAULT_API_ROOT: &str = "https://api.digitalocean.com/v2";

/// A [`Provider`] connecting to the DigitalOcean API for reading and updating domain records.
///
/// To create a provider, use the [`DigitalOceanProvider::from_config()`] function.
#[derive(Debug)]
#[non_exhaustive]
pub struct DigitalOceanProvider {
    api: DigitalOceanWrapper,
}

/// Configuration object for a [`DigitalOceanProvider`]. Must be supplied when creating a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalOceanProviderConfig<'a> {
    /// The personal access token to authenticate with
    pub api_token: &'a Token,
    /// Base URL of the API, usually [`DEFAULT_API_ROOT`]
    pub api_root: &'a str,
}

impl DigitalOceanProvider {
    /// Create a new provider. No requests are made until records are requested.
    pub fn from_config(
        config: &DigitalOceanProviderConfig,
    ) -> Result<Box<dyn Provider>, ProviderError> {
        let api = DigitalOceanWrapper::try_new(config.api_root, config.api_token)?;
        Ok(Box::new(DigitalOceanProvider { api }))
    }
}

impl Provider for DigitalOceanProvider {
    fn records(&self, domain: &str) -> Result<RecordSet, ProviderError> {
        debug!("Reading records of {} from DigitalOcean API", domain);
        let records = match self.api.list_records(domain)? {
            Some(r) if !r.is_empty() => r,
            _ => return Err(ProviderError::NoRecords(domain.to_owned())),
        };
        trace!("Collected records: {:?}", records);
        Ok(records)
    }

    fn update_record(
        &self,
        domain: &str,
        mut record: DomainRecord,
        data: &str,
    ) -> Result<DomainRecord, ProviderError> {
        record.data = data.to_owned();
        let stored = self.api.put_record(domain, &record)?;
        debug!("Registrar stored record {}", stored);

        if !stored.holds(data) {
            return Err(ProviderError::NotApplied {
                expected: data.to_owned(),
                actual: stored.data,
            });
        }
        Ok(stored)
    }
}

use http::StatusCode;
use log::{trace, warn};
use reqwest::blocking::{Client, Response};
use serde::Deserialize;

use crate::{
    provider::{DomainRecord, ProviderError},
    validate::Token,
};

const RECORD_PAGE_SIZE: u32 = 200;

#[derive(Debug, Deserialize)]
struct RecordsPage {
    domain_records: Option<Vec<DomainRecord>>,
    links: Option<Links>,
}

#[derive(Debug, Deserialize)]
struct Links {
    pages: Option<Pages>,
}

#[derive(Debug, Deserialize)]
struct Pages {
    next: Option<String>,
}

impl RecordsPage {
    fn has_next(&self) -> bool {
        self.links
            .as_ref()
            .and_then(|l| l.pages.as_ref())
            .and_then(|p| p.next.as_ref())
            .is_some()
    }
}

#[derive(Debug, Deserialize)]
struct SingleRecord {
    domain_record: DomainRecord,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Internal wrapper around the DigitalOcean API. Handles authentication, status codes and paged requests
#[derive(Debug)]
pub(super) struct DigitalOceanWrapper {
    client: Client,
    api_root: String,
    token: Token,
}

impl DigitalOceanWrapper {
    pub fn try_new(api_root: &str, token: &Token) -> Result<DigitalOceanWrapper, ProviderError> {
        let client = Client::builder()
            .user_agent(concat!("dodns/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;
        Ok(DigitalOceanWrapper {
            client,
            api_root: api_root.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
        })
    }

    fn records_url(&self, domain: &str) -> String {
        format!("{}/domains/{}/records", self.api_root, domain)
    }

    /// Fetch every page of records for a domain.
    /// Returns [`None`] if the first page carries no record collection at all.
    pub fn list_records(&self, domain: &str) -> Result<Option<Vec<DomainRecord>>, ProviderError> {
        let mut page_counter = 1;

        // Initial failures are never good, return quickly
        let first = self.records_page(domain, page_counter)?;
        let mut more = first.has_next();
        let mut records = match first.domain_records {
            Some(r) => r,
            None => return Ok(None),
        };

        while more {
            page_counter += 1;
            let page = self.records_page(domain, page_counter)?;
            more = page.has_next();
            match page.domain_records {
                Some(r) if !r.is_empty() => records.extend(r),
                _ => break,
            }
        }
        Ok(Some(records))
    }

    fn records_page(&self, domain: &str, page: u32) -> Result<RecordsPage, ProviderError> {
        trace!("Requesting page {} of records for {}", page, domain);
        let response = self
            .client
            .get(self.records_url(domain))
            .bearer_auth(self.token.as_str())
            .query(&[("page", page), ("per_page", RECORD_PAGE_SIZE)])
            .send()
            .map_err(|e| ProviderError::Request(format!("Check records (GET) failed: {}", e)))?;

        check_status(response)?
            .json::<RecordsPage>()
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    /// Send a full record to the registrar and return the record it echoes back
    pub fn put_record(
        &self,
        domain: &str,
        record: &DomainRecord,
    ) -> Result<DomainRecord, ProviderError> {
        let response = self
            .client
            .put(format!("{}/{}", self.records_url(domain), record.id))
            .bearer_auth(self.token.as_str())
            .json(record)
            .send()
            .map_err(|e| {
                ProviderError::Request(format!(
                    "Update record [ {} ] (PUT) failed: {}",
                    record.id, e
                ))
            })?;

        check_status(response)?
            .json::<SingleRecord>()
            .map(|r| r.domain_record)
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

// Turn error statuses into errors, including the API's own message when it sends one
fn check_status(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let canonical = status.canonical_reason().unwrap_or("unknown").to_owned();
        let reason = match response.json::<ApiErrorBody>() {
            Ok(body) => format!("{} ({})", canonical, body.message),
            Err(_) => canonical,
        };
        return Err(ProviderError::Status {
            code: status.as_u16(),
            reason,
        });
    }
    if status != StatusCode::OK {
        warn!("Non-OK status code returned [ {} ]", status);
    }
    Ok(response)
}

use std::net::IpAddr;

use http::StatusCode;
use itertools::Itertools;
use log::{debug, warn};
use reqwest::{blocking::Client, Url};

use super::{IpSource, SourceError};

/// Plain HTTP services that answer with the caller's address as the entire response body
pub const DEFAULT_ECHO_URLS: [&str; 2] = ["http://ipecho.net/plain", "http://ipinfo.io/ip"];

/// How an [`EchoSource`] treats the services after the first one.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FallbackPolicy {
    /// Only ask the first service and report its failure as-is
    #[default]
    FirstOnly,
    /// Ask each service in order until one returns a valid address
    Exhaustive,
}

/// Configuration for [`EchoSource`]. Must be supplied when creating an [`EchoSource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EchoSourceConfig {
    /// Echo service URLs, in the order they should be asked
    pub urls: Vec<String>,
    pub policy: FallbackPolicy,
}

impl Default for EchoSourceConfig {
    fn default() -> Self {
        EchoSourceConfig {
            urls: DEFAULT_ECHO_URLS.iter().map(|u| u.to_string()).collect(),
            policy: FallbackPolicy::default(),
        }
    }
}

/// An address source that asks public echo services which address we are connecting from.
///
/// Each call to [`IpSource::addr()`] performs new requests, nothing is cached.
///
/// To create a new source, use the [`EchoSource::from_config()`] function
#[derive(Debug)]
#[non_exhaustive]
pub struct EchoSource {
    urls: Vec<String>,
    policy: FallbackPolicy,
    client: Client,
}

impl EchoSource {
    /// Create a new [`EchoSource`] with the supplied configuration.
    /// No requests are made until an address is requested.
    pub fn from_config(config: &EchoSourceConfig) -> Result<Box<dyn IpSource>, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("dodns/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("could not initialize HTTP client: {}", e))?;
        Ok(Box::new(EchoSource {
            urls: config.urls.to_owned(),
            policy: config.policy,
            client,
        }))
    }

    // Ask a single echo service for our address. The response is consumed before returning.
    fn fetch(&self, url: &str) -> Result<IpAddr, SourceError> {
        let parsed = Url::parse(url)
            .map_err(|e| format!("Provided url string [ {} ] can not be parsed: {}", url, e))?;

        debug!("Asking {} for our address", parsed);
        let response = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| format!("Check IP (GET) failed: {}", e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(format!(
                "Error response [ {} ]: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown")
            )
            .into());
        }
        if status != StatusCode::OK {
            warn!("Non-OK status code returned [ {} ] by {}", status, url);
            return Err(format!("Unacceptable response code: {}", status.as_u16()).into());
        }

        let body = response
            .text()
            .map_err(|e| format!("Failed to read response bytes: {}", e))?;
        let content = body.trim();
        content.parse::<IpAddr>().map_err(|_| {
            SourceError::from(format!(
                "Response content is not a valid IP address: {:?}",
                content
            ))
        })
    }
}

impl IpSource for EchoSource {
    fn addr(&self) -> Result<IpAddr, SourceError> {
        match self.policy {
            FallbackPolicy::FirstOnly => {
                let url = self
                    .urls
                    .first()
                    .ok_or_else(|| SourceError::from("No IP echo services configured".to_string()))?;
                self.fetch(url)
            }
            FallbackPolicy::Exhaustive => {
                let mut errors: Vec<String> = Vec::new();
                for url in &self.urls {
                    match self.fetch(url) {
                        Ok(addr) => return Ok(addr),
                        Err(e) => {
                            warn!("IP lookup via {} failed: {}", url, e);
                            errors.push(format!("{}: {}", url, e));
                        }
                    }
                }
                Err(format!(
                    "Failed to retrieve IP from all ({}) remotes: {}",
                    self.urls.len(),
                    errors.iter().join("; ")
                )
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use httpmock::prelude::*;
    use totems::assert_err;

    use super::*;

    fn source(urls: Vec<String>, policy: FallbackPolicy) -> Box<dyn IpSource> {
        EchoSource::from_config(&EchoSourceConfig { urls, policy }).unwrap()
    }

    #[test]
    fn should_return_trimmed_address() {
        let server = MockServer::start();
        let echo = server.mock(|when, then| {
            when.method(GET).path("/plain");
            then.status(200).body("  203.0.113.7\n");
        });

        let addr = source(vec![server.url("/plain")], FallbackPolicy::FirstOnly).addr();

        assert_eq!(addr, Ok(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7))));
        echo.assert();
    }

    #[test]
    fn should_accept_ipv6_address() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ip");
            then.status(200).body("2001:db8::7");
        });

        let addr = source(vec![server.url("/ip")], FallbackPolicy::FirstOnly).addr();

        assert_eq!(
            addr,
            Ok(IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 7)))
        );
    }

    #[test]
    fn should_only_ask_first_service_by_default() {
        let server = MockServer::start();
        let broken = server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(503);
        });
        let working = server.mock(|when, then| {
            when.method(GET).path("/working");
            then.status(200).body("203.0.113.7");
        });

        let res = source(
            vec![server.url("/broken"), server.url("/working")],
            FallbackPolicy::FirstOnly,
        )
        .addr();

        assert!(res.unwrap_err().to_string().contains("503"));
        broken.assert();
        working.assert_hits(0);
    }

    #[test]
    fn should_fall_back_when_exhaustive() {
        let server = MockServer::start();
        let broken = server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(500);
        });
        let garbage = server.mock(|when, then| {
            when.method(GET).path("/garbage");
            then.status(200).body("<html>hello</html>");
        });
        let working = server.mock(|when, then| {
            when.method(GET).path("/working");
            then.status(200).body("198.51.100.2");
        });

        let res = source(
            vec![
                server.url("/broken"),
                server.url("/garbage"),
                server.url("/working"),
            ],
            FallbackPolicy::Exhaustive,
        )
        .addr();

        assert_eq!(res, Ok(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 2))));
        broken.assert();
        garbage.assert();
        working.assert();
    }

    #[test]
    fn should_fail_after_all_services_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/a");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET).path("/b");
            then.status(200).body("not an address");
        });

        let err = source(
            vec![server.url("/a"), server.url("/b")],
            FallbackPolicy::Exhaustive,
        )
        .addr()
        .unwrap_err();

        assert!(err.to_string().contains("all (2) remotes"));
    }

    #[test]
    fn should_reject_non_ok_success_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ip");
            then.status(204);
        });

        let err = source(vec![server.url("/ip")], FallbackPolicy::FirstOnly)
            .addr()
            .unwrap_err();

        assert!(err.to_string().contains("Unacceptable response code"));
    }

    #[test]
    fn should_reject_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ip");
            then.status(200).body("1.2.3.4.5");
        });

        assert_err!(source(vec![server.url("/ip")], FallbackPolicy::FirstOnly).addr());
    }

    #[test]
    fn should_reject_invalid_service_url() {
        assert_err!(source(
            vec!["get:ip;from.invalid_site.com".to_string()],
            FallbackPolicy::FirstOnly
        )
        .addr());
        assert_err!(source(vec![], FallbackPolicy::FirstOnly).addr());
    }

    #[test]
    fn should_have_parsable_default_services() {
        for url in DEFAULT_ECHO_URLS {
            assert!(Url::parse(url).is_ok(), "{} is not a valid url", url);
        }
    }
}

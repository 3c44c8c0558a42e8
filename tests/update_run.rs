//! Complete update runs against local stand-ins for the echo services and the DigitalOcean API.

use std::net::{IpAddr, Ipv4Addr};

use dodns::{
    ipsource::{EchoSourceConfig, FallbackPolicy},
    lookup::{HostLookup, LookupError},
    run_with_lookup, Config, ErrorKind, Outcome, Stage,
};
use httpmock::prelude::*;
use serde_json::json;

const DOMAIN: &str = "example.com";
const RECORD: &str = "home";

/// Every name resolves
struct AnyHost;
impl HostLookup for AnyHost {
    fn lookup_host(&self, _host: &str) -> Result<Vec<IpAddr>, LookupError> {
        Ok(vec![IpAddr::V4(Ipv4Addr::new(203, 0, 113, 1))])
    }
}

fn token() -> String {
    "d".repeat(64)
}

fn config(api: &MockServer) -> Config {
    let mut config = Config::new(&token(), DOMAIN, RECORD);
    config.api_root = api.base_url();
    config
}

fn record(data: &str) -> serde_json::Value {
    json!({
        "id": 3352895,
        "type": "A",
        "name": RECORD,
        "data": data,
        "priority": null,
        "port": null,
        "weight": null,
        "ttl": 3600
    })
}

fn mock_listing<'a>(api: &'a MockServer, data: &str) -> httpmock::Mock<'a> {
    let body = json!({
        "domain_records": [
            { "id": 1, "type": "NS", "name": "@", "data": "ns1.digitalocean.com",
              "priority": null, "port": null, "weight": null },
            record(data),
        ],
        "links": {},
        "meta": { "total": 2 }
    });
    api.mock(|when, then| {
        when.method(GET)
            .path("/domains/example.com/records")
            .header("authorization", format!("Bearer {}", token()));
        then.status(200).json_body(body);
    })
}

#[test]
fn current_record_is_left_alone() {
    let api = MockServer::start();
    let list = mock_listing(&api, "1.2.3.4");
    let put = api.mock(|when, then| {
        when.method(PUT);
        then.status(500);
    });
    let mut config = config(&api);
    config.ip = Some("1.2.3.4".to_string());

    let outcome = run_with_lookup(&config, &AnyHost).unwrap();

    assert_eq!(outcome.to_string(), "DNS update not required: 1.2.3.4");
    list.assert();
    put.assert_hits(0);
}

#[test]
fn outdated_record_is_updated() {
    let api = MockServer::start();
    mock_listing(&api, "9.9.9.9");
    let put = api.mock(|when, then| {
        when.method(PUT)
            .path("/domains/example.com/records/3352895")
            .header("authorization", format!("Bearer {}", token()))
            .json_body_partial(r#"{ "data": "1.2.3.4", "name": "home" }"#);
        then.status(200)
            .json_body(json!({ "domain_record": record("1.2.3.4") }));
    });
    let mut config = config(&api);
    config.ip = Some("1.2.3.4".to_string());

    let outcome = run_with_lookup(&config, &AnyHost).unwrap();

    assert_eq!(
        outcome,
        Outcome::Updated(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)))
    );
    assert_eq!(outcome.to_string(), "DNS update success: 1.2.3.4");
    put.assert();
}

#[test]
fn update_that_is_not_applied_fails() {
    let api = MockServer::start();
    mock_listing(&api, "9.9.9.9");
    api.mock(|when, then| {
        when.method(PUT).path("/domains/example.com/records/3352895");
        then.status(200)
            .json_body(json!({ "domain_record": record("9.9.9.9") }));
    });
    let mut config = config(&api);
    config.ip = Some("1.2.3.4".to_string());

    let err = run_with_lookup(&config, &AnyHost).unwrap_err();

    assert_eq!(err.stage(), Stage::Update);
    assert_ne!(err.exit_code(), 0);
    assert!(err.to_string().contains("not updated successfully"));
}

#[test]
fn short_token_fails_before_any_request() {
    let api = MockServer::start();
    let any = api.mock(|when, then| {
        when.any_request();
        then.status(500);
    });
    let mut config = config(&api);
    config.token = "0123456789".to_string();
    config.ip = Some("1.2.3.4".to_string());

    let err = run_with_lookup(&config, &AnyHost).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Credential);
    assert_eq!(err.exit_code(), 1);
    any.assert_hits(0);
}

#[test]
fn failed_address_lookup_stops_before_registrar() {
    let echo = MockServer::start();
    echo.mock(|when, then| {
        when.method(GET).path("/down");
        then.status(503);
    });
    echo.mock(|when, then| {
        when.method(GET).path("/garbage");
        then.status(200).body("definitely not an address");
    });
    let api = MockServer::start();
    let any = api.mock(|when, then| {
        when.any_request();
        then.status(500);
    });
    let mut config = config(&api);
    config.echo = EchoSourceConfig {
        urls: vec![echo.url("/down"), echo.url("/garbage")],
        policy: FallbackPolicy::Exhaustive,
    };

    let err = run_with_lookup(&config, &AnyHost).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert_eq!(err.exit_code(), 4);
    any.assert_hits(0);
}

#[test]
fn echo_address_is_published() {
    let echo = MockServer::start();
    let plain = echo.mock(|when, then| {
        when.method(GET).path("/plain");
        then.status(200).body("1.2.3.4\n");
    });
    let api = MockServer::start();
    mock_listing(&api, "1.2.3.4");
    let mut config = config(&api);
    config.echo = EchoSourceConfig {
        urls: vec![echo.url("/plain")],
        policy: FallbackPolicy::FirstOnly,
    };

    let outcome = run_with_lookup(&config, &AnyHost).unwrap();

    assert_eq!(
        outcome,
        Outcome::Unchanged(IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4)))
    );
    plain.assert();
}

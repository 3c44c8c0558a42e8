//! Decides whether the published record needs to change.

use std::net::IpAddr;

use log::{debug, info};
use thiserror::Error;

use crate::provider::DomainRecord;

/// Outcome of comparing the published record against the desired address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Decision {
    /// The record already points to the desired address
    UpToDate(DomainRecord),
    /// The record points somewhere else and needs to be updated
    Outdated(DomainRecord),
}

impl Decision {
    pub fn record(&self) -> &DomainRecord {
        match self {
            Decision::UpToDate(r) | Decision::Outdated(r) => r,
        }
    }

    pub fn needs_update(&self) -> bool {
        matches!(self, Decision::Outdated(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReconcileError {
    #[error("Record not found [ {record} ] in domain [ {domain} ]. Add it in the DigitalOcean control panel first.")]
    NotFound { record: String, domain: String },
}

/// Find the record named `label` and compare its data with `addr`.
///
/// Records are searched in the order given, the first match wins.
/// This tool never creates records, a missing one is an error.
pub fn decide(
    records: &[DomainRecord],
    label: &str,
    domain: &str,
    addr: &IpAddr,
) -> Result<Decision, ReconcileError> {
    let record = records
        .iter()
        .find(|r| r.name == label)
        .ok_or_else(|| ReconcileError::NotFound {
            record: label.to_owned(),
            domain: domain.to_owned(),
        })?;
    debug!("Found record {}", record);

    if record.holds(&addr.to_string()) {
        info!("Record {} already points to {}", label, addr);
        Ok(Decision::UpToDate(record.to_owned()))
    } else {
        info!("Record {} points to {}, expected {}", label, record.data, addr);
        Ok(Decision::Outdated(record.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use super::*;

    const DOMAIN: &str = "example.com";

    fn rec(id: u64, name: &str, data: &str) -> DomainRecord {
        DomainRecord {
            id,
            kind: "A".to_string(),
            name: name.to_string(),
            data: data.to_string(),
            priority: None,
            port: None,
            weight: None,
        }
    }

    fn ip(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn should_not_update_matching_record() {
        let records = vec![rec(1, "@", "5.5.5.5"), rec(2, "home", "1.2.3.4")];
        let d = decide(&records, "home", DOMAIN, &ip(1, 2, 3, 4)).unwrap();
        assert_eq!(d, Decision::UpToDate(rec(2, "home", "1.2.3.4")));
        assert!(!d.needs_update());
    }

    #[test]
    fn should_update_differing_record() {
        let records = vec![rec(2, "home", "9.9.9.9")];
        let d = decide(&records, "home", DOMAIN, &ip(1, 2, 3, 4)).unwrap();
        assert_eq!(d, Decision::Outdated(rec(2, "home", "9.9.9.9")));
        assert!(d.needs_update());
        assert_eq!(d.record().id, 2);
    }

    #[test]
    fn should_fail_for_missing_record() {
        let records = vec![rec(1, "www", "1.2.3.4")];
        assert_eq!(
            decide(&records, "home", DOMAIN, &ip(1, 2, 3, 4)),
            Err(ReconcileError::NotFound {
                record: "home".to_string(),
                domain: DOMAIN.to_string()
            })
        );
        assert!(decide(&[], "home", DOMAIN, &ip(1, 2, 3, 4)).is_err());
    }

    #[test]
    fn should_use_first_matching_record() {
        let records = vec![rec(7, "home", "9.9.9.9"), rec(8, "home", "1.2.3.4")];
        let d = decide(&records, "home", DOMAIN, &ip(1, 2, 3, 4)).unwrap();
        assert_eq!(d, Decision::Outdated(rec(7, "home", "9.9.9.9")));
    }

    #[test]
    fn should_compare_ipv6_as_address() {
        let records = vec![rec(3, "home", "2001:0db8:0000:0000:0000:0000:0000:0001")];
        let addr = IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1));
        assert!(!decide(&records, "home", DOMAIN, &addr)
            .unwrap()
            .needs_update());
    }
}

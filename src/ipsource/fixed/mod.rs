use std::net::IpAddr;

use super::{IpSource, SourceError};

/// Returns the address given by the user.
///
/// The literal is kept as-is and only parsed when [`IpSource::addr()`] is called,
/// so a malformed value is reported like any other address resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedSource {
    literal: String,
}

impl IpSource for FixedSource {
    fn addr(&self) -> Result<IpAddr, SourceError> {
        self.literal.trim().parse::<IpAddr>().map_err(|e| {
            format!(
                "Provided address [ {} ] is not a valid IP address: {}",
                self.literal, e
            )
            .into()
        })
    }
}

impl FixedSource {
    pub fn new(literal: &str) -> Self {
        FixedSource {
            literal: literal.to_owned(),
        }
    }
}

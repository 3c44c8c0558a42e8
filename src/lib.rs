//! Main crate for the `dodns` application.
//!
//! `dodns` keeps a single DigitalOcean DNS record pointed at the public IP address of the machine it runs on.
//! It is meant to be run periodically, e.g. from a systemd timer or cron.
//!
//! A run consists of the following steps, driven by [`Updater`]:
//! 1. The token, domain and record name are [`validate`]d. Domain and record must resolve in DNS.
//! 2. An [`ipsource`] determines the address to publish
//! 3. The records of the domain are read from the [`provider`] and [`reconcile`]d with that address
//! 4. If the record is outdated, it is updated
//!
//! Failures are reported as [`Error`]s, whose [`Stage`] determines the exit code of the binary.

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod error;
pub mod ipsource;
pub mod lookup;
pub mod provider;
pub mod reconcile;
pub mod updater;
pub mod validate;

pub use config::Config;
pub use error::{Error, ErrorKind, Stage};
pub use updater::{run, run_with_lookup, Outcome, Updater};

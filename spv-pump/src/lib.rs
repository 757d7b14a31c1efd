//! Client for the HTTP control interface of Emaux SPV pool pumps.
//!
//! The pump exposes a single CGI endpoint that takes every command as a
//! flat query string (`name`, `val`, `type`, `time`) and answers with a
//! flat JSON object. This crate maps typed operations onto that protocol:
//!
//! - [`params`] holds the table of settable parameters and their legal
//!   value domains, and validates values before they are sent.
//! - [`client`] issues the requests and judges set commands by the echo
//!   the pump sends back.
//! - [`types`] decodes the bulk read payloads into [`PumpState`] and
//!   [`PumpSettings`].

pub mod client;
pub mod error;
pub mod params;
pub mod tracing;
pub mod types;

pub use client::{Client, ClientConfig};
pub use error::{Error, Result};
pub use params::{Domain, ParamValue, Registry, ValidationError};
pub use types::{PumpSettings, PumpState, Schedule};

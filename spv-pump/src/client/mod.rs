//! Pump operations over the CGI endpoint.
//!
//! Every operation is one independent round trip: a request built from
//! the operation, the exchange, and a decode of the reply. Nothing is
//! cached between calls and nothing is retried.
//!
//! Set operations are confirmed by echo: the pump answers a write with
//! `{"<name>": <value now in effect>}`. A write counts as applied only if
//! the status is 200 and the echo matches what was sent; otherwise the
//! operation returns `Ok(false)`.

mod config;
mod request;
mod transport;

use reqwest::StatusCode;
use serde_json::{Map, Value};

pub use config::{ClientConfig, DEFAULT_ENDPOINT_PATH, DEFAULT_TIMEOUT};
pub use request::{Kind, Method, Request};
pub use transport::{HttpTransport, Response, Transport, TransportError};

use crate::error::{Error, Result};
use crate::params::{ParamValue, Registry};
use crate::tracing::prelude::*;
use crate::types::{DecodeError, PumpSettings, PumpState};

/// Bulk read of live status.
const ALL_READ: &str = "AllRd";
/// Bulk read of writable settings.
const ALL_WRITE: &str = "AllWr";
const SET_CURRENT_SPEED: &str = "SetCurrentSpeed";
const RUN_STOP: &str = "RunStop";
const RUN: i64 = 1;
const STOP: i64 = 2;

/// Client for one pump.
pub struct Client<T = HttpTransport> {
    config: ClientConfig,
    registry: Registry,
    transport: T,
}

impl Client<HttpTransport> {
    /// Client over HTTP with the SPV parameter table.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Registry::default(), HttpTransport)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, registry: Registry, transport: T) -> Self {
        Self {
            config,
            registry,
            transport,
        }
    }

    /// Replace the parameter table used by [`set_parameter`](Self::set_parameter).
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Read the live status snapshot.
    pub async fn pump_state(&self) -> Result<PumpState> {
        let body = self.read(ALL_READ).await?;
        Ok(PumpState::from_payload(&body)?)
    }

    /// Read the writable settings, including all four schedules.
    pub async fn pump_settings(&self) -> Result<PumpSettings> {
        let body = self.read(ALL_WRITE).await?;
        Ok(PumpSettings::from_payload(&body)?)
    }

    /// Read a single parameter and return the reply as-is.
    pub async fn get_parameter(&self, name: &str) -> Result<Map<String, Value>> {
        self.read(name).await
    }

    /// Set the running speed.
    ///
    /// Not checked against the parameter table; use
    /// [`set_parameter`](Self::set_parameter) for a validated write.
    pub async fn set_speed(&self, speed: i64) -> Result<bool> {
        self.write(SET_CURRENT_SPEED, &ParamValue::Int(speed)).await
    }

    pub async fn turn_on(&self) -> Result<bool> {
        self.write(RUN_STOP, &ParamValue::Int(RUN)).await
    }

    pub async fn turn_off(&self) -> Result<bool> {
        self.write(RUN_STOP, &ParamValue::Int(STOP)).await
    }

    /// Validate `value` against the parameter table, then write it.
    ///
    /// A rejected value fails with [`Error::Validation`] before anything
    /// is sent.
    pub async fn set_parameter(&self, name: &str, value: impl Into<ParamValue>) -> Result<bool> {
        let value = value.into();
        self.registry.validate(name, &value)?;
        self.write(name, &value).await
    }

    /// Enable or disable schedule slot `slot` (1-4).
    pub async fn set_schedule_enabled(&self, slot: u8, enabled: bool) -> Result<bool> {
        self.set_parameter(&format!("Sch{slot}Enable"), enabled).await
    }

    /// Store `speed` in speed preset `slot` (1-4).
    pub async fn set_speed_preset(&self, slot: u8, speed: i64) -> Result<bool> {
        self.set_parameter(&format!("Speed{slot}"), speed).await
    }

    /// Switch to running at speed preset `slot` (1-4).
    pub async fn select_speed_preset(&self, slot: u8) -> Result<bool> {
        self.set_parameter("SetCurrentSpeedSel", slot).await
    }

    async fn read(&self, name: &str) -> Result<Map<String, Value>> {
        let request = Request::get(&self.config.endpoint_url(), name);
        debug!(name, kind = %request.kind, "Reading");

        let response = self.exchange(&request).await?;
        if response.status != StatusCode::OK {
            warn!(name, status = %response.status, "Read rejected");
            return Err(Error::Status(response.status));
        }

        match response.json()? {
            Value::Object(map) => Ok(map),
            other => {
                warn!(name, body = %other, "Read answered with a non-object");
                Err(DecodeError::NotAnObject(other.to_string()).into())
            }
        }
    }

    async fn write(&self, name: &str, value: &ParamValue) -> Result<bool> {
        let request = Request::set(&self.config.endpoint_url(), name, value);
        debug!(name, kind = %request.kind, val = %request.val, "Writing");

        let response = self.exchange(&request).await?;
        if response.status != StatusCode::OK {
            warn!(name, status = %response.status, "Write not confirmed");
            return Ok(false);
        }

        let echo = match response.json() {
            Ok(Value::Object(echo)) => echo,
            Ok(other) => {
                warn!(name, body = %other, "Write not confirmed: echo is not an object");
                return Ok(false);
            }
            Err(e) => {
                warn!(name, error = %e, "Write not confirmed: unreadable echo");
                return Ok(false);
            }
        };

        let confirmed = echo
            .get(name)
            .is_some_and(|echoed| value.matches_echo(echoed));
        if !confirmed {
            warn!(name, sent = %value, echo = ?echo, "Write not confirmed: echo mismatch");
        }
        Ok(confirmed)
    }

    async fn exchange(&self, request: &Request) -> Result<Response> {
        self.transport
            .execute(request, self.config.timeout)
            .await
            .map_err(|e| {
                debug!(name = %request.name, error = %e, "Transport failure");
                Error::Connectivity(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use test_case::test_case;

    use super::transport::testing::SpyTransport;
    use super::*;
    use crate::params::ValidationError;
    use crate::types::fixtures;

    fn client(spy: SpyTransport) -> Client<SpyTransport> {
        Client::with_transport(ClientConfig::new("pump"), Registry::default(), spy)
    }

    fn body(map: &Map<String, Value>) -> String {
        Value::Object(map.clone()).to_string()
    }

    fn query(request: &Request) -> Vec<(&'static str, String)> {
        request.query()[..3].to_vec()
    }

    #[tokio::test]
    async fn pump_state_reads_all_rd() {
        let spy = SpyTransport::new().reply(StatusCode::OK, body(&fixtures::state()));
        let client = client(spy);

        let state = client.pump_state().await.unwrap();
        assert!(state.running);
        assert_eq!(state.current_speed, 1500);
        assert_eq!(state.temperature, 24);

        let requests = client.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].endpoint, "http://pump/cgi-bin/EpvCgi");
        assert_eq!(
            query(&requests[0]),
            [
                ("name", "AllRd".to_string()),
                ("val", "0".to_string()),
                ("type", "get".to_string()),
            ]
        );
        assert_eq!(requests[0].method(), Method::Get);
    }

    #[tokio::test]
    async fn pump_settings_reads_all_wr() {
        let spy = SpyTransport::new().reply(StatusCode::OK, body(&fixtures::settings()));
        let client = client(spy);

        let settings = client.pump_settings().await.unwrap();
        assert_eq!(settings.schedules[2].title, "Slot 3");
        assert_eq!(settings.speed_presets[0].speed, 1500);

        let requests = client.transport.requests();
        assert_eq!(requests[0].name, "AllWr");
        assert_eq!(requests[0].kind, Kind::Get);
    }

    #[tokio::test]
    async fn read_decode_failure_is_not_connectivity() {
        let mut payload = fixtures::state();
        payload.remove("Model");
        let client = client(SpyTransport::new().reply(StatusCode::OK, body(&payload)));

        assert!(matches!(
            client.pump_state().await,
            Err(Error::Decode(DecodeError::MissingKey(key))) if key == "Model"
        ));
    }

    #[tokio::test]
    async fn read_with_bad_status_is_an_error() {
        let client = client(SpyTransport::new().reply(StatusCode::NOT_FOUND, ""));
        assert!(matches!(
            client.pump_state().await,
            Err(Error::Status(StatusCode::NOT_FOUND))
        ));
    }

    #[tokio::test]
    async fn read_with_non_json_body_is_connectivity() {
        let client = client(SpyTransport::new().reply(StatusCode::OK, "<html>busy</html>"));
        assert!(matches!(
            client.pump_settings().await,
            Err(Error::Connectivity(TransportError::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn read_with_non_object_json_is_decode_error() {
        let client = client(
            SpyTransport::new()
                .reply(StatusCode::OK, r#"[{"Clock": "1"}]"#)
                .reply(StatusCode::OK, "42"),
        );
        assert!(matches!(
            client.pump_state().await,
            Err(Error::Decode(DecodeError::NotAnObject(body))) if body == r#"[{"Clock":"1"}]"#
        ));
        assert!(matches!(
            client.get_parameter("Speed1").await,
            Err(Error::Decode(DecodeError::NotAnObject(_)))
        ));
    }

    #[tokio::test]
    async fn set_with_non_object_echo_is_false() {
        let client = client(SpyTransport::new().reply(StatusCode::OK, "[1]"));
        assert!(!client.turn_on().await.unwrap());
    }

    #[tokio::test]
    async fn get_parameter_returns_raw_body() {
        let client = client(
            SpyTransport::new().reply(StatusCode::OK, r#"{"Speed2": "2000"}"#),
        );

        let body = client.get_parameter("Speed2").await.unwrap();
        assert_eq!(body.get("Speed2"), Some(&Value::from("2000")));

        let requests = client.transport.requests();
        assert_eq!(
            query(&requests[0]),
            [
                ("name", "Speed2".to_string()),
                ("val", "0".to_string()),
                ("type", "get".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn set_speed_confirmed_by_echo() {
        let client = client(
            SpyTransport::new().reply(StatusCode::OK, r#"{"SetCurrentSpeed": 1500}"#),
        );

        assert!(client.set_speed(1500).await.unwrap());

        let requests = client.transport.requests();
        assert_eq!(
            query(&requests[0]),
            [
                ("name", "SetCurrentSpeed".to_string()),
                ("val", "1500".to_string()),
                ("type", "set".to_string()),
            ]
        );
        assert_eq!(requests[0].method(), Method::Post);
    }

    #[tokio::test]
    async fn set_speed_echo_mismatch_is_false() {
        let client = client(
            SpyTransport::new().reply(StatusCode::OK, r#"{"SetCurrentSpeed": 1400}"#),
        );
        assert!(!client.set_speed(1500).await.unwrap());
    }

    #[test_case(r#"{"SetCurrentSpeed": "1500"}"#, true ; "numeric string")]
    #[test_case(r#"{"SetCurrentSpeed": " +1500 "}"#, false ; "padded and signed")]
    #[test_case(r#"{"SetCurrentSpeed": "+1500"}"#, false ; "signed")]
    #[test_case(r#"{"SetCurrentSpeed": "01500"}"#, false ; "leading zero")]
    #[tokio::test]
    async fn set_speed_string_echo_must_be_exact(echo: &str, confirmed: bool) {
        let client = client(SpyTransport::new().reply(StatusCode::OK, echo));
        assert_eq!(client.set_speed(1500).await.unwrap(), confirmed);
    }

    #[tokio::test]
    async fn set_with_bad_status_is_false() {
        let client = client(
            SpyTransport::new().reply(StatusCode::INTERNAL_SERVER_ERROR, r#"{"RunStop": 1}"#),
        );
        assert!(!client.turn_on().await.unwrap());
    }

    #[tokio::test]
    async fn set_with_unreadable_echo_is_false() {
        let client = client(SpyTransport::new().reply(StatusCode::OK, "OK"));
        assert!(!client.turn_off().await.unwrap());
    }

    #[tokio::test]
    async fn set_echo_for_other_key_is_false() {
        let client = client(SpyTransport::new().reply(StatusCode::OK, r#"{"RunStop": 1}"#));
        assert!(!client.set_speed(1).await.unwrap());
    }

    #[tokio::test]
    async fn power_on_and_off() {
        let spy = SpyTransport::new()
            .reply(StatusCode::OK, r#"{"RunStop": 1}"#)
            .reply(StatusCode::OK, r#"{"RunStop": "2"}"#);
        let client = client(spy);

        assert!(client.turn_on().await.unwrap());
        assert!(client.turn_off().await.unwrap());

        let vals: Vec<(String, String)> = client
            .transport
            .requests()
            .iter()
            .map(|r| (r.name.clone(), r.val.clone()))
            .collect();
        assert_eq!(
            vals,
            [
                ("RunStop".to_string(), "1".to_string()),
                ("RunStop".to_string(), "2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn set_parameter_out_of_range_sends_nothing() {
        let client = client(SpyTransport::new());

        let result = client.set_parameter("SetCurrentSpeed", 5000).await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::OutOfRange { value: 5000, .. }))
        ));
        assert!(client.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn set_parameter_unknown_name() {
        let client = client(SpyTransport::new());

        let result = client.set_parameter("Bogus", 1).await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::UnknownParameter(name))) if name == "Bogus"
        ));
        assert!(client.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn set_parameter_string_value() {
        let client = client(
            SpyTransport::new().reply(StatusCode::OK, r#"{"Sch2Title": "Night run"}"#),
        );

        assert!(client.set_parameter("Sch2Title", "Night run").await.unwrap());

        let requests = client.transport.requests();
        assert_eq!(requests[0].val, "Night run");
        assert_eq!(requests[0].method(), Method::Get);
    }

    #[tokio::test]
    async fn set_parameter_uses_injected_registry() {
        let registry =
            Registry::from_entries([("SetCurrentSpeed", crate::Domain::range(0, 9999))]);
        let client = client(
            SpyTransport::new().reply(StatusCode::OK, r#"{"SetCurrentSpeed": 5000}"#),
        )
        .with_registry(registry);

        assert!(client.set_parameter("SetCurrentSpeed", 5000).await.unwrap());
    }

    #[tokio::test]
    async fn typed_setters_go_through_registry() {
        let spy = SpyTransport::new()
            .reply(StatusCode::OK, r#"{"Sch3Enable": "1"}"#)
            .reply(StatusCode::OK, r#"{"Speed4": 2800}"#)
            .reply(StatusCode::OK, r#"{"SetCurrentSpeedSel": 2}"#);
        let client = client(spy);

        assert!(client.set_schedule_enabled(3, true).await.unwrap());
        assert!(client.set_speed_preset(4, 2800).await.unwrap());
        assert!(client.select_speed_preset(2).await.unwrap());
        assert!(matches!(
            client.set_schedule_enabled(5, true).await,
            Err(Error::Validation(ValidationError::UnknownParameter(_)))
        ));

        let names: Vec<String> = client
            .transport
            .requests()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["Sch3Enable", "Speed4", "SetCurrentSpeedSel"]);
    }

    #[tokio::test]
    async fn timeout_is_connectivity_for_every_operation() {
        let timeout = || TransportError::Timeout(Duration::from_secs(5));
        let spy = SpyTransport::new()
            .fail(timeout())
            .fail(timeout())
            .fail(timeout())
            .fail(timeout())
            .fail(timeout())
            .fail(timeout())
            .fail(timeout());
        let client = client(spy);

        assert!(matches!(
            client.pump_state().await,
            Err(Error::Connectivity(_))
        ));
        assert!(matches!(
            client.pump_settings().await,
            Err(Error::Connectivity(_))
        ));
        assert!(matches!(
            client.get_parameter("Speed1").await,
            Err(Error::Connectivity(_))
        ));
        assert!(matches!(
            client.set_speed(1500).await,
            Err(Error::Connectivity(_))
        ));
        assert!(matches!(client.turn_on().await, Err(Error::Connectivity(_))));
        assert!(matches!(client.turn_off().await, Err(Error::Connectivity(_))));
        assert!(matches!(
            client.set_parameter("RunStop", 1).await,
            Err(Error::Connectivity(TransportError::Timeout(_)))
        ));
    }

    #[tokio::test]
    async fn each_request_is_timestamped() {
        let spy = SpyTransport::new()
            .reply(StatusCode::OK, r#"{"RunStop": 1}"#)
            .reply(StatusCode::OK, r#"{"RunStop": 1}"#);
        let client = client(spy);

        let before = request::now_millis();
        client.turn_on().await.unwrap();
        client.turn_on().await.unwrap();
        let after = request::now_millis();

        for req in client.transport.requests() {
            assert!((before..=after).contains(&req.time));
        }
    }
}

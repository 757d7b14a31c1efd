//! Query-string requests against the pump endpoint.

use time::OffsetDateTime;

use crate::params::ParamValue;

/// Value of the `type` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    Get,
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// Speed writes go out as POST; everything else as GET.
const POSTED_NAMES: &[&str] = &["SetCurrentSpeed"];

/// One request to the pump: endpoint plus the four query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub endpoint: String,
    pub name: String,
    pub val: String,
    pub kind: Kind,
    /// Milliseconds since the Unix epoch, UTC.
    pub time: i64,
}

impl Request {
    /// Read `name`. Reads always send `val=0`.
    pub fn get(endpoint: &str, name: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            name: name.to_string(),
            val: "0".to_string(),
            kind: Kind::Get,
            time: now_millis(),
        }
    }

    /// Write `value` to `name`.
    pub fn set(endpoint: &str, name: &str, value: &ParamValue) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            name: name.to_string(),
            val: value.to_string(),
            kind: Kind::Set,
            time: now_millis(),
        }
    }

    pub fn method(&self) -> Method {
        if self.kind == Kind::Set && POSTED_NAMES.contains(&self.name.as_str()) {
            Method::Post
        } else {
            Method::Get
        }
    }

    /// Query pairs in wire order. Values are not percent-encoded here.
    pub fn query(&self) -> [(&'static str, String); 4] {
        [
            ("name", self.name.clone()),
            ("val", self.val.clone()),
            ("type", self.kind.to_string()),
            ("time", self.time.to_string()),
        ]
    }
}

/// Current UTC time in whole milliseconds since the epoch.
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

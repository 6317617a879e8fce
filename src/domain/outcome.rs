//! Publish outcome types.
//!
//! Every publish attempt resolves to exactly one Outcome value. API-level
//! failures are data, not errors: the publisher maps its status codes into
//! this closed set and only transport faults surface as `FlockrError`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified result of one publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Post accepted by the platform
    Success,
    /// 403 - account blocked from the action
    Forbidden,
    /// 401 - credentials rejected
    Unauthorized,
    /// 429 - account throttled
    RateLimited,
    /// 400 - request malformed
    BadRequest,
    /// 404 - target missing
    NotFound,
    /// 5xx - platform-side failure
    ServerError,
    /// Anything else the publisher could classify but not name
    Other,
}

impl Outcome {
    /// Returns true if the attempt went through.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Returns true for any non-success variant.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Stable string form used in the health store and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Forbidden => "forbidden",
            Outcome::Unauthorized => "unauthorized",
            Outcome::RateLimited => "rate_limited",
            Outcome::BadRequest => "bad_request",
            Outcome::NotFound => "not_found",
            Outcome::ServerError => "server_error",
            Outcome::Other => "other",
        }
    }

    /// Parse the stable string form back into an Outcome.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Outcome::Success),
            "forbidden" => Some(Outcome::Forbidden),
            "unauthorized" => Some(Outcome::Unauthorized),
            "rate_limited" => Some(Outcome::RateLimited),
            "bad_request" => Some(Outcome::BadRequest),
            "not_found" => Some(Outcome::NotFound),
            "server_error" => Some(Outcome::ServerError),
            "other" => Some(Outcome::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

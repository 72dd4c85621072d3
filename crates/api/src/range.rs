//! Parses the `from`/`to`/`Accept` query parameters every endpoint accepts
//! (§4.8). `from`/`to` are required ISO-8601 timestamps.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Error;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "Accept")]
    pub accept_override: Option<String>,
}

impl RangeQuery {
    pub fn range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), Error> {
        let from = self.from.as_deref().ok_or_else(|| Error::BadRequest("missing 'from'".into()))?;
        let to = self.to.as_deref().ok_or_else(|| Error::BadRequest("missing 'to'".into()))?;
        let from = parse_instant(from)?;
        let to = parse_instant(to)?;
        Ok((from, to))
    }
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| Error::BadRequest(format!("'{s}' is not a valid ISO-8601 timestamp")))
}

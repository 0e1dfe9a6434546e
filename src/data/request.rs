use crate::data::pair::{normalize_symbol, UnrecognizedPair};
use crate::ui::Timeframe;
use chrono::NaiveDateTime;
use thiserror::Error;

pub const HISTORY_LIMIT: u32 = 1500;
pub const RECENT_LIMIT: u32 = 200;
pub const POLL_LIMIT: u32 = 2;

const START_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid start time '{0}', expected YYYY-MM-DD HH:MM")]
pub struct InvalidStartTime(pub String);

/// Parses a UTC start time into epoch milliseconds.
pub fn parse_start_time(value: &str) -> Result<i64, InvalidStartTime> {
    let value = value.trim();
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| InvalidStartTime(value.to_string()))
}

/// Form values captured when the user asks for a chart. Polling reuses them
/// until the next manual fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub exchange_id: String,
    pub raw_symbol: String,
    pub timeframe: Timeframe,
    pub start_time: Option<String>,
}

impl RequestParams {
    pub fn is_historical(&self) -> bool {
        self.start_time.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineQuery {
    pub exchange_id: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub since: Option<i64>,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Pair(#[from] UnrecognizedPair),
    #[error(transparent)]
    StartTime(#[from] InvalidStartTime),
}

impl KlineQuery {
    /// Query for a manual load: history since the start time, or the most
    /// recent bars.
    pub fn initial(params: &RequestParams) -> Result<Self, QueryError> {
        let symbol = normalize_symbol(&params.raw_symbol)?;
        let (since, limit) = match &params.start_time {
            Some(start) => (Some(parse_start_time(start)?), HISTORY_LIMIT),
            None => (None, RECENT_LIMIT),
        };
        Ok(Self {
            exchange_id: params.exchange_id.clone(),
            symbol,
            timeframe: params.timeframe,
            since,
            limit,
        })
    }

    pub fn poll(params: &RequestParams) -> Result<Self, QueryError> {
        Ok(Self {
            exchange_id: params.exchange_id.clone(),
            symbol: normalize_symbol(&params.raw_symbol)?,
            timeframe: params.timeframe,
            since: None,
            limit: POLL_LIMIT,
        })
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("exchange_id", self.exchange_id.clone()),
            ("symbol", self.symbol.clone()),
            ("timeframe", self.timeframe.as_str().to_string()),
        ];
        if let Some(since) = self.since {
            pairs.push(("since", since.to_string()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(start_time: Option<&str>) -> RequestParams {
        RequestParams {
            exchange_id: "binance".to_string(),
            raw_symbol: "BTCUSDT".to_string(),
            timeframe: Timeframe::OneHour,
            start_time: start_time.map(str::to_string),
        }
    }

    #[test]
    fn parses_utc_start_time() {
        assert_eq!(parse_start_time("2024-01-01 00:00").unwrap(), 1_704_067_200_000);
        assert_eq!(parse_start_time("2024-01-01T00:01").unwrap(), 1_704_067_260_000);
        assert_eq!(parse_start_time("2024-01-01 00:00:30").unwrap(), 1_704_067_230_000);
    }

    #[test]
    fn rejects_malformed_start_time() {
        assert!(parse_start_time("yesterday").is_err());
        assert!(parse_start_time("2024-13-01 00:00").is_err());
    }

    #[test]
    fn recent_query_asks_for_200() {
        let query = KlineQuery::initial(&params(None)).unwrap();
        assert_eq!(query.symbol, "BTC/USDT");
        assert_eq!(query.since, None);
        assert_eq!(query.limit, RECENT_LIMIT);
    }

    #[test]
    fn historical_query_asks_for_1500_since() {
        let query = KlineQuery::initial(&params(Some("2024-01-01 00:00"))).unwrap();
        assert_eq!(query.since, Some(1_704_067_200_000));
        assert_eq!(query.limit, HISTORY_LIMIT);
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("since", "1704067200000".to_string())));
        assert!(pairs.contains(&("limit", "1500".to_string())));
        assert!(pairs.contains(&("timeframe", "1h".to_string())));
    }

    #[test]
    fn poll_query_asks_for_two() {
        let query = KlineQuery::poll(&params(None)).unwrap();
        assert_eq!(query.limit, POLL_LIMIT);
        assert!(!query.to_query_pairs().iter().any(|(k, _)| *k == "since"));
    }

    #[test]
    fn bad_pair_surfaces_as_query_error() {
        let mut p = params(None);
        p.raw_symbol = "BTC".to_string();
        assert!(matches!(KlineQuery::initial(&p), Err(QueryError::Pair(_))));
    }
}

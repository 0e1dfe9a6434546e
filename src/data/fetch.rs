use crate::data::models::{exchanges_from_map, Exchange, Kline, SymbolList};
use crate::data::request::KlineQuery;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://crypto-miniapp-backend.onrender.com";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{detail}")]
    Status { status: u16, detail: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }
}

// `detail` is a plain string for HTTPException and a list of objects for
// request validation errors.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// Message for a non-2xx response: the backend's `detail` field when present,
/// otherwise `<context>: <reason> (<code>)`.
pub fn error_detail(context: &str, status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|detail| match detail {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| {
            format!(
                "{}: {} ({})",
                context,
                status.canonical_reason().unwrap_or("Unknown"),
                status.as_u16()
            )
        })
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("klineview/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_exchanges(&self) -> Result<Vec<Exchange>, ApiError> {
        let map: BTreeMap<String, String> = self
            .get_json("/exchanges", &[], "failed to load exchanges")
            .await?;
        Ok(exchanges_from_map(map))
    }

    pub async fn fetch_symbols(&self, exchange_id: &str) -> Result<SymbolList, ApiError> {
        let raw: Vec<String> = self
            .get_json(
                "/symbols",
                &[("exchange_id", exchange_id.to_string())],
                "failed to load pairs",
            )
            .await?;
        Ok(SymbolList::classify(raw))
    }

    pub async fn fetch_klines(&self, query: &KlineQuery) -> Result<Vec<Kline>, ApiError> {
        let mut klines: Vec<Kline> = self
            .get_json("/klines", &query.to_query_pairs(), "failed to load chart")
            .await?;
        klines.sort_by_key(|k| k.timestamp);
        Ok(klines)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, ?query, "backend request");

        let res = self.http.get(&url).query(query).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: error_detail(context, status, &body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::request::RequestParams;
    use crate::data::test_server::serve_once;
    use crate::ui::Timeframe;

    #[test]
    fn detail_field_wins() {
        let msg = error_detail(
            "failed to load chart",
            StatusCode::NOT_FOUND,
            r#"{"detail":"Symbol 'FOO/BAR' not found or invalid on okx."}"#,
        );
        assert_eq!(msg, "Symbol 'FOO/BAR' not found or invalid on okx.");
    }

    #[test]
    fn falls_back_to_status_text() {
        let msg = error_detail("failed to load pairs", StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(msg, "failed to load pairs: Bad Gateway (502)");

        let msg = error_detail("failed to load pairs", StatusCode::SERVICE_UNAVAILABLE, "{}");
        assert_eq!(msg, "failed to load pairs: Service Unavailable (503)");
    }

    #[test]
    fn non_string_detail_is_rendered_as_json() {
        let body = r#"{"detail":[{"loc":["query","limit"],"msg":"value is not a valid integer","type":"type_error.integer"}]}"#;
        let msg = error_detail("failed to load chart", StatusCode::UNPROCESSABLE_ENTITY, body);
        assert!(msg.starts_with('['));
        assert!(msg.contains("value is not a valid integer"));

        let msg = error_detail("failed to load chart", StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":null}"#);
        assert_eq!(msg, "failed to load chart: Unprocessable Entity (422)");
    }

    #[test]
    fn status_error_displays_detail() {
        let err = ApiError::Status {
            status: 404,
            detail: "Exchange ID 'foo' is not supported or not found.".to_string(),
        };
        assert_eq!(err.to_string(), "Exchange ID 'foo' is not supported or not found.");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = BackendClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    fn client(base_url: &str) -> BackendClient {
        BackendClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn symbols_sentinel_is_classified() {
        let (url, server) = serve_once(
            "200 OK",
            "application/json",
            r#"["Биржа okx временно недоступна"]"#,
        )
        .await;

        let list = client(&url).fetch_symbols("okx").await.unwrap();
        assert_eq!(list, SymbolList::Unavailable("Биржа okx временно недоступна".to_string()));

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /symbols?exchange_id=okx "));
    }

    #[tokio::test]
    async fn symbols_payload_keeps_real_pairs() {
        let (url, _server) = serve_once(
            "200 OK",
            "application/json",
            r#"["BTC/USDT","ETH/USDT"]"#,
        )
        .await;

        let list = client(&url).fetch_symbols("binance").await.unwrap();
        assert_eq!(
            list,
            SymbolList::Available(vec!["BTC/USDT".to_string(), "ETH/USDT".to_string()])
        );
    }

    #[tokio::test]
    async fn not_found_surfaces_backend_detail() {
        let (url, _server) = serve_once(
            "404 Not Found",
            "application/json",
            r#"{"detail":"Exchange ID 'foo' is not supported or not found."}"#,
        )
        .await;

        let err = client(&url).fetch_symbols("foo").await.unwrap_err();
        match err {
            ApiError::Status { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Exchange ID 'foo' is not supported or not found.");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn html_gateway_error_falls_back_to_status_text() {
        let (url, _server) = serve_once(
            "502 Bad Gateway",
            "text/html",
            "<html><body>upstream down</body></html>",
        )
        .await;

        let err = client(&url).fetch_exchanges().await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "failed to load exchanges: Bad Gateway (502)");
    }

    #[tokio::test]
    async fn klines_come_back_sorted() {
        let body = r#"[
            {"timestamp":1704070800000,"open":3.0,"high":4.0,"low":2.0,"close":3.5,"volume":10.0},
            {"timestamp":1704067200000,"open":1.0,"high":2.0,"low":0.5,"close":1.5,"volume":5.0},
            {"timestamp":1704074400000,"open":3.5,"high":5.0,"low":3.0,"close":4.5,"volume":7.0}
        ]"#;
        let (url, server) = serve_once("200 OK", "application/json", body).await;

        let params = RequestParams {
            exchange_id: "binance".to_string(),
            raw_symbol: "BTCUSDT".to_string(),
            timeframe: Timeframe::OneHour,
            start_time: None,
        };
        let query = KlineQuery::initial(&params).unwrap();
        let klines = client(&url).fetch_klines(&query).await.unwrap();

        let stamps: Vec<i64> = klines.iter().map(|k| k.timestamp).collect();
        assert_eq!(stamps, vec![1704067200000, 1704070800000, 1704074400000]);

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /klines?"));
        assert!(head.contains("exchange_id=binance"));
        assert!(head.contains("timeframe=1h"));
        assert!(head.contains("limit=200"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let (url, _server) = serve_once("200 OK", "application/json", r#"{"binance":"#).await;

        let err = client(&url).fetch_exchanges().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(err.status(), None);
    }
}

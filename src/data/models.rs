use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Kline {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Kline {
    /// Bar time on the chart's seconds-based axis.
    pub fn time(&self) -> i64 {
        self.timestamp / 1000
    }

    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub id: String,
    pub name: String,
}

pub fn exchanges_from_map(map: BTreeMap<String, String>) -> Vec<Exchange> {
    map.into_iter()
        .map(|(id, name)| Exchange { id, name })
        .collect()
}

// Sentinels the backend puts into an otherwise successful /symbols payload.
const NO_PAIRS_PREFIX: &str = "Нет подходящих пар";
const LOAD_ERROR_PREFIX: &str = "Ошибка";
const UNAVAILABLE_PREFIX: &str = "Биржа ";
const UNAVAILABLE_SUFFIX: &str = "временно недоступна";

/// Outcome of a /symbols call once sentinel strings have been stripped out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolList {
    Available(Vec<String>),
    Empty,
    Unavailable(String),
}

impl SymbolList {
    pub fn classify(raw: Vec<String>) -> Self {
        let mut reason = None;
        let mut symbols = Vec::with_capacity(raw.len());

        for entry in raw {
            if entry.starts_with(NO_PAIRS_PREFIX) {
                continue;
            }
            if is_unavailable_sentinel(&entry) {
                reason.get_or_insert(entry);
                continue;
            }
            if entry.trim().is_empty() {
                continue;
            }
            symbols.push(entry);
        }

        match (symbols.is_empty(), reason) {
            (false, _) => SymbolList::Available(symbols),
            (true, Some(reason)) => SymbolList::Unavailable(reason),
            (true, None) => SymbolList::Empty,
        }
    }
}

fn is_unavailable_sentinel(entry: &str) -> bool {
    entry.starts_with(LOAD_ERROR_PREFIX)
        || (entry.starts_with(UNAVAILABLE_PREFIX) && entry.ends_with(UNAVAILABLE_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn kline_deserializes_backend_shape() {
        let json = r#"{"timestamp":1700000000000,"open":1.0,"high":2.5,"low":0.5,"close":2.0,"volume":10}"#;
        let kline: Kline = serde_json::from_str(json).unwrap();
        assert_eq!(kline.time(), 1_700_000_000);
        assert_eq!(kline.volume, 10.0);
        assert!(kline.is_bullish());
    }

    #[test]
    fn exchanges_are_ordered_by_id() {
        let map: BTreeMap<String, String> =
            serde_json::from_str(r#"{"okx":"OKX","kucoin":"KuCoin","bitget":"Bitget"}"#).unwrap();
        let ids: Vec<_> = exchanges_from_map(map).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["bitget", "kucoin", "okx"]);
    }

    #[test]
    fn classify_keeps_real_symbols() {
        let list = SymbolList::classify(strings(&["BTC/USDT", "", "ETH/USDT"]));
        assert_eq!(list, SymbolList::Available(strings(&["BTC/USDT", "ETH/USDT"])));
    }

    #[test]
    fn classify_no_pairs_sentinel_is_empty() {
        assert_eq!(
            SymbolList::classify(strings(&["Нет подходящих пар на бирже"])),
            SymbolList::Empty
        );
        assert_eq!(SymbolList::classify(Vec::new()), SymbolList::Empty);
    }

    #[test]
    fn classify_error_sentinels_are_unavailable() {
        assert_eq!(
            SymbolList::classify(strings(&["Ошибка при загрузке пар с биржи okx"])),
            SymbolList::Unavailable("Ошибка при загрузке пар с биржи okx".to_string())
        );
        assert_eq!(
            SymbolList::classify(strings(&["Биржа htx временно недоступна"])),
            SymbolList::Unavailable("Биржа htx временно недоступна".to_string())
        );
    }
}

pub mod fetch;
pub mod models;
pub mod pair;
pub mod request;
#[cfg(test)]
pub(crate) mod test_server;

pub use fetch::{ApiError, BackendClient};
pub use models::{Exchange, Kline, SymbolList};
pub use request::{KlineQuery, QueryError, RequestParams};

use crate::data::{ApiError, QueryError};
use thiserror::Error;

/// Everything that ends up in the error banner.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("choose an exchange, a pair and a timeframe")]
    MissingSelection,
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("no data to chart for this request")]
    NoData,
    #[error(transparent)]
    Backend(#[from] ApiError),
}

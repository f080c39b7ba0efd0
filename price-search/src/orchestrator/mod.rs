//! Search orchestrator: concurrent fan-out, retry, filtering, ranking.
//!
//! [`search::execute`] composes the stages. Each stage lives in its own
//! module and is usable on its own.

pub mod dedup;
pub mod fallback;
pub mod fanout;
pub mod filter;
pub mod retry;
pub mod search;
pub mod shipping;
pub mod url_normalize;

pub use retry::RetryPolicy;
pub use search::SearchStage;
pub use shipping::ShippingTable;

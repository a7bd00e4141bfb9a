//! Client side of the analysis protocol: one synchronous request per document.

pub mod http;

pub use http::{AnalysisClient, ClientError, DEFAULT_TIMEOUT};

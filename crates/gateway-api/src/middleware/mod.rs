//! API 서버용 HTTP middleware.

mod metrics;

pub use self::metrics::metrics_layer;

pub mod logger;
pub mod address;
pub mod fetch_data;
pub mod rate_limiter;
pub mod health_check;
pub mod report;

// Re-export commonly used items
pub use logger::{init_tracing, Logger};
pub use fetch_data::FetchError;
pub use rate_limiter::RateLimiter;
pub use health_check::{perform_health_check, log_health_check};
pub use report::{render_csv, write_reports};

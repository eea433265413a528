//! Logging setup
//!
//! Structured logging through `tracing`, pretty in debug builds and JSON in
//! release builds. `RUST_LOG` overrides the default levels.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::LazyError;

/// Install the global subscriber
///
/// # Example
///
/// ```rust,no_run
/// use lazy_crud::observability;
///
/// # fn main() -> Result<(), lazy_crud::error::LazyError> {
/// observability::init()?;
/// tracing::info!("application started");
/// # Ok(())
/// # }
/// ```
pub fn init() -> Result<(), LazyError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            EnvFilter::new("debug,lazy_crud=trace,sqlx=warn")
        } else {
            EnvFilter::new("info")
        }
    });

    #[cfg(debug_assertions)]
    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .try_init();

    #[cfg(not(debug_assertions))]
    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init();

    result.map_err(|e| LazyError::Config(format!("logging already initialized: {e}")))
}

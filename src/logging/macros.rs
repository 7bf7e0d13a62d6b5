//! Macro surface for logging call sites

/// Level macros, importable as `crate::logging::{trace, debug, ...}`
pub use tracing::{debug, error, info, trace, warn};

/// printf-style wrapper over [`server_log`](crate::logging::server_log)
#[macro_export]
macro_rules! server_log {
    ($($arg:tt)*) => {
        $crate::logging::server_log(&format!($($arg)*))
    };
}

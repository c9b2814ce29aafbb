//! Standardized emoji logging for provisioning operations
//!
//! Keeps deposit, withdrawal and swap log lines visually consistent across
//! the provisioner and the CLI.

/// Standard emoji set for provisioning logs
pub struct LogEmoji;

impl LogEmoji {
    pub const SUCCESS: &'static str = "✅";
    pub const ERROR: &'static str = "❌";
    pub const POOL: &'static str = "🏊";
    pub const SWAP: &'static str = "🔄";
    pub const DEPOSIT: &'static str = "➕";
    pub const WITHDRAW: &'static str = "➖";
}

#[macro_export]
macro_rules! log_deposit {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::DEPOSIT, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_withdraw {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::WITHDRAW, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_swap {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SWAP, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_failure {
    ($($arg:tt)*) => {
        tracing::warn!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

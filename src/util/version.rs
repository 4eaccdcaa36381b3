pub const APP_NAME: &str = "Freight Mode Advisor";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn version_label() -> String {
    format!("v{APP_VERSION}")
}

/// User agent sent with every outbound HTTP request.
pub fn user_agent() -> String {
    format!("freight-mode-advisor/{APP_VERSION}")
}

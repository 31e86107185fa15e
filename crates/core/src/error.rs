//! Error types for the Concierge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Concierge operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Memory service request failed: {0}")]
    Request(String),

    #[error("Memory service returned {status_code}: {message}")]
    Api { status_code: u16, message: String },

    #[error("Memory service not configured: {0}")]
    NotConfigured(String),

    #[error("Malformed memory service response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Missing API key for {tool_name}: set {env_var}")]
    MissingApiKey { tool_name: String, env_var: String },

    #[error("Upstream API error in {tool_name}: {message}")]
    Upstream { tool_name: String, message: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Thread {0} is already processing a message")]
    Busy(String),

    #[error("Routing exceeded {max_hops} supervisor visits on thread {thread_id}")]
    HopLimit { thread_id: String, max_hops: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn missing_key_names_the_variable() {
        let err = Error::Tool(ToolError::MissingApiKey {
            tool_name: "search_flights".into(),
            env_var: "SERPAPI_API_KEY".into(),
        });
        assert!(err.to_string().contains("search_flights"));
        assert!(err.to_string().contains("SERPAPI_API_KEY"));
    }

    #[test]
    fn busy_session_mentions_thread() {
        let err = Error::from(SessionError::Busy("samantha".into()));
        assert!(err.to_string().contains("samantha"));
    }
}

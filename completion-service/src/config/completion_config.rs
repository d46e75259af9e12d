/// Configuration for the upstream completion API.
///
/// # Fields
///
/// - `model`: The model identifier (e.g., `"gpt-4o"`).
/// - `endpoint`: Base URL of the API, without the `/v1/...` suffix.
/// - `api_key`: Bearer credential. `None` means every call fails with
///   `MissingApiKey` instead of reaching the network.
/// - `max_tokens`: Maximum number of tokens to generate.
/// - `temperature`: Controls randomness (0.0 = deterministic).
/// - `timeout_secs`: Optional request timeout; `None` keeps the transport default.
///
/// # Examples
///
/// ```
/// use completion_service::config::completion_config::CompletionConfig;
///
/// let cfg = CompletionConfig {
///     api_key: Some("sk-...".to_string()),
///     ..CompletionConfig::default()
/// };
/// assert_eq!(cfg.model, "gpt-4o");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    /// Model identifier string.
    pub model: String,

    /// Base URL (e.g. `https://api.openai.com`).
    pub endpoint: String,

    /// Optional API key for authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            endpoint: "https://api.openai.com".into(),
            api_key: None,
            max_tokens: Some(100),
            temperature: Some(0.7),
            timeout_secs: None,
        }
    }
}

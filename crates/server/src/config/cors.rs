use serde::Deserialize;

/// Cross-origin resource sharing configuration.
///
/// An empty origin list leaves cross-origin requests blocked, matching the
/// browser default.
#[derive(Debug, Default, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to call the API (e.g. `https://app.example.com`).
    #[serde(default)]
    pub origins: Vec<String>,
}

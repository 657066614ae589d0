/// Configuration for the Cashtree client.
#[derive(Debug, Clone)]
pub struct CashtreeConfig {
    /// Base URL for the Cashtree backend (e.g. `https://cashtree.example.com`).
    pub base_url: String,
}

/// Environment variable consulted by [`CashtreeConfig::from_env`].
pub const BASE_URL_ENV: &str = "CASHTREE_API_URL";

impl CashtreeConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read the base URL from `CASHTREE_API_URL`, if set.
    pub fn from_env() -> Option<Self> {
        std::env::var(BASE_URL_ENV).ok().map(Self::new)
    }
}

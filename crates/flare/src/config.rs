//! Connection settings.

use std::time::Duration;

/// Settings for one database connection.
///
/// ```
/// use flare::Config;
/// use std::time::Duration;
///
/// let config = Config::new("https://example.firebaseio.com")
///     .with_auth_token("secret")
///     .with_timeout(Duration::from_secs(10));
/// # let _ = config;
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    base_url: String,
    auth_token: Option<String>,
    timeout: Option<Duration>,
}

impl Config {
    /// Settings for the database rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            timeout: None,
        }
    }

    /// Attach an auth token to every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Time limit for CRUD requests. Change streams are exempt: their
    /// connection is meant to stay open.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The database root URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The auth token, if any.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// The CRUD request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

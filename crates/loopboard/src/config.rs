//! Server configuration, read from the environment.

use std::net::SocketAddr;

/// Shared credential pair for viewer endpoints.
#[derive(Debug, Clone)]
pub struct ViewerCredentials {
    pub username: String,
    pub password: String,
}

/// Dashboard configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,
    /// Credentials gating viewer endpoints. `None` disables the gate
    /// entirely: endpoints are open to all callers.
    pub credentials: Option<ViewerCredentials>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_address: ([127, 0, 0, 1], 3000).into(),
            credentials: None,
        }
    }
}

impl DashboardConfig {
    /// Build from `LOOPBOARD_BIND`, `LOOPBOARD_USER` and `LOOPBOARD_PASS`.
    ///
    /// The credential gate is enabled only when both variables are set and
    /// non-empty.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(bind) = std::env::var("LOOPBOARD_BIND") {
            config.bind_address = bind
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid LOOPBOARD_BIND address '{bind}': {e}"))?;
        }

        let username = std::env::var("LOOPBOARD_USER").unwrap_or_default();
        let password = std::env::var("LOOPBOARD_PASS").unwrap_or_default();
        if !username.is_empty() && !password.is_empty() {
            config.credentials = Some(ViewerCredentials { username, password });
        }

        Ok(config)
    }

    /// Configure the credential gate.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some(ViewerCredentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }
}

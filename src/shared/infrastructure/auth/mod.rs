use async_trait::async_trait;

/// Supplies the bearer token attached to backend requests and the realtime handshake.
///
/// Asked on every request so a rotating token is picked up without a restart.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|token| !token.trim().is_empty());
        Self { token }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Option<String> {
        self.token.clone()
    }
}

use super::errors::{MaxeonError, MaxeonResult};

// --------------------------------------------------------------------------------------------------------------

/// Source of a valid OAuth2 bearer token, asked before every request.
///
/// The authorize/token exchange itself (fixed vendor endpoints, scopes
/// offline_access system.read system.write) lives outside this process;
/// implementations only hand over whatever token is currently valid.
pub trait AccessTokenProvider: Send + Sync {
    fn access_token(&self) -> MaxeonResult<String>;
}

/// Token pasted straight from the configuration file.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl AccessTokenProvider for StaticTokenProvider {
    fn access_token(&self) -> MaxeonResult<String> {
        if self.token.is_empty() {
            return Err(MaxeonError::Token(
                "access_token is empty - set it in config.json".to_string(),
            ));
        }
        Ok(self.token.clone())
    }
}

// --------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_returns_configured_token() {
        let provider = StaticTokenProvider::new("tok-123");
        assert_eq!(provider.access_token().unwrap(), "tok-123");
    }

    #[test]
    fn empty_token_is_an_error() {
        let provider = StaticTokenProvider::new("");
        assert!(matches!(provider.access_token(), Err(MaxeonError::Token(_))));
    }
}

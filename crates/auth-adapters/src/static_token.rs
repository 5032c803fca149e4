//! Fixed token table authenticator.

use crate::error::AuthError;
use async_trait::async_trait;
use domains::{AuthenticatedUser, Authenticator, Badges, DomainResult, UserId};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, AuthenticatedUser>,
}

impl StaticTokenAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>, badges: Badges) -> Self {
        self.tokens.insert(
            token.into(),
            AuthenticatedUser {
                id: UserId::new(user_id),
                badges,
            },
        );
        self
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self, token: &str) -> DomainResult<AuthenticatedUser> {
        if token.is_empty() {
            return Err(AuthError::MissingToken.into());
        }
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::InvalidToken("unknown token".into()).into())
    }
}

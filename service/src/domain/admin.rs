use std::collections::VecDeque;
use std::sync::Arc;

use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::sync::RwLock;

use crate::domain::error::CourseError;

const ADMIN_TOKEN_LEN: usize = 32;
/// Live tokens kept at once; a login beyond this drops the oldest token.
pub const MAX_ADMIN_TOKENS: usize = 16;

/// Opaque capability handed out after a successful admin login.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AdminToken(String);

impl AdminToken {
    fn generate() -> Self {
        let token = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(ADMIN_TOKEN_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Shared-secret admin gate. The secret only mints tokens; admin operations
/// check the token. Tokens live in memory, oldest first, until evicted by
/// newer logins or the process exits.
#[derive(Clone, Debug)]
pub struct AdminGate {
    secret: Arc<str>,
    tokens: Arc<RwLock<VecDeque<AdminToken>>>,
}

impl AdminGate {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
            tokens: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    pub async fn login(&self, password: &str) -> Result<AdminToken, CourseError> {
        if password != self.secret.as_ref() {
            tracing::warn!("admin login refused");
            return Err(CourseError::InvalidAdminPassword);
        }

        let token = AdminToken::generate();
        let mut tokens = self.tokens.write().await;
        if tokens.len() >= MAX_ADMIN_TOKENS {
            tokens.pop_front();
        }
        tokens.push_back(token.clone());
        tracing::info!("admin logged in");
        Ok(token)
    }

    pub async fn verify(&self, token: &str) -> bool {
        self.tokens.read().await.iter().any(|live| live.as_str() == token)
    }

    pub async fn authorize(&self, token: Option<&str>) -> Result<(), CourseError> {
        match token {
            Some(token) if self.verify(token).await => Ok(()),
            _ => Err(CourseError::AdminUnauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wrong_password_is_refused() {
        let gate = AdminGate::new("s3cret");
        assert!(matches!(
            gate.login("S3CRET").await,
            Err(CourseError::InvalidAdminPassword)
        ));
    }

    #[tokio::test]
    async fn issued_token_verifies() {
        let gate = AdminGate::new("s3cret");

        let token = gate.login("s3cret").await.unwrap();

        assert_eq!(token.as_str().len(), ADMIN_TOKEN_LEN);
        assert!(gate.verify(token.as_str()).await);
        assert!(!gate.verify("forged").await);
    }

    #[tokio::test]
    async fn clones_share_tokens() {
        let gate = AdminGate::new("s3cret");
        let token = gate.login("s3cret").await.unwrap();

        assert!(gate.clone().verify(token.as_str()).await);
    }

    #[tokio::test]
    async fn oldest_token_is_evicted_past_the_cap() {
        let gate = AdminGate::new("s3cret");
        let first = gate.login("s3cret").await.unwrap();
        for _ in 0..MAX_ADMIN_TOKENS {
            gate.login("s3cret").await.unwrap();
        }

        assert!(!gate.verify(first.as_str()).await);
        assert_eq!(gate.tokens.read().await.len(), MAX_ADMIN_TOKENS);
    }

    #[tokio::test]
    async fn missing_or_unknown_token_is_unauthorized() {
        let gate = AdminGate::new("s3cret");
        let token = gate.login("s3cret").await.unwrap();

        assert!(gate.authorize(Some(token.as_str())).await.is_ok());
        assert!(matches!(
            gate.authorize(Some("forged")).await,
            Err(CourseError::AdminUnauthorized)
        ));
        assert!(matches!(
            gate.authorize(None).await,
            Err(CourseError::AdminUnauthorized)
        ));
    }
}

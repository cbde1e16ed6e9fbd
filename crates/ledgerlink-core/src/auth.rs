//! Local login against the configured argon2 hash

use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use ledgerlink_config::AuthConfig;
use std::sync::Arc;

use crate::credential::CredentialStore;
use crate::error::{CoreError, CoreResult};

/// Verifies credentials and opens or closes the session
pub struct Authenticator {
    config: AuthConfig,
    store: Arc<CredentialStore>,
}

impl Authenticator {
    pub fn new(config: AuthConfig, store: Arc<CredentialStore>) -> Self {
        Self { config, store }
    }

    /// Check the credentials and start a session keyed with `password`
    pub fn login(&self, username: &str, password: &str) -> CoreResult<()> {
        if password.is_empty() {
            return Err(CoreError::ValidationError {
                message: "Password must not be empty".to_string(),
            });
        }
        if username != self.config.username {
            log::warn!(target: "ledgerlink::auth", "Login rejected for unknown user {:?}", username);
            return Err(CoreError::LoginRejected);
        }
        if self.config.password_hash.is_empty() {
            return Err(CoreError::ConfigError {
                message: "auth.password_hash is not set".to_string(),
            });
        }

        let hash = PasswordHash::new(&self.config.password_hash).map_err(|e| CoreError::ConfigError {
            message: format!("auth.password_hash is not a valid PHC string: {}", e),
        })?;

        if Argon2::default().verify_password(password.as_bytes(), &hash).is_err() {
            log::warn!(target: "ledgerlink::auth", "Login rejected for {:?}", username);
            return Err(CoreError::LoginRejected);
        }

        self.store.set_session(password)?;
        log::info!(target: "ledgerlink::auth", "Logged in as {}", username);
        Ok(())
    }

    pub fn logout(&self) -> CoreResult<()> {
        self.store.clear_session()
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.is_logged_in()
    }
}

use tracing::warn;

use crate::api::ApiClient;
use crate::models::User;
use crate::storage::{KvStore, Storage};

/// Storage key for the auth token
const TOKEN_KEY: &str = "panelcache_auth_token";

/// Storage key for the user object
const USER_KEY: &str = "panelcache_user";

/// Persisted authentication session.
///
/// The token and user are two key-value namespaces owned by this type;
/// reads degrade to `None` on storage failure, and `logout` clears local
/// state unconditionally, regardless of the server call outcome.
pub struct AuthSession<S: Storage> {
    kv: KvStore<S>,
}

impl<S: Storage> AuthSession<S> {
    pub fn new(backend: S) -> Self {
        Self {
            kv: KvStore::new(backend),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.kv.read::<Option<String>>(TOKEN_KEY).value()
    }

    pub fn user(&self) -> Option<User> {
        self.kv.read::<Option<User>>(USER_KEY).value()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store the token and user produced by a successful login.
    ///
    /// Returns whether both writes were confirmed durable.
    pub fn store_session(&self, token: &str, user: &User) -> bool {
        let token_ok = self.kv.write(TOKEN_KEY, &Some(token.to_string()));
        let user_ok = self.kv.write(USER_KEY, &Some(user.clone()));
        token_ok && user_ok
    }

    /// Clear the persisted token and user.
    pub fn clear(&self) {
        self.kv.remove(TOKEN_KEY);
        self.kv.remove(USER_KEY);
    }

    /// Log out: attempt the server call, then clear local state.
    ///
    /// Local state is cleared even when the server call fails or no token
    /// exists; a failed server call is logged, never surfaced.
    pub async fn logout(&self, client: &ApiClient) {
        if let Some(token) = self.token() {
            if let Err(e) = client.post_logout(&token).await {
                warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::MemoryStorage;

    fn user() -> User {
        User {
            id: 7,
            name: "Reader".to_string(),
            email: "reader@example.com".to_string(),
        }
    }

    #[test]
    fn test_session_round_trip() {
        let session = AuthSession::new(MemoryStorage::new());
        assert!(!session.is_authenticated());
        assert_eq!(session.user(), None);

        assert!(session.store_session("tok-abc", &user()));
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("tok-abc"));
        assert_eq!(session.user().map(|u| u.email), Some("reader@example.com".to_string()));

        session.clear();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_local_state_when_server_unreachable() {
        let session = AuthSession::new(MemoryStorage::new());
        session.store_session("tok-abc", &user());

        // Point the auth backend at a closed local port so the server call
        // fails fast without leaving the machine.
        let config = Config {
            auth_api_base: "http://127.0.0.1:1/api/v1".to_string(),
            ..Config::default()
        };
        let client = ApiClient::new(config).expect("Failed to build client");

        session.logout(&client).await;
        assert!(!session.is_authenticated());
        assert_eq!(session.user(), None);
    }
}

//! Auth session state and its persisted store.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::ProviderResult;
use crate::persist::JsonRecord;

/// An access token together with the "authenticated" flag.
///
/// The two can't disagree: a session is either anonymous (no token) or
/// authenticated with a non-empty token.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredSession", into = "StoredSession")]
pub struct AuthSession {
    access_token: Option<String>,
}

impl AuthSession {
    pub fn anonymous() -> Self {
        Self { access_token: None }
    }

    /// An authenticated session. An empty token yields an anonymous session.
    pub fn authenticated(access_token: impl Into<String>) -> Self {
        let token = access_token.into();
        Self {
            access_token: (!token.is_empty()).then_some(token),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// On-disk shape of a session.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    #[serde(default)]
    google_access_token: Option<String>,
    #[serde(default)]
    is_authenticated: bool,
}

impl From<StoredSession> for AuthSession {
    fn from(stored: StoredSession) -> Self {
        match stored.google_access_token {
            Some(token) if stored.is_authenticated => AuthSession::authenticated(token),
            _ => AuthSession::anonymous(),
        }
    }
}

impl From<AuthSession> for StoredSession {
    fn from(session: AuthSession) -> Self {
        Self {
            is_authenticated: session.is_authenticated(),
            google_access_token: session.access_token,
        }
    }
}

/// The current session, mirrored to `session.json`.
#[derive(Debug)]
pub struct SessionStore {
    current: RwLock<AuthSession>,
    record: JsonRecord<AuthSession>,
}

impl SessionStore {
    /// Opens the store, loading any persisted session.
    ///
    /// An unreadable record is logged and treated as anonymous.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let record = JsonRecord::new(path);
        let session = match record.load() {
            Ok(Some(session)) => session,
            Ok(None) => AuthSession::anonymous(),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable session record");
                AuthSession::anonymous()
            }
        };

        Self {
            current: RwLock::new(session),
            record,
        }
    }

    /// A store that never touches the filesystem until written to.
    pub fn in_memory(path: impl Into<PathBuf>, session: AuthSession) -> Self {
        Self {
            current: RwLock::new(session),
            record: JsonRecord::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.record.path()
    }

    pub async fn current(&self) -> AuthSession {
        self.current.read().await.clone()
    }

    /// Persists `session` and makes it current.
    pub async fn set(&self, session: AuthSession) -> ProviderResult<()> {
        let mut current = self.current.write().await;
        self.record.save(&session)?;
        info!(authenticated = session.is_authenticated(), "session updated");
        *current = session;
        Ok(())
    }

    /// Discards the session in memory and on disk. Safe to call repeatedly.
    pub async fn clear(&self) -> ProviderResult<()> {
        let mut current = self.current.write().await;
        let was_authenticated = current.is_authenticated();
        *current = AuthSession::anonymous();
        self.record.remove()?;
        if was_authenticated {
            info!("session cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_keep_flag_and_token_consistent() {
        let anon = AuthSession::anonymous();
        assert!(!anon.is_authenticated());
        assert!(anon.access_token().is_none());

        let auth = AuthSession::authenticated("ya29.token");
        assert!(auth.is_authenticated());
        assert_eq!(auth.access_token(), Some("ya29.token"));

        assert!(!AuthSession::authenticated("").is_authenticated());
    }

    #[test]
    fn serializes_with_storage_keys() {
        let json = serde_json::to_value(AuthSession::authenticated("tok")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"googleAccessToken": "tok", "isAuthenticated": true})
        );

        let json = serde_json::to_value(AuthSession::anonymous()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"googleAccessToken": null, "isAuthenticated": false})
        );
    }

    #[test]
    fn inconsistent_records_load_as_anonymous() {
        let flag_without_token: AuthSession =
            serde_json::from_str(r#"{"isAuthenticated": true}"#).unwrap();
        assert_eq!(flag_without_token, AuthSession::anonymous());

        let token_without_flag: AuthSession =
            serde_json::from_str(r#"{"googleAccessToken": "tok", "isAuthenticated": false}"#)
                .unwrap();
        assert_eq!(token_without_flag, AuthSession::anonymous());
    }

    #[test]
    fn debug_hides_token() {
        let rendered = format!("{:?}", AuthSession::authenticated("secret-token"));
        assert!(!rendered.contains("secret-token"));
    }

    #[tokio::test]
    async fn store_persists_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::open(&path);
        assert!(!store.current().await.is_authenticated());

        store.set(AuthSession::authenticated("tok")).await.unwrap();
        assert!(path.exists());

        let reopened = SessionStore::open(&path);
        assert_eq!(reopened.current().await.access_token(), Some("tok"));

        reopened.clear().await.unwrap();
        reopened.clear().await.unwrap();
        assert!(!path.exists());
        assert!(!reopened.current().await.is_authenticated());
    }

    #[tokio::test]
    async fn corrupt_record_opens_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "garbage").unwrap();

        let store = SessionStore::open(&path);
        assert!(!store.current().await.is_authenticated());
    }
}

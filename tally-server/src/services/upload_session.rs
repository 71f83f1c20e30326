//! In-memory upload sessions for cross-device photo capture
//!
//! A session is a short-lived handoff token: the desktop creates one and
//! shows a QR code, the phone uploads a photo against it, the desktop
//! polls until the photo appears. Sessions live only in process memory.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_TTL: Duration = Duration::from_secs(10 * 60);
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A processed file attached to a session
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub path: String,
    pub url: String,
}

#[derive(Debug, Clone)]
struct UploadSession {
    expires_at: Instant,
    uploaded_file: Option<UploadedFile>,
}

/// Handle returned to the creating device: the id to encode in the QR
/// code plus the wall-clock deadline (epoch millis) for its countdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTicket {
    pub session_id: String,
    pub expires_at: i64,
}

/// Status snapshot returned to the polling device
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub session_id: String,
    pub has_upload: bool,
    pub uploaded_file: Option<UploadedFile>,
}

/// Shared session map
///
/// A plain mutex rather than per-entry locking: the expiry check and the
/// mutation it guards must happen under one critical section.
#[derive(Clone, Default)]
pub struct UploadSessionStore {
    sessions: Arc<Mutex<HashMap<String, UploadSession>>>,
}

impl UploadSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session
    pub async fn create(&self) -> SessionTicket {
        self.create_with_ttl(SESSION_TTL).await
    }

    async fn create_with_ttl(&self, ttl: Duration) -> SessionTicket {
        let id = Uuid::new_v4().to_string();
        let session = UploadSession {
            // expiry checks use the monotonic clock; the wall-clock
            // deadline in the ticket is display-only
            expires_at: Instant::now() + ttl,
            uploaded_file: None,
        };
        self.sessions.lock().await.insert(id.clone(), session);
        SessionTicket {
            session_id: id,
            expires_at: Utc::now().timestamp_millis() + ttl.as_millis() as i64,
        }
    }

    /// Current status, or None if the session is unknown or past its
    /// deadline. Expired entries are removed on sight, so expiry takes
    /// effect even if the sweep has not run yet.
    pub async fn status(&self, id: &str) -> Option<SessionStatus> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get(id)?;
        if session.expires_at <= Instant::now() {
            sessions.remove(id);
            return None;
        }
        Some(SessionStatus {
            session_id: id.to_string(),
            has_upload: session.uploaded_file.is_some(),
            uploaded_file: session.uploaded_file.clone(),
        })
    }

    /// Attach a processed file to a live session. Returns false if the
    /// session is unknown or expired.
    pub async fn attach(&self, id: &str, file: UploadedFile) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(id) {
            Some(session) if session.expires_at > Instant::now() => {
                session.uploaded_file = Some(file);
                true
            }
            Some(_) => {
                sessions.remove(id);
                false
            }
            None => false,
        }
    }

    /// Drop a session. Idempotent; the converted file (if any) stays on disk.
    pub async fn remove(&self, id: &str) {
        self.sessions.lock().await.remove(id);
    }

    /// Remove every expired session, returning how many went
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> UploadedFile {
        UploadedFile {
            filename: "product_x.jpg".into(),
            path: "uploads/product_x.jpg".into(),
            url: "/uploads/product_x.jpg".into(),
        }
    }

    #[tokio::test]
    async fn fresh_session_has_no_upload() {
        let store = UploadSessionStore::new();
        let id = store.create().await.session_id;
        let status = store.status(&id).await.expect("session should be live");
        assert!(!status.has_upload);
        assert!(status.uploaded_file.is_none());
    }

    #[tokio::test]
    async fn ticket_carries_wall_clock_deadline() {
        let store = UploadSessionStore::new();
        let before = Utc::now().timestamp_millis();
        let ticket = store.create().await;
        let ttl = SESSION_TTL.as_millis() as i64;
        assert!(ticket.expires_at >= before + ttl);
        assert!(ticket.expires_at <= Utc::now().timestamp_millis() + ttl);

        let wire = serde_json::to_value(&ticket).unwrap();
        assert!(wire["sessionId"].is_string());
        assert!(wire["expiresAt"].is_i64());
    }

    #[tokio::test]
    async fn attach_makes_upload_visible() {
        let store = UploadSessionStore::new();
        let id = store.create().await.session_id;
        assert!(store.attach(&id, file()).await);
        let status = store.status(&id).await.unwrap();
        assert!(status.has_upload);
        assert_eq!(status.uploaded_file.unwrap().filename, "product_x.jpg");
    }

    #[tokio::test]
    async fn expired_session_is_gone_without_sweep() {
        let store = UploadSessionStore::new();
        let id = store.create_with_ttl(Duration::ZERO).await.session_id;
        assert!(store.status(&id).await.is_none());
        // lazy expiry also removed the entry
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn attach_to_expired_session_fails() {
        let store = UploadSessionStore::new();
        let id = store.create_with_ttl(Duration::ZERO).await.session_id;
        assert!(!store.attach(&id, file()).await);
    }

    #[tokio::test]
    async fn sweep_removes_only_expired() {
        let store = UploadSessionStore::new();
        let _dead = store.create_with_ttl(Duration::ZERO).await;
        let live = store.create().await.session_id;
        assert_eq!(store.sweep().await, 1);
        assert!(store.status(&live).await.is_some());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = UploadSessionStore::new();
        let id = store.create().await.session_id;
        store.remove(&id).await;
        store.remove(&id).await;
        assert!(store.status(&id).await.is_none());
    }
}

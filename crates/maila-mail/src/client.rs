//! Session-level mail client.
//!
//! [`MailSessionClient`] is stateless with respect to sessions: every
//! operation takes the caller's [`MailSession`] and either returns a new one
//! or mutates the one it was handed. Local state (the cached inbox) only
//! changes after the remote has confirmed the corresponding action.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use maila_platform::fs::FileSystem;
use maila_types::config::MailConfig;
use maila_types::index;
use maila_types::session::MailSession;

use crate::error::{MailError, Result};
use crate::protocol::{
    self, AddressResponse, DeleteResponse, FetchResponse, ListResponse, function,
};
use crate::transport::{ApiRequest, MailTransport};

/// Longest subject prefix kept in a download file name.
const SUBJECT_PREFIX_LEN: usize = 30;

/// A fully fetched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub mail_id: String,
    pub from: String,
    pub subject: String,
    /// HTML body as sent by the provider.
    pub body: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl EmailMessage {
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Outcome of a bulk download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Files written, in inbox order.
    pub saved: Vec<PathBuf>,
    /// Messages that could not be fetched or written.
    pub failed: usize,
}

fn path_safe(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Whether `component` can be joined onto a directory without escaping it.
fn is_path_component(component: &str) -> bool {
    !component.is_empty() && component.chars().all(path_safe)
}

/// Build the file name a downloaded message is saved under.
///
/// Spaces in the subject become underscores, everything except
/// alphanumerics, `_` and `-` is dropped from both parts, and the subject
/// is cut to 30 characters.
pub fn download_file_name(mail_id: &str, subject: &str) -> String {
    let mail_id: String = mail_id.chars().filter(|c| path_safe(*c)).collect();
    let subject: String = subject
        .replace(' ', "_")
        .chars()
        .filter(|c| path_safe(*c))
        .take(SUBJECT_PREFIX_LEN)
        .collect();
    format!("{mail_id}_{subject}.html")
}

/// Client for one disposable mail provider.
pub struct MailSessionClient {
    transport: Arc<dyn MailTransport>,
    fs: Arc<dyn FileSystem>,
    lang: String,
    downloads_root: PathBuf,
}

impl MailSessionClient {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        fs: Arc<dyn FileSystem>,
        config: &MailConfig,
    ) -> Self {
        Self {
            transport,
            fs,
            lang: config.lang.clone(),
            downloads_root: config.downloads_path(),
        }
    }

    /// Directory downloads for `sid_token` are written to.
    pub fn download_dir(&self, sid_token: &str) -> PathBuf {
        self.downloads_root.join(sid_token)
    }

    /// Create a brand-new disposable address.
    pub async fn start_new_session(&self) -> Result<MailSession> {
        let req = ApiRequest::get(function::GET_EMAIL_ADDRESS).param("lang", &self.lang);
        let payload = self.transport.call(&req).await?;
        let resp: AddressResponse = serde_json::from_value(payload)?;

        let (Some(address), Some(sid_token)) = (resp.email_addr.clone(), resp.sid_token.clone())
        else {
            return Err(MailError::Protocol(
                "get_email_address returned no address or session token".into(),
            ));
        };

        let session = session_from(sid_token, address, &resp);
        info!(address = %session.address, "started mail session");
        Ok(session)
    }

    /// Re-attach to an existing session by token.
    ///
    /// # Errors
    ///
    /// [`MailError::SessionNotInitialized`] when the provider does not know
    /// the token.
    pub async fn restore_session(&self, sid_token: &str) -> Result<MailSession> {
        if sid_token.is_empty() {
            return Err(MailError::Validation(
                "Session ID is required to restore.".into(),
            ));
        }

        let req = ApiRequest::get(function::GET_EMAIL_ADDRESS)
            .param("sid_token", sid_token)
            .param("lang", &self.lang);
        let payload = self.transport.call(&req).await?;

        if protocol::has_auth_error(&payload) {
            warn!(sid_token, "provider rejected session token");
            return Err(MailError::SessionNotInitialized {
                sid_token: sid_token.to_string(),
            });
        }

        let resp: AddressResponse = serde_json::from_value(payload)?;
        let Some(address) = resp.email_addr.clone() else {
            return Err(MailError::SessionNotInitialized {
                sid_token: sid_token.to_string(),
            });
        };
        let sid = resp.sid_token.clone().unwrap_or_else(|| sid_token.to_string());

        let session = session_from(sid, address, &resp);
        info!(address = %session.address, "restored mail session");
        Ok(session)
    }

    /// Verify a stored session is still alive, keeping its cached inbox.
    ///
    /// If the provider hands back a different address the old cache is
    /// meaningless and is dropped.
    pub async fn resume(&self, session: &MailSession) -> Result<MailSession> {
        require_session(session)?;
        let mut fresh = self.restore_session(&session.sid_token).await?;
        if fresh.address == session.address {
            fresh.inbox = session.inbox.clone();
        } else {
            info!(
                old = %session.address,
                new = %fresh.address,
                "provider reassigned address, dropping cached inbox"
            );
        }
        Ok(fresh)
    }

    /// Fetch one page of the inbox and merge it into the cache.
    ///
    /// Returns how many new entries were added.
    pub async fn refresh_inbox(&self, session: &mut MailSession, offset: u32) -> Result<usize> {
        require_session(session)?;
        let req = ApiRequest::get(function::GET_EMAIL_LIST).param("offset", offset.to_string());
        let payload = self.session_call(session, req).await?;

        if payload.get("list").is_none() {
            return Err(MailError::Protocol(
                "get_email_list response has no list".into(),
            ));
        }
        let resp: ListResponse = serde_json::from_value(payload)?;
        let added = session.inbox.merge(resp.list.into_iter().map(Into::into));
        debug!(added, total = session.inbox.len(), "merged inbox page");
        Ok(added)
    }

    /// Fetch the message at a 1-based position of the cached inbox.
    pub async fn fetch_email(
        &self,
        session: &mut MailSession,
        position: usize,
    ) -> Result<EmailMessage> {
        require_session(session)?;
        let len = session.inbox.len();
        let Some(entry) = session.inbox.at_position(position) else {
            return Err(MailError::Validation(if len == 0 {
                "The inbox is empty.".to_string()
            } else {
                format!("Index {position} is out of bounds (1-{len}).")
            }));
        };
        let mail_id = entry.mail_id.clone();

        let message = self.fetch_by_id(session, &mail_id).await?;
        session.inbox.mark_read(&mail_id);
        Ok(message)
    }

    /// Delete every message an index expression names.
    ///
    /// Returns the ids the provider confirmed; only those leave the cache.
    pub async fn delete_emails(
        &self,
        session: &mut MailSession,
        expr: &str,
    ) -> Result<Vec<String>> {
        require_session(session)?;
        let ids = resolve_or_reject(session, expr)?;

        let req = ids.iter().fold(ApiRequest::post(function::DEL_EMAIL), |req, id| {
            req.param("email_ids[]", id.as_str())
        });
        let payload = self.session_call(session, req).await?;
        let resp: DeleteResponse = serde_json::from_value(payload)?;

        let confirmed: Vec<String> = resp
            .deleted_ids
            .into_iter()
            .filter(|id| ids.contains(id))
            .collect();
        session.inbox.remove_ids(&confirmed);

        if confirmed.len() < ids.len() {
            warn!(
                requested = ids.len(),
                confirmed = confirmed.len(),
                "provider confirmed only part of a delete"
            );
        }
        Ok(confirmed)
    }

    /// Save every message an index expression names as HTML.
    ///
    /// A failure on one message is counted and does not stop the rest.
    pub async fn download_emails(
        &self,
        session: &mut MailSession,
        expr: &str,
    ) -> Result<DownloadReport> {
        require_session(session)?;
        let ids = resolve_or_reject(session, expr)?;
        if !is_path_component(&session.sid_token) {
            return Err(MailError::Validation(
                "Session ID cannot be used as a download directory.".into(),
            ));
        }

        let dir = self.download_dir(&session.sid_token);
        self.fs.create_dir_all(&dir).await?;

        let mut report = DownloadReport::default();
        for mail_id in ids {
            match self.download_one(session, &mail_id, &dir).await {
                Ok(path) => {
                    session.inbox.mark_read(&mail_id);
                    report.saved.push(path);
                }
                Err(e) => {
                    warn!(mail_id = %mail_id, error = %e, "failed to download message");
                    report.failed += 1;
                }
            }
        }
        info!(saved = report.saved.len(), failed = report.failed, "download finished");
        Ok(report)
    }

    /// Ask the provider to forget the address, then clear local state.
    ///
    /// A session with no address is already forgotten and makes no call.
    pub async fn forget(&self, session: &mut MailSession) -> Result<()> {
        require_session(session)?;
        if session.address.is_empty() {
            return Ok(());
        }

        let req = ApiRequest::post(function::FORGET_ME).param("email_addr", &session.address);
        let payload = self.session_call(session, req).await?;
        if matches!(payload, Value::Null | Value::Bool(false)) {
            return Err(MailError::Protocol(
                "provider refused to forget the address".into(),
            ));
        }

        info!(address = %session.address, "forgot mail address");
        session.address.clear();
        session.email_timestamp = None;
        session.alias = None;
        session.inbox.clear();
        Ok(())
    }

    // ── internals ────────────────────────────────────────────────────────

    /// Call with the session token attached, adopting a rotated token.
    async fn session_call(&self, session: &mut MailSession, req: ApiRequest) -> Result<Value> {
        let req = req.param("sid_token", &session.sid_token);
        let payload = self.transport.call(&req).await?;

        if protocol::has_auth_error(&payload) {
            return Err(MailError::SessionNotInitialized {
                sid_token: session.sid_token.clone(),
            });
        }
        if let Some(sid) = protocol::rotated_sid(&payload)
            && sid != session.sid_token
        {
            debug!("provider rotated session token");
            session.sid_token = sid.to_string();
        }
        Ok(payload)
    }

    async fn fetch_by_id(&self, session: &mut MailSession, mail_id: &str) -> Result<EmailMessage> {
        let req = ApiRequest::get(function::FETCH_EMAIL).param("email_id", mail_id);
        let payload = self.session_call(session, req).await?;
        let resp: FetchResponse = serde_json::from_value(payload)?;

        let Some(body) = resp.mail_body else {
            return Err(MailError::Protocol(format!("message {mail_id} has no body")));
        };
        let cached = session.inbox.get(mail_id);
        let from = if resp.mail_from.is_empty() {
            cached.map(|e| e.from.clone()).unwrap_or_default()
        } else {
            resp.mail_from
        };
        let subject = resp
            .mail_subject
            .or_else(|| cached.map(|e| e.subject.clone()))
            .unwrap_or_default();
        let timestamp = if resp.mail_timestamp == 0 {
            cached.map(|e| e.timestamp).unwrap_or_default()
        } else {
            resp.mail_timestamp
        };

        Ok(EmailMessage {
            mail_id: mail_id.to_string(),
            from,
            subject,
            body,
            timestamp,
        })
    }

    async fn download_one(
        &self,
        session: &mut MailSession,
        mail_id: &str,
        dir: &Path,
    ) -> Result<PathBuf> {
        if !mail_id.chars().any(path_safe) {
            return Err(MailError::Validation(format!(
                "message id {mail_id:?} cannot be used in a file name"
            )));
        }
        let message = self.fetch_by_id(session, mail_id).await?;
        let path = dir.join(download_file_name(mail_id, &message.subject));
        self.fs.write_string(&path, &message.body).await?;
        debug!(path = %path.display(), "saved message");
        Ok(path)
    }
}

impl std::fmt::Debug for MailSessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSessionClient")
            .field("lang", &self.lang)
            .field("downloads_root", &self.downloads_root)
            .finish_non_exhaustive()
    }
}

fn require_session(session: &MailSession) -> Result<()> {
    if session.sid_token.is_empty() {
        return Err(MailError::NoSession);
    }
    Ok(())
}

fn resolve_or_reject(session: &MailSession, expr: &str) -> Result<Vec<String>> {
    let ids = index::resolve(&session.inbox, expr);
    if ids.is_empty() {
        return Err(MailError::Validation(
            "No valid email indices provided.".into(),
        ));
    }
    Ok(ids)
}

fn session_from(sid_token: String, address: String, resp: &AddressResponse) -> MailSession {
    let mut session = MailSession::new(sid_token, address);
    session.email_timestamp = resp.email_timestamp;
    session.alias = resp.alias.clone();
    session
}

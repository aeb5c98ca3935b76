use log::info;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use tokio::sync::Mutex;
use url::Url;

use crate::broadcast::content::{
    parse_button_target, ButtonKind, ButtonTargetError, PostButton, PostContent,
};
use crate::localization::Lang;

/// mailing session phases; exactly one is active at a time, which rules out
/// the contradictory flag combinations a set of independent booleans allows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailingPhase {
    AwaitingContent,
    AwaitingButtonChoice,
    AwaitingButtonKind,
    AwaitingButtonLabel,
    AwaitingButtonTarget,
    AwaitingConfirmation,
}

impl MailingPhase {
    pub fn name(&self) -> &'static str {
        match self {
            MailingPhase::AwaitingContent => "awaiting content",
            MailingPhase::AwaitingButtonChoice => "awaiting button choice",
            MailingPhase::AwaitingButtonKind => "awaiting button kind",
            MailingPhase::AwaitingButtonLabel => "awaiting button label",
            MailingPhase::AwaitingButtonTarget => "awaiting button target",
            MailingPhase::AwaitingConfirmation => "awaiting confirmation",
        }
    }
}

#[derive(Debug)]
struct MailingSession {
    phase: MailingPhase,
    lang: Lang,
    content: Option<PostContent>,
    button: Option<PostButton>,
    // partial button state while the kind/label/target dialog runs
    pending_kind: Option<ButtonKind>,
    pending_label: Option<String>,
}

impl MailingSession {
    fn new(lang: Lang) -> Self {
        Self {
            phase: MailingPhase::AwaitingContent,
            lang,
            content: None,
            button: None,
            pending_kind: None,
            pending_label: None,
        }
    }
}

/// snapshot of a composed post, handed out for preview rendering and dispatch
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedPost {
    pub content: PostContent,
    pub button: Option<PostButton>,
}

/// outcome of capturing the button label
#[derive(Debug, Clone, PartialEq)]
pub enum LabelOutcome {
    /// link buttons still need a target URL
    NeedsTarget,
    /// in-app buttons are complete, the target was pre-filled
    Ready(ComposedPost),
}

#[derive(Debug)]
pub enum SessionError {
    NotActive(i64),
    WrongPhase(MailingPhase),
    EmptyContent,
    InvalidButtonTarget(ButtonTargetError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotActive(admin_id) => {
                write!(f, "admin {} has no active mailing session", admin_id)
            }
            SessionError::WrongPhase(phase) => {
                write!(f, "input not valid while {}", phase.name())
            }
            SessionError::EmptyContent => write!(f, "broadcast content must not be empty"),
            SessionError::InvalidButtonTarget(e) => write!(f, "{}", e),
        }
    }
}

impl Error for SessionError {}

/// per-admin mailing session registry; insert on /mailing, remove on
/// cancel or confirm
pub struct MailingSessions {
    sessions: Mutex<HashMap<i64, MailingSession>>,
    app_url: Url,
}

impl MailingSessions {
    pub fn new(app_url: Url) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            app_url,
        }
    }

    /// opens a fresh session for the admin; an unfinished draft is replaced.
    /// returns true when a prior draft was thrown away
    pub async fn start(&self, admin_id: i64, lang: Lang) -> bool {
        let mut sessions = self.sessions.lock().await;
        let replaced = sessions
            .insert(admin_id, MailingSession::new(lang))
            .is_some();
        info!(
            "Admin {}: mailing session started{}",
            admin_id,
            if replaced { " (previous draft replaced)" } else { "" }
        );
        replaced
    }

    pub async fn phase(&self, admin_id: i64) -> Option<MailingPhase> {
        self.sessions
            .lock()
            .await
            .get(&admin_id)
            .map(|session| session.phase)
    }

    /// language captured when the session was opened; used by timer-driven
    /// prompts that have no message to derive it from
    pub async fn lang(&self, admin_id: i64) -> Option<Lang> {
        self.sessions
            .lock()
            .await
            .get(&admin_id)
            .map(|session| session.lang)
    }

    /// captures the post content; only valid while awaiting content
    pub async fn set_content(
        &self,
        admin_id: i64,
        content: PostContent,
    ) -> Result<(), SessionError> {
        if content.is_empty() {
            return Err(SessionError::EmptyContent);
        }
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&admin_id)
            .ok_or(SessionError::NotActive(admin_id))?;
        if session.phase != MailingPhase::AwaitingContent {
            return Err(SessionError::WrongPhase(session.phase));
        }
        info!(
            "Admin {}: mailing content captured ({})",
            admin_id,
            content.kind_name()
        );
        session.content = Some(content);
        session.phase = MailingPhase::AwaitingButtonChoice;
        Ok(())
    }

    /// admin wants a button attached
    pub async fn request_button(&self, admin_id: i64) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&admin_id)
            .ok_or(SessionError::NotActive(admin_id))?;
        if session.phase != MailingPhase::AwaitingButtonChoice {
            return Err(SessionError::WrongPhase(session.phase));
        }
        session.phase = MailingPhase::AwaitingButtonKind;
        Ok(())
    }

    /// admin skips the button; the post is complete and moves to confirmation
    pub async fn decline_button(&self, admin_id: i64) -> Result<ComposedPost, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&admin_id)
            .ok_or(SessionError::NotActive(admin_id))?;
        if session.phase != MailingPhase::AwaitingButtonChoice {
            return Err(SessionError::WrongPhase(session.phase));
        }
        session.phase = MailingPhase::AwaitingConfirmation;
        Self::composed(session)
    }

    pub async fn choose_kind(&self, admin_id: i64, kind: ButtonKind) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&admin_id)
            .ok_or(SessionError::NotActive(admin_id))?;
        if session.phase != MailingPhase::AwaitingButtonKind {
            return Err(SessionError::WrongPhase(session.phase));
        }
        session.pending_kind = Some(kind);
        session.phase = MailingPhase::AwaitingButtonLabel;
        Ok(())
    }

    /// captures the button label; in-app buttons get the shop web-app URL as
    /// their target without a further prompt
    pub async fn set_label(&self, admin_id: i64, label: &str) -> Result<LabelOutcome, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&admin_id)
            .ok_or(SessionError::NotActive(admin_id))?;
        if session.phase != MailingPhase::AwaitingButtonLabel {
            return Err(SessionError::WrongPhase(session.phase));
        }
        let kind = session
            .pending_kind
            .ok_or(SessionError::WrongPhase(session.phase))?;
        match kind {
            ButtonKind::Link => {
                session.pending_label = Some(label.trim().to_string());
                session.phase = MailingPhase::AwaitingButtonTarget;
                Ok(LabelOutcome::NeedsTarget)
            }
            ButtonKind::InAppView => {
                session.button = Some(PostButton {
                    kind,
                    label: label.trim().to_string(),
                    target: self.app_url.clone(),
                });
                session.phase = MailingPhase::AwaitingConfirmation;
                Self::composed(session).map(LabelOutcome::Ready)
            }
        }
    }

    /// captures the link button target; an invalid URL keeps the session in
    /// the target-input phase so the admin can retry
    pub async fn set_target(&self, admin_id: i64, raw: &str) -> Result<ComposedPost, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(&admin_id)
            .ok_or(SessionError::NotActive(admin_id))?;
        if session.phase != MailingPhase::AwaitingButtonTarget {
            return Err(SessionError::WrongPhase(session.phase));
        }
        let target = parse_button_target(raw).map_err(SessionError::InvalidButtonTarget)?;
        let label = session.pending_label.take().unwrap_or_default();
        session.button = Some(PostButton {
            kind: ButtonKind::Link,
            label,
            target,
        });
        session.phase = MailingPhase::AwaitingConfirmation;
        Self::composed(session)
    }

    /// consumes the session on confirmation; this is the only way to obtain a
    /// post for dispatch, so no broadcast can start before the confirmation
    /// phase is reached
    pub async fn take_confirmed(&self, admin_id: i64) -> Result<ComposedPost, SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get(&admin_id)
            .ok_or(SessionError::NotActive(admin_id))?;
        if session.phase != MailingPhase::AwaitingConfirmation {
            return Err(SessionError::WrongPhase(session.phase));
        }
        let post = Self::composed(session)?;
        sessions.remove(&admin_id);
        info!("Admin {}: mailing confirmed, session closed", admin_id);
        Ok(post)
    }

    /// discards the session in any phase; returns whether one existed
    pub async fn cancel(&self, admin_id: i64) -> bool {
        let removed = self.sessions.lock().await.remove(&admin_id).is_some();
        if removed {
            info!("Admin {}: mailing session cancelled", admin_id);
        }
        removed
    }

    fn composed(session: &MailingSession) -> Result<ComposedPost, SessionError> {
        let content = session
            .content
            .clone()
            .ok_or(SessionError::EmptyContent)?;
        Ok(ComposedPost {
            content,
            button: session.button.clone(),
        })
    }
}

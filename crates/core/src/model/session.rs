use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionDataError {
    #[error("access token cannot be empty")]
    EmptyAccessToken,

    #[error("refresh token cannot be empty")]
    EmptyRefreshToken,
}

/// Short-lived credential used to authorize API calls.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

/// Longer-lived credential used solely to obtain a new access token.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl AccessToken {
    /// # Errors
    ///
    /// Returns `SessionDataError::EmptyAccessToken` for a blank token.
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionDataError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SessionDataError::EmptyAccessToken);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RefreshToken {
    /// # Errors
    ///
    /// Returns `SessionDataError::EmptyRefreshToken` for a blank token.
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionDataError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SessionDataError::EmptyRefreshToken);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens never show up in logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(..)")
    }
}

/// Lifecycle phase of the current browser-context session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    LoggedOut,
    Active,
    Renewing,
}

impl SessionPhase {
    #[must_use]
    pub fn is_logged_in(self) -> bool {
        !matches!(self, SessionPhase::LoggedOut)
    }
}

/// The authenticated user's identity and token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    display_name: String,
    access_token: AccessToken,
    refresh_token: RefreshToken,
    access_expiry_hint: Option<DateTime<Utc>>,
}

impl Session {
    #[must_use]
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        access_token: AccessToken,
        refresh_token: RefreshToken,
    ) -> Self {
        Self {
            user_id,
            display_name: display_name.into().trim().to_owned(),
            access_token,
            refresh_token,
            access_expiry_hint: None,
        }
    }

    #[must_use]
    pub fn with_expiry_hint(mut self, hint: Option<DateTime<Utc>>) -> Self {
        self.access_expiry_hint = hint;
        self
    }

    /// Replace the access token after a successful renewal.
    ///
    /// Identity and refresh token are left untouched.
    #[must_use]
    pub fn with_renewed_access(
        mut self,
        access_token: AccessToken,
        hint: Option<DateTime<Utc>>,
    ) -> Self {
        self.access_token = access_token;
        self.access_expiry_hint = hint;
        self
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    #[must_use]
    pub fn refresh_token(&self) -> &RefreshToken {
        &self.refresh_token
    }

    #[must_use]
    pub fn access_expiry_hint(&self) -> Option<DateTime<Utc>> {
        self.access_expiry_hint
    }

    /// True when the expiry hint is known and has already passed.
    #[must_use]
    pub fn access_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.access_expiry_hint.is_some_and(|hint| hint <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn session() -> Session {
        Session::new(
            UserId::new(7),
            " Ada ",
            AccessToken::new("a-1").unwrap(),
            RefreshToken::new("r-1").unwrap(),
        )
    }

    #[test]
    fn blank_tokens_are_rejected() {
        assert_eq!(
            AccessToken::new("  ").unwrap_err(),
            SessionDataError::EmptyAccessToken
        );
        assert_eq!(
            RefreshToken::new("").unwrap_err(),
            SessionDataError::EmptyRefreshToken
        );
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let rendered = format!("{:?}", session());
        assert!(!rendered.contains("a-1"));
        assert!(!rendered.contains("r-1"));
        assert!(rendered.contains("Ada"));
    }

    #[test]
    fn renewal_replaces_only_access_token() {
        let hint = fixed_now() + Duration::minutes(5);
        let renewed = session().with_renewed_access(AccessToken::new("a-2").unwrap(), Some(hint));
        assert_eq!(renewed.access_token().as_str(), "a-2");
        assert_eq!(renewed.refresh_token().as_str(), "r-1");
        assert_eq!(renewed.user_id(), UserId::new(7));
        assert_eq!(renewed.display_name(), "Ada");
        assert_eq!(renewed.access_expiry_hint(), Some(hint));
    }

    #[test]
    fn expiry_hint_is_checked_against_now() {
        let now = fixed_now();
        let s = session().with_expiry_hint(Some(now));
        assert!(s.access_expired_at(now));
        assert!(!session().access_expired_at(now));
    }

    #[test]
    fn phase_reports_login_state() {
        assert!(!SessionPhase::LoggedOut.is_logged_in());
        assert!(SessionPhase::Renewing.is_logged_in());
    }
}

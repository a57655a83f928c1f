//! Who is taking the quiz, and in which group.

use thiserror::Error;

/// Characters the response store does not accept in a path segment.
const RESERVED_KEY_CHARS: [char; 5] = ['.', '#', '$', '[', ']'];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Please enter your name")]
    MissingName,

    #[error("Please enter a group code")]
    MissingGroupCode,
}

/// A validated (user name, group code) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_name: String,
    group_code: String,
}

impl Identity {
    /// Both values are trimmed and must be non-empty afterwards.
    pub fn new(user_name: &str, group_code: &str) -> Result<Self, IdentityError> {
        let user_name = user_name.trim();
        let group_code = group_code.trim();

        if user_name.is_empty() {
            return Err(IdentityError::MissingName);
        }
        if group_code.is_empty() {
            return Err(IdentityError::MissingGroupCode);
        }

        Ok(Self {
            user_name: user_name.to_string(),
            group_code: group_code.to_string(),
        })
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn group_code(&self) -> &str {
        &self.group_code
    }
}

/// Replace characters that are illegal in store paths with `_`.
pub fn sanitize_key(value: &str) -> String {
    value
        .chars()
        .map(|c| if RESERVED_KEY_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Identity for the lifetime of one run of the app.
#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn sign_in(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    /// The identity, if the entry screen has been completed.
    pub fn require(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn reset(&mut self) {
        self.identity = None;
    }
}

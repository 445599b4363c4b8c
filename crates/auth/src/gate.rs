use thiserror::Error;

use tiredesk_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("wrong admin password")]
    WrongPassword,

    #[error("admin area is locked")]
    Locked,
}

impl From<AuthError> for DomainError {
    fn from(_: AuthError) -> Self {
        DomainError::Unauthorized
    }
}

/// Lock state of the admin area for one session.
///
/// Starts locked. No IO, no panics.
#[derive(Clone)]
pub struct AdminGate {
    password: String,
    unlocked: bool,
    failed_attempts: u32,
}

impl core::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminGate")
            .field("unlocked", &self.unlocked)
            .field("failed_attempts", &self.failed_attempts)
            .finish_non_exhaustive()
    }
}

impl AdminGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            unlocked: false,
            failed_attempts: 0,
        }
    }

    /// Try to unlock. A wrong attempt leaves the gate locked, even if it was
    /// unlocked before.
    pub fn unlock(&mut self, attempt: &str) -> Result<(), AuthError> {
        if attempt == self.password {
            self.unlocked = true;
            self.failed_attempts = 0;
            tracing::info!("admin area unlocked");
            Ok(())
        } else {
            self.unlocked = false;
            self.failed_attempts = self.failed_attempts.saturating_add(1);
            tracing::warn!(failed_attempts = self.failed_attempts, "admin unlock failed");
            Err(AuthError::WrongPassword)
        }
    }

    pub fn lock(&mut self) {
        if self.unlocked {
            tracing::info!("admin area locked");
        }
        self.unlocked = false;
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Consecutive wrong attempts since the last successful unlock.
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn require_unlocked(&self) -> Result<(), AuthError> {
        if self.unlocked {
            Ok(())
        } else {
            Err(AuthError::Locked)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_locked() {
        let gate = AdminGate::new("admin");
        assert!(!gate.is_unlocked());
        assert_eq!(gate.require_unlocked(), Err(AuthError::Locked));
    }

    #[test]
    fn unlock_and_lock() {
        let mut gate = AdminGate::new("werkstatt");
        gate.unlock("werkstatt").unwrap();
        assert!(gate.require_unlocked().is_ok());

        gate.lock();
        assert!(!gate.is_unlocked());
    }

    #[test]
    fn wrong_password_relocks_and_counts() {
        let mut gate = AdminGate::new("werkstatt");
        gate.unlock("werkstatt").unwrap();

        assert_eq!(gate.unlock("Werkstatt"), Err(AuthError::WrongPassword));
        assert_eq!(gate.unlock(""), Err(AuthError::WrongPassword));
        assert!(!gate.is_unlocked());
        assert_eq!(gate.failed_attempts(), 2);

        gate.unlock("werkstatt").unwrap();
        assert_eq!(gate.failed_attempts(), 0);
    }

    #[test]
    fn maps_to_unauthorized() {
        let err: DomainError = AuthError::Locked.into();
        assert_eq!(err, DomainError::Unauthorized);
    }

    #[test]
    fn debug_hides_password() {
        let gate = AdminGate::new("geheim");
        assert!(!format!("{gate:?}").contains("geheim"));
    }
}

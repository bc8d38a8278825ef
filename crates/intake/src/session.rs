//! Phone-number login.
//!
//! There is no verification step: a well-formed Indian mobile number is
//! enough to start a session. The configured admin number always gets the
//! admin role.

use civic_core::{Role, Session, Time};
use civic_storage::{KeyValueStore, SessionStore};
use regex::Regex;
use tracing::{info, warn};

use crate::{IntakeError, Result};

const MOBILE_PATTERN: &str = r"^[6-9]\d{9}$";

/// Digits of `phone` formatted as `XXXXX XXXXX`, or the bare digits when
/// there are not exactly ten.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("{} {}", &digits[..5], &digits[5..])
    } else {
        digits
    }
}

/// Whether `phone` is a ten-digit mobile number starting with 6-9.
pub fn validate_phone(phone: &str) -> bool {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    match Regex::new(MOBILE_PATTERN) {
        Ok(re) => re.is_match(&digits),
        Err(e) => {
            warn!("Invalid mobile pattern: {}", e);
            false
        }
    }
}

/// Log in with a phone number and store the session.
pub async fn login<S: KeyValueStore>(
    store: &mut SessionStore<S>,
    phone: &str,
    requested: Role,
    admin_phone: &str,
    at: Time,
) -> Result<Session> {
    if !validate_phone(phone) {
        return Err(IntakeError::InvalidPhone(phone.to_string()));
    }

    let identifier = normalize_phone(phone);
    let role = if identifier == normalize_phone(admin_phone) { Role::Admin } else { requested };

    let session = Session::start(identifier, role, at);
    store.save(&session).await?;
    info!("Logged in {} as {}", session.identifier, session.role);
    Ok(session)
}

/// The stored session, if any.
pub async fn current_session<S: KeyValueStore>(store: &SessionStore<S>) -> Option<Session> {
    store.load().await.filter(|s| s.is_authenticated)
}

/// Drop the stored session.
pub async fn logout<S: KeyValueStore>(store: &mut SessionStore<S>) -> Result<()> {
    store.clear().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use civic_storage::MemoryStorage;

    const ADMIN: &str = "90844 63472";

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("9876543210"));
        assert!(validate_phone("(987) 654-3210"));
        assert!(!validate_phone("5876543210"));
        assert!(!validate_phone("987654321"));
        assert!(!validate_phone("98765432101"));
        assert!(!validate_phone(""));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("9084463472"), "90844 63472");
        assert_eq!(normalize_phone("123"), "123");
    }

    #[tokio::test]
    async fn test_admin_phone_promoted() {
        let mut store = SessionStore::new(MemoryStorage::new());
        let session = login(&mut store, "9084463472", Role::User, ADMIN, Utc::now()).await.unwrap();
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.identifier, ADMIN);
        assert!(current_session(&store).await.unwrap().is_admin());
    }

    #[tokio::test]
    async fn test_regular_user_keeps_requested_role() {
        let mut store = SessionStore::new(MemoryStorage::new());
        let session = login(&mut store, "98765 43210", Role::User, ADMIN, Utc::now()).await.unwrap();
        assert_eq!(session.role, Role::User);

        logout(&mut store).await.unwrap();
        assert!(current_session(&store).await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_phone_stores_nothing() {
        let mut store = SessionStore::new(MemoryStorage::new());
        let err = login(&mut store, "12345", Role::User, ADMIN, Utc::now()).await.unwrap_err();
        assert!(matches!(err, IntakeError::InvalidPhone(_)));
        assert!(current_session(&store).await.is_none());
    }
}

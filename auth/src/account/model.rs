use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account ID: opaque string assigned at creation time
pub type AccountId = String;

/// Generate a fresh account ID
pub fn generate_account_id() -> AccountId {
    Uuid::new_v4().to_string()
}

/// Creation timestamp in the `toISOString` form, e.g. `2024-06-10T08:00:00.000Z`
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Stored credential record, keyed by email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    /// Unique across the registry; compared case-sensitively
    pub email: String,
    /// Plaintext, compared byte-for-byte on login
    pub password: String,
    /// ISO-8601 text as stored; kept verbatim so any valid form round-trips
    pub created_at: String,
}

impl Account {
    /// Build a new account with a generated ID and the current timestamp
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_account_id(),
            name: name.into(),
            email: email.into(),
            password: password.into(),
            created_at: now_iso8601(),
        }
    }

    /// Project this account into a session, dropping the password
    pub fn to_session(&self) -> Session {
        Session {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at.clone(),
        }
    }

    pub fn matches_credentials(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

/// The authenticated user as seen by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl Session {
    /// Initials for the avatar fallback, e.g. "Alice Smith" -> "AS"
    pub fn initials(&self) -> String {
        self.name
            .split(' ')
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_ids_are_unique() {
        let a = Account::new("A", "a@x.com", "pw");
        let b = Account::new("A", "a@x.com", "pw");
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }

    #[test]
    fn test_session_projection_drops_password() {
        let account = Account::new("Alice", "alice@pet.com", "secret1");
        let session = account.to_session();

        assert_eq!(session.id, account.id);
        assert_eq!(session.name, "Alice");
        assert_eq!(session.email, "alice@pet.com");
        assert_eq!(session.created_at, account.created_at);

        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_account_json_shape() {
        let json = r#"{
            "id": "1718000000000",
            "name": "Bob",
            "email": "bob@pet.com",
            "password": "hunter2",
            "createdAt": "2024-06-10T08:00:00.000Z"
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.id, "1718000000000");
        assert_eq!(account.email, "bob@pet.com");

        let value = serde_json::to_value(&account).unwrap();
        for field in ["id", "name", "email", "password", "createdAt"] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
    }

    #[test]
    fn test_date_only_created_at_is_accepted() {
        let json = r#"{"id":"7","name":"Cat","email":"cat@pet.com","password":"pw","createdAt":"2024-06-10"}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.created_at, "2024-06-10");

        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["createdAt"], "2024-06-10");
    }

    #[test]
    fn test_new_account_timestamp_format() {
        let account = Account::new("A", "a@x.com", "pw");
        assert!(chrono::DateTime::parse_from_rfc3339(&account.created_at).is_ok());
        assert!(account.created_at.ends_with('Z'));
    }

    #[test]
    fn test_session_ignores_stray_password_field() {
        let json = r#"{"id":"1","name":"Bob","email":"bob@pet.com","password":"x","createdAt":"2024-06-10T08:00:00Z"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.email, "bob@pet.com");
    }

    #[test]
    fn test_credentials_are_exact_match() {
        let account = Account::new("Bob", "bob@pet.com", "hunter2");
        assert!(account.matches_credentials("bob@pet.com", "hunter2"));
        assert!(!account.matches_credentials("Bob@pet.com", "hunter2"));
        assert!(!account.matches_credentials("bob@pet.com", "Hunter2"));
        assert!(!account.matches_credentials("bob@pet.com", "hunter2 "));
    }

    #[test]
    fn test_initials() {
        let session = Account::new("alice smith", "a@x.com", "pw").to_session();
        assert_eq!(session.initials(), "AS");

        let single = Account::new("Bob", "b@x.com", "pw").to_session();
        assert_eq!(single.initials(), "B");
    }
}

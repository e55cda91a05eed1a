//! Credential container with automatic memory zeroing.
//!
//! The username and password are wrapped in `Zeroizing` containers so they
//! are cleared from memory when the run ends. The password is never exposed
//! through `Debug` or `Display`.

use zeroize::{Zeroize, Zeroizing};

/// Username and optional password for the database session.
///
/// # Example
///
/// ```rust
/// use mb4convert_core::Credentials;
///
/// let creds = Credentials::new("admin".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "admin");
/// assert!(creds.has_password());
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials with automatic memory zeroing.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Checks if a password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Borrows the password for handing to the driver.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let password = if self.has_password() {
            "****"
        } else {
            "<none>"
        };
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &password)
            .finish()
    }
}

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of the PIN, the form stored in project files.
pub fn hash_password(pin: &str) -> String {
    hex::encode(Sha256::digest(pin.as_bytes()))
}

pub fn is_valid_pin(pin: &str) -> bool {
    pin.len() == 4 && pin.bytes().all(|b| b.is_ascii_digit())
}

/// Who is driving the session. A project opened with a password stays
/// read-only until the PIN is verified.
#[derive(Debug, Clone)]
pub struct Access {
    password_hash: Option<String>,
    admin: bool,
}

impl Access {
    pub fn admin() -> Self {
        Self {
            password_hash: None,
            admin: true,
        }
    }

    pub fn open(password_hash: Option<String>) -> Self {
        let password_hash = password_hash.filter(|h| !h.is_empty());
        Self {
            admin: password_hash.is_none(),
            password_hash,
        }
    }

    #[allow(dead_code)]
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn is_read_only(&self) -> bool {
        !self.admin
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    /// Unlocks the session when `pin` matches. Without a stored password
    /// every PIN is accepted.
    pub fn verify(&mut self, pin: &str) -> bool {
        let matches = match self.password_hash.as_deref() {
            Some(stored) => hash_password(pin) == stored,
            None => true,
        };
        if matches {
            self.admin = true;
        }
        matches
    }

    /// Sets or clears the password written on the next export.
    pub fn set_password(&mut self, pin: Option<&str>) {
        self.password_hash = pin.filter(|p| !p.is_empty()).map(hash_password);
    }
}

use sha2::{Digest, Sha256};

/// Optional phone-number parsing capability supplied by the host. When no
/// parser is installed, tel fields skip the phone rule entirely.
pub trait PhoneParser: Send + Sync {
    /// True when `raw` parses as a plausible number for the 2-letter
    /// uppercase `country` code.
    fn is_valid(&self, raw: &str, country: &str) -> bool;
}

pub const DEFAULT_AVATAR_SIZE: u32 = 80;

/// Gravatar icon URL for an email address. Pure helper; the address is
/// trimmed and lowercased before hashing, and non-positive or absent sizes
/// fall back to the default.
pub fn gravatar_url(email: &str, size: Option<u32>) -> String {
    let normalized = email.trim().to_ascii_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    let size = size.filter(|value| *value > 0).unwrap_or(DEFAULT_AVATAR_SIZE);
    format!("https://www.gravatar.com/avatar/{}?s={size}", hex::encode(digest))
}

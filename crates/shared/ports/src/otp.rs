use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::OtpError;

/// Time-based one-time password key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpKey {
    pub issuer: String,
    pub account_name: String,
    /// Base32 encoded shared secret
    pub secret: String,
    /// `otpauth://` enrollment URL
    pub url: String,
}

impl fmt::Debug for OtpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpKey")
            .field("issuer", &self.issuer)
            .field("account_name", &self.account_name)
            .field("secret", &"***")
            .finish()
    }
}

/// One-time password generation and validation
pub trait OtpProvider: Send + Sync {
    fn generate_key(&self, issuer: &str, account_name: &str) -> Result<OtpKey, OtpError>;

    /// Render the enrollment URL as a PNG encoded QR code
    fn render_png(&self, key: &OtpKey) -> Result<Vec<u8>, OtpError>;

    /// Check `code` against the key at time `at`
    fn validate(&self, key: &OtpKey, code: &str, at: DateTime<Utc>) -> bool;
}

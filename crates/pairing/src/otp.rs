use athena_ports::{OtpError, OtpKey, OtpProvider};
use chrono::{DateTime, Utc};
use totp_rs::{Algorithm, Secret, TOTP};

const DIGITS: usize = 6;
const SKEW: u8 = 1;
const STEP_SECONDS: u64 = 30;

/// RFC 6238 TOTP provider (SHA1, 6 digits, 30 second step)
#[derive(Debug, Clone, Copy, Default)]
pub struct TotpProvider;

impl TotpProvider {
    pub fn new() -> Self {
        TotpProvider
    }

    /// The code valid for `key` at `at`
    pub fn code_at(&self, key: &OtpKey, at: DateTime<Utc>) -> Result<String, OtpError> {
        Ok(totp(key)?.generate(unix_seconds(at)))
    }
}

fn unix_seconds(at: DateTime<Utc>) -> u64 {
    at.timestamp().max(0) as u64
}

fn totp(key: &OtpKey) -> Result<TOTP, OtpError> {
    let secret = Secret::Encoded(key.secret.clone())
        .to_bytes()
        .map_err(|e| OtpError::KeyGeneration(format!("invalid secret: {:?}", e)))?;

    TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP_SECONDS,
        secret,
        Some(key.issuer.clone()),
        key.account_name.clone(),
    )
    .map_err(|e| OtpError::KeyGeneration(e.to_string()))
}

impl OtpProvider for TotpProvider {
    fn generate_key(&self, issuer: &str, account_name: &str) -> Result<OtpKey, OtpError> {
        let secret = Secret::generate_secret()
            .to_bytes()
            .map_err(|e| OtpError::KeyGeneration(format!("{:?}", e)))?;

        let totp = TOTP::new(
            Algorithm::SHA1,
            DIGITS,
            SKEW,
            STEP_SECONDS,
            secret,
            Some(issuer.to_string()),
            account_name.to_string(),
        )
        .map_err(|e| OtpError::KeyGeneration(e.to_string()))?;

        Ok(OtpKey {
            issuer: issuer.to_string(),
            account_name: account_name.to_string(),
            secret: totp.get_secret_base32(),
            url: totp.get_url(),
        })
    }

    fn render_png(&self, key: &OtpKey) -> Result<Vec<u8>, OtpError> {
        totp(key)?.get_qr_png().map_err(OtpError::Image)
    }

    fn validate(&self, key: &OtpKey, code: &str, at: DateTime<Utc>) -> bool {
        match totp(key) {
            Ok(totp) => totp.check(code.trim(), unix_seconds(at)),
            Err(e) => {
                tracing::warn!(account = %key.account_name, "can not validate one-time password: {}", e);
                false
            }
        }
    }
}

use athena_ports::{ChatUser, OtpKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which bot a pairing session belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingIdentity {
    /// Messaging provider, e.g. `telegram`
    pub provider: String,
    /// Bot id as reported by the provider
    pub id: String,
}

impl PairingIdentity {
    pub fn new(provider: impl Into<String>, id: impl Into<String>) -> Self {
        PairingIdentity {
            provider: provider.into(),
            id: id.into(),
        }
    }

    /// Persistence namespace: `athena/<provider>/<id>`
    pub fn namespace(&self) -> [&str; 3] {
        ["athena", self.provider.as_str(), self.id.as_str()]
    }

    /// OTP account name shown in authenticator apps
    pub fn account_name(&self) -> String {
        format!("{}-{}", self.provider, self.id)
    }

    pub fn qr_code_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("otp-{}.png", self.id))
    }
}

/// Persisted binding between a bot and its operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingSession {
    pub otp_key: OtpKey,
    #[serde(default)]
    pub owner: Option<ChatUser>,
    #[serde(default)]
    pub owner_chat: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Fixed token accepted in place of a TOTP code; never persisted
    #[serde(skip)]
    pub auth_token: Option<String>,
}

impl PairingSession {
    pub fn new(otp_key: OtpKey) -> Self {
        PairingSession {
            otp_key,
            owner: None,
            owner_chat: None,
            created_at: Utc::now(),
            auth_token: None,
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.owner.is_some() && self.owner_chat.is_some()
    }

    pub fn is_owner(&self, user: &ChatUser) -> bool {
        self.owner.as_ref().is_some_and(|owner| owner.id == user.id)
    }

    pub(crate) fn claimed_by(&self, user: &ChatUser, chat_id: i64) -> Self {
        PairingSession {
            owner: Some(user.clone()),
            owner_chat: Some(chat_id),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> OtpKey {
        OtpKey {
            issuer: "athena".to_string(),
            account_name: "telegram-1".to_string(),
            secret: "JBSWY3DPEHPK3PXP".to_string(),
            url: "otpauth://totp/athena:telegram-1".to_string(),
        }
    }

    #[test]
    fn test_identity_paths() {
        let identity = PairingIdentity::new("telegram", "12345");
        assert_eq!(identity.namespace(), ["athena", "telegram", "12345"]);
        assert_eq!(identity.account_name(), "telegram-12345");
        assert_eq!(
            identity.qr_code_path(Path::new("/tmp")),
            PathBuf::from("/tmp/otp-12345.png")
        );
    }

    #[test]
    fn test_claim() {
        let session = PairingSession::new(key());
        assert!(!session.is_claimed());

        let user = ChatUser { id: 7, username: Some("ops".to_string()) };
        let claimed = session.claimed_by(&user, 99);
        assert!(claimed.is_claimed());
        assert!(claimed.is_owner(&user));
        assert!(!claimed.is_owner(&ChatUser { id: 8, username: None }));
        assert_eq!(claimed.owner_chat, Some(99));
    }

    #[test]
    fn test_auth_token_is_not_serialized() {
        let mut session = PairingSession::new(key());
        session.auth_token = Some("secret-token".to_string());

        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret-token"));

        let back: PairingSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back.auth_token, None);
        assert_eq!(back.otp_key, session.otp_key);
    }
}

//! Pairing session bootstrap

use athena_notify::QueuedNotifier;
use athena_ports::{ChatBot, OtpKey, OtpProvider, Persistence, Store, StoreExt};
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::error::PairingError;
use crate::interaction::Interaction;
use crate::session::{PairingIdentity, PairingSession};
use crate::telegram::TelegramDeliverer;

const OTP_ISSUER: &str = "athena";
const NOTIFICATION_QUEUE_CAPACITY: usize = 256;

/// Load the persisted session, or create and persist a new unclaimed one.
///
/// A claimed session is reused as-is: no new key, no QR code, no instructions.
pub fn prepare_session(
    store: &dyn Store,
    otp: &dyn OtpProvider,
    identity: &PairingIdentity,
    artifact_dir: &Path,
) -> Result<PairingSession, PairingError> {
    match store.load::<PairingSession>() {
        Ok(session) if session.is_claimed() => {
            tracing::info!(
                bot = %identity.id,
                owner_chat = ?session.owner_chat,
                "reusing claimed pairing session"
            );
            return Ok(session);
        }
        Ok(_) => {
            tracing::info!(bot = %identity.id, "pairing session was never claimed, regenerating key");
        }
        Err(e) if e.is_not_found() => {
            tracing::info!(bot = %identity.id, "no pairing session found, generating key");
        }
        Err(e) => {
            tracing::warn!(bot = %identity.id, "can not load pairing session, regenerating key: {}", e);
        }
    }

    let key = otp.generate_key(OTP_ISSUER, &identity.account_name())?;
    let png = otp.render_png(&key)?;

    std::fs::create_dir_all(artifact_dir).map_err(|source| PairingError::QrCodeWrite {
        path: artifact_dir.to_path_buf(),
        source,
    })?;
    let qr_path = identity.qr_code_path(artifact_dir);
    std::fs::write(&qr_path, png).map_err(|source| PairingError::QrCodeWrite {
        path: qr_path.clone(),
        source,
    })?;

    print_otp_guide(&key, &qr_path);

    let session = PairingSession::new(key);
    store.save(&session).map_err(PairingError::Save)?;
    Ok(session)
}

pub fn print_otp_guide(key: &OtpKey, qr_path: &Path) {
    println!("======================================================");
    println!("PLEASE STORE YOUR OTP KEY SAFELY");
    println!("======================================================");
    println!("  Issuer:       {}", key.issuer);
    println!("  AccountName:  {}", key.account_name);
    println!("  Secret:       {}", key.secret);
    println!("  Key URL:      {}", key.url);
    println!("  QR Code:      {}", qr_path.display());
    println!();
    println!("Scan the QR code with your authenticator app, then send");
    println!("    /auth {{code}}");
    println!("to the bot with the current 6-digit code to pair.");
    println!("======================================================");
}

pub fn print_auth_token_guide(token: &str) {
    println!("send the following command to the bot to pair:");
    println!("    /auth {}", token);
}

/// Running pairing interaction for one bot
pub struct PairingHandle {
    pub interaction: Arc<Interaction>,
    /// Notifier delivering to the owner's chat once paired
    pub notifier: QueuedNotifier,
    pub tasks: Vec<JoinHandle<()>>,
}

/// Prepare the bot's pairing session and spawn its interaction loop
/// and notification dispatcher on the current runtime.
pub fn start_pairing(
    provider: &str,
    bot: Arc<dyn ChatBot>,
    persistence: &dyn Persistence,
    otp: Arc<dyn OtpProvider>,
    auth_token: Option<String>,
    artifact_dir: &Path,
) -> Result<PairingHandle, PairingError> {
    let identity = PairingIdentity::new(provider, bot.identity());
    let store = persistence.new_store(&identity.namespace());

    if let Some(token) = auth_token.as_deref() {
        print_auth_token_guide(token);
    }

    let mut session = prepare_session(store.as_ref(), otp.as_ref(), &identity, artifact_dir)?;
    session.auth_token = auth_token;

    let interaction = Arc::new(Interaction::new(bot, store, otp, session));
    let poller = tokio::spawn(interaction.clone().run());

    let (notifier, dispatcher) = QueuedNotifier::spawn(
        TelegramDeliverer::new(interaction.clone()),
        NOTIFICATION_QUEUE_CAPACITY,
    );

    Ok(PairingHandle {
        interaction,
        notifier,
        tasks: vec![poller, dispatcher],
    })
}

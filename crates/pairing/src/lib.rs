//! Athena Pairing
//!
//! Binds a messaging-bot chat to the operator allowed to receive
//! notifications, without a pre-shared password:
//!
//! 1. **Setup**: load the pairing session persisted for the bot; when it is
//!    missing or unclaimed, generate a TOTP key, write its QR code and print
//!    enrollment instructions.
//! 2. **Interaction**: long-poll the bot; `/auth <code>` with a valid TOTP code
//!    (or the fixed auth token) claims the session for the sender.
//! 3. **Delivery**: notifications go to the owner's chat once claimed.
//!
//! Claiming is one-way; there is no un-pairing command.

pub mod error;
pub mod interaction;
pub mod otp;
pub mod session;
pub mod setup;
pub mod telegram;

pub use error::PairingError;
pub use interaction::{AuthOutcome, Interaction};
pub use otp::TotpProvider;
pub use session::{PairingIdentity, PairingSession};
pub use setup::{
    PairingHandle, prepare_session, print_auth_token_guide, print_otp_guide, start_pairing,
};
pub use telegram::{TelegramBot, TelegramDeliverer};

//! Error types for the pairing crate

use athena_ports::{OtpError, StoreError};
use std::path::PathBuf;
use thiserror::Error;

/// Pairing setup failures, all reported as a failed OTP key setup
#[derive(Error, Debug)]
pub enum PairingError {
    #[error("failed to setup time-based one-time password key: {0}")]
    OtpSetup(#[from] OtpError),

    #[error("failed to setup time-based one-time password key: can not write QR code to {path}: {source}")]
    QrCodeWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to setup time-based one-time password key: can not save pairing session: {0}")]
    Save(#[source] StoreError),
}

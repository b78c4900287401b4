//! Notification Config

use clap::Args;

/// Addresses used on outgoing notices.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct NotificationConfig {
    /// Sender address for member notices
    #[arg(
        long,
        env = "NOTIFICATION_FROM_ADDRESS",
        default_value = "registration@wellington.invalid"
    )]
    pub from_address: String,

    /// Reply-to address for member notices
    #[arg(
        long,
        env = "NOTIFICATION_REPLY_TO",
        default_value = "registration@wellington.invalid"
    )]
    pub reply_to: String,
}

//! Notifications
//!
//! Notices the checkout pipeline hands off once its store changes commit.
//! Delivery is behind [`Notifier`] so a mailer can replace [`LogNotifier`].

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::info;

use crate::domain::{carts::records::CartUuid, users::records::UserUuid};

/// Sent when a user chooses to pay for a cart by cheque.
#[derive(Debug, Clone, PartialEq)]
pub struct CartWaitingForCheque {
    pub user: UserUuid,
    pub email: String,
    pub item_count: usize,
    pub outstanding: Money<'static, Currency>,
    pub item_descriptions: Vec<String>,
    pub transaction_date: Timestamp,
    /// The cart number quoted on the cheque.
    pub cart: CartUuid,
    pub from_address: String,
    pub reply_to: String,
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("notice could not be delivered: {0}")]
    Delivery(String),
}

#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tells the user where to send their cheque and what it covers.
    async fn cart_waiting_for_cheque(
        &self,
        notice: CartWaitingForCheque,
    ) -> Result<(), NotifierError>;
}

/// Writes notices to the log instead of sending them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn cart_waiting_for_cheque(
        &self,
        notice: CartWaitingForCheque,
    ) -> Result<(), NotifierError> {
        info!(
            user = %notice.user,
            to = %notice.email,
            from = %notice.from_address,
            reply_to = %notice.reply_to,
            cart = %notice.cart,
            items = notice.item_count,
            outstanding = %notice.outstanding,
            transaction_date = %notice.transaction_date,
            description = %notice.item_descriptions.concat(),
            "cart waiting for cheque"
        );

        Ok(())
    }
}

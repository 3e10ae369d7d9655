use std::sync::{Arc, Mutex};

use tracing::info;

use crate::account::Amount;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    Credited,
    Debited,
    TransferSent { to: String },
}

/// Alert addressed to an account holder's contact channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub username: String,
    pub contact: String,
    pub kind: NotificationKind,
    pub amount: Amount,
    pub balance: Amount,
}

impl Notification {
    pub fn render(&self, currency: &str) -> String {
        let Self {
            contact,
            amount,
            balance,
            ..
        } = self;
        match &self.kind {
            NotificationKind::Credited => format!(
                "ALERT: {currency}{amount} credited. New balance: {currency}{balance} sent to {contact}"
            ),
            NotificationKind::Debited => format!(
                "ALERT: {currency}{amount} debited. New balance: {currency}{balance} sent to {contact}"
            ),
            NotificationKind::TransferSent { to } => {
                format!("ALERT: {currency}{amount} transferred to {to}")
            }
        }
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Emits every alert as a structured `tracing` event.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        info!(
            user = %notification.username,
            contact = %notification.contact,
            kind = ?notification.kind,
            amount = notification.amount,
            balance = notification.balance,
            "notification sent"
        );
    }
}

/// Keeps every alert in memory; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Hands over the alerts recorded so far and forgets them.
    pub fn take(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|mut sent| std::mem::take(&mut *sent))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification);
        }
    }
}

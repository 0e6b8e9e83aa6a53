//! Notification outbox.
//!
//! The lifecycle manager enqueues a notice after a write has committed and
//! returns immediately. A single background dispatcher drains the queue,
//! resolves the recipient and calls the notifier. Delivery failures are
//! logged and dropped; they never reach the caller.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::models::{Appointment, MessageKind};
use crate::notifier::{NotificationPayload, Notifier};
use crate::store::ProfileDirectory;

/// One queued notification: a snapshot of the committed record.
#[derive(Debug, Clone)]
pub struct StatusNotice {
    pub appointment: Appointment,
    pub kind: MessageKind,
}

pub type OutboxReceiver = mpsc::UnboundedReceiver<StatusNotice>;

/// Sending half. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NotificationOutbox {
    tx: mpsc::UnboundedSender<StatusNotice>,
}

impl NotificationOutbox {
    pub fn new() -> (Self, OutboxReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a notice. Never blocks and never fails the caller.
    pub fn enqueue(&self, appointment: Appointment, kind: MessageKind) {
        let appointment_id = appointment.id;
        if self.tx.send(StatusNotice { appointment, kind }).is_err() {
            tracing::warn!(
                appointment_id = %appointment_id,
                kind = %kind,
                "Notification dispatcher stopped, notice dropped"
            );
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Drain `rx` until every sender is dropped.
pub async fn run_dispatcher<D, N>(
    mut rx: OutboxReceiver,
    directory: Arc<D>,
    notifier: Arc<N>,
) -> DispatchStats
where
    D: ProfileDirectory,
    N: Notifier,
{
    let mut stats = DispatchStats::default();

    while let Some(notice) = rx.recv().await {
        let appointment_id = notice.appointment.id;

        let Some(owner_id) = notice.appointment.owner_id else {
            tracing::debug!(appointment_id = %appointment_id, "Walk-in appointment, no notification");
            stats.skipped += 1;
            continue;
        };

        let to = match directory.email_for(owner_id).await {
            Ok(Some(email)) => email,
            Ok(None) => {
                tracing::debug!(
                    appointment_id = %appointment_id,
                    owner_id = %owner_id,
                    "Owner has no email on file, notification skipped"
                );
                stats.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(
                    appointment_id = %appointment_id,
                    error = %e,
                    "Recipient lookup failed, notification dropped"
                );
                stats.failed += 1;
                continue;
            }
        };

        let payload = NotificationPayload::for_appointment(to, &notice.appointment, notice.kind);
        match notifier.send(payload).await {
            Ok(_) => {
                tracing::info!(
                    appointment_id = %appointment_id,
                    kind = %notice.kind,
                    "Notification sent"
                );
                stats.sent += 1;
            }
            Err(e) => {
                tracing::warn!(
                    appointment_id = %appointment_id,
                    kind = %notice.kind,
                    error = %e,
                    "Notification failed"
                );
                stats.failed += 1;
            }
        }
    }

    tracing::debug!(?stats, "Notification dispatcher stopped");
    stats
}

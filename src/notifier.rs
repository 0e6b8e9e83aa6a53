//! Notifier collaborator: transactional email through the hosted function.

use std::future::Future;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Appointment, MessageKind};

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Cannot reach email function at {0}")]
    Connection(String),
    #[error("Email function returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Body accepted by the `send-appointment-email` function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub to: String,
    pub full_name: String,
    /// Long form, e.g. "October 17th, 2026".
    pub appointment_date: String,
    pub appointment_time: String,
    pub service_type: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl NotificationPayload {
    pub fn for_appointment(to: String, appointment: &Appointment, kind: MessageKind) -> Self {
        Self {
            to,
            full_name: appointment.full_name.clone(),
            appointment_date: format_long_date(appointment.date),
            appointment_time: appointment.time.clone(),
            service_type: appointment.service_type.as_str().to_string(),
            status: appointment.status.as_str().to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Raw response body from the function, if any.
    pub detail: Option<String>,
}

pub trait Notifier: Send + Sync + 'static {
    fn send(
        &self,
        payload: NotificationPayload,
    ) -> impl Future<Output = Result<DeliveryReceipt, NotificationError>> + Send;
}

/// "October 17th, 2026"
pub fn format_long_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {day}{suffix}, {}", date.format("%B"), date.year())
}

// ═══════════════════════════════════════════════════════════
// Email templates
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

/// Subject and body the function renders for `payload`.
pub fn compose_email(payload: &NotificationPayload) -> EmailContent {
    let subject = match payload.kind {
        MessageKind::Confirmation => "Appointment Confirmed - Barbershop".to_string(),
        MessageKind::Reminder => "Appointment Reminder - Barbershop".to_string(),
        MessageKind::StatusChange => {
            format!("Appointment {} - Barbershop", capitalize(&payload.status))
        }
    };

    let (intro, show_status, closing) = match payload.kind {
        MessageKind::Confirmation => (
            "<p>Your appointment has been confirmed.</p>".to_string(),
            true,
            "We look forward to seeing you!",
        ),
        MessageKind::Reminder => (
            "<p>This is a reminder about your upcoming appointment.</p>".to_string(),
            false,
            "We look forward to seeing you!",
        ),
        MessageKind::StatusChange => (
            format!(
                "<p>Your appointment status has been updated to: <strong>{}</strong></p>",
                payload.status
            ),
            true,
            "If you have any questions, please contact us.",
        ),
    };

    let mut details = format!(
        "<p><strong>Service:</strong> {}</p><p><strong>Date:</strong> {}</p><p><strong>Time:</strong> {}</p>",
        payload.service_type, payload.appointment_date, payload.appointment_time
    );
    if show_status {
        details.push_str(&format!("<p><strong>Status:</strong> {}</p>", payload.status));
    }

    let html = format!(
        "<h1>Hello {}!</h1>{intro}<div><h2>Appointment Details</h2>{details}</div><p>{closing}</p><p>Best regards,<br>The Barbershop Team</p>",
        payload.full_name
    );

    EmailContent { subject, html }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ═══════════════════════════════════════════════════════════
// Adapters
// ═══════════════════════════════════════════════════════════

/// POSTs payloads to the hosted email function.
pub struct EmailFunctionNotifier {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl EmailFunctionNotifier {
    pub fn new(
        url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::HttpClient(e.to_string()))?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

impl Notifier for EmailFunctionNotifier {
    async fn send(&self, payload: NotificationPayload) -> Result<DeliveryReceipt, NotificationError> {
        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                NotificationError::Connection(self.url.clone())
            } else {
                NotificationError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(DeliveryReceipt {
            detail: (!body.is_empty()).then_some(body),
        })
    }
}

/// Used when no email function is configured. Logs and reports success.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn send(&self, payload: NotificationPayload) -> Result<DeliveryReceipt, NotificationError> {
        let email = compose_email(&payload);
        tracing::info!(
            to = %payload.to,
            kind = %payload.kind,
            subject = %email.subject,
            "Email function not configured, notification logged only"
        );
        Ok(DeliveryReceipt { detail: None })
    }
}

/// Either configured adapter, picked at startup.
pub enum AnyNotifier {
    EmailFunction(EmailFunctionNotifier),
    Log(LogNotifier),
}

impl Notifier for AnyNotifier {
    async fn send(&self, payload: NotificationPayload) -> Result<DeliveryReceipt, NotificationError> {
        match self {
            Self::EmailFunction(inner) => inner.send(payload).await,
            Self::Log(inner) => inner.send(payload).await,
        }
    }
}

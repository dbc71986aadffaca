//! Outbound mail: OTP codes, invoice PDFs and stock notifications.
//!
//! Delivery goes through the `MailTransport` trait so the development
//! profile can run with a log-only transport while staging/production use
//! SMTP (STARTTLS) with credentials from config.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::{self, MailDriver};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("Invalid content type: {0}")]
    ContentType(String),
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: Message) -> Result<(), MailError>;
}

/// Real delivery over SMTP.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn from_config() -> Result<Self, MailError> {
        let mail = &config::config().mail;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.smtp_host)?
            .port(mail.smtp_port)
            .credentials(Credentials::new(
                mail.smtp_username.clone(),
                mail.smtp_password.clone(),
            ))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, message: Message) -> Result<(), MailError> {
        self.transport.send(message).await?;
        Ok(())
    }
}

/// Development transport: traces the envelope instead of sending.
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn deliver(&self, message: Message) -> Result<(), MailError> {
        tracing::info!(
            to = ?message.envelope().to(),
            bytes = message.formatted().len(),
            "mail driver is 'log', suppressing delivery"
        );
        Ok(())
    }
}

pub struct Mailer {
    transport: Box<dyn MailTransport>,
    from: Mailbox,
}

impl Mailer {
    pub fn from_config() -> Result<Self, MailError> {
        let mail = &config::config().mail;
        let from: Mailbox = format!("{} <{}>", mail.from_name, mail.from_address).parse()?;

        let transport: Box<dyn MailTransport> = match mail.driver {
            MailDriver::Smtp => Box::new(SmtpMailTransport::from_config()?),
            MailDriver::Log => Box::new(LogMailTransport),
        };

        Ok(Self { transport, from })
    }

    pub fn with_transport(transport: Box<dyn MailTransport>, from: Mailbox) -> Self {
        Self { transport, from }
    }

    pub async fn send_otp(&self, to: &str, otp: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject("E-Market OTP Verification")
            .header(ContentType::TEXT_PLAIN)
            .body(format!("Your OTP is: {}. It is valid for 5 minutes.", otp))?;
        self.transport.deliver(message).await
    }

    pub async fn send_invoice(
        &self,
        to: &str,
        invoice_id: &str,
        pdf: Vec<u8>,
    ) -> Result<(), MailError> {
        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| MailError::ContentType(e.to_string()))?;
        let attachment =
            Attachment::new(format!("invoice_{}.pdf", invoice_id)).body(pdf, pdf_type);

        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(format!("E-Market Invoice for Order #{}", invoice_id))
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(
                        "Please find attached your invoice for the recent order from E-Market."
                            .to_string(),
                    ))
                    .singlepart(attachment),
            )?;
        self.transport.deliver(message).await
    }

    pub async fn send_out_of_stock_alert(&self, product_name: &str) -> Result<(), MailError> {
        let admin = &config::config().security.admin_email;
        let message = Message::builder()
            .from(self.from.clone())
            .to(admin.parse()?)
            .subject(format!("Out of Stock Alert: {}", product_name))
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Dear Admin,\n\nThe product '{}' is out of stock on E-Market.\n\
                 Please restock it at the earliest.\n\nRegards,\nE-Market System",
                product_name
            ))?;
        self.transport.deliver(message).await
    }

    /// Broadcast a restock notice to every registered user. Individual
    /// failures are logged; the broadcast carries on.
    pub async fn send_restock_notice(&self, recipients: &[String], product_name: &str) {
        let sends = recipients.iter().map(|email| async move {
            let result = self.build_restock_notice(email, product_name);
            let message = match result {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Skipping restock notice to {}: {}", email, e);
                    return;
                }
            };
            if let Err(e) = self.transport.deliver(message).await {
                tracing::warn!("Failed to send restock notice to {}: {}", email, e);
            }
        });
        futures::future::join_all(sends).await;
    }

    fn build_restock_notice(&self, to: &str, product_name: &str) -> Result<Message, MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(format!("Product Restocked: {}", product_name))
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "The product '{}' is now available again on E-Market. \
                 Hurry before it sells out!",
                product_name
            ))?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<Message>>>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn deliver(&self, message: Message) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn mailer_with_recorder() -> (Mailer, RecordingTransport) {
        let recorder = RecordingTransport::default();
        let mailer = Mailer::with_transport(
            Box::new(recorder.clone()),
            "E-Market <noreply@emarket.com>".parse().unwrap(),
        );
        (mailer, recorder)
    }

    #[tokio::test]
    async fn otp_mail_carries_the_code() {
        let (mailer, recorder) = mailer_with_recorder();
        mailer.send_otp("buyer@example.com", "482913").await.unwrap();

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let raw = String::from_utf8(sent[0].formatted()).unwrap();
        assert!(raw.contains("E-Market OTP Verification"));
        assert!(raw.contains("Your OTP is: 482913"));
    }

    #[tokio::test]
    async fn invoice_mail_attaches_the_pdf() {
        let (mailer, recorder) = mailer_with_recorder();
        mailer
            .send_invoice("buyer@example.com", "INV-00C0FFEE42", b"%PDF-1.4 fake".to_vec())
            .await
            .unwrap();

        let sent = recorder.sent.lock().unwrap();
        let raw = String::from_utf8(sent[0].formatted()).unwrap();
        assert!(raw.contains("E-Market Invoice for Order #INV-00C0FFEE42"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("invoice_INV-00C0FFEE42.pdf"));
    }

    #[tokio::test]
    async fn restock_broadcast_reaches_every_recipient() {
        let (mailer, recorder) = mailer_with_recorder();
        let recipients = vec![
            "a@example.com".to_string(),
            "not an address".to_string(),
            "b@example.com".to_string(),
        ];
        mailer.send_restock_notice(&recipients, "Widget").await;

        // The malformed address is skipped, the rest go out.
        assert_eq!(recorder.sent.lock().unwrap().len(), 2);
    }
}

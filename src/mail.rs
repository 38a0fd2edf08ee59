//! Outgoing mail: the "new login data" notice and its SMTP delivery.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::info;

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub from: Party,
    pub to: Party,
    pub subject: String,
    pub body: String,
}

#[derive(Template)]
#[template(path = "email/login_data.txt")]
struct LoginDataText<'a> {
    name: &'a str,
    username: &'a str,
    password: &'a str,
    user_type: &'a str,
    panel_url: &'a str,
    sender: &'a str,
}

/// Values quoted in a login-data notice.
pub struct LoginData<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub user_type: &'a str,
    pub panel_url: &'a str,
}

/// Builds the mail telling a customer its (new) credentials.
pub fn login_data_mail(
    from: Party,
    to: Party,
    data: &LoginData<'_>,
) -> Result<OutgoingMail, MailError> {
    let name = if to.name.is_empty() {
        data.username
    } else {
        to.name.as_str()
    };
    let body = LoginDataText {
        name,
        username: data.username,
        password: data.password,
        user_type: data.user_type,
        panel_url: data.panel_url,
        sender: &from.name,
    }
    .render()?;
    let subject = format!("New login data for {}", data.username);
    Ok(OutgoingMail {
        from,
        to,
        subject,
        body,
    })
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port);
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            transport: builder.build(),
        })
    }
}

fn mailbox(party: &Party) -> Result<Mailbox, MailError> {
    let address: Address = party
        .email
        .parse()
        .map_err(|_| MailError::InvalidAddress(party.email.clone()))?;
    let name = (!party.name.is_empty()).then(|| party.name.clone());
    Ok(Mailbox::new(name, address))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(mailbox(&mail.from)?)
            .to(mailbox(&mail.to)?)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)?;
        self.transport.send(message).await?;
        info!(to = %mail.to.email, subject = %mail.subject, "mail sent");
        Ok(())
    }
}

/// Used when no SMTP relay is configured. Never logs the body.
#[derive(Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        mailbox(&mail.to)?;
        info!(
            from = %mail.from.email,
            to = %mail.to.email,
            subject = %mail.subject,
            "smtp disabled; mail not delivered"
        );
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn party(name: &str, email: &str) -> Party {
        Party {
            name: name.into(),
            email: email.into(),
        }
    }

    #[test]
    fn login_data_mail_quotes_credentials() {
        let mail = login_data_mail(
            party("Rita Seller", "rita@reseller.test"),
            party("Ada Lovelace", "ada@example.com"),
            &LoginData {
                username: "customer1",
                password: "n3w-Secret",
                user_type: "Customer",
                panel_url: "https://panel.example.com",
            },
        )
        .unwrap();
        assert_eq!(mail.subject, "New login data for customer1");
        assert!(mail.body.contains("Dear Ada Lovelace"));
        assert!(mail.body.contains("n3w-Secret"));
        assert!(mail.body.contains("https://panel.example.com"));
        assert!(mail.body.contains("Rita Seller"));
    }

    #[test]
    fn greeting_falls_back_to_username() {
        let mail = login_data_mail(
            party("", "rita@reseller.test"),
            party("", "ada@example.com"),
            &LoginData {
                username: "customer1",
                password: "x",
                user_type: "Customer",
                panel_url: "http://p",
            },
        )
        .unwrap();
        assert!(mail.body.contains("Dear customer1"));
    }

    #[tokio::test]
    async fn log_mailer_rejects_bad_recipient() {
        let mail = OutgoingMail {
            from: party("a", "a@example.com"),
            to: party("b", "not an address"),
            subject: "s".into(),
            body: "b".into(),
        };
        let err = LogMailer.send(mail).await.unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress(_)));
    }
}

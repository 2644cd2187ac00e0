use std::fmt;

use lettre::{
    address::Envelope,
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{Tls, TlsParameters},
    },
    Address, SmtpTransport, Transport,
};
use log::{debug, info};

use crate::{
    config::{SmtpSettings, TlsMode},
    mail::{
        mime::{build_message, Boundary},
        Email,
    },
    MailError,
};

/// Hands an assembled message to a server for delivery
pub trait Transmitter {
    fn transmit(&self, from: &str, recipients: &[&str], message: &[u8]) -> Result<(), MailError>;
}

/// Submits messages over SMTP using PLAIN authentication
pub struct SmtpTransmitter {
    transport: SmtpTransport,
}

impl SmtpTransmitter {
    /// Configures the client, no connection is made until a message is sent
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        debug!(
            "Setting up SMTP transport for {}:{} with TLS mode {:?}",
            settings.host, settings.port, settings.tls
        );
        let transport_err = |source| MailError::Transport {
            host: settings.host.clone(),
            source,
        };
        let parameters = || TlsParameters::new(settings.host.clone()).map_err(transport_err);
        let tls = match settings.tls {
            TlsMode::None => Tls::None,
            TlsMode::Opportunistic => Tls::Opportunistic(parameters()?),
            TlsMode::Required => Tls::Required(parameters()?),
            TlsMode::Wrapper => Tls::Wrapper(parameters()?),
        };

        let transport = SmtpTransport::builder_dangerous(&settings.host)
            .port(settings.port)
            .tls(tls)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .authentication(vec![Mechanism::Plain])
            .build();
        Ok(Self { transport })
    }
}

impl fmt::Debug for SmtpTransmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpTransmitter").finish_non_exhaustive()
    }
}

impl Transmitter for SmtpTransmitter {
    fn transmit(&self, from: &str, recipients: &[&str], message: &[u8]) -> Result<(), MailError> {
        let from = parse_address(from)?;
        let recipients = recipients
            .iter()
            .map(|address| parse_address(address))
            .collect::<Result<Vec<_>, _>>()?;
        let envelope = Envelope::new(Some(from), recipients).map_err(MailError::Envelope)?;

        let response = self
            .transport
            .send_raw(&envelope, message)
            .map_err(|e| MailError::Transmission(Box::new(e)))?;
        debug!("Message accepted with response code {}", response.code());
        Ok(())
    }
}

fn parse_address(address: &str) -> Result<Address, MailError> {
    address
        .trim()
        .parse()
        .map_err(|source| MailError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

/// Sends [`Email`]s from the configured account
#[derive(Debug)]
pub struct Mailer<T> {
    from: String,
    transmitter: T,
}

impl Mailer<SmtpTransmitter> {
    pub fn smtp(settings: &SmtpSettings) -> Result<Self, MailError> {
        Ok(Self::new(settings, SmtpTransmitter::new(settings)?))
    }
}

impl<T: Transmitter> Mailer<T> {
    pub fn new(settings: &SmtpSettings, transmitter: T) -> Self {
        Self {
            from: settings.username.clone(),
            transmitter,
        }
    }

    /// Builds the message then transmits it once, retrying is left to the caller
    ///
    /// The message is fully built before anything is transmitted so a
    /// missing attachment never results in a partial message being sent.
    pub fn send_email(&self, email: &Email) -> Result<(), MailError> {
        let boundary = Boundary::generate_for(&email.body);
        let message = build_message(&self.from, email, &boundary)?;
        let recipients: Vec<&str> = email.envelope_recipients().collect();
        info!(
            "Sending {:?} to {} recipient(s)",
            email.subject,
            recipients.len()
        );
        self.transmitter.transmit(&self.from, &recipients, &message)
    }
}

mod email;
pub mod mime;
mod sender;

pub use email::Email;
pub use sender::{Mailer, SmtpTransmitter, Transmitter};

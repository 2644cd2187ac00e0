use std::path::PathBuf;

/// A single message to be sent, created right before sending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Email {
    pub to: Vec<String>,
    pub cc: Vec<String>,

    /// Only used for the SMTP envelope, never written to a header
    pub bcc: Vec<String>,

    pub subject: String,

    /// Already rendered HTML
    pub body: String,

    /// Files to attach, in the order they will appear in the message
    pub attachments: Vec<PathBuf>,
}

impl Email {
    /// Every address the server must deliver to: To, then Cc, then Bcc
    pub fn envelope_recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
    }
}

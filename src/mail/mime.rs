//! Hand built `multipart/mixed` messages.
//!
//! Layout produced by [`build_message`]:
//!
//! ```text
//! <headers>
//!
//! --<boundary>
//! Content-Type: text/html; charset="utf-8"
//!
//! <html body>
//! --<boundary>            (one part per attachment)
//! Content-Disposition: attachment; filename="<name>"
//! Content-Transfer-Encoding: base64
//! Content-Type: application/octet-stream
//!
//! <base64, 76 columns>
//! --<boundary>--
//! ```

use std::{
    fmt::Display,
    fs::File,
    io::{self, Read, Write},
    path::Path,
};

use base64::{engine::general_purpose::STANDARD, write::EncoderWriter, Engine};
use chrono::Local;
use log::debug;
use rand::{distributions::Alphanumeric, Rng};

use crate::{mail::Email, utils::make_single_line, MailError};

/// Bytes read from an attachment per read call
pub const CHUNK_SIZE: usize = 3 * 1024;

/// Longest encoded line allowed by RFC 2045
const MAX_LINE_LEN: usize = 76;

/// Separates the parts of a multipart message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary(String);

impl Boundary {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Random token starting with `=_`, a sequence base64 output never contains
    pub fn generate() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        Self(format!("=_{suffix}"))
    }

    /// Generates a boundary that does not occur anywhere in `body`
    pub fn generate_for(body: &str) -> Self {
        loop {
            let result = Self::generate();
            if !body.contains(result.as_str()) {
                return result;
            }
            debug!("Generated boundary found in body, generating another");
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Boundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds the complete message, headers first then the HTML part and one part per attachment
///
/// Bcc recipients are deliberately absent from the headers. On error the
/// partially written buffer is discarded and nothing is returned.
pub fn build_message(
    from: &str,
    email: &Email,
    boundary: &Boundary,
) -> Result<Vec<u8>, MailError> {
    let mut buffer = Vec::new();

    write_header(&mut buffer, "From", from);
    write_header(&mut buffer, "To", &email.to.join(","));
    if !email.cc.is_empty() {
        write_header(&mut buffer, "Cc", &email.cc.join(","));
    }
    write_header(&mut buffer, "Subject", &encode_subject(&email.subject));
    write_header(&mut buffer, "Date", &Local::now().to_rfc2822());
    write_header(&mut buffer, "MIME-Version", "1.0");
    write_header(
        &mut buffer,
        "Content-Type",
        &format!("multipart/mixed; boundary=\"{boundary}\""),
    );
    buffer.extend_from_slice(b"\r\n");

    buffer.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    buffer.extend_from_slice(b"Content-Type: text/html; charset=\"utf-8\"\r\n\r\n");
    buffer.extend_from_slice(email.body.as_bytes());
    buffer.extend_from_slice(b"\r\n");

    for attachment in &email.attachments {
        write_attachment(&mut buffer, attachment, boundary)?;
    }

    buffer.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    debug!(
        "Built message of {} bytes with {} attachment(s)",
        buffer.len(),
        email.attachments.len()
    );
    Ok(buffer)
}

/// Writes one attachment part, streaming the file through a base64 encoder
///
/// The file is read [`CHUNK_SIZE`] bytes at a time so memory use does not
/// depend on the size of the attachment.
pub fn write_attachment<W: Write>(
    out: &mut W,
    path: &Path,
    boundary: &Boundary,
) -> Result<(), MailError> {
    debug!("Attaching {path:?}");
    let mut file = File::open(path).map_err(|source| MailError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let encode_err = |source: io::Error| MailError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let filename = make_single_line(&filename).replace(['"', '\\'], "_");
    write!(
        out,
        "--{boundary}\r\n\
         Content-Disposition: attachment; filename=\"{filename}\"\r\n\
         Content-Transfer-Encoding: base64\r\n\
         Content-Type: application/octet-stream\r\n\
         \r\n"
    )
    .map_err(encode_err)?;

    let mut encoder = EncoderWriter::new(LineWrapper::new(&mut *out), &STANDARD);
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let n = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(MailError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        encoder.write_all(&chunk[..n]).map_err(encode_err)?;
    }
    // Flushes the final partial group and its padding
    let wrapper = encoder.finish().map_err(encode_err)?;

    // Bypasses the wrapper, the break ends the part rather than a line of data
    wrapper.inner.write_all(b"\r\n").map_err(encode_err)?;
    Ok(())
}

fn write_header(buffer: &mut Vec<u8>, name: &str, value: &str) {
    buffer.extend_from_slice(format!("{name}: {}\r\n", make_single_line(value)).as_bytes());
}

/// Non ASCII subjects become an RFC 2047 encoded word
fn encode_subject(subject: &str) -> String {
    let subject = make_single_line(subject);
    if subject.is_ascii() {
        subject.into_owned()
    } else {
        format!("=?utf-8?B?{}?=", STANDARD.encode(subject.as_bytes()))
    }
}

/// Inserts CRLF so no line written through it exceeds [`MAX_LINE_LEN`]
struct LineWrapper<W> {
    inner: W,
    column: usize,
}

impl<W: Write> LineWrapper<W> {
    fn new(inner: W) -> Self {
        Self { inner, column: 0 }
    }
}

impl<W: Write> Write for LineWrapper<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut rest = buf;
        while !rest.is_empty() {
            // Break lazily so the output never ends with an empty line
            if self.column == MAX_LINE_LEN {
                self.inner.write_all(b"\r\n")?;
                self.column = 0;
            }
            let take = (MAX_LINE_LEN - self.column).min(rest.len());
            self.inner.write_all(&rest[..take])?;
            self.column += take;
            rest = &rest[take..];
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

use std::{borrow::Cow, error::Error};

/// Replaces line breaks so a value can't start a new header line
pub fn make_single_line(s: &str) -> Cow<'_, str> {
    if s.contains(['\r', '\n']) {
        Cow::Owned(s.replace("\r\n", " ").replace(['\r', '\n'], " "))
    } else {
        Cow::Borrowed(s)
    }
}

/// Formats an error followed by each of its sources, separated by ": "
pub fn error_chain(err: &dyn Error) -> String {
    let mut result = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        result.push_str(": ");
        result.push_str(&cause.to_string());
        source = cause.source();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MailError;

    #[test]
    fn no_linefeed() {
        let s = "Hello\nWorld!".to_string();
        assert!(s.contains('\n'));
        assert!(!make_single_line(&s).contains('\n'));
    }

    #[test]
    fn crlf_becomes_single_space() {
        let actual = make_single_line("Subject\r\nBcc: someone@example.com");
        assert_eq!(actual, "Subject Bcc: someone@example.com");
    }

    #[test]
    fn untouched_value_is_borrowed() {
        let actual = make_single_line("Plain subject");
        assert!(matches!(actual, Cow::Borrowed(_)));
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = MailError::Transmission("connection refused".into());
        assert_eq!(
            error_chain(&err),
            "Failed to transmit message: connection refused"
        );
    }
}

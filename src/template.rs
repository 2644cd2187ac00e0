//! Renders HTML email bodies from template files.
//!
//! Placeholders take the form `{{ Name }}` or `{{ .Name }}`. Every value is
//! HTML escaped before it is inserted. Anything else between `{{` and `}}`
//! is rejected rather than passed through to the recipient.

use std::{fs, path::Path, sync::OnceLock};

use log::debug;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::MailError;

pub type TemplateData = Map<String, Value>;

/// Reads the template at `path` and renders it with `data`
pub fn render_file(path: &Path, data: &TemplateData) -> Result<String, MailError> {
    debug!("Rendering template: {path:?}");
    let source = fs::read_to_string(path).map_err(|source| MailError::TemplateRead {
        path: path.to_path_buf(),
        source,
    })?;
    render(&source, data).map_err(|reason| MailError::TemplateRender {
        path: path.to_path_buf(),
        reason,
    })
}

fn render(source: &str, data: &TemplateData) -> Result<String, String> {
    static CELL_PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let re = CELL_PLACEHOLDER.get_or_init(|| {
        debug!("Compiling regex for template placeholders");
        Regex::new(r"\{\{\s*\.?([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("failed to compile regex")
    });

    // Checked on the source so values containing braces are not mistaken for actions
    let leftovers = re.replace_all(source, "");
    if let Some(start) = leftovers.find("{{") {
        let action: String = leftovers[start..].chars().take(40).collect();
        return Err(format!("unsupported template action starting at {action:?}"));
    }

    // Unlike Go's html/template a missing key fails instead of rendering as empty
    let mut missing = None;
    let rendered = re.replace_all(source, |captures: &Captures<'_>| {
        let key = &captures[1];
        match data.get(key) {
            Some(value) => escape_html(&value_to_text(value)),
            None => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });

    if let Some(key) = missing {
        return Err(format!("no value supplied for {key:?}"));
    }
    Ok(rendered.into_owned())
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&#34;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

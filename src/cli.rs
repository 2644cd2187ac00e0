use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use serde_json::Value;

use crate::{mail::Email, template::TemplateData};

#[derive(Parser, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default)]
#[command(
    author,
    version,
    about,
    long_about = "Renders an HTML email from a template and sends it, with attachments, over SMTP."
)]
pub struct Cli {
    /// Specify config file to use
    ///
    /// If not specified uses `config.json` in the current folder
    #[arg(long = "config", short, value_name = "PATH")]
    pub config_filename: Option<String>,

    /// HTML template used for the body of the email
    #[arg(long, short, value_name = "PATH")]
    pub template: PathBuf,

    /// JSON file containing an object with the values for the template
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Template value, overrides the same key from `--data`
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,

    /// Recipient, may be repeated
    #[arg(long, value_name = "ADDRESS", required = true)]
    pub to: Vec<String>,

    /// Carbon copy recipient, may be repeated
    #[arg(long, value_name = "ADDRESS")]
    pub cc: Vec<String>,

    /// Blind carbon copy recipient, may be repeated
    #[arg(long, value_name = "ADDRESS")]
    pub bcc: Vec<String>,

    /// Subject line, may contain non ASCII characters
    #[arg(long, short, default_value = "")]
    pub subject: String,

    /// File to attach, may be repeated
    #[arg(long = "attach", short, value_name = "PATH")]
    pub attachments: Vec<PathBuf>,

    /// Set logging level to use
    #[arg(long, short, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Cli {
    pub fn get_config_path(&self) -> PathBuf {
        match self.config_filename.as_ref() {
            Some(val) => PathBuf::from(val),
            None => PathBuf::from("config.json"),
        }
    }

    /// Values from `--data` with `--var` values layered on top
    pub fn template_data(&self) -> anyhow::Result<TemplateData> {
        let mut result = match self.data.as_ref() {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read template data from {path:?}"))?;
                match serde_json::from_str::<Value>(&contents)
                    .with_context(|| format!("Failed to parse template data in {path:?}"))?
                {
                    Value::Object(map) => map,
                    other => bail!("Template data in {path:?} must be a JSON object, found: {other}"),
                }
            }
            None => TemplateData::new(),
        };
        for (key, value) in &self.vars {
            result.insert(key.clone(), Value::String(value.clone()));
        }
        Ok(result)
    }

    /// Builds the email to send around an already rendered body
    pub fn to_email(&self, body: String) -> Email {
        Email {
            to: self.to.clone(),
            cc: self.cc.clone(),
            bcc: self.bcc.clone(),
            subject: self.subject.clone(),
            body,
            attachments: self.attachments.clone(),
        }
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE but got {s:?}")),
    }
}

/// Exists to provide better help messages variants copied from LevelFilter as
/// that's the type that is actually needed
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum LogLevel {
    /// Nothing emitted in this mode
    #[default]
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

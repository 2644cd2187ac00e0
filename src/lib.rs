mod cli;
mod config;
mod error;
pub mod logging;
pub mod mail;
pub mod retry;
pub mod template;
mod units;
mod utils;

use std::thread;

use anyhow::Context;
use log::info;

pub use cli::{Cli, LogLevel};
pub use config::{Config, SmtpSettings, TlsMode};
pub use error::MailError;
pub use units::Seconds;

use crate::{mail::Mailer, retry::RetryPolicy};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(&cli.get_config_path()).context("Failed to load config")?;

    let data = cli.template_data()?;
    let body = template::render_file(&cli.template, &data)
        .context("Failed to render email template")?;
    let email = cli.to_email(body);

    let mailer = Mailer::smtp(&config.smtp).context("Failed to set up mailer")?;
    let policy = RetryPolicy::default();
    retry::retry(&policy, thread::sleep, || mailer.send_email(&email))
        .context("Failed to send email")?;

    info!("Email sent successfully");
    Ok(())
}

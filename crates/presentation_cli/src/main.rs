//! WhatsApp relay CLI
//!
//! Test caller for a running relay, plus local phone normalization.

#![allow(clippy::print_stdout)]

mod caller;

use std::time::Duration;

use anyhow::bail;
use caller::{Reply, RelayCaller};
use clap::{Parser, Subcommand};
use domain::{NormalizationMode, PhoneNumber, SendRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Timeout for calls against the relay
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// WhatsApp relay CLI
#[derive(Debug, Parser)]
#[command(name = "wa-relay-cli")]
#[command(author, version, about = "WhatsApp relay test caller", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send a text message, or a PDF with the message as caption
    ///
    /// Example: wa-relay-cli send --phone 05397324662 --message "Your receipt"
    Send {
        /// Recipient phone number, any common format
        #[arg(long)]
        phone: String,

        /// Message text (caption when a PDF is attached)
        #[arg(long)]
        message: String,

        /// URL of a PDF to attach
        #[arg(long)]
        pdf_url: Option<String>,

        /// Send endpoint
        #[arg(long, env = "BOT_URL", default_value = "http://localhost:3001/send")]
        url: String,

        /// Shared secret sent as x-bot-secret
        #[arg(long, env = "BOT_SECRET", hide_env_values = true)]
        secret: String,
    },

    /// Check relay health
    Health {
        /// Relay base URL
        #[arg(short, long, default_value = "http://localhost:3001")]
        url: String,
    },

    /// Normalize a phone number locally
    Normalize {
        /// Phone number to normalize
        phone: String,

        /// Reject numbers that are not in canonical form
        #[arg(long)]
        strict: bool,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn print_reply(reply: &Reply) {
    println!("Status: {}", reply.status);
    println!("{}", reply.pretty_body());
}

fn normalize(phone: &str, strict: bool) -> anyhow::Result<String> {
    let mode = if strict {
        NormalizationMode::Strict
    } else {
        NormalizationMode::Lenient
    };
    Ok(PhoneNumber::normalize(phone, mode)?.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(
            cli.verbose,
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Send {
            phone,
            message,
            pdf_url,
            url,
            secret,
        } => {
            let mut request = SendRequest::new(phone, message);
            if let Some(pdf_url) = pdf_url {
                request = request.with_pdf_url(pdf_url);
            }

            let reply = RelayCaller::new(REQUEST_TIMEOUT)?
                .send(&url, &secret, &request)
                .await?;
            print_reply(&reply);
            if !reply.status.is_success() {
                bail!("send failed with status {}", reply.status);
            }
        },

        Commands::Health { url } => {
            let reply = RelayCaller::new(REQUEST_TIMEOUT)?.health(&url).await?;
            print_reply(&reply);
            if !reply.status.is_success() {
                bail!("relay unhealthy: {}", reply.status);
            }
        },

        Commands::Normalize { phone, strict } => {
            println!("{}", normalize(&phone, strict)?);
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn parses_send_with_all_flags() {
        let cli = parse(&[
            "wa-relay-cli",
            "send",
            "--phone",
            "05397324662",
            "--message",
            "Hi",
            "--pdf-url",
            "https://files.example/r.pdf",
            "--url",
            "http://relay:3001/send",
            "--secret",
            "s3cret",
        ])
        .unwrap();

        match cli.command {
            Commands::Send {
                phone,
                message,
                pdf_url,
                url,
                secret,
            } => {
                assert_eq!(phone, "05397324662");
                assert_eq!(message, "Hi");
                assert_eq!(pdf_url.as_deref(), Some("https://files.example/r.pdf"));
                assert_eq!(url, "http://relay:3001/send");
                assert_eq!(secret, "s3cret");
            },
            other => panic!("expected send, got {other:?}"),
        }
    }

    #[test]
    fn parses_health_default_url() {
        let cli = parse(&["wa-relay-cli", "health"]).unwrap();
        assert!(
            matches!(cli.command, Commands::Health { url } if url == "http://localhost:3001")
        );
    }

    #[test]
    fn parses_normalize_strict() {
        let cli = parse(&["wa-relay-cli", "normalize", "1234", "--strict"]).unwrap();
        assert!(
            matches!(cli.command, Commands::Normalize { phone, strict } if phone == "1234" && strict)
        );
    }

    #[test]
    fn send_requires_phone_and_message() {
        assert!(parse(&["wa-relay-cli", "send", "--message", "Hi", "--secret", "x"]).is_err());
        assert!(parse(&["wa-relay-cli", "send", "--phone", "1", "--secret", "x"]).is_err());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
        assert_eq!(log_filter_from_verbosity(2), "debug");
        assert_eq!(log_filter_from_verbosity(7), "trace");
    }

    #[test]
    fn normalizes_locally() {
        assert_eq!(normalize("+90 539 732 46 62", false).unwrap(), "905397324662");
        assert_eq!(normalize("1234", false).unwrap(), "1234");
        assert!(normalize("1234", true).is_err());
    }
}

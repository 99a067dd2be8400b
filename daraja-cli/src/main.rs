//! Command-line access to the Daraja tool registry.
//!
//! # Usage
//!
//! ```bash
//! # List the available tools with their input schemas
//! daraja tools
//!
//! # Call one tool with JSON arguments
//! daraja call daraja_stk_query --args '{"checkout_request_id": "ws_CO_123"}'
//!
//! # Configure logging level
//! RUST_LOG=debug daraja call daraja_generate_token
//! ```
//!
//! # Environment Variables
//!
//! A `.env` file in the working directory is loaded first, if present.
//!
//! - `DARAJA_CONSUMER_KEY`, `DARAJA_CONSUMER_SECRET` - OAuth credentials
//! - `DARAJA_BUSINESS_SHORT_CODE`, `DARAJA_PASS_KEY` - Business identity
//! - `DARAJA_ENVIRONMENT` - `sandbox` (default) or `production`
//! - `DARAJA_INITIATOR_NAME`, `DARAJA_INITIATOR_PASSWORD` - Initiator for
//!   disbursement, transfer, balance, status and reversal
//! - `DARAJA_SECURITY_CREDENTIAL` - Pre-encrypted initiator credential
//! - `RUST_LOG` - Log level filter (default: `info`)

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use daraja::{ClientConfig, DarajaClient, Environment};
use daraja_mcp::{CallToolParams, daraja_tools};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "daraja", version)]
#[command(about = "Call Safaricom Daraja (M-Pesa) operations from the command line")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// OAuth consumer key
    #[arg(long, env = "DARAJA_CONSUMER_KEY", hide_env_values = true)]
    consumer_key: String,

    /// OAuth consumer secret
    #[arg(long, env = "DARAJA_CONSUMER_SECRET", hide_env_values = true)]
    consumer_secret: String,

    /// Business short code (paybill or till)
    #[arg(long, env = "DARAJA_BUSINESS_SHORT_CODE")]
    business_short_code: String,

    /// Pass key used to sign push payments
    #[arg(long, env = "DARAJA_PASS_KEY", hide_env_values = true)]
    pass_key: String,

    /// Target environment
    #[arg(long, env = "DARAJA_ENVIRONMENT", default_value_t = Environment::Sandbox)]
    environment: Environment,

    /// Initiator user name
    #[arg(long, env = "DARAJA_INITIATOR_NAME")]
    initiator_name: Option<String>,

    /// Initiator password
    #[arg(long, env = "DARAJA_INITIATOR_PASSWORD", hide_env_values = true)]
    initiator_password: Option<String>,

    /// Pre-encrypted initiator security credential
    #[arg(long, env = "DARAJA_SECURITY_CREDENTIAL", hide_env_values = true)]
    security_credential: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "DARAJA_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
}

impl ConfigArgs {
    fn into_config(self) -> ClientConfig {
        let mut config = ClientConfig::new(
            self.consumer_key,
            self.consumer_secret,
            self.business_short_code,
            self.pass_key,
            self.environment,
        );
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        if let (Some(name), Some(password)) = (
            present(self.initiator_name),
            present(self.initiator_password),
        ) {
            config = config.with_initiator(name, password);
            if let Some(credential) = present(self.security_credential) {
                config = config.with_security_credential(credential);
            }
        }
        config
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every tool definition as JSON
    Tools,

    /// Invoke one tool and print its result as JSON
    Call {
        /// Tool name, e.g. `daraja_stk_push`
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            tracing::error!("daraja failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Runs one command. Returns `false` when a tool call reported an error.
async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let timeout = Duration::from_secs(cli.config.timeout_secs);
    let client = DarajaClient::try_new(cli.config.into_config())?.with_timeout(timeout);
    tracing::debug!(
        environment = %client.environment(),
        base_url = %client.base_url(),
        "Adapter ready"
    );
    let tools = daraja_tools(Arc::new(client));

    match cli.command {
        Command::Tools => {
            emit(&serde_json::to_value(tools.list_tools())?)?;
            Ok(true)
        }
        Command::Call { tool, args } => {
            let arguments: Map<String, Value> = serde_json::from_str(&args)
                .map_err(|e| format!("--args must be a JSON object: {e}"))?;
            let result = tools.call_tool(CallToolParams::new(tool, arguments)).await;
            emit(&result.structured_content.unwrap_or(Value::Null))?;
            Ok(!result.is_error)
        }
    }
}

fn emit(value: &Value) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: [&str; 9] = [
        "daraja",
        "--consumer-key",
        "key",
        "--consumer-secret",
        "secret",
        "--business-short-code",
        "174379",
        "--pass-key",
        "passkey",
    ];

    fn parse(extra: &[&str]) -> Cli {
        Cli::try_parse_from(BASE.iter().chain(extra)).unwrap()
    }

    #[test]
    fn test_initiator_requires_name_and_password() {
        let config = parse(&["--initiator-name", "testapi", "tools"])
            .config
            .into_config();
        assert!(config.initiator.is_none());

        let config = parse(&[
            "--initiator-name",
            "testapi",
            "--initiator-password",
            "Safaricom999!",
            "--security-credential",
            "ENCRYPTED",
            "tools",
        ])
        .config
        .into_config();
        let initiator = config.initiator.unwrap();
        assert_eq!(initiator.name, "testapi");
        assert_eq!(initiator.security_credential.as_deref(), Some("ENCRYPTED"));
    }

    #[test]
    fn test_environment_parses() {
        let cli = parse(&["--environment", "Production", "tools"]);
        assert_eq!(cli.config.environment, Environment::Production);
    }

    #[test]
    fn test_call_arguments_default_to_empty_object() {
        let Command::Call { tool, args } = parse(&["call", "daraja_generate_token"]).command else {
            panic!("expected call");
        };
        assert_eq!(tool, "daraja_generate_token");
        assert_eq!(args, "{}");
    }
}

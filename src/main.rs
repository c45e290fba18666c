//! Command-line front end for a single profile update.
//!
//! Configuration comes from the environment (a `.env` file is read if
//! present). The rendered page goes to stdout and logs go to stderr.
//!
//! ```bash
//! PROFILE_GUARD_DATABASE_URL=profiles.db \
//!     RUST_LOG=profile_guard=debug \
//!     profile-guard --init-schema --user-id bob --new-email bob@x.com
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use profile_guard::{
    HandlerConfig, ProfileUpdateHandler, RequestMeta, Tainted, WriterSink, ENV_DATABASE_URL,
};

const DEFAULT_LOG_FILTER: &str = "profile_guard=info";

#[derive(Debug, Parser)]
#[command(
    name = "profile-guard",
    version,
    about = "Store a profile update and render the user's records"
)]
struct Cli {
    /// Value of the `userId` request field.
    #[arg(long, default_value = "")]
    user_id: String,

    /// Value of the `newEmail` request field.
    #[arg(long, default_value = "")]
    new_email: String,

    /// Database path or `file:` URI. Overrides PROFILE_GUARD_DATABASE_URL.
    #[arg(long)]
    database: Option<String>,

    /// Create the `user_data` table before handling the request.
    #[arg(long)]
    init_schema: bool,

    /// Correlation id for log events. Generated when omitted.
    #[arg(long)]
    request_id: Option<String>,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<HandlerConfig, profile_guard::Error> {
    // Other settings still come from the environment when --database is set.
    let config = match &cli.database {
        Some(url) => HandlerConfig::from_lookup(|name| {
            if name == ENV_DATABASE_URL {
                Some(url.clone())
            } else {
                std::env::var(name).ok()
            }
        })?,
        None => HandlerConfig::from_env()?,
    };
    Ok(config)
}

fn run(cli: Cli) -> Result<bool, profile_guard::Error> {
    let config = load_config(&cli)?;
    let handler = ProfileUpdateHandler::from_config(&config);
    if cli.init_schema {
        handler.store().initialize()?;
    }

    let meta = match cli.request_id {
        Some(id) => RequestMeta::new(id),
        None => RequestMeta::generate(),
    };

    let stdout = io::stdout();
    let sink = WriterSink::new(stdout.lock());
    let status = handler.handle(
        &meta,
        Tainted::new(cli.user_id),
        Tainted::new(cli.new_email),
        &sink,
    );

    let mut out = sink.into_inner();
    // Terminate the page line; a closed stdout is already reflected in `status`.
    let _ = writeln!(out);

    tracing::debug!(request_id = %meta.request_id, ?status, "request finished");
    Ok(status.is_success())
}

fn main() -> ExitCode {
    // A missing .env file is normal.
    dotenvy::dotenv().ok();
    init_logging();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            let cause = std::error::Error::source(&error)
                .map(ToString::to_string)
                .unwrap_or_default();
            tracing::error!(error = %error, cause = %cause, "startup failed");
            ExitCode::FAILURE
        }
    }
}

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcriptor::transcribe::{GroqFactory, TranscriberFactory};
use transcriptor::{dispatch, output, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout carries the JSON document, logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transcriptor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let stdin = io::stdin();
    let input = if stdin.is_terminal() { None } else { Some(stdin) };

    let outcome = dispatch(std::env::args_os(), input, Config::load, |config: &Config| {
        Box::new(GroqFactory::new(&config.provider)) as Box<dyn TranscriberFactory>
    })
    .await;

    if let Err(e) = output::emit(&mut io::stdout().lock(), &outcome.document) {
        tracing::error!(error = %e, "Failed to write result to stdout");
        return ExitCode::FAILURE;
    }

    outcome.exit_code()
}

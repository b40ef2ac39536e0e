// # loopia-plugind - Loopia plugin process
//
// This is a THIN integration layer only. All provider, adapter and API
// logic lives in loopia-core and loopia-xmlrpc.
//
// The plugin process is responsible for:
// 1. Reading process configuration from environment variables
// 2. Installing the log subscriber (stderr; stdout carries responses)
// 3. Wiring the XML-RPC client factory into the provider
// 4. Serving host requests, one JSON object per line, strictly in order
//
// ## Configuration
//
// - `LOOPIA_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
// - `LOOPIA_USERNAME`, `LOOPIA_PASSWORD`, `LOOPIA_ENDPOINT`: fallbacks for
//   the provider block, read and validated when the host sends
//   `configure_provider`
//
// ## Example
//
// ```bash
// export LOOPIA_USERNAME=user@loopiaapi
// export LOOPIA_PASSWORD=secret
//
// echo '{"method":"get_provider_schema"}' | loopia-plugind
// ```

use anyhow::Result;
use loopia_core::{Diagnostics, LoopiaProvider, PluginServer, Request, Response};
use std::env;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Environment variable selecting the log level
const LOG_LEVEL_ENV: &str = "LOOPIA_LOG_LEVEL";

/// Exit codes for different termination scenarios
///
/// - 0: Clean shutdown (stdin closed or signal received)
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum PluginExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<PluginExitCode> for ExitCode {
    fn from(code: PluginExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Process configuration
struct Config {
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            log_level: env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.level().map(|_| ())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "{LOG_LEVEL_ENV} '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {e}");
        return PluginExitCode::ConfigError.into();
    }

    let log_level = config.level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return PluginExitCode::ConfigError.into();
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting loopia-plugind");

    // Requests are handled strictly one at a time.
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {e}");
            return PluginExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run_plugin().await {
            Ok(()) => PluginExitCode::CleanShutdown,
            Err(e) => {
                error!("Plugin error: {e}");
                PluginExitCode::RuntimeError
            }
        }
    })
    .into()
}

#[cfg(feature = "xmlrpc")]
fn build_provider() -> Result<LoopiaProvider> {
    use std::sync::Arc;

    Ok(LoopiaProvider::with_builtin_adapters(
        env!("CARGO_PKG_VERSION"),
        Arc::new(loopia_xmlrpc::XmlRpcClientFactory),
    ))
}

#[cfg(not(feature = "xmlrpc"))]
fn build_provider() -> Result<LoopiaProvider> {
    anyhow::bail!("built without a Loopia API client; enable the `xmlrpc` feature")
}

/// Serve requests until stdin closes or a shutdown signal arrives
async fn run_plugin() -> Result<()> {
    let mut server = PluginServer::new(build_provider()?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            received = &mut shutdown => {
                info!("Received shutdown signal: {}", received?);
                return Ok(());
            }
        };

        let Some(line) = line else {
            info!("Host closed stdin, shutting down");
            return Ok(());
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(&mut server, &line).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
    }
}

/// Decode one request line and dispatch it
async fn handle_line(server: &mut PluginServer, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => server.handle(request).await,
        Err(e) => {
            debug!("Rejecting malformed request: {e}");
            Response {
                diagnostics: Diagnostics::error(
                    "Invalid Request",
                    format!("The plugin could not decode the request: {e}"),
                ),
                ..Response::default()
            }
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {e}"))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {e}"))?;

    tokio::select! {
        _ = sigterm.recv() => Ok("SIGTERM"),
        _ = sigint.recv() => Ok("SIGINT"),
    }
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {e}"))?;
    Ok("SIGINT")
}

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::cli::{parse_cli_args, resolve_run_config, usage_text, version_text, CliCommand, RunArgs};
use crate::config::{self, env_var};
use crate::monitor::{Monitor, StopSignal};
use crate::network::list_interfaces;
use crate::notify::SlackNotifier;

/// Run the app by parsing CLI-style args and dispatching the command.
pub async fn run<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let command = parse_cli_args(args)?;
    execute_command(command).await
}

/// Execute a pre-parsed command.
pub async fn execute_command(command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Help => {
            println!("{}", usage_text());
            Ok(())
        }
        CliCommand::Version => {
            println!("{}", version_text());
            Ok(())
        }
        CliCommand::Interfaces => handle_interfaces(),
        CliCommand::Run(args) => handle_run(args).await,
    }
}

fn handle_interfaces() -> Result<()> {
    let interfaces = list_interfaces();
    if interfaces.is_empty() {
        println!("No network interfaces found.");
        return Ok(());
    }

    for iface in interfaces {
        let mut flags = Vec::new();
        if iface.is_up {
            flags.push("up");
        }
        if iface.is_loopback {
            flags.push("loopback");
        }
        println!(
            "{:<16} {:<20} {}",
            iface.name,
            iface.network.as_deref().unwrap_or("-"),
            flags.join(",")
        );
    }
    Ok(())
}

async fn handle_run(args: RunArgs) -> Result<()> {
    let (monitor_config, token) = resolve_run_config(&args, env_var)?;

    let notifier = SlackNotifier::new(
        token,
        &config::slack_api_url(),
        monitor_config.notify_timeout,
    )
    .context("Failed to build Slack client")?;

    crate::log_stderr!(
        "Posting to {} when {} asks for an address",
        monitor_config.channel,
        monitor_config.target_mac
    );
    let handle = Monitor::new(monitor_config, Arc::new(notifier)).start()?;

    let signals = tokio::spawn(wait_for_shutdown(handle.stop_signal()));

    let report = handle.join().await;
    signals.abort();

    crate::log_debug!(
        "Run summary: {}",
        serde_json::to_string(&report).context("Failed to serialize run summary")?
    );
    eprintln!("done.");
    Ok(())
}

/// Fires `stop` on SIGINT, SIGTERM or SIGQUIT (Ctrl+C elsewhere)
async fn wait_for_shutdown(stop: StopSignal) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let streams = (
            signal(SignalKind::interrupt()),
            signal(SignalKind::terminate()),
            signal(SignalKind::quit()),
        );
        match streams {
            (Ok(mut int), Ok(mut term), Ok(mut quit)) => {
                tokio::select! {
                    _ = int.recv() => {}
                    _ = term.recv() => {}
                    _ = quit.recv() => {}
                    _ = stop.cancelled() => return,
                }
            }
            _ => {
                crate::log_warn!("Failed to install signal handlers; falling back to Ctrl+C");
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = stop.cancelled() => return,
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = stop.cancelled() => return,
        }
    }

    eprint!("Stopping...");
    stop.stop();
}

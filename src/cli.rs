use anyhow::Result;
use std::time::Duration;

use crate::config::{
    self, parse_mac, MonitorConfig, DASH_ADDR_ENV, DEFAULT_DEBOUNCE_INTERVAL, TOKEN_ENV,
};
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunArgs {
    pub interface: String,
    pub channel: String,
    pub message: String,
    pub token: Option<String>,
    pub dash_addr: Option<String>,
    pub interval_ms: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CliCommand {
    Run(RunArgs),
    Interfaces,
    Help,
    Version,
}

pub fn version_text() -> String {
    format!("dashwatch {}", env!("CARGO_PKG_VERSION"))
}

pub fn usage_text() -> String {
    format!(
        "{version}
Posts a Slack message whenever a Dash-style button sends an ARP request.

Usage:
  dashwatch [run] [OPTIONS] [--] <INTERFACE> <CHANNEL> <MESSAGE>
  dashwatch interfaces
  dashwatch --help
  dashwatch --version

Options:
      --token <TOKEN>      Slack API token (default: ${token_env})
      --dash-addr <MAC>    Button hardware address, aa:bb:cc:dd:ee:ff (default: ${addr_env})
      --interval-ms <N>    Minimum gap between notifications (default: {interval} ms)
  -h, --help               Show this help text
  -V, --version            Show version",
        version = version_text(),
        token_env = TOKEN_ENV,
        addr_env = DASH_ADDR_ENV,
        interval = DEFAULT_DEBOUNCE_INTERVAL.as_millis()
    )
}

fn parse_u64_arg(flag: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>().ok().filter(|v| *v > 0).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid value for {}: '{}'. Expected a positive integer.\n\n{}",
            flag,
            raw,
            usage_text()
        )
    })
}

/// Splits `--flag=value` / `-flag=value` into the bare flag name and value
fn split_flag(arg: &str) -> (&str, Option<&str>) {
    let trimmed = arg.trim_start_matches('-');
    match trimmed.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (trimmed, None),
    }
}

pub fn parse_cli_args<I, S>(args: I) -> Result<CliCommand>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut iter = args.into_iter();
    let _program_name = iter.next();

    let mut command: Option<&'static str> = None;
    let mut positionals: Vec<String> = Vec::new();
    let mut run = RunArgs::default();
    // Flags end at `--` or the first positional
    let mut flags_done = false;

    while let Some(arg) = iter.next() {
        let arg = arg.as_ref();

        if !flags_done && arg == "--" {
            flags_done = true;
            continue;
        }

        if flags_done || !arg.starts_with('-') || arg == "-" {
            if !flags_done && command.is_none() {
                match arg {
                    "run" => {
                        command = Some("run");
                        continue;
                    }
                    "interfaces" => {
                        command = Some("interfaces");
                        continue;
                    }
                    _ => {}
                }
            }
            flags_done = true;
            positionals.push(arg.to_string());
            continue;
        }

        let (name, inline) = split_flag(arg);
        match name {
            "h" | "help" => return Ok(CliCommand::Help),
            "V" | "version" => return Ok(CliCommand::Version),
            "token" | "dash-addr" | "interval-ms" => {
                let value = match inline {
                    Some(v) => v.to_string(),
                    None => iter
                        .next()
                        .map(|v| v.as_ref().to_string())
                        .ok_or_else(|| {
                            anyhow::anyhow!("Missing value for --{}.\n\n{}", name, usage_text())
                        })?,
                };
                if value.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Missing value for --{}.\n\n{}",
                        name,
                        usage_text()
                    ));
                }
                match name {
                    "token" => run.token = Some(value),
                    "dash-addr" => run.dash_addr = Some(value),
                    _ => run.interval_ms = Some(parse_u64_arg("--interval-ms", &value)?),
                }
            }
            _ => {
                return Err(anyhow::anyhow!(
                    "Unknown argument: {arg}\n\n{}",
                    usage_text()
                ));
            }
        }
    }

    if command == Some("interfaces") {
        if !positionals.is_empty()
            || run.token.is_some()
            || run.dash_addr.is_some()
            || run.interval_ms.is_some()
        {
            return Err(anyhow::anyhow!(
                "interfaces takes no arguments.\n\n{}",
                usage_text()
            ));
        }
        return Ok(CliCommand::Interfaces);
    }

    if positionals.len() != 3 {
        return Err(anyhow::anyhow!(
            "Expected <INTERFACE> <CHANNEL> <MESSAGE>, got {} positional argument(s).\n\n{}",
            positionals.len(),
            usage_text()
        ));
    }

    let mut positionals = positionals.into_iter();
    run.interface = positionals.next().unwrap_or_default();
    run.channel = positionals.next().unwrap_or_default();
    run.message = positionals.next().unwrap_or_default();

    Ok(CliCommand::Run(run))
}

/// Builds the monitor config and API token, falling back to `env` for the
/// token and button address
pub fn resolve_run_config<F>(args: &RunArgs, env: F) -> Result<(MonitorConfig, String), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let token = args
        .token
        .clone()
        .or_else(|| env(TOKEN_ENV))
        .filter(|t| !t.trim().is_empty())
        .ok_or(ConfigError::MissingArgument("token"))?;

    let raw_addr = args
        .dash_addr
        .clone()
        .or_else(|| env(DASH_ADDR_ENV))
        .filter(|a| !a.trim().is_empty())
        .ok_or(ConfigError::MissingArgument("dash-addr"))?;
    let target_mac = parse_mac(&raw_addr)?;

    let debounce = match args.interval_ms {
        Some(ms) => Duration::from_millis(ms),
        None => config::debounce_interval(),
    };

    let monitor_config = MonitorConfig::new(
        args.interface.clone(),
        target_mac,
        args.channel.clone(),
        args.message.clone(),
    )
    .with_debounce_interval(debounce)
    .with_notify_timeout(config::notify_timeout())
    .with_poll_interval(config::poll_interval());

    monitor_config.validate()?;
    Ok((monitor_config, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnet::util::MacAddr;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn run_args() -> RunArgs {
        RunArgs {
            interface: "eth0".to_string(),
            channel: "#dash".to_string(),
            message: "Ordering detergent...".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn parse_help_flag() {
        let parsed = parse_cli_args(["dashwatch", "--help"]).expect("help should parse");
        assert_eq!(parsed, CliCommand::Help);
    }

    #[test]
    fn parse_version_flag() {
        let parsed = parse_cli_args(["dashwatch", "-V"]).expect("version should parse");
        assert_eq!(parsed, CliCommand::Version);
    }

    #[test]
    fn parse_positional_run() {
        let parsed = parse_cli_args(["dashwatch", "eth0", "#dash", "Ordering detergent..."])
            .expect("positional run should parse");
        assert_eq!(parsed, CliCommand::Run(run_args()));
    }

    #[test]
    fn parse_run_with_flags_in_both_styles() {
        let parsed = parse_cli_args([
            "dashwatch",
            "run",
            "-token",
            "xoxb-1",
            "--dash-addr=b4:79:a7:00:00:01",
            "--interval-ms",
            "2500",
            "eth0",
            "#dash",
            "Ordering detergent...",
        ])
        .expect("flags should parse");

        let mut expected = run_args();
        expected.token = Some("xoxb-1".to_string());
        expected.dash_addr = Some("b4:79:a7:00:00:01".to_string());
        expected.interval_ms = Some(2500);
        assert_eq!(parsed, CliCommand::Run(expected));
    }

    #[test]
    fn interface_named_like_a_command_after_first_positional() {
        let parsed = parse_cli_args(["dashwatch", "run", "interfaces", "#c", "m"])
            .expect("later positionals are literal");
        match parsed {
            CliCommand::Run(args) => assert_eq!(args.interface, "interfaces"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn arguments_after_first_positional_are_literal() {
        let parsed = parse_cli_args(["dashwatch", "eth0", "#dash", "--token"])
            .expect("message may start with a dash");
        match parsed {
            CliCommand::Run(args) => {
                assert_eq!(args.message, "--token");
                assert_eq!(args.token, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn double_dash_ends_flags() {
        let parsed = parse_cli_args([
            "dashwatch", "--token", "xoxb-1", "--", "-eth0", "#dash", "-1 detergent",
        ])
        .expect("should parse");
        match parsed {
            CliCommand::Run(args) => {
                assert_eq!(args.token.as_deref(), Some("xoxb-1"));
                assert_eq!(args.interface, "-eth0");
                assert_eq!(args.message, "-1 detergent");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_interfaces_command() {
        let parsed = parse_cli_args(["dashwatch", "interfaces"]).expect("should parse");
        assert_eq!(parsed, CliCommand::Interfaces);
    }

    #[test]
    fn interfaces_rejects_extra_arguments() {
        let err = parse_cli_args(["dashwatch", "interfaces", "eth0"]).expect_err("extra arg");
        assert!(err.to_string().contains("interfaces takes no arguments"));
    }

    #[test]
    fn missing_positionals_error() {
        let err = parse_cli_args(["dashwatch", "eth0", "#dash"]).expect_err("two positionals");
        assert!(err.to_string().contains("Expected <INTERFACE> <CHANNEL> <MESSAGE>"));
    }

    #[test]
    fn missing_flag_value_errors() {
        let err = parse_cli_args(["dashwatch", "--token"]).expect_err("no value");
        assert!(err.to_string().contains("Missing value for --token"));
    }

    #[test]
    fn invalid_interval_errors() {
        let err = parse_cli_args(["dashwatch", "--interval-ms", "0", "a", "b", "c"])
            .expect_err("zero interval");
        assert!(err.to_string().contains("Expected a positive integer"));
    }

    #[test]
    fn unknown_argument_errors() {
        let err = parse_cli_args(["dashwatch", "--bogus"]).expect_err("unknown flag");
        assert!(err.to_string().contains("Unknown argument"));
    }

    #[test]
    fn resolve_uses_env_fallbacks() {
        let env = |name: &str| match name {
            TOKEN_ENV => Some("xoxb-env".to_string()),
            DASH_ADDR_ENV => Some("b4:79:a7:00:00:01".to_string()),
            _ => None,
        };
        let mut args = run_args();
        args.interval_ms = Some(5000);

        let (config, token) = resolve_run_config(&args, env).expect("should resolve");
        assert_eq!(token, "xoxb-env");
        assert_eq!(config.target_mac, MacAddr::new(0xb4, 0x79, 0xa7, 0, 0, 1));
        assert_eq!(config.channel, "#dash");
        assert_eq!(config.debounce_interval, Duration::from_secs(5));
    }

    #[test]
    fn flags_take_precedence_over_env() {
        let env = |_: &str| Some("xoxb-env".to_string());
        let mut args = run_args();
        args.token = Some("xoxb-flag".to_string());
        args.dash_addr = Some("00:11:22:33:44:55".to_string());

        let (config, token) = resolve_run_config(&args, env).expect("should resolve");
        assert_eq!(token, "xoxb-flag");
        assert_eq!(config.target_mac, MacAddr::new(0, 0x11, 0x22, 0x33, 0x44, 0x55));
    }

    #[test]
    fn resolve_rejects_missing_token_and_bad_mac() {
        let mut args = run_args();
        args.dash_addr = Some("b4:79:a7:00:00:01".to_string());
        assert!(matches!(
            resolve_run_config(&args, no_env),
            Err(ConfigError::MissingArgument("token"))
        ));

        args.token = Some("xoxb".to_string());
        args.dash_addr = Some("b4:79:a7".to_string());
        assert!(matches!(
            resolve_run_config(&args, no_env),
            Err(ConfigError::InvalidMac(_))
        ));
    }
}

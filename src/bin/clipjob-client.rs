use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::io;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipjob_client::poller::COMPLETE_STATUS;
use clipjob_client::render::COMPILING_STATUS;
use clipjob_client::submitter::parse_form_field;
use clipjob_client::{
    ClipJobClient, DownloadForm, DownloadOutcome, PollConfig, PollErrorPolicy, PollOutcome,
    Poller, RenderFormat, TerminalDisplay, DEFAULT_SERVER_ADDR,
};

const EXIT_CANCELLED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipjob_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let matches = cli().get_matches();

    let server_addr = matches
        .get_one::<url::Url>("server-addr")
        .expect("server-addr has a default value");
    let client = ClipJobClient::new_for_server(server_addr.as_str())?;
    let mut display = TerminalDisplay::new(io::stdout());

    let poller = Poller::new(poll_config(&matches));
    if let Some(secs) = matches.get_one::<u64>("timeout-secs").copied() {
        let cancel = poller.cancel_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::warn!(timeout_secs = secs, "giving up on the job");
            cancel.cancel();
        });
    }

    let status = if let Some(matches) = matches.subcommand_matches("start") {
        let form = download_form(matches);
        download_exit_status(&client.download(&form, &poller, &mut display).await)
    } else if matches.subcommand_matches("watch").is_some() {
        poll_exit_status(&poller.spawn(client, display).join().await?)
    } else {
        unreachable!("subcommand is required");
    };
    Ok(ExitCode::from(status))
}

fn cli() -> Command {
    Command::new("clipjob-client")
        .arg(
            Arg::new("server-addr")
                .long("server-addr")
                .required(false)
                .default_value(DEFAULT_SERVER_ADDR)
                .value_parser(value_parser!(url::Url)),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .default_value("1000")
                .value_parser(value_parser!(u64)),
        )
        // Added to the defaults, never replacing them.
        .arg(
            Arg::new("terminal-status")
                .long("terminal-status")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("status-only")
                .long("status-only")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("on-poll-error")
                .long("on-poll-error")
                .default_value("stop")
                .value_parser(["stop", "retry"]),
        )
        .arg(
            Arg::new("max-poll-retries")
                .long("max-poll-retries")
                .default_value("3")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("timeout-secs")
                .long("timeout-secs")
                .required(false)
                .value_parser(value_parser!(u64)),
        )
        .arg_required_else_help(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("start")
                .arg(
                    Arg::new("field")
                        .long("field")
                        .action(ArgAction::Append)
                        .value_parser(parse_form_field),
                )
                .arg(Arg::new("streamer").long("streamer"))
                .arg(Arg::new("period").long("period")),
        )
        .subcommand(Command::new("watch"))
}

fn download_form(matches: &ArgMatches) -> DownloadForm {
    let mut form: DownloadForm = matches
        .get_many::<(String, String)>("field")
        .unwrap_or_default()
        .cloned()
        .collect();
    for name in ["streamer", "period"] {
        if let Some(value) = matches.get_one::<String>(name) {
            form.push(name, value.clone());
        }
    }
    form
}

fn poll_config(matches: &ArgMatches) -> PollConfig {
    let with_default = |id: &str, default: &str| -> Vec<String> {
        let mut values = vec![default.to_string()];
        for value in matches.get_many::<String>(id).unwrap_or_default() {
            if !values.contains(value) {
                values.push(value.clone());
            }
        }
        values
    };
    let on_error = match matches.get_one::<String>("on-poll-error").map(String::as_str) {
        Some("retry") => PollErrorPolicy::Retry {
            max_consecutive: *matches
                .get_one::<u32>("max-poll-retries")
                .expect("max-poll-retries has a default value"),
        },
        _ => PollErrorPolicy::Stop,
    };
    PollConfig {
        interval: Duration::from_millis(
            *matches
                .get_one::<u64>("interval-ms")
                .expect("interval-ms has a default value"),
        ),
        terminal_statuses: with_default("terminal-status", COMPLETE_STATUS),
        format: RenderFormat {
            status_only: with_default("status-only", COMPILING_STATUS),
        },
        on_error,
    }
}

fn poll_exit_status(outcome: &PollOutcome) -> u8 {
    match outcome {
        PollOutcome::Completed(_) => 0,
        PollOutcome::Failed(_) => 1,
        PollOutcome::Cancelled => EXIT_CANCELLED,
    }
}

fn download_exit_status(outcome: &DownloadOutcome) -> u8 {
    match outcome {
        DownloadOutcome::Polled(outcome) => poll_exit_status(outcome),
        DownloadOutcome::Rejected { .. } | DownloadOutcome::SubmitFailed(_) => 1,
    }
}

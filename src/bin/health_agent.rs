//! health-agent: interactive health-metrics assistant on the terminal.
//!
//! Usage:
//!   health-agent [--session <id>] [--config <path.yaml>]
//!
//! Lines typed at the prompt are sent as user messages. `/reset` clears the
//! session transcript, `/exit` (or EOF) quits.

use anyhow::Context;
use health_metrics_agent::prompt::WELCOME_MESSAGE;
use health_metrics_agent::{AgentBuilder, AgentConfig, ConversationLoop};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

struct CliArgs {
    session: Option<String>,
    config: Option<PathBuf>,
}

fn print_usage() {
    println!(
        r#"health-agent: conversational BMI / BMR / TDEE assistant

USAGE:
    health-agent [OPTIONS]

OPTIONS:
    --session <id>        Resume (or start) the named session
    --config <path>       Load agent settings from a YAML file
    --help                Show this help message

COMMANDS (at the prompt):
    /reset                Forget the current conversation
    /exit                 Quit

ENVIRONMENT:
    GOOGLE_API_KEY        API key for the gemini provider
    OPENAI_API_KEY        API key for the openai provider
    HEALTH_AGENT_*        Overrides for any config field
    RUST_LOG              Log filter (default: info)"#
    );
}

fn parse_args(args: &[String]) -> anyhow::Result<Option<CliArgs>> {
    let mut parsed = CliArgs {
        session: None,
        config: None,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--session" => {
                let id = iter.next().context("--session requires a value")?;
                parsed.session = Some(id.clone());
            }
            "--config" => {
                let path = iter.next().context("--config requires a value")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--help" | "-h" => return Ok(None),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(Some(parsed))
}

async fn turn(agent: &ConversationLoop, session: &str, input: &str) -> anyhow::Result<String> {
    let state = agent.run_session(session, input).await?;
    Ok(state.final_answer().unwrap_or_default().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(cli) = parse_args(&args)? else {
        print_usage();
        return Ok(());
    };

    let config = match &cli.config {
        Some(path) => AgentConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AgentConfig::from_env()?,
    };
    let agent = AgentBuilder::new()
        .config(config)
        .build()
        .context("building the agent")?;

    let session = cli
        .session
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!(%session, "session started");

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{WELCOME_MESSAGE}\n\n").as_bytes())
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        match input {
            "" => continue,
            "/exit" | "/quit" => break,
            "/reset" => {
                agent.reset_session(&session).await?;
                stdout.write_all(b"(conversation cleared)\n").await?;
                continue;
            }
            _ => {}
        }

        match turn(&agent, &session, input).await {
            Ok(answer) => stdout.write_all(format!("\n{answer}\n\n").as_bytes()).await?,
            // The session checkpoint is untouched on failure.
            Err(err) => eprintln!("error: {err:#}"),
        }
    }

    Ok(())
}

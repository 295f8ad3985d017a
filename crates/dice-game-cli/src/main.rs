//! Dice Game console driver
//!
//! Parses the dice from the command line, then feeds stdin to the game
//! session one line at a time.

use clap::Parser;
use dice_game_core::dice::{MIN_DICE, MIN_FACES};
use dice_game_core::{ConfigError, DieSet, Line, Output, Session, SessionConfig};
use std::io::{self, BufRead, Write};
use std::num::NonZeroU32;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE_EXAMPLE: &str = "Example: dice-game 2,2,4,4,9,9 6,8,1,1,8,6 7,5,3,7,5,3";

/// Generalized non-transitive dice with provably fair rolls
#[derive(Parser, Debug)]
#[command(name = "dice-game", version, after_help = USAGE_EXAMPLE)]
struct Cli {
    /// Die faces as a comma-separated list of non-negative integers; at least
    /// three dice with at least six faces each
    #[arg(value_name = "DIE")]
    dice: Vec<String>,

    /// Stop after this many rounds instead of playing until `X`
    #[arg(long, env = "DICE_ROUNDS")]
    rounds: Option<NonZeroU32>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return report_usage(&e),
    };

    // Logs go to stderr so they never mix with the game on stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {}", e);
    }

    let dice = match DieSet::parse(&cli.dice) {
        Ok(dice) => dice,
        Err(e) => {
            error!(error = %e, "invalid dice configuration");
            for line in config_report(&e) {
                eprintln!("{}", line);
            }
            return ExitCode::FAILURE;
        }
    };
    info!(dice = dice.len(), rounds = ?cli.rounds, "starting session");

    let session = Session::new(
        dice,
        SessionConfig {
            max_rounds: cli.rounds,
        },
    );
    match run(session) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "console I/O failed");
            ExitCode::FAILURE
        }
    }
}

/// Print a clap error or help text. Help and version exit 0, usage errors 1.
///
/// Runs before the log subscriber exists, so a failed print goes to stderr
/// directly.
fn report_usage(e: &clap::Error) -> ExitCode {
    if let Err(io_err) = e.print() {
        eprintln!("failed to print usage: {}", io_err);
    }
    if e.use_stderr() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Lines shown on stderr when the dice cannot be loaded
fn config_report(e: &ConfigError) -> Vec<String> {
    vec![
        format!("Error: {}", e),
        format!(
            "Provide at least {} dice, each a comma-separated list of at least {} non-negative integers.",
            MIN_DICE, MIN_FACES
        ),
        USAGE_EXAMPLE.to_string(),
    ]
}

fn run(mut session: Session) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();

    render(&session.start(), &mut stdout, &mut stderr)?;
    for line in stdin.lock().lines() {
        let out = session.handle_line(&line?);
        render(&out, &mut stdout, &mut stderr)?;
        if out.is_exit() {
            return Ok(());
        }
    }
    info!("input closed");
    Ok(())
}

fn render(out: &Output, stdout: &mut impl Write, stderr: &mut impl Write) -> io::Result<()> {
    for line in &out.lines {
        match line {
            Line::Out(text) => writeln!(stdout, "{}", text)?,
            Line::Err(text) => writeln!(stderr, "{}", text)?,
        }
    }
    stdout.flush()?;
    stderr.flush()
}

use clap::{Parser, Subcommand, builder::styling};
use esports_sync::{cli, jobs::JobName, jobs::RunState, records::Domain};
use eyre::{Context, Result};
use owo_colors::OwoColorize;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Esports sync: keeps match, event and ranking data in step with an uncooperative upstream
#[derive(Parser)]
#[command(name = "esync", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source configuration from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync job and print its report as JSON
    Run {
        /// Job to run
        #[arg(value_enum)]
        job: JobName,
    },

    /// List the available jobs
    Jobs,

    /// Acquire and extract one document without storing it
    Fetch {
        /// Data domain to fetch
        #[arg(value_enum)]
        domain: Domain,

        /// Identifier(s) of the entity; listings take none
        ids: Vec<String>,
    },

    /// Show the most recent job runs
    Runs {
        /// Number of runs to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dotenv = dotenvy::from_filename(&cli.env);

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    match dotenv {
        Ok(path) => log::debug!("Sourced {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No {} file, using process environment", cli.env),
        Err(e) => return Err(e).with_context(|| format!("Failed to source {}", cli.env)),
    }

    match cli.command {
        Commands::Run { job } => {
            let config = cli::load_config()?;
            match cli::run_named_job(&config, job).await? {
                Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                Err(failed) => {
                    println!("{}", serde_json::to_string_pretty(&failed.report)?);
                    return Err(failed.cause).with_context(|| format!("Job {} failed", job));
                }
            }
        }
        Commands::Jobs => {
            for job in JobName::ALL {
                println!("{:<14} {}", job.as_str().green(), job.description());
            }
        }
        Commands::Fetch { domain, ids } => {
            let config = cli::load_config()?;
            let records = cli::fetch_records(&config, domain, &ids).await?;
            log::info!("Extracted {} {} record(s)", records.len(), domain.cyan());
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Runs { limit } => {
            let config = cli::load_config()?;
            for run in cli::recent_runs(&config, limit)? {
                let state = match run.state {
                    RunState::Succeeded => run.state.green().to_string(),
                    RunState::Failed => run.state.red().to_string(),
                    RunState::Running => run.state.yellow().to_string(),
                };
                println!(
                    "{} {:<14} {:<9} {:>5} {}",
                    run.started_at.format("%Y-%m-%d %H:%M:%S").bright_black(),
                    run.name,
                    state,
                    run.items,
                    run.error.as_deref().unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

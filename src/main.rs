use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use orgdash::cli::{self, Context, OutputFormat};
use orgdash::config;

#[derive(Debug, Parser)]
#[command(name = "orgdash")]
#[command(about = "Employer wellness analytics dashboard")]
struct App {
    /// Show raw error details regardless of environment
    #[arg(long, global = true)]
    details: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in with organization credentials
    Login {
        email: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the current session and access flags
    Whoami {
        /// Output format: table (default), json
        #[arg(long)]
        format: Option<String>,
    },
    /// Headcount, engagement and risk mix
    Overview {
        /// Output format: table (default), json
        #[arg(long)]
        format: Option<String>,
    },
    /// Aggregated BMI, blood pressure and diabetes risk
    PopulationHealth {
        /// Output format: table (default), json
        #[arg(long)]
        format: Option<String>,
    },
    /// Login trends, active users, appointments and inactivity
    Engagement {
        /// Output format: table (default), json
        #[arg(long)]
        format: Option<String>,
    },
    /// Employee roster
    Employees {
        #[arg(long, default_value = "1")]
        page: u32,
        /// Output format: table (default), json
        #[arg(long)]
        format: Option<String>,
    },
    /// Generated report history
    Reports {
        #[arg(long, default_value = "1")]
        page: u32,
        /// Output format: table (default), json
        #[arg(long)]
        format: Option<String>,
    },
    /// Check that the backend endpoints respond
    Probe {
        /// Output format: table (default), json
        #[arg(long)]
        format: Option<String>,
    },
    /// Summarize the local request log
    Activity {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config to ~/.orgdash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a single value, e.g. `api.base_url https://…/api/org`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> ExitCode {
    let app = App::parse();

    match dispatch(app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is::<cli::Reported>() => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn dispatch(app: App) -> Result<()> {
    let details = app.details;
    let open = || Context::open(config::load(), details);

    match app.command {
        Commands::Login { email, password } => cli::run_login(&mut open()?, &email, password),
        Commands::Logout => cli::run_logout(&mut open()?),
        Commands::Whoami { format } => {
            let ctx = open()?;
            cli::run_whoami(&ctx, ctx.format(format.as_deref()))
        }
        Commands::Overview { format } => {
            let ctx = open()?;
            cli::run_overview(&ctx, ctx.format(format.as_deref()))
        }
        Commands::PopulationHealth { format } => {
            let ctx = open()?;
            cli::run_population_health(&ctx, ctx.format(format.as_deref()))
        }
        Commands::Engagement { format } => {
            let ctx = open()?;
            cli::run_engagement(&ctx, ctx.format(format.as_deref()))
        }
        Commands::Employees { page, format } => {
            let ctx = open()?;
            cli::run_employees(&ctx, page, ctx.format(format.as_deref()))
        }
        Commands::Reports { page, format } => {
            let ctx = open()?;
            cli::run_reports(&ctx, page, ctx.format(format.as_deref()))
        }
        Commands::Probe { format } => {
            let ctx = open()?;
            cli::run_probe(&ctx, ctx.format(format.as_deref()))
        }
        Commands::Activity { format, days } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_activity(&config::load(), fmt, days)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shift_roster::config::GeneratorConfig;
use shift_roster::generator::ScheduleGenerator;
use shift_roster::notify::LogSender;
use shift_roster::report::{RosterKpi, SummaryFormatter};
use shift_roster::store::{JsonFileStore, ScheduleStore};

#[derive(Parser)]
#[command(name = "shift-roster")]
#[command(version)]
#[command(about = "Generate and inspect rotating work schedules", long_about = None)]
struct Cli {
    /// Roster data file (employees, shifts, schedules)
    #[arg(short, long, global = true, default_value = "roster.json")]
    data: PathBuf,

    /// Generator config file; `ROSTER_*` variables are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate schedules and write them to the data file
    Generate {
        /// First day of the first week (YYYY-MM-DD)
        #[arg(short, long)]
        start: NaiveDate,

        /// Number of weeks to generate
        #[arg(short, long, default_value_t = 4)]
        weeks: u32,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the recap of one day
    Recap {
        /// Day to recap (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print quality metrics for a date range as JSON
    Kpi {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shift_roster=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::from_env()?,
    };

    match cli.command {
        Commands::Generate { start, weeks, seed } => {
            let mut store = JsonFileStore::open(&cli.data)?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            let generator = ScheduleGenerator::new(config);
            let report = generator.try_generate(&mut store, &LogSender, &mut rng, start, weeks)?;
            tracing::info!(path = %store.path().display(), rows = report.rows_written, "roster saved");
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Recap { date } => {
            let store = JsonFileStore::open(&cli.data)?;
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            let employees = store.employees()?;
            let shifts = store.shifts()?;
            let rows = store.schedules_between(date, date)?;
            match SummaryFormatter::new(&employees, &shifts).daily_recap(&rows, date) {
                Some(text) => println!("{text}"),
                None => println!("No schedule rows for {date}."),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Kpi { from, to } => {
            let store = JsonFileStore::open(&cli.data)?;
            let rows = store.schedules_between(from, to)?;
            let kpi = RosterKpi::calculate(&rows, &store.employees()?, &store.shifts()?, from, to);
            println!("{}", serde_json::to_string_pretty(&kpi)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

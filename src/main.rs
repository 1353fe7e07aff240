use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use ons_carga::{AreaCode, OnsCarga, Settings, CARGA_SERIES, DEFAULT_SAVE_DIR};

#[derive(Parser)]
#[command(name = "ons-carga")]
#[command(about = "Download verified and scheduled load from the ONS API into a CSV file", long_about = None)]
struct Cli {
    /// TOML settings file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Entry of data_config to fetch
    #[arg(short, long, default_value = CARGA_SERIES)]
    series: String,

    /// Comma separated area codes, e.g. SECO,S (defaults to the four subsystems)
    #[arg(short, long, value_delimiter = ',')]
    areas: Vec<AreaCode>,

    /// First day to fetch (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to fetch (YYYY-MM-DD), defaults to today
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Maximum number of days per request
    #[arg(long)]
    days_limit: Option<u32>,

    /// Directory the CSV file is written to
    #[arg(short, long, default_value = DEFAULT_SAVE_DIR)]
    out_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => {
            let settings = Settings::default();
            settings.validate()?;
            settings
        }
    };
    let series = settings.series(&cli.series)?;

    let client = OnsCarga::from_series(series)?;
    let table = client
        .fetch()
        .series(series)
        .areas(cli.areas)
        .maybe_date_from(cli.from)
        .maybe_date_to(cli.to)
        .maybe_days_limit(cli.days_limit)
        .call()?;

    client
        .save()
        .frame(table)
        .series(series)
        .global(&settings.global_config)
        .save_where(cli.out_dir)
        .call()?;

    Ok(())
}

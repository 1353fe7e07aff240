use chrono::NaiveDate;
use ons_carga::{AreaCode, CargaError, OnsCarga, Settings, CARGA_SERIES};
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), CargaError> {
    configure_polars_display();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::default();
    let series = settings.series(CARGA_SERIES)?;
    let client = OnsCarga::from_series(series)?;

    // First week of 2024 for the Southeast/Midwest subsystem, two days per request.
    let table = client
        .fetch()
        .series(series)
        .areas(vec![AreaCode::Seco])
        .date_from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .date_to(NaiveDate::from_ymd_opt(2024, 1, 7).unwrap())
        .days_limit(2)
        .call()?;

    println!("{:#?}", table);

    client
        .save()
        .frame(table)
        .series(series)
        .global(&settings.global_config)
        .save_where(PathBuf::from("data"))
        .call()?;

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}

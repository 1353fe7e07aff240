use crate::config::{ConfigError, GlobalConfig};
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create output directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to create output file '{0}'")]
    FileCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV file '{0}'")]
    CsvWrite(PathBuf, #[source] PolarsError),
}

/// Writes `frame` as delimited text to `dir/file_name` and hands it back.
///
/// The directory is created when missing. Separator, decimal mark and float
/// precision come from `global`; nulls are written as empty fields and no
/// index column is added.
pub fn save_table(
    frame: DataFrame,
    dir: &Path,
    file_name: &str,
    global: &GlobalConfig,
) -> Result<DataFrame, PersistError> {
    global.validate()?;
    let separator = global.separator()?;
    let decimal_comma = global.decimal_comma()?;

    std::fs::create_dir_all(dir).map_err(|e| PersistError::DirCreation(dir.to_path_buf(), e))?;

    let path = dir.join(file_name);
    let mut output = if decimal_comma {
        render_decimal_comma(&frame, global.round_float)
            .map_err(|e| PersistError::CsvWrite(path.clone(), e))?
    } else {
        frame.clone()
    };

    let file = File::create(&path).map_err(|e| PersistError::FileCreation(path.clone(), e))?;
    CsvWriter::new(file)
        .include_header(true)
        .with_separator(separator)
        .with_float_precision(Some(global.round_float))
        .finish(&mut output)
        .map_err(|e| PersistError::CsvWrite(path.clone(), e))?;

    info!("Saved {} rows to {}", frame.height(), path.display());
    Ok(frame)
}

/// Renders every float column as text with `precision` digits and a comma
/// as decimal mark. The CSV writer only knows the point.
fn render_decimal_comma(frame: &DataFrame, precision: usize) -> PolarsResult<DataFrame> {
    let columns = frame
        .get_columns()
        .iter()
        .map(|column| {
            if !column.dtype().is_float() {
                return Ok(column.clone());
            }
            let values = column.cast(&DataType::Float64)?;
            let rendered: StringChunked = values
                .f64()?
                .into_iter()
                .map(|value| value.map(|v| format!("{v:.precision$}").replace('.', ",")))
                .collect();
            Ok(rendered.with_name(column.name().clone()).into_column())
        })
        .collect::<PolarsResult<Vec<Column>>>()?;
    DataFrame::new(columns)
}

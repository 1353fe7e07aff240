//! Final reshaping of the accumulated load table into its published layout.

use crate::types::endpoint::{
    AREA_COLUMN, DATE_COLUMN, INSTANT_COLUMN, SCHEDULED_COLUMN, UPDATED_COLUMN, VERIFIED_COLUMN,
};
use polars::prelude::*;

pub const AREA_LABEL: &str = "Area Carga";
pub const DATE_LABEL: &str = "Referencia";
pub const INSTANT_LABEL: &str = "Instante";
pub const UPDATED_LABEL: &str = "Atualizacao";
pub const SCHEDULED_LABEL: &str = "Carga Programada";
pub const VERIFIED_LABEL: &str = "Carga Verificada";
pub const DIFFERENCE_LABEL: &str = "Carga Diferenca";

/// Columns of the final table, in order.
pub const OUTPUT_COLUMNS: [&str; 7] = [
    AREA_LABEL,
    DATE_LABEL,
    INSTANT_LABEL,
    UPDATED_LABEL,
    SCHEDULED_LABEL,
    VERIFIED_LABEL,
    DIFFERENCE_LABEL,
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn local_datetime() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

/// Source column, output label and the type used when the source is absent.
fn renames() -> [(&'static str, &'static str, DataType); 6] {
    [
        (AREA_COLUMN, AREA_LABEL, DataType::String),
        (DATE_COLUMN, DATE_LABEL, DataType::String),
        (INSTANT_COLUMN, INSTANT_LABEL, local_datetime()),
        (UPDATED_COLUMN, UPDATED_LABEL, local_datetime()),
        (SCHEDULED_COLUMN, SCHEDULED_LABEL, DataType::Float64),
        (VERIFIED_COLUMN, VERIFIED_LABEL, DataType::Float64),
    ]
}

/// Turns the merged endpoint rows into the published table.
///
/// Columns are renamed and put in [`OUTPUT_COLUMNS`] order; a source column no
/// response carried becomes an all-null column so the layout never changes.
/// `Carga Diferenca` is scheduled minus verified load. Rows whose verified load
/// is exactly zero are dropped, rows where it is null are kept. Both timestamp
/// columns end up as `YYYY-MM-DD HH:MM` strings.
///
/// # Examples
///
/// ```
/// use ons_carga::finalize_load_table;
/// use polars::prelude::*;
///
/// # fn main() -> PolarsResult<()> {
/// let merged = df!(
///     "cod_areacarga" => ["SECO", "SECO"],
///     "dat_referencia" => ["2024-01-01", "2024-01-01"],
///     "val_cargaglobal" => [Some(80.0), Some(0.0)],
///     "val_cargaglobalprogramada" => [Some(100.0), Some(50.0)],
/// )?;
///
/// let table = finalize_load_table(merged)?;
/// assert_eq!(table.height(), 1);
/// assert_eq!(table.column("Carga Diferenca")?.f64()?.get(0), Some(20.0));
/// # Ok(())
/// # }
/// ```
pub fn finalize_load_table(merged: DataFrame) -> PolarsResult<DataFrame> {
    if merged.width() == 0 {
        return empty_output();
    }

    let columns: Vec<Expr> = renames()
        .into_iter()
        .map(|(source, label, dtype)| {
            if merged.get_column_index(source).is_some() {
                col(source).alias(label)
            } else {
                lit(NULL).cast(dtype).alias(label)
            }
        })
        .collect();

    merged
        .lazy()
        .select(columns)
        .with_column((col(SCHEDULED_LABEL) - col(VERIFIED_LABEL)).alias(DIFFERENCE_LABEL))
        .filter(
            col(VERIFIED_LABEL)
                .is_null()
                .or(col(VERIFIED_LABEL).neq(lit(0.0))),
        )
        .with_columns([
            col(INSTANT_LABEL).dt().strftime(TIMESTAMP_FORMAT),
            col(UPDATED_LABEL).dt().strftime(TIMESTAMP_FORMAT),
        ])
        .collect()
}

fn empty_output() -> PolarsResult<DataFrame> {
    let columns = OUTPUT_COLUMNS
        .iter()
        .map(|label| {
            let dtype = match *label {
                SCHEDULED_LABEL | VERIFIED_LABEL | DIFFERENCE_LABEL => DataType::Float64,
                _ => DataType::String,
            };
            Series::new_empty((*label).into(), &dtype).into_column()
        })
        .collect();
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn instants(name: &str, values: &[Option<&str>]) -> Column {
        let millis: Vec<Option<i64>> = values
            .iter()
            .map(|text| {
                text.map(|text| {
                    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M")
                        .unwrap()
                        .and_utc()
                        .timestamp_millis()
                })
            })
            .collect();
        Series::new(name.into(), millis)
            .cast(&local_datetime())
            .unwrap()
            .into_column()
    }

    fn merged_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("cod_areacarga".into(), ["SECO", "SECO", "SECO", "SECO"]).into_column(),
            Series::new(
                "dat_referencia".into(),
                ["2024-01-01", "2024-01-01", "2024-01-01", "2024-01-01"],
            )
            .into_column(),
            instants(
                "din_referencia",
                &[
                    Some("2024-01-01 09:00"),
                    Some("2024-01-01 09:30"),
                    Some("2024-01-01 10:00"),
                    Some("2024-01-01 10:30"),
                ],
            ),
            instants(
                "din_atualizacao",
                &[Some("2024-01-01 12:05"), Some("2024-01-01 12:05"), None, None],
            ),
            Series::new(
                "val_cargaglobal".into(),
                [Some(80.0), Some(75.5), None, Some(0.0)],
            )
            .into_column(),
            Series::new(
                "val_cargaglobalprogramada".into(),
                [Some(100.0), None, Some(90.0), Some(95.0)],
            )
            .into_column(),
        ])
        .unwrap()
    }

    fn strings(df: &DataFrame, column: &str) -> Vec<Option<String>> {
        df.column(column)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_owned))
            .collect()
    }

    fn floats(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
        df.column(column).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_layout_is_fixed() -> PolarsResult<()> {
        let table = finalize_load_table(merged_frame())?;
        let names: Vec<&str> = table
            .get_column_names()
            .into_iter()
            .map(|c| c.as_str())
            .collect();
        assert_eq!(names, OUTPUT_COLUMNS);
        Ok(())
    }

    #[test]
    fn test_zero_rows_dropped_null_rows_kept() -> PolarsResult<()> {
        let table = finalize_load_table(merged_frame())?;

        assert_eq!(table.height(), 3);
        assert_eq!(floats(&table, VERIFIED_LABEL), [Some(80.0), Some(75.5), None]);
        assert_eq!(floats(&table, SCHEDULED_LABEL), [Some(100.0), None, Some(90.0)]);
        Ok(())
    }

    #[test]
    fn test_difference_is_scheduled_minus_verified() -> PolarsResult<()> {
        let table = finalize_load_table(merged_frame())?;
        assert_eq!(floats(&table, DIFFERENCE_LABEL), [Some(20.0), None, None]);
        Ok(())
    }

    #[test]
    fn test_timestamps_are_formatted() -> PolarsResult<()> {
        let table = finalize_load_table(merged_frame())?;

        assert_eq!(
            strings(&table, INSTANT_LABEL),
            [
                Some("2024-01-01 09:00".to_owned()),
                Some("2024-01-01 09:30".to_owned()),
                Some("2024-01-01 10:00".to_owned()),
            ]
        );
        assert_eq!(
            strings(&table, UPDATED_LABEL),
            [
                Some("2024-01-01 12:05".to_owned()),
                Some("2024-01-01 12:05".to_owned()),
                None,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_empty_input_keeps_layout() -> PolarsResult<()> {
        let table = finalize_load_table(DataFrame::empty())?;

        assert_eq!(table.height(), 0);
        assert_eq!(table.width(), OUTPUT_COLUMNS.len());
        assert_eq!(table.column(DIFFERENCE_LABEL)?.dtype(), &DataType::Float64);
        Ok(())
    }

    #[test]
    fn test_missing_update_column_becomes_null() -> PolarsResult<()> {
        let merged = merged_frame().drop("din_atualizacao")?;
        let table = finalize_load_table(merged)?;

        assert_eq!(table.width(), OUTPUT_COLUMNS.len());
        assert_eq!(table.column(UPDATED_LABEL)?.null_count(), table.height());
        Ok(())
    }
}

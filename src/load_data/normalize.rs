//! Turns the JSON records of one endpoint response into a typed table,
//! following the endpoint's declared schema and the series allowlist.

use crate::config::SeriesConfig;
use crate::load_data::client::RawRecord;
use crate::load_data::error::FetchError;
use crate::types::area::AreaCode;
use crate::types::date_range::DateRange;
use crate::types::endpoint::{Endpoint, FieldKind, FieldSpec, INSTANT_COLUMN, INSTANT_UTC_COLUMN};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use polars::prelude::*;
use serde_json::Value;

/// Grid local time is UTC−3 all year round.
const LOCAL_UTC_OFFSET_HOURS: i64 = 3;

/// Identifies the request a batch of records came from, for error reporting.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RequestContext {
    pub endpoint: Endpoint,
    pub area: AreaCode,
    pub range: DateRange,
}

pub(crate) fn utc_to_local(utc: DateTime<Utc>) -> NaiveDateTime {
    utc.naive_utc() - Duration::hours(LOCAL_UTC_OFFSET_HOURS)
}

/// Accepts RFC 3339 timestamps and offset-less `YYYY-MM-DDTHH:MM:SS`, read as UTC.
pub(crate) fn parse_utc_instant(text: &str) -> Option<DateTime<Utc>> {
    text.parse::<DateTime<Utc>>().ok().or_else(|| {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    })
}

/// Builds the normalized table of one endpoint response.
///
/// Only fields declared by the endpoint schema, allowed by the series and
/// present in at least one record become columns; an optional field missing
/// from the whole response stays missing. `din_referenciautc` is converted to
/// local time and stored as `din_referencia`, `din_atualizacao` is converted
/// in place.
pub(crate) fn normalize_records(
    ctx: RequestContext,
    records: &[RawRecord],
    series: &SeriesConfig,
) -> Result<DataFrame, FetchError> {
    if records.is_empty() {
        return Err(empty_response(ctx));
    }

    let mut columns: Vec<Column> = Vec::new();

    for field in ctx.endpoint.schema() {
        if !series.allows(field.name) {
            continue;
        }
        let present = records.iter().any(|record| record.contains_key(field.name));
        if !present && !field.required {
            continue;
        }

        let column = match field.kind {
            FieldKind::Text => {
                let values = records
                    .iter()
                    .enumerate()
                    .map(|(row, record)| text_value(ctx, field, row, record))
                    .collect::<Result<Vec<_>, _>>()?;
                Series::new(field.name.into(), values)
            }
            FieldKind::Float => {
                let values = records
                    .iter()
                    .enumerate()
                    .map(|(row, record)| float_value(ctx, field, row, record))
                    .collect::<Result<Vec<_>, _>>()?;
                Series::new(field.name.into(), values)
            }
            FieldKind::UtcInstant => {
                let millis = records
                    .iter()
                    .enumerate()
                    .map(|(row, record)| {
                        instant_value(ctx, field, row, record).map(|instant| {
                            instant.map(|utc| utc_to_local(utc).and_utc().timestamp_millis())
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let name = if field.name == INSTANT_UTC_COLUMN {
                    INSTANT_COLUMN
                } else {
                    field.name
                };
                Series::new(name.into(), millis)
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            }
        };
        columns.push(column.into_column());
    }

    if columns.is_empty() {
        return Err(empty_response(ctx));
    }

    Ok(DataFrame::new(columns)?)
}

fn empty_response(ctx: RequestContext) -> FetchError {
    FetchError::EmptyResponse {
        endpoint: ctx.endpoint,
        area: ctx.area,
        range: ctx.range,
    }
}

/// Looks the field up, treating JSON `null` like an absent key. Fails only
/// when a required field has no value.
fn field_value<'a>(
    ctx: RequestContext,
    field: &FieldSpec,
    row: usize,
    record: &'a RawRecord,
) -> Result<Option<&'a Value>, FetchError> {
    match record.get(field.name) {
        Some(Value::Null) | None if field.required => Err(FetchError::MissingField {
            endpoint: ctx.endpoint,
            area: ctx.area,
            row,
            field: field.name,
        }),
        Some(Value::Null) | None => Ok(None),
        Some(value) => Ok(Some(value)),
    }
}

fn invalid(ctx: RequestContext, field: &FieldSpec, row: usize, value: &Value) -> FetchError {
    FetchError::InvalidField {
        endpoint: ctx.endpoint,
        area: ctx.area,
        row,
        field: field.name,
        value: value.to_string(),
    }
}

fn text_value(
    ctx: RequestContext,
    field: &FieldSpec,
    row: usize,
    record: &RawRecord,
) -> Result<Option<String>, FetchError> {
    match field_value(ctx, field, row, record)? {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(invalid(ctx, field, row, other)),
    }
}

fn float_value(
    ctx: RequestContext,
    field: &FieldSpec,
    row: usize,
    record: &RawRecord,
) -> Result<Option<f64>, FetchError> {
    let Some(value) = field_value(ctx, field, row, record)? else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| invalid(ctx, field, row, value))
}

fn instant_value(
    ctx: RequestContext,
    field: &FieldSpec,
    row: usize,
    record: &RawRecord,
) -> Result<Option<DateTime<Utc>>, FetchError> {
    let Some(value) = field_value(ctx, field, row, record)? else {
        return Ok(None);
    };
    value
        .as_str()
        .and_then(parse_utc_instant)
        .map(Some)
        .ok_or_else(|| invalid(ctx, field, row, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use serde_json::json;

    fn ctx(endpoint: Endpoint) -> RequestContext {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        RequestContext {
            endpoint,
            area: AreaCode::Seco,
            range: DateRange::new(day, day),
        }
    }

    fn records(value: serde_json::Value) -> Vec<RawRecord> {
        serde_json::from_value(value).unwrap()
    }

    fn column_names(df: &DataFrame) -> Vec<&str> {
        df.get_column_names().into_iter().map(|c| c.as_str()).collect()
    }

    fn local_millis(text: &str) -> i64 {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M")
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_utc_to_local_is_three_hours_behind() {
        let utc = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(
            utc_to_local(utc).format("%Y-%m-%d %H:%M").to_string(),
            "2024-01-01 09:00"
        );

        // crosses midnight backwards
        let utc = Utc.with_ymd_and_hms(2024, 3, 1, 1, 30, 0).unwrap();
        assert_eq!(
            utc_to_local(utc).format("%Y-%m-%d %H:%M").to_string(),
            "2024-02-29 22:30"
        );
    }

    #[test]
    fn test_parse_utc_instant_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_utc_instant("2024-01-01T12:00:00Z"), Some(expected));
        assert_eq!(parse_utc_instant("2024-01-01T09:00:00-03:00"), Some(expected));
        assert_eq!(parse_utc_instant("2024-01-01T12:00:00"), Some(expected));
        assert_eq!(parse_utc_instant("01/01/2024 12:00"), None);
    }

    #[test]
    fn test_verified_records_are_normalized() -> Result<(), Box<dyn std::error::Error>> {
        let raw = records(json!([
            {
                "cod_areacarga": "SECO",
                "dat_referencia": "2024-01-01",
                "din_referenciautc": "2024-01-01T12:00:00Z",
                "din_atualizacao": "2024-01-02T03:00:00Z",
                "val_cargaglobal": 41250.5,
                "val_cargamgd": 12.0
            },
            {
                "cod_areacarga": "SECO",
                "dat_referencia": "2024-01-01",
                "din_referenciautc": "2024-01-01T12:30:00Z",
                "din_atualizacao": null,
                "val_cargaglobal": null
            }
        ]));

        let df = normalize_records(ctx(Endpoint::Verified), &raw, &SeriesConfig::default())?;

        assert_eq!(
            column_names(&df),
            [
                "cod_areacarga",
                "dat_referencia",
                "din_referencia",
                "din_atualizacao",
                "val_cargaglobal"
            ]
        );
        assert_eq!(df.height(), 2);

        let instants = df.column("din_referencia")?.datetime()?;
        assert_eq!(instants.get(0), Some(local_millis("2024-01-01 09:00")));
        assert_eq!(instants.get(1), Some(local_millis("2024-01-01 09:30")));

        let updated = df.column("din_atualizacao")?.datetime()?;
        assert_eq!(updated.get(0), Some(local_millis("2024-01-02 00:00")));
        assert_eq!(updated.get(1), None);

        let values = df.column("val_cargaglobal")?.f64()?;
        assert_eq!(values.get(0), Some(41250.5));
        assert_eq!(values.get(1), None);
        Ok(())
    }

    #[test]
    fn test_missing_optional_column_is_not_fabricated() -> Result<(), Box<dyn std::error::Error>> {
        let raw = records(json!([{
            "cod_areacarga": "S",
            "dat_referencia": "2024-01-01",
            "din_referenciautc": "2024-01-01T12:00:00Z",
            "val_cargaglobalprogramada": "15000.25"
        }]));

        let df = normalize_records(ctx(Endpoint::Scheduled), &raw, &SeriesConfig::default())?;

        assert_eq!(
            column_names(&df),
            [
                "cod_areacarga",
                "dat_referencia",
                "din_referencia",
                "val_cargaglobalprogramada"
            ]
        );
        assert_eq!(
            df.column("val_cargaglobalprogramada")?.f64()?.get(0),
            Some(15000.25)
        );
        Ok(())
    }

    #[test]
    fn test_columns_outside_allowlist_are_dropped() -> Result<(), Box<dyn std::error::Error>> {
        let raw = records(json!([{
            "cod_areacarga": "N",
            "dat_referencia": "2024-01-01",
            "din_referenciautc": "2024-01-01T12:00:00Z",
            "din_atualizacao": "2024-01-01T13:00:00Z",
            "val_cargaglobal": 100.0
        }]));
        let series = SeriesConfig {
            desirable_columns: vec![
                "cod_areacarga".into(),
                "dat_referencia".into(),
                "din_referenciautc".into(),
                "val_cargaglobal".into(),
            ],
            ..SeriesConfig::default()
        };

        let df = normalize_records(ctx(Endpoint::Verified), &raw, &series)?;
        assert_eq!(
            column_names(&df),
            ["cod_areacarga", "dat_referencia", "din_referencia", "val_cargaglobal"]
        );
        Ok(())
    }

    #[test]
    fn test_empty_response_is_an_error() {
        let err = normalize_records(ctx(Endpoint::Verified), &[], &SeriesConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::EmptyResponse {
                endpoint: Endpoint::Verified,
                area: AreaCode::Seco,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_required_field_is_reported() {
        let raw = records(json!([
            {
                "cod_areacarga": "SECO",
                "dat_referencia": "2024-01-01",
                "din_referenciautc": "2024-01-01T12:00:00Z"
            },
            {
                "cod_areacarga": "SECO",
                "din_referenciautc": "2024-01-01T12:30:00Z"
            }
        ]));

        let err = normalize_records(ctx(Endpoint::Verified), &raw, &SeriesConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::MissingField {
                row: 1,
                field: "dat_referencia",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_timestamp_is_reported() {
        let raw = records(json!([{
            "cod_areacarga": "SECO",
            "dat_referencia": "2024-01-01",
            "din_referenciautc": "yesterday"
        }]));

        let err = normalize_records(ctx(Endpoint::Verified), &raw, &SeriesConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FetchError::InvalidField {
                row: 0,
                field: "din_referenciautc",
                ..
            }
        ));
    }
}

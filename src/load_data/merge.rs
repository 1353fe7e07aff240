use crate::types::endpoint::JOIN_KEYS;
use polars::prelude::*;

const RIGHT_SUFFIX: &str = "_right";

fn key_exprs() -> Vec<Expr> {
    JOIN_KEYS.iter().map(|key| col(*key)).collect()
}

/// Full outer join of two normalized endpoint tables on area, date and instant.
///
/// Rows without a counterpart keep nulls for the other side's columns. A
/// non-key column present on both sides ends up once: the left value is kept
/// and nulls are filled from the right. The result is sorted by the key.
pub(crate) fn outer_join_on_keys(left: DataFrame, right: DataFrame) -> PolarsResult<DataFrame> {
    let left_names: Vec<String> = left
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let right_only: Vec<String> = right
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| !JOIN_KEYS.contains(&name.as_str()) && !left_names.contains(name))
        .collect();

    let output: Vec<Expr> = left_names
        .iter()
        .map(|name| {
            let shared = !JOIN_KEYS.contains(&name.as_str())
                && right.get_column_index(name).is_some();
            if shared {
                col(name.as_str())
                    .fill_null(col(format!("{name}{RIGHT_SUFFIX}").as_str()))
                    .alias(name.as_str())
            } else {
                col(name.as_str())
            }
        })
        .chain(right_only.iter().map(|name| col(name.as_str())))
        .collect();

    left.lazy()
        .join(
            right.lazy(),
            key_exprs(),
            key_exprs(),
            JoinArgs::new(JoinType::Full)
                .with_coalesce(JoinCoalesce::CoalesceColumns)
                .with_suffix(Some(RIGHT_SUFFIX.into())),
        )
        .select(output)
        .sort_by_exprs(key_exprs(), SortMultipleOptions::default())
        .collect()
}

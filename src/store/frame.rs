//! Typed column access over Polars data frames.
//!
//! Aggregate tables come from upstream notebooks, so integer columns may be
//! stored as any width and counts sometimes as floats. Every accessor casts
//! to a canonical type before reading.

use polars::prelude::*;

use super::TableError;

fn column<'a>(df: &'a DataFrame, table: &str, name: &str) -> Result<&'a Column, TableError> {
    df.column(name).map_err(|_| TableError::MissingColumn {
        table: table.to_string(),
        column: name.to_string(),
    })
}

#[must_use]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

pub fn i64_values(df: &DataFrame, table: &str, name: &str) -> Result<Vec<Option<i64>>, TableError> {
    let casted = column(df, table, name)?.cast(&DataType::Int64)?;
    Ok(casted.i64()?.into_iter().collect())
}

pub fn f64_values(df: &DataFrame, table: &str, name: &str) -> Result<Vec<Option<f64>>, TableError> {
    let casted = column(df, table, name)?.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().collect())
}

pub fn string_values(
    df: &DataFrame,
    table: &str,
    name: &str,
) -> Result<Vec<Option<String>>, TableError> {
    let casted = column(df, table, name)?.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Reads a column that must not contain nulls.
pub fn required<T>(
    values: Vec<Option<T>>,
    table: &str,
    name: &str,
) -> Result<Vec<T>, TableError> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value.ok_or_else(|| TableError::NullValue {
                table: table.to_string(),
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

/// Converts a possibly fractional count column to unsigned integers.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn count_values(df: &DataFrame, table: &str, name: &str) -> Result<Vec<u64>, TableError> {
    let values = required(f64_values(df, table, name)?, table, name)?;
    Ok(values.into_iter().map(|v| v.max(0.0).round() as u64).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_columns_are_widened() {
        let df = df!(
            "movieId" => [1i32, 2, 3],
            "count" => [1.0f64, 2.4, 2.6],
        )
        .unwrap();

        let ids = required(i64_values(&df, "t", "movieId").unwrap(), "t", "movieId").unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(count_values(&df, "t", "count").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_column_is_reported_with_table_name() {
        let df = df!("tag" => ["a"]).unwrap();
        let err = i64_values(&df, "user_tag_stats.parquet", "count").unwrap_err();
        assert!(matches!(
            err,
            TableError::MissingColumn { ref table, ref column }
                if table == "user_tag_stats.parquet" && column == "count"
        ));
    }

    #[test]
    fn test_nulls_in_required_columns_are_rejected() {
        let df = df!("title" => [Some("A"), None]).unwrap();
        let err = required(string_values(&df, "t", "title").unwrap(), "t", "title").unwrap_err();
        assert!(matches!(err, TableError::NullValue { row: 1, .. }));
    }
}

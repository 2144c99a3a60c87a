//! Integration tests for the transform catalog.

use polars::prelude::*;
use proptest::prelude::*;
use sweep_model::{
    ConversionTarget, FillStrategy, OutlierMethod, column_missing_count, is_numeric_dtype,
    tables_equal,
};
use sweep_transform::{
    DeriveSource, Transform, TransformError, convert_type, dedup, detect_outliers, fill_numeric,
    rename_column,
};

fn orders() -> DataFrame {
    DataFrame::new(vec![
        Series::new("id".into(), vec![1i64, 1, 2]).into(),
        Series::new("v".into(), vec![5i64, 5, 3]).into(),
    ])
    .unwrap()
}

#[test]
fn test_dedup_scenario() {
    let out = dedup(&orders()).unwrap();
    assert_eq!(out.height(), 2);
    let v = out.column("v").unwrap().i64().unwrap();
    assert_eq!(v.get(0), Some(5));
    assert_eq!(v.get(1), Some(3));
}

#[test]
fn test_dedup_treats_negative_zero_as_zero() {
    let df = DataFrame::new(vec![Series::new("x".into(), vec![0.0, -0.0]).into()]).unwrap();
    assert_eq!(dedup(&df).unwrap().height(), 1);
}

#[test]
fn test_mean_fill_scenario() {
    let df = DataFrame::new(vec![
        Series::new("price".into(), vec![Some(10.0), Some(f64::NAN), Some(30.0)]).into(),
    ])
    .unwrap();
    let out = fill_numeric(&df, FillStrategy::Mean).unwrap();
    let price = out.column("price").unwrap().f64().unwrap();
    assert_eq!(
        price.into_iter().collect::<Vec<_>>(),
        vec![Some(10.0), Some(20.0), Some(30.0)]
    );
}

#[test]
fn test_iqr_scenario() {
    let df = DataFrame::new(vec![
        Series::new("x".into(), vec![1.0, 2.0, 3.0, 4.0, 100.0]).into(),
    ])
    .unwrap();
    let flagged = detect_outliers(&df, "x", &OutlierMethod::iqr(1.5)).unwrap();
    assert_eq!(flagged, vec![4]);
}

#[test]
fn test_rename_scenarios() {
    let df = DataFrame::new(vec![
        Series::new("a".into(), vec![1i64]).into(),
        Series::new("b".into(), vec![2i64]).into(),
    ])
    .unwrap();
    let same = rename_column(&df, "a", "a").unwrap();
    assert!(tables_equal(&same, &df));
    assert!(matches!(
        rename_column(&df, "a", "b"),
        Err(TransformError::ColumnExists(_))
    ));
}

#[test]
fn test_convert_non_numeric_string_to_integer_is_missing() {
    let df = DataFrame::new(vec![Series::new("s".into(), vec!["abc", "7"]).into()]).unwrap();
    let out = convert_type(&df, "s", ConversionTarget::Integer).unwrap();
    let s = out.column("s").unwrap().i64().unwrap();
    assert_eq!(s.get(0), None);
    assert_eq!(s.get(1), Some(7));
}

#[test]
fn test_failed_transform_leaves_input() {
    let df = orders();
    let step = Transform::DeriveColumn {
        name: "bad".into(),
        source: DeriveSource::Expression {
            expression: "id + missing_column".into(),
        },
    };
    let err = step.apply(&df).unwrap_err();
    assert!(err.to_string().contains("missing_column"));
    assert!(tables_equal(&df, &orders()));
}

#[test]
fn test_filter_rows_transform() {
    let step = Transform::FilterRows {
        expression: "id == 1 and v >= 5".into(),
    };
    let out = step.apply(&orders()).unwrap();
    assert_eq!(out.height(), 2);
}

#[test]
fn test_derived_expression_column() {
    let step = Transform::DeriveColumn {
        name: "score".into(),
        source: DeriveSource::Expression {
            expression: "v * 10 + id".into(),
        },
    };
    let out = step.apply(&orders()).unwrap();
    let score = out.column("score").unwrap().i64().unwrap();
    assert_eq!(score.get(2), Some(32));
}

fn table_strategy() -> impl Strategy<Value = DataFrame> {
    (1usize..20).prop_flat_map(|rows| {
        (
            prop::collection::vec(prop::option::of(0i64..4), rows),
            prop::collection::vec(prop::option::of(-5.0f64..5.0), rows),
            prop::collection::vec(prop::option::of("[ab]{0,2}"), rows),
        )
            .prop_map(|(ints, floats, texts)| {
                DataFrame::new(vec![
                    Series::new("i".into(), ints).into(),
                    Series::new("f".into(), floats).into(),
                    Series::new("t".into(), texts).into(),
                ])
                .unwrap()
            })
    })
}

proptest! {
    #[test]
    fn prop_dedup_is_idempotent(df in table_strategy()) {
        let once = dedup(&df).unwrap();
        let twice = dedup(&once).unwrap();
        prop_assert!(once.height() <= df.height());
        prop_assert!(tables_equal(&once, &twice));
    }

    #[test]
    fn prop_fill_leaves_no_missing_numbers(df in table_strategy()) {
        let out = fill_numeric(&df, FillStrategy::Mean).unwrap();
        for column in out.get_columns() {
            if !is_numeric_dtype(column.dtype()) {
                continue;
            }
            let original = df.column(column.name().as_str()).unwrap();
            let all_missing = column_missing_count(original) == original.len();
            prop_assert!(all_missing || column_missing_count(column) == 0);
        }
        let text_before = df.select(["t"]).unwrap();
        let text_after = out.select(["t"]).unwrap();
        prop_assert!(tables_equal(&text_before, &text_after));
    }
}

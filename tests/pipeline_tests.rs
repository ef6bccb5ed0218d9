//! End-to-end pipeline tests: group -> align -> bounds -> smooth.

use serde_json::{Map, Value};
use trackplot::api::{Run, RunSeries, Sample};
use trackplot::frame::Frame;
use trackplot::pipeline::bounds::{HIGH, LOW, MEAN};
use trackplot::pipeline::group::{default_name_func, FilterValue};
use trackplot::pipeline::{align, bounds, bounds_all, group_runs, smooth};
use trackplot::utils::error::GroupError;

fn run(name: &str, group: &str) -> Run {
    Run {
        name: name.to_string(),
        group: Some(group.to_string()),
        state: "finished".to_string(),
        config: Map::new(),
        summary: Map::new(),
    }
}

fn series(name: &str, points: &[(f64, f64)]) -> RunSeries {
    RunSeries {
        name: name.to_string(),
        samples: points
            .iter()
            .map(|&(step, value)| Sample { step, value })
            .collect(),
    }
}

fn cell(frame: &Frame, column: &str, row: usize) -> f64 {
    frame.column(column).unwrap().values[row].unwrap()
}

#[test]
fn three_runs_one_group_minmax_envelope() {
    // Three runs logging `reward` at steps [0, 10, 20]
    let runs = vec![run("r1", "exp"), run("r2", "exp"), run("r3", "exp")];
    let groups = group_runs(&runs, &default_name_func, &Vec::new()).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups["exp"].len(), 3);

    let histories = vec![
        series("r1", &[(0.0, 1.0), (10.0, 2.0), (20.0, 3.0)]),
        series("r2", &[(0.0, 1.0), (10.0, 2.0), (20.0, 3.0)]),
        series("r3", &[(0.0, 4.0), (10.0, 5.0), (20.0, 6.0)]),
    ];
    let aligned = align(&histories, "_step").unwrap();
    assert_eq!(aligned.index(), &[0.0, 10.0, 20.0]);

    let envelope = bounds(&aligned, true).unwrap();

    assert_eq!(cell(&envelope, LOW, 0), 1.0);
    assert_eq!(cell(&envelope, MEAN, 0), 2.0);
    assert_eq!(cell(&envelope, HIGH, 0), 4.0);

    // Step 20 holds values {3, 3, 6}
    assert_eq!(cell(&envelope, LOW, 2), 3.0);
    assert!((cell(&envelope, MEAN, 2) - 4.0).abs() < 0.01);
    assert_eq!(cell(&envelope, HIGH, 2), 6.0);
}

#[test]
fn sparse_run_interpolates_inside_its_span() {
    // Samples only at [0, 100] vs [0, 50, 100]: step 50 is interior for both
    let histories = vec![
        series("sparse", &[(0.0, 0.0), (100.0, 10.0)]),
        series("dense", &[(0.0, 1.0), (50.0, 2.0), (100.0, 3.0)]),
    ];

    let aligned = align(&histories, "_step").unwrap();

    assert_eq!(
        aligned.column("sparse").unwrap().values[1],
        Some(5.0),
        "step 50 lies inside [0, 100] and must be linearly filled"
    );
}

#[test]
fn no_column_contributes_outside_its_span() {
    // `late` starts at step 10; the mean at step 0 must come from `early` alone
    let histories = vec![
        series("early", &[(0.0, 2.0), (10.0, 2.0), (20.0, 2.0)]),
        series("late", &[(10.0, 8.0), (20.0, 8.0)]),
    ];

    let aligned = align(&histories, "_step").unwrap();
    let envelope = bounds(&aligned, true).unwrap();

    assert_eq!(cell(&envelope, MEAN, 0), 2.0);
    assert_eq!(cell(&envelope, MEAN, 1), 5.0);
}

#[test]
fn single_run_group_is_idempotent_under_alignment() {
    let points = [(0.0, 1.5), (5.0, 2.5), (20.0, 0.5)];
    let aligned = align(&[series("only", &points)], "_step").unwrap();
    let envelope = bounds(&aligned, true).unwrap();

    for (row, &(_, value)) in points.iter().enumerate() {
        assert_eq!(cell(&envelope, LOW, row), value);
        assert_eq!(cell(&envelope, MEAN, row), value);
        assert_eq!(cell(&envelope, HIGH, row), value);
    }
}

#[test]
fn std_envelope_brackets_the_mean() {
    let histories = vec![
        series("a", &[(0.0, 1.0), (10.0, 5.0)]),
        series("b", &[(0.0, 3.0), (10.0, 1.0)]),
        series("c", &[(5.0, 2.0)]),
    ];

    let aligned = align(&histories, "_step").unwrap();
    let envelope = bounds(&aligned, false).unwrap();

    for row in 0..envelope.rows() {
        let low = cell(&envelope, LOW, row);
        let mean = cell(&envelope, MEAN, row);
        let high = cell(&envelope, HIGH, row);
        assert!(low <= mean && mean <= high);
        // Symmetric by construction
        assert!((mean - low - (high - mean)).abs() < 1e-9);
    }
}

#[test]
fn smoothing_zero_is_identity_end_to_end() {
    let histories = vec![
        series("a", &[(0.0, 1.0), (10.0, 9.0), (20.0, 1.0)]),
        series("b", &[(0.0, 2.0), (10.0, 8.0), (20.0, 2.0)]),
    ];
    let aligned = align(&histories, "_step").unwrap();
    let envelope = bounds(&aligned, false).unwrap();

    let smoothed = smooth(&envelope, 0.0);

    assert_eq!(smoothed, envelope);
}

#[test]
fn filters_apply_before_grouping() {
    let mut keep = run("r1", "sae");
    keep.config.insert("dim".to_string(), Value::from(96));
    let mut drop = run("r2", "sae");
    drop.config.insert("dim".to_string(), Value::from(48));

    let runs = vec![keep, drop];
    let filters = vec![("dim".to_string(), FilterValue::Literal(Value::from(96)))];

    let groups = group_runs(&runs, &default_name_func, &filters).unwrap();

    assert_eq!(groups["sae"].len(), 1);
    assert_eq!(groups["sae"][0].name, "r1");
}

#[test]
fn predicate_filter_sees_attribute_value() {
    let mut r1 = run("r1", "sae");
    r1.config.insert("step".to_string(), Value::from(150));
    let mut r2 = run("r2", "sae");
    r2.config.insert("step".to_string(), Value::from(50));

    let runs = vec![r1, r2];
    let filters = vec![(
        "step".to_string(),
        FilterValue::Predicate(Box::new(|v: &Value| v.as_i64().is_some_and(|n| n > 100))),
    )];

    let groups = group_runs(&runs, &default_name_func, &filters).unwrap();

    assert_eq!(groups["sae"].len(), 1);
    assert_eq!(groups["sae"][0].name, "r1");
}

#[test]
fn missing_filter_attribute_fails_loudly() {
    let runs = vec![run("r1", "sae")];
    let filters = vec![("dim".to_string(), FilterValue::Literal(Value::from(96)))];

    let err = group_runs(&runs, &default_name_func, &filters).unwrap_err();

    assert!(matches!(err, GroupError::MissingAttribute { .. }));
}

#[test]
fn bounds_all_passes_through_group_names() {
    let aligned_a = align(&[series("a", &[(0.0, 1.0)])], "_step").unwrap();
    let aligned_b = align(&[series("b", &[(0.0, 2.0)])], "_step").unwrap();

    let mut groups = indexmap::IndexMap::new();
    groups.insert("first".to_string(), aligned_a);
    groups.insert("second".to_string(), aligned_b);

    let envelopes = bounds_all(&groups, true).unwrap();

    let names: Vec<&String> = envelopes.keys().collect();
    assert_eq!(names, vec!["first", "second"]);
}

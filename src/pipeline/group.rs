//! Partition runs into named groups by filtering and naming over their
//! merged attributes.
//!
//! A run's attribute view is its configuration flattened together with the
//! derived fields `group`, `name`, `state` and its numeric summary metrics.
//! Two runs land in the same group iff the naming function returns equal
//! strings for both.

use crate::api::Run;
use crate::utils::config::INTERNAL_MARKER;
use crate::utils::error::GroupError;
use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};

/// Flat attribute view of a run
pub type AttrMap = Map<String, Value>;

/// Naming function over a run's merged attributes
pub type NameFunc<'a> = &'a dyn Fn(&AttrMap) -> String;

/// One filter clause: keep a run iff the named attribute matches
pub enum FilterValue {
    /// Keep iff the attribute equals this value
    Literal(Value),
    /// Keep iff the predicate returns true on the attribute value
    Predicate(Box<dyn Fn(&Value) -> bool>),
}

impl FilterValue {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FilterValue::Literal(expected) => value == expected,
            FilterValue::Predicate(pred) => pred(value),
        }
    }
}

/// A set of filter clauses, all of which must pass
pub type FilterConfig = Vec<(String, FilterValue)>;

/// Default naming: group by the run's experiment-group attribute
pub fn default_name_func(attrs: &AttrMap) -> String {
    attrs.get("group").map(attr_label).unwrap_or_default()
}

/// Render an attribute value as a label fragment
pub fn attr_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Merge a run's configuration, derived fields and summary into one flat
/// attribute mapping.
///
/// Summary keys beginning with the internal marker have it stripped; only
/// numeric summary values are retained. Summary values overwrite config
/// values of the same name (logged metrics win over stale config).
pub fn merged_attrs(run: &Run) -> AttrMap {
    let mut attrs = run.config.clone();
    attrs.insert(
        "group".to_string(),
        Value::String(run.group.clone().unwrap_or_default()),
    );
    attrs.insert("name".to_string(), Value::String(run.name.clone()));
    attrs.insert("state".to_string(), Value::String(run.state.clone()));

    for (key, value) in &run.summary {
        if !value.is_number() {
            continue;
        }
        let key = key
            .strip_prefix(INTERNAL_MARKER)
            .unwrap_or(key)
            .to_string();
        attrs.insert(key, value.clone());
    }

    attrs
}

/// Partition runs into named groups.
///
/// Filtering is evaluated before grouping: a run excluded by any clause
/// never appears in any group. A filter clause referencing an attribute a
/// run does not have is a fatal error, not a non-match.
///
/// Returns an insertion-ordered map from group name to the runs in it, in
/// the order they were seen.
pub fn group_runs<'a>(
    runs: &'a [Run],
    name_func: NameFunc<'_>,
    filter_config: &FilterConfig,
) -> Result<IndexMap<String, Vec<&'a Run>>, GroupError> {
    let mut groups: IndexMap<String, Vec<&Run>> = IndexMap::new();

    for run in runs {
        let attrs = merged_attrs(run);

        let mut skip = false;
        for (key, filter) in filter_config {
            let value = attrs.get(key).ok_or_else(|| GroupError::MissingAttribute {
                key: key.clone(),
                run: run.name.clone(),
            })?;
            if !filter.matches(value) {
                skip = true;
                break;
            }
        }
        if skip {
            continue;
        }

        let name = name_func(&attrs);
        groups.entry(name).or_default().push(run);
    }

    debug!("Grouped runs into {} groups", groups.len());
    groups.iter().for_each(|(name, members)| {
        debug!("  '{}': {} runs", name, members.len());
    });

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_run(name: &str, group: &str, dim: i64) -> Run {
        let mut config = Map::new();
        config.insert("hidden_dim".to_string(), Value::from(dim));
        let mut summary = Map::new();
        summary.insert("_runtime".to_string(), Value::from(12.5));
        summary.insert("reward".to_string(), Value::from(1.0));
        summary.insert("note".to_string(), Value::from("text"));
        Run {
            name: name.to_string(),
            group: Some(group.to_string()),
            state: "finished".to_string(),
            config,
            summary,
        }
    }

    #[test]
    fn test_merged_attrs_strips_marker_and_drops_non_numeric() {
        let attrs = merged_attrs(&make_run("r1", "sae", 96));

        assert_eq!(attrs.get("runtime"), Some(&Value::from(12.5)));
        assert_eq!(attrs.get("reward"), Some(&Value::from(1.0)));
        // Non-numeric summary entries are dropped
        assert!(attrs.get("note").is_none());
        assert_eq!(attrs.get("group"), Some(&Value::from("sae")));
        assert_eq!(attrs.get("name"), Some(&Value::from("r1")));
        assert_eq!(attrs.get("state"), Some(&Value::from("finished")));
    }

    #[test]
    fn test_summary_overwrites_config() {
        let mut run = make_run("r1", "sae", 96);
        run.summary
            .insert("hidden_dim".to_string(), Value::from(128));

        let attrs = merged_attrs(&run);

        assert_eq!(attrs.get("hidden_dim"), Some(&Value::from(128)));
    }

    #[test]
    fn test_literal_filter() {
        let runs = vec![make_run("r1", "sae", 96), make_run("r2", "rnn", 48)];
        let filters = vec![(
            "hidden_dim".to_string(),
            FilterValue::Literal(Value::from(96)),
        )];

        let groups = group_runs(&runs, &default_name_func, &filters).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups["sae"].len(), 1);
        assert_eq!(groups["sae"][0].name, "r1");
    }

    #[test]
    fn test_predicate_filter() {
        let runs = vec![
            make_run("r1", "sae", 96),
            make_run("r2", "rnn", 96),
            make_run("r3", "transformer", 96),
        ];
        let filters: FilterConfig = vec![(
            "group".to_string(),
            FilterValue::Predicate(Box::new(|v| v.as_str() != Some("transformer"))),
        )];

        let groups = group_runs(&runs, &default_name_func, &filters).unwrap();

        assert_eq!(groups.len(), 2);
        assert!(groups.contains_key("sae"));
        assert!(groups.contains_key("rnn"));
    }

    #[test]
    fn test_missing_filter_key_is_fatal() {
        let runs = vec![make_run("r1", "sae", 96)];
        let filters = vec![(
            "learning_rate".to_string(),
            FilterValue::Literal(Value::from(0.001)),
        )];

        let err = group_runs(&runs, &default_name_func, &filters).unwrap_err();

        match err {
            GroupError::MissingAttribute { key, run } => {
                assert_eq!(key, "learning_rate");
                assert_eq!(run, "r1");
            }
        }
    }

    #[test]
    fn test_grouping_is_a_partition_preserving_order() {
        let runs = vec![
            make_run("r1", "sae", 96),
            make_run("r2", "rnn", 96),
            make_run("r3", "sae", 96),
        ];

        let groups = group_runs(&runs, &default_name_func, &Vec::new()).unwrap();

        let total: usize = groups.values().map(|v| v.len()).sum();
        assert_eq!(total, runs.len());
        let names: Vec<&str> = groups["sae"].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["r1", "r3"]);
    }

    #[test]
    fn test_custom_name_func() {
        let runs = vec![make_run("r1", "sae", 96), make_run("r2", "sae", 48)];
        let name_func = |attrs: &AttrMap| {
            format!(
                "{}-{}",
                attrs.get("group").map(attr_label).unwrap_or_default(),
                attrs.get("hidden_dim").map(attr_label).unwrap_or_default(),
            )
        };

        let groups = group_runs(&runs, &name_func, &Vec::new()).unwrap();

        assert!(groups.contains_key("sae-96"));
        assert!(groups.contains_key("sae-48"));
    }
}

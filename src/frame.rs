//! A minimal step-indexed column table.
//!
//! `Frame` is the in-memory shape flowing through the pipeline: a strictly
//! increasing f64 index (the step axis) and one `Option<f64>` column per
//! contributing run. Absent cells stay `None`; every numeric reduction
//! ignores them. This is all the tabular machinery the pipeline needs --
//! outer-join concatenation, interior interpolation, row-wise statistics
//! and an exponentially-weighted moving average.

use std::collections::HashMap;

/// One named column of optional values, same length as the frame index
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Step-indexed table with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index_name: String,
    index: Vec<f64>,
    columns: Vec<Column>,
}

impl Frame {
    /// Create an empty frame with the given index name
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            index: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Create a column-less frame over an existing index
    pub fn with_index(index_name: impl Into<String>, index: Vec<f64>) -> Self {
        Self {
            index_name: index_name.into(),
            index,
            columns: Vec::new(),
        }
    }

    /// Build a single-column frame from raw (step, value) samples.
    ///
    /// Samples are sorted by step; duplicate steps keep the last value.
    pub fn from_samples(
        index_name: impl Into<String>,
        column_name: impl Into<String>,
        samples: &[(f64, f64)],
    ) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut index = Vec::with_capacity(sorted.len());
        let mut values: Vec<Option<f64>> = Vec::with_capacity(sorted.len());
        for (step, value) in sorted {
            if index.last() == Some(&step) {
                if let Some(last) = values.last_mut() {
                    *last = Some(value);
                }
            } else {
                index.push(step);
                values.push(Some(value));
            }
        }

        Self {
            index_name: index_name.into(),
            index,
            columns: vec![Column { name: column_name.into(), values }],
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.index.len()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[f64] {
        &self.index
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Append a column; its length must match the index
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.index.len());
        self.columns.push(Column { name: name.into(), values });
    }

    /// Present values of one row, across all columns
    pub fn row_values(&self, row: usize) -> impl Iterator<Item = f64> + '_ {
        self.columns.iter().filter_map(move |c| c.values[row])
    }

    /// Last present value of a column, with its step
    pub fn last_value(&self, name: &str) -> Option<(f64, f64)> {
        let column = self.column(name)?;
        column
            .values
            .iter()
            .enumerate()
            .rev()
            .find_map(|(row, v)| v.map(|value| (self.index[row], value)))
    }

    /// Outer-join frames on their step index.
    ///
    /// The result index is the sorted union of all input indices; each input
    /// column is carried over with `None` at steps it did not cover. The
    /// index name comes from the first frame.
    pub fn outer_join(frames: &[Frame]) -> Frame {
        let index_name = frames
            .first()
            .map(|f| f.index_name.clone())
            .unwrap_or_else(|| "step".to_string());

        let mut union: Vec<f64> = frames.iter().flat_map(|f| f.index.iter().copied()).collect();
        union.sort_by(f64::total_cmp);
        union.dedup_by(|a, b| a.total_cmp(b).is_eq());

        let mut joined = Frame {
            index_name,
            index: union,
            columns: Vec::new(),
        };

        for frame in frames {
            // Steps are keyed by bit pattern; exact equality is intended here
            let positions: HashMap<u64, usize> = frame
                .index
                .iter()
                .enumerate()
                .map(|(row, step)| (step.to_bits(), row))
                .collect();

            for column in &frame.columns {
                let values = joined
                    .index
                    .iter()
                    .map(|step| {
                        positions
                            .get(&step.to_bits())
                            .and_then(|&row| column.values[row])
                    })
                    .collect();
                joined.columns.push(Column { name: column.name.clone(), values });
            }
        }

        joined
    }

    /// Fill interior gaps of every column by index-proportional linear
    /// interpolation.
    ///
    /// Only cells strictly between a column's first and last present value
    /// are filled; nothing is fabricated outside a column's observed span.
    pub fn interpolate_interior(&mut self) {
        for column in &mut self.columns {
            interpolate_column(&self.index, &mut column.values);
        }
    }

    /// Exponentially-weighted moving average of every column.
    ///
    /// Pandas-compatible adjusted weighting: the weight of an observation
    /// decays by half every `halflife` rows, absent cells decay the running
    /// weights without contributing, and the running mean is emitted at
    /// every row once a value has been seen. A non-positive halflife is the
    /// identity.
    pub fn ewm_mean(&self, halflife: f64) -> Frame {
        if halflife <= 0.0 {
            return self.clone();
        }
        let decay = 0.5f64.powf(1.0 / halflife);

        let mut out = self.clone();
        for column in &mut out.columns {
            let mut num = 0.0;
            let mut den = 0.0;
            for cell in column.values.iter_mut() {
                num *= decay;
                den *= decay;
                if let Some(x) = *cell {
                    num += x;
                    den += 1.0;
                }
                *cell = (den > 0.0).then(|| num / den);
            }
        }
        out
    }
}

/// Linear interpolation over one column, restricted to the interior span
fn interpolate_column(index: &[f64], values: &mut [Option<f64>]) {
    let Some(first) = values.iter().position(|v| v.is_some()) else {
        return;
    };
    let Some(last) = values.iter().rposition(|v| v.is_some()) else {
        return;
    };

    let mut prev = first;
    for row in first + 1..=last {
        if values[row].is_some() {
            prev = row;
            continue;
        }
        // Next present cell; exists because `last` is present
        let Some(next) = (row + 1..=last).find(|&r| values[r].is_some()) else {
            return;
        };
        let (x0, x1) = (index[prev], index[next]);
        let (Some(y0), Some(y1)) = (values[prev], values[next]) else {
            return;
        };
        let t = if x1 > x0 { (index[row] - x0) / (x1 - x0) } else { 0.0 };
        values[row] = Some(y0 + (y1 - y0) * t);
    }
}

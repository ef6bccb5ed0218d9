//! Draw-order and legend-order policies for group names.

use std::cmp::Ordering;

/// How groups are ordered for drawing and in the legend
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SortOrder {
    /// Keep the grouping insertion order
    #[default]
    Insertion,
    /// Explicit list: listed names first, in list order, then the rest
    Given(Vec<String>),
    /// Alphanumeric with numeric substrings compared as integers
    Natural,
    /// Ascending by final mean value
    FinalValue,
    /// Descending by final mean value
    FinalValueDesc,
}

/// Order group names according to the policy.
///
/// `entries` pairs each name with its final mean value (None when a group
/// has no data); for the value orders, groups without a value sort last.
pub fn sorted_names(entries: &[(String, Option<f64>)], order: &SortOrder) -> Vec<String> {
    let mut names: Vec<String> = entries.iter().map(|(n, _)| n.clone()).collect();
    match order {
        SortOrder::Insertion => {}
        SortOrder::Given(listed) => {
            let mut ordered: Vec<String> = listed
                .iter()
                .filter(|l| names.contains(l))
                .cloned()
                .collect();
            for name in names {
                if !ordered.contains(&name) {
                    ordered.push(name);
                }
            }
            return ordered;
        }
        SortOrder::Natural => {
            names.sort_by(|a, b| natural_cmp(a, b));
        }
        SortOrder::FinalValue | SortOrder::FinalValueDesc => {
            let desc = *order == SortOrder::FinalValueDesc;
            names.sort_by(|a, b| {
                let va = final_value(entries, a);
                let vb = final_value(entries, b);
                // Groups without a value sort last in either direction
                match (va, vb) {
                    (Some(x), Some(y)) => {
                        let cmp = x.total_cmp(&y);
                        if desc { cmp.reverse() } else { cmp }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }
    }
    names
}

fn final_value(entries: &[(String, Option<f64>)], name: &str) -> Option<f64> {
    entries.iter().find(|(n, _)| n == name).and_then(|(_, v)| *v)
}

/// Compare strings treating runs of digits as integers.
///
/// `"run2" < "run10"`, unlike plain lexicographic order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ta = tokens(a).into_iter();
    let mut tb = tokens(b).into_iter();
    loop {
        match (ta.next(), tb.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let cmp = match (&x, &y) {
                    (Token::Num(n), Token::Num(m)) => cmp_digits(n, m),
                    (Token::Num(_), Token::Text(_)) => Ordering::Less,
                    (Token::Text(_), Token::Num(_)) => Ordering::Greater,
                    (Token::Text(s), Token::Text(t)) => s.cmp(t),
                };
                if cmp != Ordering::Equal {
                    return cmp;
                }
            }
        }
    }
}

#[derive(Debug)]
enum Token {
    Num(String),
    Text(String),
}

fn tokens(s: &str) -> Vec<Token> {
    let mut out = Vec::new();
    for c in s.chars() {
        let is_digit = c.is_ascii_digit();
        match out.last_mut() {
            Some(Token::Num(run)) if is_digit => run.push(c),
            Some(Token::Text(run)) if !is_digit => run.push(c),
            _ if is_digit => out.push(Token::Num(c.to_string())),
            _ => out.push(Token::Text(c.to_string())),
        }
    }
    out
}

/// Compare two digit runs numerically without parsing into a fixed width
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

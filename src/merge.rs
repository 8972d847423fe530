use std::collections::{HashMap, HashSet, hash_map::Entry};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{data::Cell, table::Table};

pub const SOURCE_SUFFIX: &str = "_src";
pub const DETAIL_SUFFIX: &str = "_det";

#[derive(Debug, Clone)]
pub struct JoinSpec<'a> {
    pub left_key: &'a str,
    pub right_key: &'a str,
    /// Appended to column names present on both sides (left, right).
    pub suffixes: (&'a str, &'a str),
    /// Left key values that never join, such as the no-match sentinel.
    pub never_match: &'a [&'a str],
}

impl<'a> JoinSpec<'a> {
    pub fn new(left_key: &'a str, right_key: &'a str) -> Self {
        Self {
            left_key,
            right_key,
            suffixes: (SOURCE_SUFFIX, DETAIL_SUFFIX),
            never_match: &[],
        }
    }

    pub fn never_match(mut self, values: &'a [&'a str]) -> Self {
        self.never_match = values;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutput {
    pub table: Table,
    pub matched_rows: usize,
}

/// Left outer join keeping every left row exactly once. When several right
/// rows share a key the first one is used.
pub fn left_join(left: &Table, right: &Table, spec: &JoinSpec<'_>) -> Result<JoinOutput> {
    let left_idx = left
        .require_column(spec.left_key)
        .context("Resolving left join key")?;
    let right_idx = right
        .require_column(spec.right_key)
        .context("Resolving right join key")?;

    let lookup = build_right_lookup(right, right_idx);
    let headers = build_output_headers(left.headers(), right.headers(), spec.suffixes);
    let right_width = right.headers().len();

    let mut table = Table::new(headers);
    let mut matched_rows = 0usize;
    for row in left.rows() {
        let key_text = row[left_idx].as_text();
        let key: &str = &key_text;
        let matched = if row[left_idx].is_empty() || spec.never_match.contains(&key) {
            None
        } else {
            lookup.get(key).map(|idx| &right.rows()[*idx])
        };
        let mut combined = row.clone();
        match matched {
            Some(right_row) => {
                matched_rows += 1;
                combined.extend(right_row.iter().cloned());
            }
            None => combined.extend(std::iter::repeat_n(Cell::Empty, right_width)),
        }
        table.push_row(combined).context("Writing joined row")?;
    }

    info!(
        "Join complete: {} output row(s), {} matched row(s)",
        table.row_count(),
        matched_rows
    );
    Ok(JoinOutput {
        table,
        matched_rows,
    })
}

fn build_right_lookup(right: &Table, key_idx: usize) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (row_idx, row) in right.rows().iter().enumerate() {
        let cell = &row[key_idx];
        if cell.is_empty() {
            continue;
        }
        match map.entry(cell.as_text().into_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(row_idx);
            }
            Entry::Occupied(existing) => {
                warn!(
                    "Duplicate join key '{}' on detail row {}; keeping row {}",
                    existing.key(),
                    row_idx + 2,
                    existing.get() + 2
                );
            }
        }
    }
    map
}

fn build_output_headers(
    left_headers: &[String],
    right_headers: &[String],
    suffixes: (&str, &str),
) -> Vec<String> {
    let left_names: HashSet<&str> = left_headers.iter().map(String::as_str).collect();
    let right_names: HashSet<&str> = right_headers.iter().map(String::as_str).collect();

    let left = left_headers.iter().map(|name| {
        if right_names.contains(name.as_str()) {
            format!("{name}{}", suffixes.0)
        } else {
            name.clone()
        }
    });
    let right = right_headers.iter().map(|name| {
        if left_names.contains(name.as_str()) {
            format!("{name}{}", suffixes.1)
        } else {
            name.clone()
        }
    });
    left.chain(right).collect()
}

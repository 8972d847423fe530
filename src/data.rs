use std::{borrow::Cow, fmt};

use calamine::{Data, DataType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single spreadsheet value. `Empty` is the missing marker used for blank
/// cells and for the detail side of unmatched join rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    // Listed before `String` so date-time text read back from JSON keeps its type.
    DateTime(NaiveDateTime),
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Text used for matching and join keys; missing cells read as "".
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::String(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.as_display()),
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::String(s) => s.clone(),
            Cell::Integer(i) => i.to_string(),
            Cell::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Cell::Boolean(b) => b.to_string(),
            Cell::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::String(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::String(value)
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::String(s) if s.is_empty() => Cell::Empty,
            Data::String(s) => Cell::String(s.clone()),
            Data::Int(i) => Cell::Integer(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Boolean(*b),
            Data::DateTime(_) => value
                .as_datetime()
                .map(Cell::DateTime)
                .unwrap_or_else(|| Cell::String(value.to_string())),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::String(s.clone()),
            // Formula errors such as #N/A carry no usable value.
            Data::Error(_) => Cell::Empty,
        }
    }
}

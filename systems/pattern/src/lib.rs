#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Compact hexadecimal pattern descriptions.
//!
//! A pattern is a `width` x `height` block of cells. Each row is a string of
//! hexadecimal digits; every digit expands to four cells, most significant bit
//! first, and a set bit marks a living cell. Decoding centres the block in the
//! grid and produces a [`SeedPattern`] covering every cell, so a malformed
//! description never touches the live buffers.

use agelife_core::{CellAge, GridGeometry, RuleSet, SeedPattern};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value of the `rules` field that selects "3-4 life".
pub const THREE_FOUR_RULES: &str = "3-4";

/// Value of the `auto-stop` field that disables auto-stop.
pub const AUTO_STOP_DISABLED: &str = "false";

const CELLS_PER_DIGIT: usize = 4;

/// Structured pattern document as read from an external file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatternDescription {
    /// Number of cells encoded per row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    /// Number of rows to decode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    /// Optional rule-set indicator; [`THREE_FOUR_RULES`] selects "3-4 life".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
    /// Optional auto-stop indicator; [`AUTO_STOP_DISABLED`] turns auto-stop off.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_stop: Option<String>,
    /// Hexadecimal row strings, top row first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<String>>,
}

/// Pattern dimension written either as a number or as text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    /// Dimension given as an integer literal.
    Number(i64),
    /// Dimension given as a string that must parse as a non-negative integer.
    Text(String),
}

impl Dimension {
    fn resolve(&self, field: &'static str) -> Result<u32, PatternError> {
        let invalid = || PatternError::InvalidDimension {
            field,
            value: self.to_string(),
        };
        match self {
            Self::Number(value) => u32::try_from(*value).map_err(|_| invalid()),
            Self::Text(value) => value.trim().parse::<u32>().map_err(|_| invalid()),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<u32> for Dimension {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

/// Reasons a pattern description cannot be decoded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A required field was absent.
    #[error("pattern is missing the `{0}` field")]
    MissingField(&'static str),
    /// A dimension was negative or not an integer.
    #[error("pattern {field} `{value}` is not a non-negative integer")]
    InvalidDimension {
        /// Name of the offending field.
        field: &'static str,
        /// Value as written in the description.
        value: String,
    },
    /// A row contained a character that is not a hexadecimal digit.
    #[error("pattern row {row} has invalid digit {digit:?} at position {position}")]
    InvalidDigit {
        /// Zero-based row index within the pattern.
        row: usize,
        /// Zero-based character position within the row.
        position: usize,
        /// Offending character.
        digit: char,
    },
}

/// Decodes a pattern description into a seed covering the whole grid.
///
/// The width is clamped to the grid's columns and the height to both the
/// grid's rows and the number of row strings. The clamped block is centred,
/// rows shorter than the width leave their remaining cells dead, and digits
/// past the width are ignored.
pub fn decode(
    description: &PatternDescription,
    geometry: GridGeometry,
) -> Result<SeedPattern, PatternError> {
    let width = description
        .width
        .as_ref()
        .ok_or(PatternError::MissingField("width"))?
        .resolve("width")?;
    let height = description
        .height
        .as_ref()
        .ok_or(PatternError::MissingField("height"))?
        .resolve("height")?;
    let rows = description
        .rows
        .as_ref()
        .ok_or(PatternError::MissingField("rows"))?;

    let columns = geometry.columns() as usize;
    let grid_rows = geometry.rows() as usize;
    let clamped_width = (width as usize).min(columns);
    let clamped_height = (height as usize).min(grid_rows).min(rows.len());
    if clamped_width < width as usize || clamped_height < height as usize {
        log::warn!(
            "pattern of {width}x{height} clamped to {clamped_width}x{clamped_height} for a {columns}x{grid_rows} grid"
        );
    }

    let start_row = (grid_rows - clamped_height) / 2;
    let start_column = (columns - clamped_width) / 2;
    let mut cells = vec![CellAge::DEAD; geometry.cell_count()];

    for (offset, row) in rows.iter().take(clamped_height).enumerate() {
        let first = (start_row + offset) * columns + start_column;
        decode_row(row, offset, &mut cells[first..first + clamped_width])?;
    }

    Ok(SeedPattern {
        cells,
        rules: rules_override(description.rules.as_deref()),
        auto_stop: auto_stop_override(description.auto_stop.as_deref()),
    })
}

fn decode_row(text: &str, row: usize, target: &mut [CellAge]) -> Result<(), PatternError> {
    let mut digits = text.trim().chars().enumerate();
    let mut nybble = 0;
    let mut mask = 0;

    for cell in target.iter_mut() {
        if mask == 0 {
            let Some((position, digit)) = digits.next() else {
                break;
            };
            nybble = digit.to_digit(16).ok_or(PatternError::InvalidDigit {
                row,
                position,
                digit,
            })?;
            mask = 0b1000;
        }
        if nybble & mask != 0 {
            *cell = CellAge::NEWBORN;
        }
        mask >>= 1;
    }

    Ok(())
}

fn rules_override(value: Option<&str>) -> Option<RuleSet> {
    match value.map(str::trim) {
        Some(THREE_FOUR_RULES) => Some(RuleSet::ThreeFour),
        _ => None,
    }
}

fn auto_stop_override(value: Option<&str>) -> Option<bool> {
    match value.map(str::trim) {
        Some(AUTO_STOP_DISABLED) => Some(false),
        _ => None,
    }
}

/// Captures the living cells of a generation as a pattern description.
///
/// The description spans the bounding box of the living cells; an empty
/// generation yields a zero-sized pattern. Rule set and auto-stop are only
/// written when they differ from the defaults a load would otherwise restore.
#[must_use]
pub fn encode(
    cells: &[CellAge],
    geometry: GridGeometry,
    rules: RuleSet,
    auto_stop: bool,
) -> PatternDescription {
    let columns = geometry.columns() as usize;
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for (index, _) in cells.iter().enumerate().filter(|(_, age)| age.is_alive()) {
        let (row, column) = (index / columns, index % columns);
        bounds = Some(match bounds {
            None => (row, row, column, column),
            Some((top, bottom, left, right)) => (
                top.min(row),
                bottom.max(row),
                left.min(column),
                right.max(column),
            ),
        });
    }

    let (width, rows) = match bounds {
        None => (0, Vec::new()),
        Some((top, bottom, left, right)) => {
            let width = right - left + 1;
            let rows = (top..=bottom)
                .map(|row| {
                    let first = row * columns + left;
                    encode_row(&cells[first..first + width])
                })
                .collect::<Vec<_>>();
            (width, rows)
        }
    };

    PatternDescription {
        width: Some(Dimension::Number(width as i64)),
        height: Some(Dimension::Number(rows.len() as i64)),
        rules: rules
            .is_three_four()
            .then(|| THREE_FOUR_RULES.to_owned()),
        auto_stop: (!auto_stop).then(|| AUTO_STOP_DISABLED.to_owned()),
        rows: Some(rows),
    }
}

fn encode_row(cells: &[CellAge]) -> String {
    cells
        .chunks(CELLS_PER_DIGIT)
        .map(|chunk| {
            let nybble = chunk
                .iter()
                .enumerate()
                .filter(|(_, age)| age.is_alive())
                .fold(0u32, |bits, (offset, _)| bits | (0b1000 >> offset));
            char::from_digit(nybble, 16)
                .map(|digit| digit.to_ascii_uppercase())
                .unwrap_or('0')
        })
        .collect()
}

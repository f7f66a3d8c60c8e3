//! Parser for the multi-part position table.
//!
//! One row per shape id, each holding whitespace-separated numbers. Lines
//! starting with `#` are comments; rows beyond the table size are ignored.

use crate::types::{MultiPositionTable, ROW_LEN, SHAPE_ROWS};
use crate::validation::{Diagnostic, DiagnosticSink};

use super::lines::{parse_number, Lines};

/// Parse a position table. Missing numbers read as 0 and are reported.
pub fn parse_positions(source: &str, sink: &mut dyn DiagnosticSink) -> MultiPositionTable {
    let mut table = MultiPositionTable::new();
    let mut row = 0;

    for (line_no, raw) in Lines::new(source) {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || row >= SHAPE_ROWS {
            continue;
        }
        let numbers = line.split_whitespace().filter_map(parse_number).take(ROW_LEN);
        let mut column = 0;
        for value in numbers {
            table.set(row, column, value);
            column += 1;
        }
        if column < ROW_LEN {
            sink.push(
                Diagnostic::warning(
                    "archmap::parse::position-row",
                    format!("Position row {} is missing {} numbers", row + 1, ROW_LEN - column),
                )
                .at_line(line_no),
            );
        }
        row += 1;
    }

    if row < SHAPE_ROWS {
        sink.warning(
            "archmap::parse::position-rows",
            format!("Position table is missing {} rows", SHAPE_ROWS - row),
        );
    }
    table
}

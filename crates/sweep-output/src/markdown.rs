//! Markdown pipe-table export.

use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{Cell, Table};
use polars::prelude::*;
use sweep_model::any_to_string;

use crate::cell;

/// Renders the table as a Markdown pipe table, optionally with a leading
/// index column.
pub fn write_markdown(df: &DataFrame, include_index: bool) -> String {
    let columns = df.get_columns();
    let mut table = Table::new();
    table.load_preset(ASCII_MARKDOWN);

    let mut header: Vec<Cell> = Vec::with_capacity(columns.len() + 1);
    if include_index {
        header.push(Cell::new(""));
    }
    header.extend(columns.iter().map(|column| Cell::new(column.name().as_str())));
    table.set_header(header);

    for row in 0..df.height() {
        let mut cells: Vec<Cell> = Vec::with_capacity(columns.len() + 1);
        if include_index {
            cells.push(Cell::new(row));
        }
        cells.extend(
            columns
                .iter()
                .map(|column| Cell::new(escape_pipes(&any_to_string(cell(column, row))))),
        );
        table.add_row(cells);
    }
    table.to_string()
}

/// A literal `|` would end the cell early.
fn escape_pipes(text: &str) -> String {
    text.replace('|', "\\|")
}

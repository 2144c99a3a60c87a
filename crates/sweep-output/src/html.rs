//! HTML table export in the familiar `dataframe` layout.

use std::fmt::Write as _;

use polars::prelude::*;
use quick_xml::escape::escape;
use sweep_model::any_to_string;

use crate::cell;

/// Renders the table as `<table border="1" class="dataframe">`.
///
/// With `include_index` a leading header column holds the row position.
pub fn write_html(df: &DataFrame, include_index: bool) -> String {
    let columns = df.get_columns();
    let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n");

    html.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
    if include_index {
        html.push_str("      <th></th>\n");
    }
    for column in columns {
        let _ = writeln!(html, "      <th>{}</th>", escape(column.name().as_str()));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");

    for row in 0..df.height() {
        html.push_str("    <tr>\n");
        if include_index {
            let _ = writeln!(html, "      <th>{row}</th>");
        }
        for column in columns {
            let text = any_to_string(cell(column, row));
            let _ = writeln!(html, "      <td>{}</td>", escape(text.as_str()));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>");
    html
}

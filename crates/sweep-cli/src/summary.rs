use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use sweep_cli::pipeline::{CleanReport, Inspection, OutlierRow};
use sweep_model::{NumericSummary, TableStats, any_to_string};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn stats_table(stats: &TableStats) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Missing values"),
        header_cell("Duplicate rows"),
    ]);
    apply_table_style(&mut table);
    table.add_row(vec![
        Cell::new(stats.rows),
        Cell::new(stats.columns),
        Cell::new(stats.missing_cells),
        Cell::new(stats.duplicate_rows),
    ]);
    table
}

fn stat_cell(value: Option<f64>) -> Cell {
    value.map_or_else(|| dim_cell("-"), |v| Cell::new(format!("{v:.3}")))
}

fn numeric_table(summaries: &[NumericSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(
        ["Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
            .into_iter()
            .map(header_cell)
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for idx in 1..9 {
        align_column(&mut table, idx, CellAlignment::Right);
    }
    for summary in summaries {
        table.add_row(vec![
            Cell::new(&summary.name),
            Cell::new(summary.count),
            stat_cell(summary.mean),
            stat_cell(summary.std),
            stat_cell(summary.min),
            stat_cell(summary.q25),
            stat_cell(summary.median),
            stat_cell(summary.q75),
            stat_cell(summary.max),
        ]);
    }
    table
}

pub fn print_inspection(inspection: &Inspection) {
    println!("Dataset: {} ({})", inspection.name, inspection.size);
    println!("{}", stats_table(&inspection.stats));

    let mut columns = Table::new();
    columns.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Missing"),
    ]);
    apply_table_style(&mut columns);
    align_column(&mut columns, 2, CellAlignment::Right);
    for summary in &inspection.columns {
        let missing = if summary.missing == 0 {
            dim_cell(0)
        } else {
            Cell::new(summary.missing).fg(Color::Yellow)
        };
        columns.add_row(vec![
            Cell::new(&summary.name),
            Cell::new(&summary.dtype),
            missing,
        ]);
    }
    println!("{columns}");

    if !inspection.numeric.is_empty() {
        println!("Summary statistics:");
        println!("{}", numeric_table(&inspection.numeric));
    }

    let preview = &inspection.preview;
    let mut rows = Table::new();
    rows.set_header(
        preview
            .get_columns()
            .iter()
            .map(|column| header_cell(column.name().as_str()))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut rows);
    for idx in 0..preview.height() {
        rows.add_row(
            preview
                .get_columns()
                .iter()
                .map(|column| {
                    column
                        .get(idx)
                        .map(any_to_string)
                        .map_or_else(|_| dim_cell(""), Cell::new)
                })
                .collect::<Vec<_>>(),
        );
    }
    println!("Preview (first {} rows):", preview.height());
    println!("{rows}");
}

pub fn print_clean_report(report: &CleanReport, written: Option<&std::path::Path>) {
    println!("Dataset: {}", report.dataset);
    if !report.steps.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("#"),
            header_cell("Step"),
            header_cell("Rows"),
            header_cell("Columns"),
        ]);
        apply_table_style(&mut table);
        align_column(&mut table, 2, CellAlignment::Right);
        align_column(&mut table, 3, CellAlignment::Right);
        for (idx, step) in report.steps.iter().enumerate() {
            table.add_row(vec![
                dim_cell(idx + 1),
                Cell::new(&step.step),
                Cell::new(step.rows),
                Cell::new(step.columns),
            ]);
        }
        println!("{table}");
    }

    if report.changes.identical {
        println!("No changes from the original data.");
    } else {
        for line in report.changes.lines() {
            println!("  {line}");
        }
    }

    let size = sweep_model::format_byte_size(report.artifact.bytes.len() as u64);
    match written {
        Some(path) => println!("Wrote {} ({size})", path.display()),
        None => println!(
            "Dry run: {} ({size}) not written",
            report.artifact.file_name
        ),
    }
}

pub fn print_outliers(column: &str, rows: &[OutlierRow]) {
    if rows.is_empty() {
        println!("No outliers in {column}.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Row"), header_cell(column)]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for row in rows {
        table.add_row(vec![Cell::new(row.row), Cell::new(&row.value)]);
    }
    println!("{} outliers in {column}:", rows.len());
    println!("{table}");
}

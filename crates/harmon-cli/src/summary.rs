//! Result tables printed after each subcommand.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use polars::prelude::{AnyValue, DataFrame};

use harmon_cli::pipeline::PipelineResult;
use harmon_common::any_to_string;
use harmon_model::VariableMetadata;
use harmon_report::WaveDocument;

pub fn print_wave_table(documents: &[WaveDocument]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Wave"),
        header_cell("File"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Labelled"),
        header_cell("Memory"),
    ]);
    apply_wide_table_style(&mut table);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for document in documents {
        table.add_row(vec![
            Cell::new(&document.id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&document.filename),
            Cell::new(document.rows),
            Cell::new(document.columns),
            Cell::new(document.labelled_variables),
            Cell::new(human_bytes(document.memory_bytes)),
        ]);
    }
    println!("{table}");
}

pub fn print_metadata_table(rows: &[VariableMetadata]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Wave"),
        header_cell("Variable"),
        header_cell("Label"),
        header_cell("Class"),
        header_cell("Labels"),
        header_cell("Valid"),
        header_cell("NA"),
    ]);
    apply_table_style(&mut table);
    for index in 4..7 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.survey_id).fg(Color::Blue),
            Cell::new(&row.var_name_orig),
            Cell::new(&row.label_norm),
            Cell::new(row.class.as_str()),
            Cell::new(row.n_labels),
            Cell::new(row.n_valid_labels()),
            count_cell(row.n_na_labels(), Color::Yellow),
        ]);
    }
    println!("{table}");
}

pub fn print_harmonize_summary(result: &PipelineResult, outputs: &[std::path::PathBuf], dry_run: bool) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Wave"),
        header_cell("Rows"),
        header_cell("Harmonized"),
    ]);
    apply_wide_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let mut total_rows = 0usize;
    for wave in &result.waves {
        total_rows += wave.rows;
        table.add_row(vec![
            Cell::new(&wave.id)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(wave.rows),
            count_cell(wave.harmonized, Color::Green),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
    if dry_run {
        println!("Dry run: no files written.");
    } else {
        for path in outputs {
            println!("Output: {}", path.display());
        }
    }
}

/// Prints any data frame as a table, nulls rendered as empty cells.
pub fn print_dataframe(title: &str, frame: &DataFrame) {
    let mut table = Table::new();
    table.set_header(
        frame
            .get_column_names_str()
            .into_iter()
            .map(header_cell)
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for row in 0..frame.height() {
        table.add_row(
            frame
                .get_columns()
                .iter()
                .map(|column| Cell::new(any_to_string(column.get(row).unwrap_or(AnyValue::Null))))
                .collect::<Vec<_>>(),
        );
    }
    println!();
    println!("{title}:");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn human_bytes(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes >= KIB * KIB {
        format!("{:.1} MiB", bytes / (KIB * KIB))
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes / KIB)
    } else {
        format!("{bytes} B")
    }
}

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use vizmap_engine::{AssignmentResult, RemapCompleteness};
use vizmap_model::{TrackedDrilldown, TrackedFields, UsageKind, UsermetaDatasetField};

const USAGE_COLUMNS: [UsageKind; 6] = [
    UsageKind::Direct,
    UsageKind::CrossHighlightValue,
    UsageKind::CrossHighlightComparator,
    UsageKind::CrossHighlightStatus,
    UsageKind::SelectionStatus,
    UsageKind::RowIdentifier,
];

pub fn tracked_table(tracked: &TrackedFields) -> Table {
    let mut table = Table::new();
    let mut header = vec![
        header_cell("Placeholder"),
        header_cell("Field"),
        header_cell("Key"),
        header_cell("Matches"),
    ];
    header.extend(USAGE_COLUMNS.iter().map(|kind| header_cell(kind.as_str())));
    table.set_header(header);
    apply_table_style(&mut table);
    for idx in 3..3 + 1 + USAGE_COLUMNS.len() {
        align_column(&mut table, idx, CellAlignment::Right);
    }

    let mut entries: Vec<_> = tracked.iter().collect();
    entries.sort_by(|a, b| {
        (a.placeholder.is_none(), &a.placeholder, &a.field_key).cmp(&(
            b.placeholder.is_none(),
            &b.placeholder,
            &b.field_key,
        ))
    });

    let mut total = 0usize;
    for entry in entries {
        total += entry.match_count;
        let placeholder = match &entry.placeholder {
            Some(token) => Cell::new(token.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            None => dim_cell("reserved"),
        };
        let mut row = vec![
            placeholder,
            Cell::new(&entry.name),
            dim_cell(&entry.field_key),
            Cell::new(entry.match_count),
        ];
        row.extend(
            USAGE_COLUMNS
                .iter()
                .map(|kind| count_cell(entry.count_for(*kind))),
        );
        table.add_row(row);
    }
    let mut footer = vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} fields", tracked.len())).add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total).add_attribute(Attribute::Bold),
    ];
    footer.extend(USAGE_COLUMNS.iter().map(|_| dim_cell("-")));
    table.add_row(footer);
    table
}

pub fn slots_table(slots: &[UsermetaDatasetField]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Slot"),
        header_cell("Name"),
        header_cell("Type"),
        header_cell("Kind"),
        header_cell("Assigned"),
    ]);
    apply_table_style(&mut table);
    for slot in slots {
        let assigned = match &slot.supplied_object_name {
            Some(name) => Cell::new(name).fg(Color::Green),
            None => Cell::new("unassigned").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&slot.key)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&slot.name),
            Cell::new(slot.data_type.as_str()),
            Cell::new(slot.kind.as_str()),
            assigned,
        ]);
    }
    table
}

pub fn suggestions_table(result: &AssignmentResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Slot"),
        header_cell("Field"),
        header_cell("Key"),
        header_cell("Confidence"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for suggestion in &result.suggestions {
        table.add_row(vec![
            Cell::new(&suggestion.slot_key)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&suggestion.object_name),
            dim_cell(&suggestion.object_key),
            confidence_cell(suggestion.confidence),
        ]);
    }
    for slot in &result.unassigned_slots {
        table.add_row(vec![
            Cell::new(slot).fg(Color::Blue),
            Cell::new("no match").fg(Color::Yellow),
            dim_cell("-"),
            dim_cell("-"),
        ]);
    }
    table
}

/// One-line completeness report.
pub fn completeness_line(completeness: &RemapCompleteness, drilldown: &TrackedDrilldown) -> String {
    format!(
        "fields assigned: {}, drilldown: {}, complete: {}",
        yes_no(completeness.remap_all_fields_assigned),
        match (drilldown.is_current, completeness.remap_drilldown_assigned) {
            (false, _) => "not used",
            (true, true) => "bound",
            (true, false) => "missing",
        },
        yes_no(completeness.remap_all_dependencies_assigned),
    )
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
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

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell("-")
    }
}

fn confidence_cell(confidence: f32) -> Cell {
    let color = if confidence >= 0.95 {
        Color::Green
    } else if confidence >= 0.8 {
        Color::Yellow
    } else {
        Color::Red
    };
    Cell::new(format!("{confidence:.2}")).fg(color)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

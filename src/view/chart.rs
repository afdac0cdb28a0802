use crate::data::model::{CellValue, Table};

/// Label shown for a null category.
const NULL_LABEL: &str = "(null)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Pie,
}

/// One bar or one pie slice.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartMark {
    pub category: CellValue,
    pub label: String,
    pub value: f64,
    /// Share of the chart total, 0 when the total is 0.
    pub fraction: f64,
}

/// Two-field encoding: the measure (quantitative) against the first
/// non-measure column (nominal).
#[derive(Debug, Clone, PartialEq)]
pub struct ChartEncoding {
    pub kind: ChartKind,
    pub category_column: String,
    pub measure_column: String,
    pub marks: Vec<ChartMark>,
    /// Bars carry the category on the axis; pies need a legend.
    pub legend: bool,
}

impl ChartEncoding {
    /// Distinct categories in first-seen mark order, for colours and legend.
    pub fn categories(&self) -> Vec<&CellValue> {
        let mut out: Vec<&CellValue> = Vec::new();
        for mark in &self.marks {
            if !out.contains(&&mark.category) {
                out.push(&mark.category);
            }
        }
        out
    }

    pub fn total(&self) -> f64 {
        self.marks.iter().map(|m| m.value).sum()
    }
}

/// Encode `table` as a chart.  Returns `None` when the table has no
/// categorical column to put on the category axis.
///
/// * Bar: one bar per category (rows sharing a category stack into one bar),
///   ordered by descending value regardless of the table's order.
/// * Pie: one slice per row, in table order.
///
/// Null measures count as 0.
pub fn encode(table: &Table, kind: ChartKind) -> Option<ChartEncoding> {
    let category_index = table.first_category_index()?;

    let mut marks: Vec<ChartMark> = Vec::new();
    for row in table.rows() {
        let category = &row[category_index];
        let value = table.measure_value(row).unwrap_or(0.0);
        match kind {
            ChartKind::Bar => match marks.iter_mut().find(|m| &m.category == category) {
                Some(mark) => mark.value += value,
                None => marks.push(new_mark(category, value)),
            },
            ChartKind::Pie => marks.push(new_mark(category, value)),
        }
    }

    if kind == ChartKind::Bar {
        // Stable, so equal bars keep first-seen order.
        marks.sort_by(|a, b| b.value.total_cmp(&a.value));
    }

    let total: f64 = marks.iter().map(|m| m.value).sum();
    if total != 0.0 {
        for mark in &mut marks {
            mark.fraction = mark.value / total;
        }
    }

    Some(ChartEncoding {
        kind,
        category_column: table.columns()[category_index].name.clone(),
        measure_column: table.measure_column().name.clone(),
        marks,
        legend: kind == ChartKind::Pie,
    })
}

/// Axis / legend text for a category.
pub fn category_label(category: &CellValue) -> String {
    match category {
        CellValue::Null => NULL_LABEL.to_string(),
        other => other.to_string(),
    }
}

fn new_mark(category: &CellValue, value: f64) -> ChartMark {
    ChartMark {
        category: category.clone(),
        label: category_label(category),
        value,
        fraction: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::query::{apply, SortOrder};

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn table(rows: &[(&str, i64)]) -> Table {
        Table::new(
            vec!["dept".into(), "count".into()],
            rows.iter()
                .map(|(d, c)| vec![s(d), CellValue::Integer(*c)])
                .collect(),
            "count",
        )
        .unwrap()
    }

    fn values(enc: &ChartEncoding) -> Vec<f64> {
        enc.marks.iter().map(|m| m.value).collect()
    }

    #[test]
    fn bars_are_descending_regardless_of_input_order() {
        let rows = [("A", 5), ("B", 10), ("C", 5)];
        let raw = table(&rows);

        for input in [
            raw.clone(),
            apply(&raw, &[], SortOrder::Ascending.into()).unwrap(),
            apply(&raw, &[], SortOrder::Descending.into()).unwrap(),
        ] {
            let enc = encode(&input, ChartKind::Bar).unwrap();
            assert_eq!(values(&enc), vec![10.0, 5.0, 5.0]);
            assert!(!enc.legend);
        }
    }

    #[test]
    fn bar_encoding_uses_first_category_column() {
        let t = Table::new(
            vec!["count".into(), "role".into(), "dept".into()],
            vec![vec![CellValue::Integer(1), s("X"), s("A")]],
            "count",
        )
        .unwrap();
        let enc = encode(&t, ChartKind::Bar).unwrap();
        assert_eq!(enc.category_column, "role");
        assert_eq!(enc.measure_column, "count");
        assert_eq!(enc.marks[0].label, "X");
    }

    #[test]
    fn bars_stack_rows_sharing_a_category() {
        let enc = encode(&table(&[("A", 2), ("B", 4), ("A", 3)]), ChartKind::Bar).unwrap();
        let labels: Vec<_> = enc.marks.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(values(&enc), vec![5.0, 4.0]);
    }

    #[test]
    fn pie_keeps_rows_and_reports_fractions() {
        let enc = encode(&table(&[("A", 1), ("B", 3), ("A", 4)]), ChartKind::Pie).unwrap();
        assert!(enc.legend);
        assert_eq!(values(&enc), vec![1.0, 3.0, 4.0]);
        assert_eq!(enc.total(), 8.0);
        let fractions: Vec<_> = enc.marks.iter().map(|m| m.fraction).collect();
        assert_eq!(fractions, vec![0.125, 0.375, 0.5]);
        assert_eq!(enc.categories(), vec![&s("A"), &s("B")]);
    }

    #[test]
    fn null_measures_and_categories_are_drawn_as_zero_and_placeholder() {
        let t = Table::new(
            vec!["dept".into(), "count".into()],
            vec![
                vec![CellValue::Null, CellValue::Integer(2)],
                vec![s("A"), CellValue::Null],
            ],
            "count",
        )
        .unwrap();
        let enc = encode(&t, ChartKind::Pie).unwrap();
        assert_eq!(enc.marks[0].label, NULL_LABEL);
        assert_eq!(enc.marks[1].value, 0.0);
        assert_eq!(enc.marks[1].fraction, 0.0);
    }

    #[test]
    fn measure_only_tables_cannot_be_charted() {
        let t = Table::new(vec!["count".into()], vec![vec![CellValue::Integer(1)]], "count")
            .unwrap();
        assert!(encode(&t, ChartKind::Bar).is_none());
    }

    #[test]
    fn empty_table_gives_empty_chart() {
        let enc = encode(&table(&[]), ChartKind::Pie).unwrap();
        assert!(enc.marks.is_empty());
        assert_eq!(enc.total(), 0.0);
    }
}

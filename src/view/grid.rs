use crate::data::model::Table;

/// Editable scratch copy of a table for the grid view.
///
/// Edits stay local to the grid: they never reach the pipeline and are
/// discarded when the grid is rebuilt from the next pipeline output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridModel {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl GridModel {
    /// Project every column and row of `table`, in order.
    pub fn from_table(table: &Table) -> Self {
        GridModel {
            header: table.columns().iter().map(|c| c.name.clone()).collect(),
            rows: table
                .rows()
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    /// Append a blank row.
    pub fn add_row(&mut self) {
        self.rows.push(vec![String::new(); self.header.len()]);
    }

    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }
}

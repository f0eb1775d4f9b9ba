use colored::*;
use unicode_width::UnicodeWidthStr;

/// Plain bordered table for result listings. Column widths follow the
/// widest cell, measured in display width rather than bytes.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) {
        let widths = self.column_widths();
        let separator = self.separator(&widths);

        println!("{}", separator);
        let header_cells: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!(" {} ", pad(h, *w)).bright_green().bold().to_string())
            .collect();
        println!("|{}|", header_cells.join("|"));
        println!("{}", separator);

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!(" {} ", pad(cell, *w)))
                .collect();
            println!("|{}|", cells.join("|"));
        }
        println!("{}", separator);
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| UnicodeWidthStr::width(h.as_str()))
            .collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(UnicodeWidthStr::width(cell.as_str()));
                }
            }
        }
        widths
    }

    fn separator(&self, widths: &[usize]) -> ColoredString {
        let segments: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        format!("+{}+", segments.join("+")).bright_black()
    }
}

fn pad(cell: &str, width: usize) -> String {
    let padding = width.saturating_sub(UnicodeWidthStr::width(cell));
    format!("{}{}", cell, " ".repeat(padding))
}

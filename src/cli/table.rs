use crossterm::terminal;

use crate::cli::output;

const FALLBACK_WIDTH: usize = 100;
const MIN_FLEX_WIDTH: usize = 8;

/// Declarative description of a table column.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub header: String,
    pub width: usize,
    pub align_right: bool,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, width: usize) -> Self {
        Self {
            header: header.into(),
            width,
            align_right: false,
        }
    }

    pub fn right(mut self) -> Self {
        self.align_right = true;
        self
    }
}

/// Read-only overview rendered as padded columns. The last column absorbs
/// whatever terminal width is left.
#[derive(Debug, Clone)]
pub struct Table {
    pub title: Option<String>,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: Option<impl Into<String>>, columns: Vec<TableColumn>) -> Self {
        Self {
            title: title.map(Into::into),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn add_row<S: Into<String>>(&mut self, cells: Vec<S>) {
        self.rows
            .push(cells.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Lines of the rendered table, sized for `max_width` columns.
    pub fn render_lines(&self, max_width: usize) -> Vec<String> {
        let widths = self.fitted_widths(max_width);
        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        let header: Vec<String> = self.columns.iter().map(|col| col.header.clone()).collect();
        lines.push(self.render_row(&header, &widths));
        let rule_width = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        lines.push("-".repeat(rule_width));
        for row in &self.rows {
            lines.push(self.render_row(row, &widths));
        }
        lines
    }

    fn fitted_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.columns.iter().map(|col| col.width).collect();
        let Some(last) = widths.len().checked_sub(1) else {
            return widths;
        };
        let fixed: usize = widths[..last].iter().map(|w| w + 1).sum();
        let available = max_width.saturating_sub(fixed).max(MIN_FLEX_WIDTH);
        let longest = self
            .rows
            .iter()
            .filter_map(|row| row.get(last))
            .map(|cell| cell.chars().count())
            .chain(std::iter::once(self.columns[last].header.chars().count()))
            .max()
            .unwrap_or(0);
        widths[last] = longest.max(widths[last]).min(available);
        widths
    }

    fn render_row(&self, cells: &[String], widths: &[usize]) -> String {
        let rendered: Vec<String> = self
            .columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(idx, (column, width))| {
                let cell = truncate(cells.get(idx).map(String::as_str).unwrap_or(""), *width);
                if column.align_right {
                    format!("{cell:>width$}")
                } else {
                    format!("{cell:<width$}")
                }
            })
            .collect();
        rendered.join(" ").trim_end().to_string()
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width <= 1 {
        return text.chars().take(width).collect();
    }
    let mut short: String = text.chars().take(width - 1).collect();
    short.push('~');
    short
}

pub struct TableRenderer;

impl TableRenderer {
    pub fn render(table: &Table) {
        if let Some(title) = &table.title {
            output::section(title);
        }
        let width = terminal::size()
            .map(|(cols, _)| usize::from(cols))
            .unwrap_or(FALLBACK_WIDTH);
        for line in table.render_lines(width) {
            output::info(line);
        }
    }
}

//! Width-aware table rendering for terminal output.
//!
//! Columns carry a priority (0 = most important). When the table does not
//! fit, the least important columns are hidden first; the first column is
//! always kept and any remaining overflow is truncated with `…`.

const SEPARATOR: &str = " | ";
const MIN_SHRINK_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub priority: u8,
}

impl Column {
    pub const fn new(header: &'static str, priority: u8) -> Self {
        Self { header, priority }
    }
}

/// Row-oriented view of a model for table/CSV output.
pub trait Tabular {
    fn columns() -> Vec<Column>;
    fn cells(&self) -> Vec<String>;
}

pub fn terminal_width(configured: Option<usize>) -> usize {
    configured
        .or_else(|| {
            std::env::var("COLUMNS")
                .ok()
                .and_then(|c| c.trim().parse::<usize>().ok())
        })
        .filter(|w| *w > 0)
        .unwrap_or(100)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn fit(cell: &str, width: usize) -> String {
    let len = char_len(cell);
    if len <= width {
        return format!("{}{}", cell, " ".repeat(width - len));
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = cell.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn total_width(widths: &[usize], visible: &[usize]) -> usize {
    let content: usize = visible.iter().map(|&i| widths[i]).sum();
    content + SEPARATOR.len() * visible.len().saturating_sub(1)
}

pub fn render_table(columns: &[Column], rows: &[Vec<String>], max_width: usize) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| char_len(c.header)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(columns.len()) {
            widths[i] = widths[i].max(char_len(cell));
        }
    }

    let mut visible: Vec<usize> = (0..columns.len()).collect();

    // 先隱藏低優先度欄位
    while total_width(&widths, &visible) > max_width && visible.len() > 1 {
        let drop_pos = visible
            .iter()
            .enumerate()
            .skip(1)
            .max_by_key(|&(pos, &i)| (columns[i].priority, pos))
            .map(|(pos, _)| pos);
        match drop_pos {
            Some(pos) => {
                visible.remove(pos);
            }
            None => break,
        }
    }

    // 仍然太寬就截斷最寬的欄位
    while total_width(&widths, &visible) > max_width {
        let widest = visible
            .iter()
            .copied()
            .filter(|&i| widths[i] > MIN_SHRINK_WIDTH)
            .max_by_key(|&i| widths[i]);
        match widest {
            Some(i) => widths[i] -= 1,
            None => break,
        }
    }

    let render_line = |cells: Vec<String>| -> String {
        cells.join(SEPARATOR).trim_end().to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_line(
        visible
            .iter()
            .map(|&i| fit(columns[i].header, widths[i]))
            .collect(),
    ));
    lines.push(render_line(
        visible.iter().map(|&i| "-".repeat(widths[i])).collect(),
    ));
    for row in rows {
        lines.push(render_line(
            visible
                .iter()
                .map(|&i| fit(row.get(i).map(String::as_str).unwrap_or(""), widths[i]))
                .collect(),
        ));
    }

    lines.join("\n")
}

pub fn render_records<T: Tabular>(records: &[T], max_width: usize) -> String {
    let rows: Vec<Vec<String>> = records.iter().map(Tabular::cells).collect();
    render_table(&T::columns(), &rows, max_width)
}

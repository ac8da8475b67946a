#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Bordered monospace table, the layout chat clients show inside a code block.
///
/// ```text
/// +----------+--------+
/// | Name     | Amazon |
/// +----------+--------+
/// | Wingspan |   45.0 |
/// +----------+--------+
/// ```
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let align = vec![Align::Left; headers.len()];
        Self {
            headers,
            align,
            rows: Vec::new(),
        }
    }

    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.align.get_mut(column) {
            *slot = align;
        }
        self
    }

    /// Rows shorter than the header are padded with empty cells.
    pub fn add_row(&mut self, cells: Vec<String>) {
        let mut cells = cells;
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                std::iter::once(&self.headers[col])
                    .chain(self.rows.iter().map(|row| &row[col]))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let border = widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+");
        let border = format!("+{}+", border);

        let mut lines = vec![border.clone()];
        lines.push(self.render_line(&self.headers, &widths, true));
        lines.push(border.clone());
        for row in &self.rows {
            lines.push(self.render_line(row, &widths, false));
        }
        lines.push(border);

        lines.join("\n")
    }

    fn render_line(&self, cells: &[String], widths: &[usize], header: bool) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(&self.align)
            .map(|((cell, width), align)| match (header, align) {
                // Headers are centred.
                (true, _) => {
                    let total = width - cell.chars().count();
                    let left = total / 2;
                    format!("{}{}{}", " ".repeat(left), cell, " ".repeat(total - left))
                }
                (false, Align::Left) => format!("{:<width$}", cell, width = width),
                (false, Align::Right) => format!("{:>width$}", cell, width = width),
            })
            .collect();

        format!("| {} |", padded.join(" | "))
    }
}

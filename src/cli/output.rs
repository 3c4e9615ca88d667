//! Terminal output helpers.
//!
//! Listings render as aligned columns or CSV; status messages go through
//! small styled helpers that respect NO_COLOR. Decrypted secrets are
//! printed bare so `stockade get` composes with pipes.

use std::io::{self, Write};

use console::style;

/// Check if color output is disabled via the NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Print a success message with checkmark.
pub fn success(msg: &str) {
    if colors_enabled() {
        println!("{} {}", style("✓").green(), msg);
    } else {
        println!("✓ {}", msg);
    }
}

/// Print an error message to stderr.
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), msg);
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a hint message to stderr.
pub fn hint(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        eprintln!("→ {}", msg);
    }
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Aligned,
    Csv,
    Json,
}

/// A small column-aligned table with an optional CSV mode.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    format: Format,
}

impl Table {
    pub fn new(headers: &[&str], format: Format) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            format,
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Render to stdout.
    pub fn render(&self) -> io::Result<()> {
        let stdout = io::stdout();
        self.write(&mut stdout.lock())
    }

    fn write(&self, w: &mut impl Write) -> io::Result<()> {
        match self.format {
            Format::Csv => self.write_csv(w),
            Format::Aligned => self.write_aligned(w),
            Format::Json => self.write_json(w),
        }
    }

    /// Emit rows as a JSON array of objects keyed by snake_cased headers.
    fn write_json(&self, w: &mut impl Write) -> io::Result<()> {
        let keys: Vec<String> = self
            .headers
            .iter()
            .map(|h| h.to_lowercase().replace('-', "_"))
            .collect();
        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                keys.iter()
                    .zip(row)
                    .map(|(k, cell)| (k.clone(), serde_json::Value::String(cell.clone())))
                    .collect::<serde_json::Map<_, _>>()
                    .into()
            })
            .collect();

        serde_json::to_writer_pretty(&mut *w, &rows)?;
        writeln!(w)
    }

    fn write_csv(&self, w: &mut impl Write) -> io::Result<()> {
        writeln!(w, "{}", csv_line(&self.headers))?;
        for row in &self.rows {
            writeln!(w, "{}", csv_line(row))?;
        }
        Ok(())
    }

    fn write_aligned(&self, w: &mut impl Write) -> io::Result<()> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        write_padded(w, &self.headers, &widths)?;
        for row in &self.rows {
            write_padded(w, row, &widths)?;
        }
        Ok(())
    }
}

fn write_padded(w: &mut impl Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let width = widths.get(i).copied().unwrap_or(0);
            format!("{:<width$}", cell)
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(w, "{}", line.trim_end())
}

fn csv_line(cells: &[String]) -> String {
    cells
        .iter()
        .map(|c| csv_escape(c))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(table: &Table) -> String {
        let mut buf = Vec::new();
        table.write(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_aligned_columns() {
        let mut table = Table::new(&["Name", "Version"], Format::Aligned);
        table.row(vec!["db/password".to_string(), "11".to_string()]);
        table.row(vec!["api".to_string(), "2".to_string()]);

        let out = render_to_string(&table);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Name         Version");
        assert_eq!(lines[1], "db/password  11");
        assert_eq!(lines[2], "api          2");
    }

    #[test]
    fn test_json_output() {
        let mut table = Table::new(&["Name", "Version"], Format::Json);
        table.row(vec!["db/password".to_string(), "11".to_string()]);
        table.row(vec!["api".to_string(), "2".to_string()]);

        let out = render_to_string(&table);
        assert_eq!(
            out,
            concat!(
                "[\n",
                "  {\n",
                "    \"name\": \"db/password\",\n",
                "    \"version\": \"11\"\n",
                "  },\n",
                "  {\n",
                "    \"name\": \"api\",\n",
                "    \"version\": \"2\"\n",
                "  }\n",
                "]\n"
            )
        );
    }

    #[test]
    fn test_json_output_snake_cases_headers() {
        let mut table = Table::new(&["Name", "Created-At"], Format::Json);
        table.row(vec!["a".to_string(), "not available".to_string()]);

        let out = render_to_string(&table);
        assert!(out.contains("\"created_at\": \"not available\""));
    }

    #[test]
    fn test_json_output_empty_table() {
        let table = Table::new(&["Name", "Secret"], Format::Json);
        assert_eq!(render_to_string(&table), "[]\n");
    }

    #[test]
    fn test_csv_output() {
        let mut table = Table::new(&["Name", "Secret"], Format::Csv);
        table.row(vec!["a".to_string(), "plain".to_string()]);
        table.row(vec!["b".to_string(), "has,comma".to_string()]);
        table.row(vec!["c".to_string(), "has\"quote".to_string()]);

        let out = render_to_string(&table);
        assert_eq!(
            out,
            "Name,Secret\na,plain\nb,\"has,comma\"\nc,\"has\"\"quote\"\n"
        );
    }
}

use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Render rows under right-aligned headers; numeric columns line up.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:>width$}", cell, width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
    };

    let mut out = String::new();
    out.push_str(&line(headers.iter().map(|h| h.to_string()).collect()));
    out.push('\n');
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&sep.join("  "));
    out.push('\n');
    for row in rows {
        let cells = (0..widths.len())
            .map(|i| row.get(i).cloned().unwrap_or_default())
            .collect();
        out.push_str(&line(cells));
        out.push('\n');
    }
    out
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", format_table(headers, rows));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_right_aligns_columns() {
        let rows = vec![
            vec!["1".to_string(), "93".to_string()],
            vec!["10".to_string(), "7".to_string()],
        ];
        let table = format_table(&["STEP", "NOTCH"], &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "STEP  NOTCH");
        assert_eq!(lines[1], "----  -----");
        assert_eq!(lines[2], "   1     93");
        assert_eq!(lines[3], "  10      7");
    }

    #[test]
    fn short_rows_are_padded() {
        let rows = vec![vec!["1".to_string()]];
        let table = format_table(&["A", "B"], &rows);
        assert_eq!(table.lines().nth(2), Some("1  "));
    }
}

use ssm_async::SsmError;

// Status lines go through tracing so they respect RUST_LOG and NO_COLOR;
// command output itself goes to stdout.
pub fn print_success(message: &str) {
    tracing::info!("✓ {}", message);
}

pub fn print_warning(message: &str) {
    tracing::warn!("{}", message);
}

pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if text.chars().count() <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.chars().count() + word.chars().count() < max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }

        if current_line.chars().count() > max_width {
            let word = current_line;
            current_line = String::new();

            for chunk in word.chars().collect::<Vec<_>>().chunks(max_width) {
                lines.push(chunk.iter().collect());
            }
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(text.to_string());
    }

    lines
}

/// Renders `rows` under `headers` as a fixed-width table.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");

    let mut out = String::new();
    out.push_str(&separator);
    out.push('\n');
    out.push_str(&render_row(
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        &widths,
    ));
    out.push_str(&separator);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row, &widths));
    }
    out.push_str(&separator);
    out.push('\n');
    out
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let line = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!(" {:<width$} ", cell, width = width)
        })
        .collect::<Vec<_>>()
        .join("|");
    format!("{}\n", line.trim_end())
}

/// Prints indented, wrapped text under a heading; used for command output.
pub fn print_block(heading: &str, text: &str) {
    println!("{}:", heading);
    for line in text.lines() {
        for wrapped in wrap_text(line, 100) {
            println!("  {}", wrapped);
        }
    }
}

pub fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or("-")
        .to_string()
}

pub fn format_json_output<T: serde::Serialize>(data: &T) -> Result<String, SsmError> {
    Ok(serde_json::to_string_pretty(data)?)
}

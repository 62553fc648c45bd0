//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual checks from the `show` subcommand
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - present values: `o`
//! - line between consecutive present values: `-`
//! - absent values: nothing (the line is broken)

use crate::domain::YearSeries;

/// Render the year series as a text chart with a zero baseline.
pub fn render_ascii_chart(series: &YearSeries, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let y_max = y_upper_bound(series);
    let n = series.len();

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so markers overlay them.
    let mut prev: Option<(usize, usize)> = None;
    for (i, p) in series.points.iter().enumerate() {
        let Some(v) = p.value else {
            prev = None;
            continue;
        };
        let cell = (map_x(i, n, width), map_y(v, y_max, height));
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, cell.0, cell.1, '-');
        }
        prev = Some(cell);
    }

    for (i, p) in series.points.iter().enumerate() {
        if let Some(v) = p.value {
            grid[map_y(v, y_max, height)][map_x(i, n, width)] = 'o';
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Chart: {} school years | y=[0.00, {y_max:.2}]%\n",
        n
    ));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    if let (Some(first), Some(last)) = (series.points.first(), series.points.last()) {
        out.push_str(&axis_footer(&first.label, &last.label, width));
        out.push('\n');
    }

    out
}

/// Upper y bound: 10% headroom over the largest value (1.0 if none).
pub fn y_upper_bound(series: &YearSeries) -> f64 {
    match series.max_value() {
        Some(max) if max > 0.0 => max * 1.1,
        _ => 1.0,
    }
}

fn axis_footer(first: &str, last: &str, width: usize) -> String {
    if first == last {
        return first.to_string();
    }
    let used = first.chars().count() + last.chars().count();
    let gap = width.saturating_sub(used).max(1);
    format!("{first}{}{last}", " ".repeat(gap))
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n < 2 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_max: f64, height: usize) -> usize {
    let u = (y / y_max).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

use crate::graph::PlotBounds;

const CURVE: char = '•';
const GUTTER: usize = 9;
const SERIES: [char; 4] = ['█', '▓', '▒', '░'];

fn to_col(x: f64, b: &PlotBounds, w: usize) -> usize {
    let t = (x - b.x_min) / b.x_span();
    (t * (w - 1) as f64).round().clamp(0.0, (w - 1) as f64) as usize
}

fn to_row(y: f64, b: &PlotBounds, h: usize) -> usize {
    let t = (y - b.y_min) / b.y_span();
    let up = (t * (h - 1) as f64).round().clamp(0.0, (h - 1) as f64) as usize;
    h - 1 - up
}

/// Rasterises the curve onto a `width` x `height` character grid with the
/// axes drawn wherever zero falls inside the bounds.
pub fn plot_grid(points: &[(f64, f64)], bounds: &PlotBounds, width: usize, height: usize) -> Vec<Vec<char>> {
    if width < 2 || height < 2 {
        return Vec::new();
    }
    let mut grid = vec![vec![' '; width]; height];

    let axis_row = (bounds.y_min..=bounds.y_max)
        .contains(&0.0)
        .then(|| to_row(0.0, bounds, height));
    let axis_col = (bounds.x_min..=bounds.x_max)
        .contains(&0.0)
        .then(|| to_col(0.0, bounds, width));

    if let Some(r) = axis_row {
        grid[r].iter_mut().for_each(|c| *c = '─');
    }
    if let Some(c) = axis_col {
        for row in grid.iter_mut() {
            row[c] = if row[c] == '─' { '┼' } else { '│' };
        }
    }

    for &(x, y) in points {
        if !bounds.contains(x, y) {
            continue;
        }
        grid[to_row(y, bounds, height)][to_col(x, bounds, width)] = CURVE;
    }
    grid
}

/// Two decimals at most, trailing zeros dropped.
pub fn axis_label(v: f64) -> String {
    let s = format!("{v:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Grid plus a y-label gutter and an x-range footer.
pub fn render_graph(points: &[(f64, f64)], bounds: &PlotBounds, width: usize, height: usize) -> Vec<String> {
    let grid = plot_grid(points, bounds, width, height);
    if grid.is_empty() {
        return Vec::new();
    }
    let last = grid.len() - 1;
    let mut lines: Vec<String> = grid
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let tag = match i {
                0 => axis_label(bounds.y_max),
                i if i == last => axis_label(bounds.y_min),
                _ => String::new(),
            };
            let body: String = row.into_iter().collect();
            format!("{tag:>w$} ┤{body}", w = GUTTER - 2)
        })
        .collect();

    let left = axis_label(bounds.x_min);
    let right = axis_label(bounds.x_max);
    let gap = width.saturating_sub(left.chars().count() + right.chars().count());
    lines.push(format!("{}{left}{}{right}", " ".repeat(GUTTER), " ".repeat(gap)));
    lines
}

/// Fill character for the `i`-th series of a bar chart.
pub fn series_char(i: usize) -> char {
    SERIES[i % SERIES.len()]
}

/// Grouped vertical bars: one group per slot, one bar per series inside it,
/// heights scaled so the largest value spans the full grid.
pub fn bar_grid(groups: &[Vec<u64>], width: usize, height: usize) -> Vec<Vec<char>> {
    let series = groups.iter().map(Vec::len).max().unwrap_or(0);
    if series == 0 || height == 0 || width < groups.len() {
        return Vec::new();
    }
    let max = groups.iter().flatten().copied().max().unwrap_or(0);
    let mut grid = vec![vec![' '; width]; height];

    let slot = width / groups.len();
    // one blank column between groups when there is room for it
    let bar_w = (slot.saturating_sub(1) / series).max(1);
    for (g, values) in groups.iter().enumerate() {
        let left = g * slot;
        for (s, &v) in values.iter().enumerate() {
            let filled = if max == 0 {
                0
            } else {
                ((v as f64 / max as f64) * height as f64).round() as usize
            };
            let start = left + s * bar_w;
            let end = (start + bar_w).min(left + slot);
            for row in grid.iter_mut().skip(height - filled.min(height)) {
                for cell in row.iter_mut().take(end).skip(start) {
                    *cell = series_char(s);
                }
            }
        }
    }
    grid
}

/// Bar grid with a value gutter, group labels under each slot and a legend.
pub fn render_bars(labels: &[String], series: &[String], groups: &[Vec<u64>], width: usize, height: usize) -> Vec<String> {
    let grid = bar_grid(groups, width, height);
    if grid.is_empty() {
        return Vec::new();
    }
    let max = groups.iter().flatten().copied().max().unwrap_or(0);
    let last = grid.len() - 1;
    let mut lines: Vec<String> = grid
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let tag = match i {
                0 => max.to_string(),
                i if i == last => "0".to_string(),
                _ => String::new(),
            };
            let body: String = row.into_iter().collect();
            format!("{tag:>w$} ┤{body}", w = GUTTER - 2)
        })
        .collect();

    let slot = width / groups.len();
    let room = slot.saturating_sub(1).max(1);
    let mut footer = vec![' '; width];
    for (g, label) in labels.iter().enumerate().take(groups.len()) {
        for (k, c) in label.chars().take(room).enumerate() {
            footer[g * slot + k] = c;
        }
    }
    lines.push(format!("{}{}", " ".repeat(GUTTER), footer.into_iter().collect::<String>().trim_end()));

    let legend: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{} {name}", series_char(i)))
        .collect();
    lines.push(format!("{}{}", " ".repeat(GUTTER), legend.join("  ")));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> PlotBounds {
        PlotBounds { x_min: -5.0, x_max: 5.0, y_min: -5.0, y_max: 5.0 }
    }

    #[test]
    fn test_axes_cross_at_origin() {
        let grid = plot_grid(&[], &bounds(), 11, 11);
        assert_eq!(grid[5][5], '┼');
        assert_eq!(grid[5][0], '─');
        assert_eq!(grid[0][5], '│');
        assert_eq!(grid[0][0], ' ');
    }

    #[test]
    fn test_diagonal_line() {
        let pts: Vec<(f64, f64)> = (-5..=5).map(|i| (i as f64, i as f64)).collect();
        let grid = plot_grid(&pts, &bounds(), 11, 11);
        for i in 0..11 {
            assert_eq!(grid[10 - i][i], CURVE);
        }
    }

    #[test]
    fn test_points_outside_are_skipped() {
        let grid = plot_grid(&[(100.0, 0.0)], &bounds(), 11, 11);
        assert!(grid.iter().flatten().all(|&c| c != CURVE));
    }

    #[test]
    fn test_axis_label() {
        assert_eq!(axis_label(10.0), "10");
        assert_eq!(axis_label(0.0), "0");
        assert_eq!(axis_label(-2.5), "-2.5");
        assert_eq!(axis_label(0.30000000000000004), "0.3");
    }

    #[test]
    fn test_render_labels() {
        let lines = render_graph(&[], &bounds(), 20, 4);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].trim_start().starts_with("5 ┤"));
        assert!(lines[3].trim_start().starts_with("-5 ┤"));
        assert!(lines[4].trim().starts_with("-5"));
        assert!(lines[4].trim_end().ends_with('5'));
        assert!(render_graph(&[], &bounds(), 1, 4).is_empty());
    }

    #[test]
    fn test_bar_heights_scale_to_largest() {
        let grid = bar_grid(&[vec![4], vec![2]], 4, 4);
        let column = |c: usize| grid.iter().map(|row| row[c]).collect::<String>();
        assert_eq!(column(0), "████");
        assert_eq!(column(1), "    ");
        assert_eq!(column(2), "  ██");
        assert_eq!(column(3), "    ");
    }

    #[test]
    fn test_grouped_series_sit_side_by_side() {
        let grid = bar_grid(&[vec![2, 1], vec![0, 2]], 10, 2);
        assert_eq!(grid[1].iter().collect::<String>(), "██▓▓   ▓▓ ");
        assert_eq!(grid[0].iter().collect::<String>(), "██     ▓▓ ");
    }

    #[test]
    fn test_bar_grid_degenerate_inputs() {
        assert!(bar_grid(&[], 10, 4).is_empty());
        assert!(bar_grid(&[vec![1], vec![2], vec![3]], 2, 4).is_empty());
        let zeros = bar_grid(&[vec![0, 0]], 6, 3);
        assert!(zeros.iter().flatten().all(|&c| c == ' '));
    }

    #[test]
    fn test_render_bars_labels_and_legend() {
        let labels = vec!["North".to_string(), "South".to_string()];
        let series = vec!["Sales".to_string(), "Returns".to_string()];
        let lines = render_bars(&labels, &series, &[vec![120, 4], vec![80, 10]], 20, 5);
        assert_eq!(lines.len(), 7);
        assert!(lines[0].trim_start().starts_with("120 ┤"));
        assert!(lines[4].trim_start().starts_with("0 ┤"));
        assert_eq!(lines[5].trim(), "North     South");
        assert_eq!(lines[6].trim(), "█ Sales  ▓ Returns");
    }
}

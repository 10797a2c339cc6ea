use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::expr::{clean, Expr};

/// Evaluates `expr` at `steps + 1` evenly spaced x values, skipping any
/// point whose y is not finite.
pub fn sample(expr: &Expr, x_min: f64, x_max: f64, steps: usize) -> Vec<(f64, f64)> {
    let steps = steps.max(1);
    let dx = (x_max - x_min) / steps as f64;
    (0..=steps)
        .filter_map(|i| {
            let x = x_min + i as f64 * dx;
            let y = expr.eval(x);
            y.is_finite().then_some((x, y))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureType {
    Parabola,
    Line,
    Function,
}

impl fmt::Display for FigureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FigureType::Parabola => "parabola",
            FigureType::Line => "line",
            FigureType::Function => "function",
        })
    }
}

fn parabola_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?[\d.]*x\^2([+-][\d.]+x)?([+-]\d+)?$").expect("static regex"))
}

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?[\d.]*x([+-]\d+)?$").expect("static regex"))
}

/// Shape check on the cleaned source text, not on the parsed tree.
pub fn classify(src: &str) -> FigureType {
    let s = clean(src);
    if parabola_re().is_match(&s) {
        FigureType::Parabola
    } else if line_re().is_match(&s) {
        FigureType::Line
    } else {
        FigureType::Function
    }
}

/// Rounds a raw step up to 1, 2, 5 or 10 times a power of ten.
pub fn nice_increment(raw: f64) -> f64 {
    if !(raw > 0.0) || !raw.is_finite() {
        return 1.0;
    }
    let base = 10f64.powi(raw.log10().floor() as i32);
    let r = raw / base;
    if r <= 1.5 {
        base
    } else if r <= 3.5 {
        2.0 * base
    } else if r <= 7.5 {
        5.0 * base
    } else {
        10.0 * base
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PlotBounds {
    pub const PADDING: f64 = 0.1;

    /// Data extent grown by 10% on each side. No points gives -1..1;
    /// a flat extent is widened by one unit so the range is never zero.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let fold = |f: fn(&(f64, f64)) -> f64| {
            points.iter().map(f).fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
        };
        let (x_min, x_max) = or_unit(fold(|p| p.0));
        let (y_min, y_max) = or_unit(fold(|p| p.1));
        let (x_min, x_max) = pad(x_min, x_max);
        let (y_min, y_max) = pad(y_min, y_max);
        Self { x_min, x_max, y_min, y_max }
    }

    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

fn or_unit((lo, hi): (f64, f64)) -> (f64, f64) {
    if lo > hi {
        (-1.0, 1.0)
    } else if lo == hi {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    }
}

fn pad(lo: f64, hi: f64) -> (f64, f64) {
    let r = hi - lo;
    (lo - r * PlotBounds::PADDING, hi + r * PlotBounds::PADDING)
}

/// Up to `count` tick positions on a nice step, starting at the first
/// multiple of the step at or below `min`, keeping those inside the range.
pub fn ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    let count = count.max(2);
    let step = nice_increment((max - min) / (count - 1) as f64);
    let start = (min / step).floor() * step;
    (0..count)
        .map(|i| start + i as f64 * step)
        .filter(|v| (min..=max).contains(v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::expr::parse;

    #[test]
    fn test_sample_counts_and_skips() {
        let e = parse("x^2").unwrap();
        let pts = sample(&e, -1.0, 1.0, 4);
        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], (-1.0, 1.0));
        assert_eq!(pts[2], (0.0, 0.0));

        let inv = parse("1/x").unwrap();
        let pts = sample(&inv, -1.0, 1.0, 2);
        assert_eq!(pts, vec![(-1.0, -1.0), (1.0, 1.0)]);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("y = x^2"), FigureType::Parabola);
        assert_eq!(classify("2x^2+3x-4"), FigureType::Parabola);
        assert_eq!(classify("-x+5"), FigureType::Line);
        assert_eq!(classify("3.5x"), FigureType::Line);
        assert_eq!(classify("sin(x)"), FigureType::Function);
        assert_eq!(classify("x^3"), FigureType::Function);
    }

    #[test]
    fn test_nice_increment() {
        assert_eq!(nice_increment(1.2), 1.0);
        assert_eq!(nice_increment(3.0), 2.0);
        assert_eq!(nice_increment(4.0), 5.0);
        assert_eq!(nice_increment(8.0), 10.0);
        assert_eq!(nice_increment(0.0), 1.0);
        assert_eq!(nice_increment(-3.0), 1.0);
        assert!((nice_increment(0.03) - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_padding() {
        let b = PlotBounds::from_points(&[(0.0, 0.0), (10.0, 20.0)]);
        assert_eq!(b, PlotBounds { x_min: -1.0, x_max: 11.0, y_min: -2.0, y_max: 22.0 });
        assert!(b.contains(5.0, 5.0));
        assert!(!b.contains(12.0, 5.0));
    }

    #[test]
    fn test_bounds_degenerate() {
        let empty = PlotBounds::from_points(&[]);
        assert!((empty.x_min + 1.2).abs() < 1e-12);
        assert!((empty.y_max - 1.2).abs() < 1e-12);

        let flat = PlotBounds::from_points(&[(0.0, 3.0), (1.0, 3.0)]);
        assert!(flat.y_span() > 0.0);
        assert!(flat.y_min < 3.0 && flat.y_max > 3.0);
    }

    #[test]
    fn test_ticks() {
        // span 12 over 5 ticks -> raw 3 -> step 2, start -2
        let t = ticks(-1.0, 11.0, 5);
        assert_eq!(t, vec![0.0, 2.0, 4.0, 6.0]);
        assert!(ticks(0.0, 1.0, 4).iter().all(|v| (0.0..=1.0).contains(v)));
    }
}

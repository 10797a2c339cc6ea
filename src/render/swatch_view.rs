use crossterm::style::Stylize;

use super::color::{text_on, ColorCapability};
use crate::palette::Swatch;

/// One line per swatch: colour chip with its hex code, a proportional bar
/// and the share with one decimal.
pub fn swatch_line(swatch: &Swatch, cap: ColorCapability, bar_width: usize) -> String {
    let rgb = swatch.rgb();
    let chip = format!(" {} ", swatch.hex());
    let filled = bar_len(swatch.percent_times10, bar_width);
    let bar = format!("{}{}", "█".repeat(filled), "·".repeat(bar_width - filled));
    let pct = format!("{:>5.1}%", swatch.percent());

    match (cap.map(rgb), cap.map(text_on(rgb))) {
        (Some(bg), Some(fg)) => {
            format!("{} {} {}", chip.with(fg).on(bg), bar.with(bg), pct)
        }
        _ => format!("{chip} {bar} {pct}"),
    }
}

pub fn bar_len(percent_times10: u32, width: usize) -> usize {
    let filled = (percent_times10 as usize * width + 500) / 1000;
    filled.min(width)
}

pub fn render_swatches(swatches: &[Swatch], cap: ColorCapability, bar_width: usize) -> Vec<String> {
    swatches.iter().map(|s| swatch_line(s, cap, bar_width)).collect()
}

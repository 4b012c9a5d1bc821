use crate::fmt::money;

const POSITIVE: char = '\u{2588}';
const NEGATIVE: char = '\u{2592}';

/// Horizontal bar chart, one line per value, bars scaled so the largest
/// magnitude fills `width` cells. Negative values use a shaded glyph.
pub fn bar_chart(title: &str, bars: &[(String, f64)], width: usize) -> String {
    let mut out = format!("{title}\n");
    if bars.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }
    let label_w = bars.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = bars
        .iter()
        .map(|(_, v)| v.abs())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    for (label, value) in bars {
        let cells = bar_len(*value, max, width);
        let glyph = if *value < 0.0 { NEGATIVE } else { POSITIVE };
        let bar: String = std::iter::repeat(glyph).take(cells).collect();
        out.push_str(&format!(
            "  {label:<label_w$} {bar:<width$} {}\n",
            money(*value)
        ));
    }
    out
}

fn bar_len(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || !value.is_finite() || value == 0.0 {
        return 0;
    }
    let cells = (value.abs() / max * width as f64).round() as usize;
    cells.clamp(1, width)
}

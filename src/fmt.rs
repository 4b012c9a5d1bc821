fn group_thousands(int_part: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format a float as a whole-rupiah amount with thousands separators: Rp1,234,568
pub fn money(val: f64) -> String {
    if !val.is_finite() {
        return "Rp0".to_string();
    }
    let rounded = val.abs().round();
    let grouped = group_thousands(&format!("{rounded:.0}"));
    if val < 0.0 && rounded != 0.0 {
        format!("-Rp{grouped}")
    } else {
        format!("Rp{grouped}")
    }
}

/// Format a fraction as a percentage with a comma decimal separator: 0.125 -> 12,50%
pub fn percent(val: f64) -> String {
    if !val.is_finite() {
        return "0,00%".to_string();
    }
    format!("{:.2}%", val * 100.0).replace('.', ",")
}

/// Format a plain ratio, showing unbounded ratios as infinity.
pub fn ratio(val: f64) -> String {
    if val.is_infinite() {
        "\u{221e}".to_string()
    } else {
        format!("{val:.2}")
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

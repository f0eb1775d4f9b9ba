use colored::*;
use unicode_width::UnicodeWidthStr;

pub const TOTAL_WIDTH: usize = 64;

pub fn success(msg: &str) {
    println!("{} {}", "[+]".green().bold(), msg);
}

pub fn header(msg: &str) {
    let formatted = format!("⟦ {} ⟧", msg);
    let width = UnicodeWidthStr::width(formatted.as_str());

    let dash_count = TOTAL_WIDTH.saturating_sub(width);
    let left = dash_count / 2;
    let right = dash_count - left;

    println!(
        "{}{}{}",
        "─".repeat(left).bright_black(),
        formatted.to_uppercase().bright_green(),
        "─".repeat(right).bright_black()
    );
}

//! Width-aware text helpers shared by the widgets.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Drop control characters, turning tabs and newlines into spaces.
pub fn single_line(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Columns `s` occupies on screen.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `max_width` columns, ending with `tail` when it had to
/// be shortened. Wide characters are never split.
pub fn truncate(s: &str, max_width: usize, tail: &str) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    let tail_width = display_width(tail);
    if tail_width >= max_width {
        return tail.chars().take(max_width).collect();
    }
    let budget = max_width - tail_width;
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str(tail);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_flattens_markup_text() {
        assert_eq!(single_line("  Pro\n\t$29/mo "), "Pro  $29/mo");
    }

    #[test]
    fn truncate_adds_tail_only_when_needed() {
        assert_eq!(truncate("Basic", 10, "…"), "Basic");
        assert_eq!(truncate("Enterprise", 6, "…"), "Enter…");
    }

    #[test]
    fn truncate_respects_wide_chars() {
        assert_eq!(truncate("価格プラン", 5, "…"), "価格…");
    }
}

//! Fixed-width line helpers. Widths count Unicode scalar values.

/// Truncates or right-pads `text` to exactly `width` characters.
pub fn fit(text: &str, width: usize) -> String {
    let mut line: String = text.chars().take(width).collect();
    let len = line.chars().count();
    line.extend(std::iter::repeat_n(' ', width - len));
    line
}

pub fn fits(text: &str, width: usize) -> bool {
    text.chars().count() <= width
}

/// Length of one scroll cycle over `text` followed by `separator`.
pub fn cycle_len(text: &str, separator: &str) -> usize {
    text.chars().count() + separator.chars().count()
}

/// `width` characters of the endless ribbon `text + separator + text + ...`
/// starting at `offset`.
pub fn scroll_window(text: &str, separator: &str, offset: usize, width: usize) -> String {
    let cycle = cycle_len(text, separator);
    if cycle == 0 {
        return fit("", width);
    }
    text.chars()
        .chain(separator.chars())
        .cycle()
        .skip(offset % cycle)
        .take(width)
        .collect()
}

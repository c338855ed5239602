//! Text-level overlay of a modal panel onto a rendered background.
//!
//! Works on plain lines measured in characters, so it can be exercised with
//! literal arrays and never sees timer or input state.

/// Centers `popup` over `background` inside a `width` x `height` viewport.
///
/// Rows covered by the popup keep the background to the left of the popup
/// columns and past `popup_width`; other rows pass through untouched. Popup
/// lines are copied as given, so callers wanting an opaque box supply lines
/// exactly `popup_width` wide. Missing background rows
/// become blank lines. A popup taller than the viewport is cut at the bottom.
pub fn composite(
    background: &[String],
    popup: &[String],
    width: usize,
    height: usize,
    popup_width: usize,
) -> Vec<String> {
    let (row_offset, col_offset) = placement(width, height, popup_width, popup.len());
    let col_end = col_offset + popup_width;

    (0..height)
        .map(|row| {
            let bg = background.get(row);
            let popup_line = row.checked_sub(row_offset).and_then(|i| popup.get(i));

            match (popup_line, bg) {
                (Some(line), bg) => {
                    let bg = bg.map(String::as_str).unwrap_or("");
                    let mut merged = pad(bg.chars().take(col_offset), col_offset);
                    merged.push_str(line);
                    merged.extend(bg.chars().skip(col_end));
                    merged
                }
                (None, Some(bg)) => bg.clone(),
                (None, None) => " ".repeat(width),
            }
        })
        .collect()
}

/// Top-left corner `(row, column)` of a centered popup; zero when it does not fit.
pub fn placement(width: usize, height: usize, popup_width: usize, popup_height: usize) -> (usize, usize) {
    (
        height.saturating_sub(popup_height) / 2,
        width.saturating_sub(popup_width) / 2,
    )
}

/// Collects `chars`, right-padding with spaces up to `min` characters.
fn pad(chars: impl Iterator<Item = char>, min: usize) -> String {
    let mut out: String = chars.collect();
    let len = out.chars().count();
    if len < min {
        out.push_str(&" ".repeat(min - len));
    }
    out
}

use crate::config::MAX_OUTPUT_CHARS;

/// Truncates a captured stream to the fixed character budget.
///
/// Text at or under the budget passes through unchanged. Longer text keeps
/// its first [`MAX_OUTPUT_CHARS`] characters and gains a notice naming the
/// exact number of characters dropped. Counts characters, not bytes, so
/// multi-byte output is never split mid-character. Pure and deterministic;
/// applied to stdout and stderr independently, never to the success flag.
pub fn truncate_output(text: &str) -> String {
    truncate_to(text, MAX_OUTPUT_CHARS)
}

fn truncate_to(text: &str, max_chars: usize) -> String {
    let mut indices = text.char_indices();
    let Some((cut, _)) = indices.nth(max_chars) else {
        // Fewer than or exactly max_chars characters.
        return text.to_string();
    };
    let omitted = 1 + indices.count();
    format!(
        "{}\n... (truncated, {omitted} more characters)",
        &text[..cut]
    )
}

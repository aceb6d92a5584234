//! Formatting utilities.

/// Format a byte count as a human-readable size.
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Human-readable pack name for manifests.
///
/// Dashes become spaces and the first character of every word is upper-cased,
/// so `cute-animals` becomes `Cute Animals Pack`.
pub fn pack_display_name(pack_id: &str) -> String {
    let mut name = String::with_capacity(pack_id.len() + 5);
    let mut at_word_start = true;
    for c in pack_id.chars() {
        let c = if c == '-' { ' ' } else { c };
        let is_word_char = c.is_alphanumeric() || c == '_';
        if is_word_char && at_word_start {
            name.extend(c.to_uppercase());
        } else {
            name.push(c);
        }
        at_word_start = !is_word_char;
    }
    name.push_str(" Pack");
    name
}

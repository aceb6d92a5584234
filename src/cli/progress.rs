//! Progress bar for a pack's downloads.

use indicatif::{ProgressBar, ProgressStyle};

/// One bar per pack, advanced as tasks resolve.
pub struct PackProgress {
    bar: ProgressBar,
}

impl PackProgress {
    pub fn new(pack_id: &str, total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {prefix} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        bar.set_prefix(pack_id.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }

    pub fn start_task(&self, file_name: &str) {
        self.bar.set_message(truncate_filename(file_name, 35));
    }

    pub fn finish_task(&self) {
        self.bar.inc(1);
    }

    /// Print above the bar without corrupting it.
    pub fn println(&self, message: &str) {
        self.bar.println(message);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Truncate a filename for display, keeping the extension visible.
///
/// Lengths are counted in characters so multi-byte pack names are cut
/// cleanly.
fn truncate_filename(name: &str, max_len: usize) -> String {
    let len = name.chars().count();
    if len <= max_len {
        return name.to_string();
    }

    if let Some(dot_pos) = name.rfind('.') {
        let ext = &name[dot_pos..];
        let ext_len = ext.chars().count();
        if ext_len + 4 < max_len {
            let prefix: String = name.chars().take(max_len - ext_len - 3).collect();
            return format!("{}...{}", prefix, ext);
        }
    }

    let prefix: String = name.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_filename() {
        assert_eq!(truncate_filename("quby-3.webp", 20), "quby-3.webp");
        assert_eq!(
            truncate_filename("a-very-long-pack-name-that-keeps-going-12.webp", 25),
            "a-very-long-pack-....webp"
        );
        assert_eq!(truncate_filename("no_extension", 8), "no_ex...");
    }

    #[test]
    fn test_truncate_multibyte_filename() {
        let name = "aステッカーパックかわいいどうぶつ-12.webp";
        assert_eq!(truncate_filename(name, 35), name);
        assert_eq!(truncate_filename(name, 15), "aステッカーパ....webp");
        assert_eq!(truncate_filename("ステッカーパック", 5), "ステ...");
    }
}

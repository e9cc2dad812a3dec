// Download progress bar. Falls back to a spinner when the server does not
// announce a Content-Length.

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.blue} {prefix:.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.blue} {prefix:.cyan.bold} [{elapsed_precise}] {bytes} ({bytes_per_sec})";
const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";
const BAR_CHARS: &str = "█▓▒░  ";

/// Creates a progress bar for a transfer of `total` bytes, labelled with `label`.
pub fn download_bar(total: Option<u64>, label: &str) -> ProgressBar {
    let bar = match total {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::new_spinner(),
    };
    let template = if total.is_some() {
        BAR_TEMPLATE
    } else {
        SPINNER_TEMPLATE
    };
    // An invalid template only loses the styling, never the download.
    if let Ok(style) = ProgressStyle::with_template(template) {
        bar.set_style(style.tick_chars(TICK).progress_chars(BAR_CHARS));
    }
    bar.set_prefix(label.to_string());
    bar
}

use indicatif::{ProgressBar, ProgressStyle};

/// Shows how far through the result set the running scenario is.
///
/// The bar counts page indices, not requests, so an offset walk that skips ahead moves the bar in
/// jumps. Hidden bars accept updates and draw nothing.
#[derive(Debug)]
pub(crate) struct ScenarioProgress {
    bar: ProgressBar,
}

impl ScenarioProgress {
    pub(crate) fn start(label: &str, total_pages: u64, hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total_pages)
        };

        match ProgressStyle::with_template(
            "{spinner:.green} {msg} [{wide_bar:.cyan/blue}] page {pos}/{len} [{elapsed_precise}]",
        ) {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(e) => log::debug!("Using default progress style: {e}"),
        }
        bar.set_message(label.to_string());

        Self { bar }
    }

    pub(crate) fn visited(&self, page: u64) {
        if page > self.bar.length().unwrap_or(0) {
            self.bar.set_length(page);
        }
        self.bar.set_position(page);
    }

    pub(crate) fn finish(self) {
        self.bar.finish_and_clear();
    }
}

use std::io::{Write, stderr};

use crate::core::konst::PROGRESS_BAR_WIDTH;

/// Receives completed/total counts over the course of one batch.
pub trait Progress {
    fn start(&mut self, total: usize);
    fn advance(&mut self, done: usize, total: usize);
    fn finish(&mut self);
}

impl<P: Progress + ?Sized> Progress for Box<P> {
    fn start(&mut self, total: usize) {
        (**self).start(total)
    }

    fn advance(&mut self, done: usize, total: usize) {
        (**self).advance(done, total)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

/// Discards all progress events.
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&mut self, _total: usize) {}
    fn advance(&mut self, _done: usize, _total: usize) {}
    fn finish(&mut self) {}
}

/// Textual progress bar drawn on stderr.
pub struct ProgressBar {
    width: usize,
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self {
            width: PROGRESS_BAR_WIDTH,
        }
    }
}

impl ProgressBar {
    fn draw(&self, done: usize, total: usize) {
        let line = render_bar(done, total, self.width);
        let mut err = stderr().lock();
        // Progress output is best effort.
        let _ = write!(err, "\r{line}");
        let _ = err.flush();
    }
}

impl Progress for ProgressBar {
    fn start(&mut self, total: usize) {
        self.draw(0, total);
    }

    fn advance(&mut self, done: usize, total: usize) {
        self.draw(done, total);
    }

    fn finish(&mut self) {
        let _ = writeln!(stderr());
    }
}

pub fn render_bar(done: usize, total: usize, width: usize) -> String {
    let done = done.min(total);
    let (percent, filled) = match total {
        0 => (100, width),
        _ => (done * 100 / total, done * width / total),
    };
    format!(
        "Progress: {percent:>3}%|{}{}| {done}/{total}",
        "#".repeat(filled),
        " ".repeat(width - filled)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_bar_empty() {
        assert_eq!(render_bar(0, 4, 8), "Progress:   0%|        | 0/4");
    }

    #[test]
    fn render_bar_half() {
        assert_eq!(render_bar(2, 4, 8), "Progress:  50%|####    | 2/4");
    }

    #[test]
    fn render_bar_full() {
        assert_eq!(render_bar(4, 4, 8), "Progress: 100%|########| 4/4");
    }

    #[test]
    fn render_bar_never_overflows() {
        assert_eq!(render_bar(9, 4, 8), "Progress: 100%|########| 4/4");
    }
}

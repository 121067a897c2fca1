//! Spinner shown while a remote call (and its retries) is in flight.

use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Await `fut` with a spinner; the spinner is cleared when it resolves.
pub async fn with_spinner<F, T>(message: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let pb = spinner(message);
    let out = fut.await;
    pb.finish_and_clear();
    out
}

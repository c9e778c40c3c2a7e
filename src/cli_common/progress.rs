//! Индикаторы прогресса на базе `indicatif`

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Спиннер с сообщением
pub fn spinner(message: impl Into<String>, visible: bool) -> Result<ProgressBar> {
    let pb = if visible {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Failed to set progress style")?,
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

/// Прогресс-бар по пакетам
pub fn package_bar(total: u64, visible: bool) -> Result<ProgressBar> {
    let pb = if visible {
        ProgressBar::new(total)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.green/white}] {pos}/{len} {msg}")
            .context("Failed to set progress style")?
            .progress_chars("█▓░"),
    );
    Ok(pb)
}

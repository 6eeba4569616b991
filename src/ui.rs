//! Terminal output helpers.
//!
//! Every line printed by goget goes through a single process-wide lock, so
//! status lines coming from concurrent fetch workers are never interleaved.
//! Which worker's line lands first is still up to the scheduler.
//!
//! ## Glyphs
//!
//! - `✓` (green) - success
//! - `!` (yellow) - warning, work continues
//! - `x` (red) - error

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

static OUTPUT: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    // A worker panicking mid-print must not silence the others.
    OUTPUT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Print one line while holding the output lock.
pub fn line(msg: impl AsRef<str>) {
    let _guard = lock();
    println!("{}", msg.as_ref());
}

/// Print several lines as a single unit.
pub fn block<I, S>(lines: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let _guard = lock();
    for l in lines {
        println!("{}", l.as_ref());
    }
}

pub fn warn(msg: impl AsRef<str>) {
    line(format!("{} {}", "!".yellow(), msg.as_ref()));
}

pub fn success(msg: impl AsRef<str>) {
    line(format!("{} {}", "✓".green(), msg.as_ref()));
}

pub fn error(msg: impl AsRef<str>) {
    line(format!("{} {}", "x".red(), msg.as_ref()));
}

/// `[3/12]` style counter used by batch mode.
pub fn counter(index: usize, total: usize) -> String {
    format!("[{}/{}]", index + 1, total)
}

/// Horizontal rule for the batch summary.
pub fn rule() -> String {
    "=".repeat(60)
}

/// Spinner shown while a single clone runs.
pub fn spinner(msg: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"),
    );
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_is_one_based() {
        assert_eq!(counter(0, 5), "[1/5]");
        assert_eq!(counter(4, 5), "[5/5]");
    }

    #[test]
    fn test_rule_width() {
        assert_eq!(rule().len(), 60);
        assert!(rule().chars().all(|c| c == '='));
    }

    #[test]
    fn test_lock_survives_poison() {
        let handle = std::thread::spawn(|| {
            let _guard = lock();
            panic!("poison the output lock");
        });
        assert!(handle.join().is_err());
        // Still usable afterwards.
        line("after poison");
    }
}

//! Checkout detection and the git child process.

use super::CancelToken;
use super::plan::ClonePlan;
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Why a destination counts as already fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `go.mod` at the destination. Covers packages inside a monorepo whose
    /// `.git` lives further up.
    ManifestPresent,
    /// `.git` at the destination.
    RepositoryPresent,
}

impl SkipReason {
    pub fn message(&self, destination: &Path) -> String {
        match self {
            Self::ManifestPresent => format!(
                "Package already exists at {} (go.mod found), skipping clone",
                destination.display()
            ),
            Self::RepositoryPresent => format!(
                "Repository already exists at {}, skipping clone",
                destination.display()
            ),
        }
    }
}

/// `go.mod` is checked before `.git`.
pub fn existing_checkout(destination: &Path) -> Option<SkipReason> {
    if destination.join("go.mod").exists() {
        Some(SkipReason::ManifestPresent)
    } else if destination.join(".git").exists() {
        Some(SkipReason::RepositoryPresent)
    } else {
        None
    }
}

/// Run `git <plan.args>` with inherited output, killing it on cancellation.
pub fn run(git: &str, plan: &ClonePlan, cancel: &CancelToken) -> Result<()> {
    let mut child = Command::new(git)
        .args(&plan.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("failed to start {}", git))?;

    loop {
        if let Some(status) = child.try_wait().context("failed to wait for git")? {
            if status.success() {
                return Ok(());
            }
            bail!("{}", status);
        }

        if cancel.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            bail!("cancelled");
        }

        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn plan(destination: PathBuf) -> ClonePlan {
        ClonePlan {
            url: "git@example.com:u/r.git".to_string(),
            args: vec![
                "clone".to_string(),
                "--quiet".to_string(),
                "git@example.com:u/r.git".to_string(),
                destination.to_string_lossy().into_owned(),
            ],
            destination,
        }
    }

    #[test]
    fn test_existing_checkout_order() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let dest = dir.path().join("repo");
        assert_eq!(existing_checkout(&dest), None);

        fs::create_dir_all(dest.join(".git"))?;
        assert_eq!(existing_checkout(&dest), Some(SkipReason::RepositoryPresent));

        fs::write(dest.join("go.mod"), "module example.com/u/r\n")?;
        assert_eq!(existing_checkout(&dest), Some(SkipReason::ManifestPresent));
        Ok(())
    }

    #[test]
    fn test_skip_messages() {
        let dest = Path::new("/go/src/a.b/c");
        assert!(SkipReason::ManifestPresent.message(dest).contains("go.mod found"));
        assert!(
            SkipReason::RepositoryPresent
                .message(dest)
                .starts_with("Repository already exists at /go/src/a.b/c")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_status() {
        let cancel = CancelToken::new();
        let p = plan(PathBuf::from("/nonexistent/dest"));
        assert!(run("true", &p, &cancel).is_ok());
        let err = run("false", &p, &cancel).unwrap_err();
        assert!(err.to_string().contains("exit status"));
    }

    #[test]
    fn test_run_missing_binary() {
        let err = run(
            "goget-no-such-binary",
            &plan(PathBuf::from("/x")),
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_kills_child_on_cancel() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let script = dir.path().join("slow-git");
        fs::write(&script, "#!/bin/sh\nexec sleep 30\n")?;
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;
        }

        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = run(
            &script.to_string_lossy(),
            &plan(dir.path().join("dest")),
            &cancel,
        )
        .unwrap_err();
        canceller.join().ok();

        assert_eq!(err.to_string(), "cancelled");
        assert!(started.elapsed() < Duration::from_secs(10));
        Ok(())
    }
}

//! Clone planning: where a request goes on disk and which URL it clones from.

use crate::config::{SOURCE_DIR, normalize};
use crate::request::ImportRequest;
use crate::resolve::{Resolver, Transport};
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Everything needed to run one `git clone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClonePlan {
    pub url: String,
    pub destination: PathBuf,
    pub args: Vec<String>,
}

impl ClonePlan {
    pub fn build(request: &ImportRequest, resolver: &Resolver, transport: Transport) -> Result<Self> {
        let (logical_path, destination) = if request.is_relative() {
            let logical_path = relative_logical_path(request)?;
            let working_dir = absolute_dir(&request.working_dir)?;
            (logical_path, normalize(&working_dir.join(&request.import_path)))
        } else {
            let source_dir = normalize(&request.root.join(SOURCE_DIR));
            let destination = normalize(&source_dir.join(&request.import_path));
            if destination == source_dir || !destination.starts_with(&source_dir) {
                bail!(
                    "import path {} does not stay inside {}",
                    request.import_path,
                    source_dir.display()
                );
            }
            (request.import_path.clone(), destination)
        };

        let url = resolver
            .resolve(&logical_path, transport)
            .filter(|url| !url.is_empty())
            .with_context(|| format!("could not determine git URL for {}", request.import_path))?;

        if destination.as_os_str().is_empty() {
            bail!("could not determine checkout path for {}", request.import_path);
        }

        let args = vec![
            "clone".to_string(),
            "--quiet".to_string(),
            url.clone(),
            destination.to_string_lossy().into_owned(),
        ];

        Ok(Self {
            url,
            destination,
            args,
        })
    }

    /// The command as it would be typed, for messages.
    pub fn command_line(&self, git: &str) -> String {
        format!("{} {}", git, self.args.join(" "))
    }
}

fn absolute_dir(dir: &Path) -> Result<PathBuf> {
    if dir.as_os_str().is_empty() {
        bail!("working directory required for relative paths");
    }
    let absolute = std::path::absolute(dir)
        .with_context(|| format!("could not get absolute directory for {}", dir.display()))?;
    Ok(normalize(&absolute))
}

/// Full import path of a relative request, e.g. `./repo` invoked from
/// `$GOPATH/src/github.com/user` is `github.com/user/repo`.
fn relative_logical_path(request: &ImportRequest) -> Result<String> {
    let working_dir = absolute_dir(&request.working_dir)?;
    let source_dir = normalize(&request.root.join(SOURCE_DIR));

    let relative = working_dir
        .strip_prefix(&source_dir)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
        .with_context(|| {
            format!(
                "working directory should be contained inside {}, got {}",
                source_dir.display(),
                working_dir.display()
            )
        })?;

    let mut segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    for part in request.import_path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    bail!(
                        "relative import path {} leads outside {}",
                        request.import_path,
                        source_dir.display()
                    );
                }
            }
            other => segments.push(other.to_string()),
        }
    }

    if segments.is_empty() {
        bail!(
            "relative import path {} leads outside {}",
            request.import_path,
            source_dir.display()
        );
    }

    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Rules;
    use crate::resolve::discovery::tests::FakeFetcher;

    fn offline() -> Resolver {
        Resolver::new(Rules::default(), Box::new(FakeFetcher::unreachable()))
    }

    fn request(import_path: &str, working_dir: &str) -> ImportRequest {
        ImportRequest {
            root: PathBuf::from("/home/user/go"),
            working_dir: PathBuf::from(working_dir),
            import_path: import_path.to_string(),
            wildcard: false,
        }
    }

    #[test]
    fn test_build_clone_plan() {
        let cases = [
            (
                "github.com/user/repo",
                "/some/dir",
                Transport::Ssh,
                "git@github.com:user/repo.git",
                "/home/user/go/src/github.com/user/repo",
            ),
            (
                "github.com/user/repo",
                "/some/dir",
                Transport::Https,
                "https://github.com/user/repo.git",
                "/home/user/go/src/github.com/user/repo",
            ),
            (
                "golang.org/x/sync",
                "/some/dir",
                Transport::Ssh,
                "https://go.googlesource.com/sync",
                "/home/user/go/src/golang.org/x/sync",
            ),
            (
                "./repo",
                "/home/user/go/src/github.com/user",
                Transport::Ssh,
                "git@github.com:user/repo.git",
                "/home/user/go/src/github.com/user/repo",
            ),
            (
                "./repo",
                "/home/user/go/src/github.com/user",
                Transport::Https,
                "https://github.com/user/repo.git",
                "/home/user/go/src/github.com/user/repo",
            ),
            (
                "../other",
                "/home/user/go/src/github.com/user/repo",
                Transport::Ssh,
                "git@github.com:user/other.git",
                "/home/user/go/src/github.com/user/other",
            ),
        ];

        let resolver = offline();
        for (import_path, wd, transport, url, destination) in cases {
            let plan = ClonePlan::build(&request(import_path, wd), &resolver, transport).unwrap();
            assert_eq!(plan.url, url, "{}", import_path);
            assert_eq!(plan.destination, PathBuf::from(destination), "{}", import_path);
            assert_eq!(
                plan.args,
                vec![
                    "clone".to_string(),
                    "--quiet".to_string(),
                    url.to_string(),
                    destination.to_string()
                ]
            );
        }
    }

    #[test]
    fn test_relative_outside_source_dir_fails() {
        let resolver = offline();
        let err = ClonePlan::build(&request("./repo", "/tmp/elsewhere"), &resolver, Transport::Ssh)
            .unwrap_err();
        assert!(err.to_string().contains("should be contained inside"));

        // The source directory itself is not inside it.
        assert!(
            ClonePlan::build(&request("./repo", "/home/user/go/src"), &resolver, Transport::Ssh)
                .is_err()
        );

        assert!(
            ClonePlan::build(
                &request("../../../x", "/home/user/go/src/github.com"),
                &resolver,
                Transport::Ssh
            )
            .is_err()
        );
    }

    #[test]
    fn test_absolute_path_cannot_escape_source_dir() {
        let resolver = offline();
        assert!(
            ClonePlan::build(
                &request("github.com/../../etc", "/some/dir"),
                &resolver,
                Transport::Ssh
            )
            .is_err()
        );
    }

    #[test]
    fn test_command_line() {
        let plan = ClonePlan::build(&request("github.com/u/r", "/"), &offline(), Transport::Ssh)
            .unwrap();
        assert_eq!(
            plan.command_line("git"),
            "git clone --quiet git@github.com:u/r.git /home/user/go/src/github.com/u/r"
        );
    }

    #[test]
    fn test_root_with_parent_components() {
        let resolver = offline();
        let mut req = request("github.com/user/repo", "/some/dir");
        req.root = PathBuf::from("/home/user/x/../go");
        let plan = ClonePlan::build(&req, &resolver, Transport::Ssh).unwrap();
        assert_eq!(
            plan.destination,
            PathBuf::from("/home/user/go/src/github.com/user/repo")
        );

        let mut req = request("./repo", "/home/user/go/src/github.com/user");
        req.root = PathBuf::from("/home/user/x/../go");
        let plan = ClonePlan::build(&req, &resolver, Transport::Ssh).unwrap();
        assert_eq!(plan.url, "git@github.com:user/repo.git");
    }
}

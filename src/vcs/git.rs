use std::path::PathBuf;
use std::process::{Output, Stdio};

use compio::process::Command;
use snafu::{ResultExt, ensure};
use tracing::debug;

use crate::tree::CommitId;
use crate::vcs::error::{
    DetachedHeadSnafu, EncodingSnafu, NotARepositorySnafu, OutputSnafu, ReferenceSnafu,
    SpawnSnafu, UnsuccessfulCommandSnafu,
};
use crate::vcs::{PathChange, TrackedPath, Vcs, VcsError, parse_ls_tree, parse_name_status};

/// [`Vcs`] backed by the `git` executable found on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn describe(args: &[&str]) -> String {
        format!("git {}", args.join(" "))
    }

    /// Runs git and returns its output whatever the exit status.
    async fn run(&self, args: &[&str]) -> Result<Output, VcsError> {
        let command = Self::describe(args);
        debug!("Running '{}'", command);

        let mut cmd = Command::new("git");
        cmd.current_dir(&self.root);
        cmd.args(args);
        let _ = cmd.stdin(Stdio::null());
        let _ = cmd.stdout(Stdio::piped());
        let _ = cmd.stderr(Stdio::piped());
        cmd.output().await.context(SpawnSnafu { command })
    }

    /// Runs git, requiring success, and returns its stdout.
    async fn run_checked(&self, args: &[&str]) -> Result<String, VcsError> {
        let output = self.run(args).await?;
        let command = Self::describe(args);

        ensure!(
            output.status.success(),
            UnsuccessfulCommandSnafu {
                command: command.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
        );

        String::from_utf8(output.stdout).context(EncodingSnafu { command })
    }
}

impl Vcs for GitCli {
    async fn is_repository(&self) -> Result<bool, VcsError> {
        let output = self.run(&["rev-parse", "--is-inside-work-tree"]).await?;
        Ok(output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true")
    }

    async fn resolve_reference(&self, reference: &str) -> Result<CommitId, VcsError> {
        let expression = format!("{reference}^{{commit}}");
        let output = self
            .run(&["rev-parse", "--verify", "--quiet", &expression])
            .await?;

        if !output.status.success() {
            if !self.is_repository().await? {
                return NotARepositorySnafu {
                    root: self.root.clone(),
                }
                .fail();
            }
            return ReferenceSnafu { reference }.fail();
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("Resolved '{}' to {}", reference, id);
        Ok(CommitId::new(id))
    }

    async fn list_tracked_paths(&self, reference: &str) -> Result<Vec<TrackedPath>, VcsError> {
        let args = ["ls-tree", "-r", "-t", "-z", "--full-tree", reference];
        let stdout = self.run_checked(&args).await?;
        parse_ls_tree(&stdout).context(OutputSnafu {
            command: Self::describe(&args),
        })
    }

    async fn diff_name_status(
        &self,
        from: &CommitId,
        to: &str,
    ) -> Result<Vec<PathChange>, VcsError> {
        let args = ["diff", "--name-status", "-M", "-z", from.as_str(), to];
        let stdout = self.run_checked(&args).await?;
        parse_name_status(&stdout).context(OutputSnafu {
            command: Self::describe(&args),
        })
    }

    async fn current_branch(&self) -> Result<String, VcsError> {
        let output = self.run(&["symbolic-ref", "--quiet", "--short", "HEAD"]).await?;
        ensure!(output.status.success(), DetachedHeadSnafu);
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn branch_exists(&self, name: &str) -> Result<bool, VcsError> {
        let reference = format!("refs/heads/{name}");
        let output = self
            .run(&["rev-parse", "--verify", "--quiet", &reference])
            .await?;
        Ok(output.status.success())
    }

    async fn create_branch(&self, name: &str, base: &str) -> Result<(), VcsError> {
        self.run_checked(&["branch", name, base]).await.map(drop)
    }

    async fn switch_branch(&self, name: &str) -> Result<(), VcsError> {
        self.run_checked(&["switch", "--quiet", name]).await.map(drop)
    }

    async fn delete_branch(&self, name: &str) -> Result<(), VcsError> {
        self.run_checked(&["branch", "-D", name]).await.map(drop)
    }

    async fn has_uncommitted_changes(&self) -> Result<bool, VcsError> {
        let stdout = self
            .run_checked(&["status", "--porcelain", "--untracked-files=no"])
            .await?;
        Ok(!stdout.trim().is_empty())
    }

    async fn stash(&self) -> Result<(), VcsError> {
        self.run_checked(&["stash", "push", "--quiet", "-m", "gittier: metadata branch switch"])
            .await
            .map(drop)
    }

    async fn stash_pop(&self) -> Result<(), VcsError> {
        self.run_checked(&["stash", "pop", "--quiet"]).await.map(drop)
    }

    async fn stage_and_commit(&self, pathspec: &str, message: &str) -> Result<(), VcsError> {
        self.run_checked(&["add", "--all", "--", pathspec]).await?;
        // Limited to the pathspec so anything else in the index stays staged.
        self.run_checked(&["commit", "--quiet", "-m", message, "--", pathspec])
            .await
            .map(drop)
    }
}

//! In-memory [`Vcs`] that records every call, for tests.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use crate::tree::CommitId;
use crate::vcs::{PathChange, TrackedPath, Vcs, VcsError};

/// A commit recorded by [`FakeVcs::stage_and_commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommit {
    pub branch: String,
    pub pathspec: String,
    pub message: String,
    /// Content of `pathspec` under the work tree root at commit time, if it was a readable file.
    pub snapshot: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
struct FakeState {
    current_branch: String,
    branches: BTreeSet<String>,
    refs: HashMap<String, CommitId>,
    tracked: HashMap<String, Vec<TrackedPath>>,
    diffs: HashMap<(String, String), Vec<PathChange>>,
    dirty: bool,
    stashes: usize,
    commits: Vec<RecordedCommit>,
    calls: Vec<String>,
    failures: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct FakeVcs {
    root: Option<PathBuf>,
    state: RefCell<FakeState>,
}

impl FakeVcs {
    /// A repository checked out on `branch`.
    pub fn on_branch(branch: &str) -> Self {
        let fake = Self::default();
        {
            let mut state = fake.state.borrow_mut();
            state.current_branch = branch.to_string();
            state.branches.insert(branch.to_string());
        }
        fake
    }

    /// Work tree root used to snapshot committed files.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_branch(self, name: &str) -> Self {
        self.state.borrow_mut().branches.insert(name.to_string());
        self
    }

    pub fn with_ref(self, reference: &str, commit: &str) -> Self {
        self.state
            .borrow_mut()
            .refs
            .insert(reference.to_string(), CommitId::new(commit));
        self
    }

    pub fn with_tracked(self, reference: &str, paths: Vec<TrackedPath>) -> Self {
        self.state
            .borrow_mut()
            .tracked
            .insert(reference.to_string(), paths);
        self
    }

    pub fn with_diff(self, from: &str, to: &str, changes: Vec<PathChange>) -> Self {
        self.state
            .borrow_mut()
            .diffs
            .insert((from.to_string(), to.to_string()), changes);
        self
    }

    pub fn dirty(self) -> Self {
        self.state.borrow_mut().dirty = true;
        self
    }

    /// Makes the call whose log entry equals `call` fail.
    pub fn failing_on(self, call: &str) -> Self {
        self.state.borrow_mut().failures.insert(call.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn commits(&self) -> Vec<RecordedCommit> {
        self.state.borrow().commits.clone()
    }

    pub fn branch(&self) -> String {
        self.state.borrow().current_branch.clone()
    }

    pub fn stashes(&self) -> usize {
        self.state.borrow().stashes
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.state.borrow().branches.contains(name)
    }

    fn record(&self, call: String) -> Result<(), VcsError> {
        let mut state = self.state.borrow_mut();
        let failed = state.failures.contains(&call);
        state.calls.push(call.clone());
        if failed {
            return Err(VcsError::UnsuccessfulCommand {
                command: call,
                status: 1,
                stderr: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Vcs for FakeVcs {
    async fn is_repository(&self) -> Result<bool, VcsError> {
        self.record("is_repository".to_string())?;
        Ok(true)
    }

    async fn resolve_reference(&self, reference: &str) -> Result<CommitId, VcsError> {
        self.record(format!("resolve_reference {reference}"))?;
        self.state
            .borrow()
            .refs
            .get(reference)
            .cloned()
            .ok_or_else(|| VcsError::ReferenceError {
                reference: reference.to_string(),
            })
    }

    async fn list_tracked_paths(&self, reference: &str) -> Result<Vec<TrackedPath>, VcsError> {
        self.record(format!("list_tracked_paths {reference}"))?;
        Ok(self
            .state
            .borrow()
            .tracked
            .get(reference)
            .cloned()
            .unwrap_or_default())
    }

    async fn diff_name_status(
        &self,
        from: &CommitId,
        to: &str,
    ) -> Result<Vec<PathChange>, VcsError> {
        self.record(format!("diff_name_status {from} {to}"))?;
        Ok(self
            .state
            .borrow()
            .diffs
            .get(&(from.to_string(), to.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn current_branch(&self) -> Result<String, VcsError> {
        self.record("current_branch".to_string())?;
        Ok(self.branch())
    }

    async fn branch_exists(&self, name: &str) -> Result<bool, VcsError> {
        self.record(format!("branch_exists {name}"))?;
        Ok(self.has_branch(name))
    }

    async fn create_branch(&self, name: &str, base: &str) -> Result<(), VcsError> {
        self.record(format!("create_branch {name} {base}"))?;
        self.state.borrow_mut().branches.insert(name.to_string());
        Ok(())
    }

    async fn switch_branch(&self, name: &str) -> Result<(), VcsError> {
        self.record(format!("switch_branch {name}"))?;
        self.state.borrow_mut().current_branch = name.to_string();
        Ok(())
    }

    async fn delete_branch(&self, name: &str) -> Result<(), VcsError> {
        self.record(format!("delete_branch {name}"))?;
        self.state.borrow_mut().branches.remove(name);
        Ok(())
    }

    async fn has_uncommitted_changes(&self) -> Result<bool, VcsError> {
        self.record("has_uncommitted_changes".to_string())?;
        Ok(self.state.borrow().dirty)
    }

    async fn stash(&self) -> Result<(), VcsError> {
        self.record("stash".to_string())?;
        let mut state = self.state.borrow_mut();
        state.dirty = false;
        state.stashes += 1;
        Ok(())
    }

    async fn stash_pop(&self) -> Result<(), VcsError> {
        self.record("stash_pop".to_string())?;
        let mut state = self.state.borrow_mut();
        state.stashes = state.stashes.saturating_sub(1);
        state.dirty = true;
        Ok(())
    }

    async fn stage_and_commit(&self, pathspec: &str, message: &str) -> Result<(), VcsError> {
        self.record(format!("stage_and_commit {pathspec}"))?;
        let snapshot = self
            .root
            .as_ref()
            .and_then(|root| std::fs::read(root.join(pathspec)).ok());
        let mut state = self.state.borrow_mut();
        let branch = state.current_branch.clone();
        state.commits.push(RecordedCommit {
            branch,
            pathspec: pathspec.to_string(),
            message: message.to_string(),
            snapshot,
        });
        Ok(())
    }
}

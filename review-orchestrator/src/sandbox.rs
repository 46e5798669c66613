//! Per-job file sandbox: static analyzers shell out to child processes
//! that need real files on disk, but spec §1's non-goals rule out local
//! clone semantics — so each job fetches only the changed files it needs
//! (spec §4.9/§1 "diffs and selected files are fetched on demand") into a
//! throwaway [`tempfile::TempDir`] that is dropped at end of run.

use forge_client::ForgeClient;
use tracing::warn;

pub struct Sandbox {
    dir: tempfile::TempDir,
}

impl Sandbox {
    pub fn workdir(&self) -> &std::path::Path {
        self.dir.path()
    }

    /// Creates a fresh sandbox and fetches `paths` at `git_ref` into it,
    /// skipping (and logging) any file that fails to fetch — a missing
    /// file degrades the static-analysis pass for that file only.
    pub async fn populate(
        forge: &ForgeClient,
        installation_id: u64,
        owner: &str,
        repo: &str,
        git_ref: &str,
        paths: &[String],
    ) -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        for path in paths {
            match forge.get_file_contents(installation_id, owner, repo, path, git_ref).await {
                Ok(Some(contents)) => {
                    let dest = dir.path().join(path);
                    if let Some(parent) = dest.parent() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                    tokio::fs::write(&dest, contents).await?;
                }
                Ok(None) => warn!(path, "file not found at ref, skipping for static analysis"),
                Err(err) => warn!(path, %err, "failed to fetch file, skipping for static analysis"),
            }
        }
        Ok(Self { dir })
    }
}

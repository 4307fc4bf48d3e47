use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failure reported by a job handle while deleting
#[derive(Debug, Error)]
pub enum JobError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Interrupted(String),
}

/// A deletable job owned by the caller
#[async_trait]
pub trait JobHandle: Send + Sync {
    /// Full hierarchical name, e.g. `teamA/backend`
    fn full_name(&self) -> String;

    async fn delete(&self) -> Result<(), JobError>;
}

/// Job stored on disk in the automation server's layout:
/// `<jobs_dir>/<folder>/jobs/<child>/...`
///
/// Nothing touches the filesystem until [`JobHandle::delete`] runs, so a
/// missing or malformed job only surfaces after the caller's permission check.
#[derive(Debug, Clone)]
pub struct FsJob {
    full_name: String,
    jobs_dir: PathBuf,
}

impl FsJob {
    pub fn new(jobs_dir: impl Into<PathBuf>, full_name: &str) -> Self {
        Self {
            full_name: full_name.replace("/job/", "/"),
            jobs_dir: jobs_dir.into(),
        }
    }

    /// Directory this job lives in
    pub fn path(&self) -> Result<PathBuf, JobError> {
        Self::resolve(&self.jobs_dir, &self.full_name)
    }

    fn resolve(jobs_dir: &Path, full_name: &str) -> Result<PathBuf, JobError> {
        let plain = full_name.replace("/job/", "/");
        let segments: Vec<&str> = plain.split('/').filter(|s| !s.is_empty()).collect();

        if segments.is_empty() {
            return Err(invalid_name(full_name));
        }
        if segments.iter().any(|s| *s == "." || *s == "..") {
            return Err(invalid_name(full_name));
        }

        let mut path = jobs_dir.join(segments[0]);
        for segment in &segments[1..] {
            path = path.join("jobs").join(segment);
        }
        Ok(path)
    }
}

fn invalid_name(full_name: &str) -> JobError {
    JobError::Io(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("Invalid job name: '{}'", full_name),
    ))
}

#[async_trait]
impl JobHandle for FsJob {
    fn full_name(&self) -> String {
        self.full_name.clone()
    }

    async fn delete(&self) -> Result<(), JobError> {
        let path = self.path()?;
        if !path.is_dir() {
            return Err(JobError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Job directory not found: {}", path.display()),
            )));
        }

        debug!(path = %path.display(), "Removing job directory");
        tokio::fs::remove_dir_all(&path).await.map_err(|e| match e.kind() {
            io::ErrorKind::Interrupted => JobError::Interrupted(e.to_string()),
            _ => JobError::Io(e),
        })
    }
}

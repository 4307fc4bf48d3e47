use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::auth::{AuthorizationContext, Permission};
use crate::http::{HttpPoster, PostStatus, TransportError};
use crate::job::{JobError, JobHandle};

/// Authorization context with a fixed set of grants
pub struct FakeAuthorization {
    granted: Vec<Permission>,
    root_url: Option<String>,
}

impl FakeAuthorization {
    pub fn new(granted: &[Permission], root_url: Option<&str>) -> Self {
        Self {
            granted: granted.to_vec(),
            root_url: root_url.map(str::to_string),
        }
    }
}

impl AuthorizationContext for FakeAuthorization {
    fn has_permission(&self, permission: Permission) -> bool {
        self.granted.contains(&permission)
    }

    fn root_url(&self) -> Option<String> {
        self.root_url.clone()
    }
}

enum Failure {
    Io(String),
    Interrupted(String),
}

/// In-memory job that records whether it was deleted
pub struct FakeJob {
    full_name: String,
    failure: Option<Failure>,
    deleted: AtomicBool,
}

impl FakeJob {
    pub fn new(full_name: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            failure: None,
            deleted: AtomicBool::new(false),
        }
    }

    pub fn failing_io(full_name: &str, message: &str) -> Self {
        Self {
            failure: Some(Failure::Io(message.to_string())),
            ..Self::new(full_name)
        }
    }

    pub fn interrupted(full_name: &str, message: &str) -> Self {
        Self {
            failure: Some(Failure::Interrupted(message.to_string())),
            ..Self::new(full_name)
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobHandle for FakeJob {
    fn full_name(&self) -> String {
        self.full_name.clone()
    }

    async fn delete(&self) -> Result<(), JobError> {
        match &self.failure {
            Some(Failure::Io(msg)) => {
                Err(JobError::Io(io::Error::new(io::ErrorKind::Other, msg.clone())))
            }
            Some(Failure::Interrupted(msg)) => Err(JobError::Interrupted(msg.clone())),
            None => {
                self.deleted.store(true, Ordering::SeqCst);
                Ok(())
            }
        }
    }
}

/// HTTP poster answering with a canned status token or transport error
pub struct FakePoster {
    response: Result<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakePoster {
    pub fn token(token: &str) -> Self {
        Self {
            response: Ok(token.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn transport_error(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(base_url, target_url)` of every post, in order
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpPoster for FakePoster {
    async fn post(&self, base_url: &str, target_url: &str) -> Result<PostStatus, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((base_url.to_string(), target_url.to_string()));

        match &self.response {
            Ok(token) => Ok(PostStatus::from_token(token)),
            Err(msg) => Err(TransportError::Client(msg.clone())),
        }
    }
}

//! The authorisation capability (C7, §4.7, §9 "Capability abstraction for
//! authorisation"). Supplied per request, never as a global.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("authorisation provider failed: {0}")]
pub struct UnauthorisedProvider(pub String);

/// `{admin(), spaces()}` — exactly the two methods the spec allows.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn admin(&self) -> bool;
    async fn spaces(&self) -> Result<HashSet<String>, UnauthorisedProvider>;
}

/// A static authorizer for tests and for `simulate`/forecast paths that run
/// outside of a real request context.
pub struct StaticAuthorizer {
    pub is_admin: bool,
    pub spaces: HashSet<String>,
}

impl StaticAuthorizer {
    pub fn admin() -> Self {
        Self {
            is_admin: true,
            spaces: HashSet::new(),
        }
    }

    pub fn spaces(spaces: impl IntoIterator<Item = String>) -> Self {
        Self {
            is_admin: false,
            spaces: spaces.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn admin(&self) -> bool {
        self.is_admin
    }

    async fn spaces(&self) -> Result<HashSet<String>, UnauthorisedProvider> {
        Ok(self.spaces.clone())
    }
}

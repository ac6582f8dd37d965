//! Top-level handle bundling one authenticated session.

use std::sync::Arc;

use crate::api::{Credentials, HttpSession, Result, SessionClient};
use crate::config::Config;
use crate::groups::GroupsProvider;
use crate::people::PeopleProvider;

/// Entry point handed to applications.
///
/// Every provider created from a `Backend` shares its session.
#[derive(Clone)]
pub struct Backend {
    session: Arc<dyn SessionClient>,
}

impl Backend {
    pub fn new(session: Arc<dyn SessionClient>) -> Self {
        Self { session }
    }

    /// Build an HTTP session from configuration and credentials
    pub fn connect(config: &Config, credentials: Credentials) -> Result<Self> {
        let session = HttpSession::new(config)?.with_credentials(credentials);
        Ok(Self::new(Arc::new(session)))
    }

    pub fn session(&self) -> Arc<dyn SessionClient> {
        Arc::clone(&self.session)
    }

    pub fn groups(&self) -> GroupsProvider {
        GroupsProvider::new(self.session())
    }

    pub fn people(&self) -> PeopleProvider {
        PeopleProvider::new(self.session())
    }
}

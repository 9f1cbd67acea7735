//! Shared state of the events endpoint

use std::collections::HashMap;
use std::sync::Arc;

use crate::actors::controller::ControllerHandle;

/// Controller handles keyed by channel id, plus the token Slack signs
/// its requests with
#[derive(Clone)]
pub struct EventsState {
    controllers: Arc<HashMap<String, ControllerHandle>>,

    verification_token: Option<Arc<str>>,
}

impl EventsState {
    pub fn new(
        controllers: impl IntoIterator<Item = ControllerHandle>,
        verification_token: Option<String>,
    ) -> Self {
        let controllers = controllers
            .into_iter()
            .map(|handle| (handle.channel_id().to_string(), handle))
            .collect();

        Self {
            controllers: Arc::new(controllers),
            verification_token: verification_token.map(Arc::from),
        }
    }

    /// Controller responsible for `channel_id`
    pub fn controller(&self, channel_id: &str) -> Option<&ControllerHandle> {
        self.controllers.get(channel_id)
    }

    pub fn controllers(&self) -> impl Iterator<Item = &ControllerHandle> {
        self.controllers.values()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Whether a request presenting `token` may be processed.
    ///
    /// Without a configured verification token every request is accepted.
    pub fn is_authorized(&self, token: Option<&str>) -> bool {
        match &self.verification_token {
            Some(expected) => token == Some(expected.as_ref()),
            None => true,
        }
    }
}

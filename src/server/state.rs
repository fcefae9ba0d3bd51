use axum::extract::FromRef;

use crate::requester::AnalysisRequester;
use crate::session::AnalysisSession;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedRequester = Arc<AnalysisRequester>;
pub type GuardedSession = Arc<AnalysisSession>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub requester: GuardedRequester,
    pub session: GuardedSession,
}

impl FromRef<ServerState> for GuardedRequester {
    fn from_ref(input: &ServerState) -> Self {
        input.requester.clone()
    }
}

impl FromRef<ServerState> for GuardedSession {
    fn from_ref(input: &ServerState) -> Self {
        input.session.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

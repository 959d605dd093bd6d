use crate::modules::live_roster::session::LiveRosterSession;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<LiveRosterSession>,
}

use std::sync::Arc;

use kairos_auth::AuthService;
use kairos_core::Config;
use kairos_ranker::ScheduleRanker;
use kairos_store::Repository;

pub struct AppState {
    pub config: Config,
    pub repo: Arc<Repository>,
    pub auth: Arc<AuthService>,
    pub ranker: ScheduleRanker,
}

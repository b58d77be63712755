pub mod health;
pub mod ping_results;

use crate::database::Database;

pub use health::{db_health_check, health_check, placeholder};
pub use ping_results::{create_ping_result, latest_up_per_container, list_ping_results};

/// 应用状态
#[derive(Debug, Clone)]
pub struct AppState {
    pub database: Option<Database>,
}

use crate::config::{AppConfig, ScoringConfig};
use crate::error::Result;
use crate::fingerprint::FrameFetcher;

#[derive(Clone)]
pub struct AppState {
    pub fetcher: FrameFetcher,
    pub scoring: ScoringConfig,
}

impl AppState {
    pub fn new(app_config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(app_config.fetch.timeout())
            .build()?;

        Ok(AppState {
            fetcher: FrameFetcher::new(client, &app_config.fetch),
            scoring: app_config.scoring.clone(),
        })
    }
}

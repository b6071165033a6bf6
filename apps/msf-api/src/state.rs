use std::sync::Arc;

use msf_service::MsfService;
use msf_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MsfService>,
}
impl AppState {
	pub async fn new(config: msf_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(MsfService::new(config, db)))
	}

	pub fn from_service(service: MsfService) -> Self {
		Self { service: Arc::new(service) }
	}

	/// Expected `Authorization` bearer token, if the deployment configured one.
	pub fn api_auth_token(&self) -> Option<&str> {
		self.service.cfg.security.api_auth_token.as_deref()
	}
}

pub mod content_types;
pub mod documents;
pub mod filter;
pub mod items;
pub mod outcome;
pub mod publish;
pub mod settings;
pub mod time_serde;
pub mod update;

mod error;
mod tag_locks;

pub use content_types::{ContentTypeRegistry, DisplayFieldResolver, DisplaySettings};
pub use documents::{DocumentGroup, DocumentItem, DocumentsResponse};
pub use error::{Error, Result};
pub use filter::{
	ApiEndpointRequest, EntryView, FilterRequest, QueryPage, QueryParams, QueryResponse,
};
pub use items::{ItemView, ItemsResponse};
pub use outcome::Outcome;
pub use publish::{PublishRequest, PublishResponse};
pub use settings::{Settings, SettingsPayload};
pub use update::{DesiredItem, ItemRequest, UpdateRequest, UpdateResponse};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use msf_config::Config;
use msf_storage::db::Db;

use crate::tag_locks::TagLocks;

pub const WELCOME_MESSAGE: &str = "Welcome to the multi-select filter service.";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WelcomeResponse {
	pub body: String,
}

pub struct MsfService {
	pub cfg: Config,
	pub db: Db,
	pub resolver: Arc<dyn DisplayFieldResolver>,
	tag_locks: TagLocks,
}
impl MsfService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let resolver = Arc::new(ContentTypeRegistry::from_config(&cfg.content_types));

		Self::with_resolver(cfg, db, resolver)
	}

	pub fn with_resolver(cfg: Config, db: Db, resolver: Arc<dyn DisplayFieldResolver>) -> Self {
		Self { cfg, db, resolver, tag_locks: TagLocks::default() }
	}

	pub fn welcome(&self) -> WelcomeResponse {
		WelcomeResponse { body: WELCOME_MESSAGE.to_string() }
	}
}

/// Trims `value` and rejects it when missing or blank, naming `field` in the error.
pub(crate) fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
	value
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.ok_or_else(|| Error::missing_field(field))
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub security: Security,
	#[serde(default)]
	pub defaults: Defaults,
	pub content_types: Vec<ContentType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	/// Optional. When set, every route except the liveness probes requires
	/// `Authorization: Bearer <token>`.
	pub api_auth_token: Option<String>,
}

/// Values used to seed the settings singleton the first time it is read.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
	#[serde(default = "default_entity_uid")]
	pub default_entity_uid: String,
	#[serde(default)]
	pub default_api_endpoint: String,
	#[serde(default)]
	pub default_published_only: bool,
	#[serde(default = "default_query_limit")]
	pub default_query_limit: Option<u32>,
	#[serde(default)]
	pub update_field_name: Option<String>,
}

/// A referenceable collection and how its entries are displayed in the selection dropdown.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentType {
	pub uid: String,
	/// Plural REST path, e.g. `articles` for `api::article.article`.
	pub api_path: String,
	pub main_field: String,
	pub default_sort_by: String,
	#[serde(default)]
	pub default_sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	#[default]
	Asc,
	Desc,
}
impl SortOrder {
	pub fn as_sql(self) -> &'static str {
		match self {
			Self::Asc => "ASC",
			Self::Desc => "DESC",
		}
	}
}

impl Default for Defaults {
	fn default() -> Self {
		Self {
			default_entity_uid: default_entity_uid(),
			default_api_endpoint: String::new(),
			default_published_only: false,
			default_query_limit: default_query_limit(),
			update_field_name: None,
		}
	}
}

fn default_entity_uid() -> String {
	"api::article.article".to_string()
}

fn default_query_limit() -> Option<u32> {
	Some(50)
}

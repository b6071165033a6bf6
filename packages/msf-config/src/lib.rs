mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, ContentType, Defaults, Postgres, Security, Service, SortOrder, Storage};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.content_types.is_empty() {
		return Err(Error::Validation {
			message: "At least one [[content_types]] entry is required.".to_string(),
		});
	}

	let mut uids = HashSet::new();
	let mut api_paths = HashSet::new();

	for content_type in &cfg.content_types {
		if content_type.uid.trim().is_empty() {
			return Err(Error::Validation {
				message: "content_types.uid must be non-empty.".to_string(),
			});
		}
		if !uids.insert(content_type.uid.as_str()) {
			return Err(Error::Validation {
				message: format!("content_types.uid {:?} is declared twice.", content_type.uid),
			});
		}
		if content_type.api_path.is_empty() {
			return Err(Error::Validation {
				message: format!(
					"content_types.api_path must be non-empty for {:?}.",
					content_type.uid
				),
			});
		}
		if !api_paths.insert(content_type.api_path.as_str()) {
			return Err(Error::Validation {
				message: format!(
					"content_types.api_path {:?} is declared twice.",
					content_type.api_path
				),
			});
		}
		if content_type.main_field.trim().is_empty() {
			return Err(Error::Validation {
				message: format!(
					"content_types.main_field must be non-empty for {:?}.",
					content_type.uid
				),
			});
		}
		if content_type.default_sort_by.trim().is_empty() {
			return Err(Error::Validation {
				message: format!(
					"content_types.default_sort_by must be non-empty for {:?}.",
					content_type.uid
				),
			});
		}
	}

	if let Some(limit) = cfg.defaults.default_query_limit
		&& limit == 0
	{
		return Err(Error::Validation {
			message: "defaults.default_query_limit must be greater than zero.".to_string(),
		});
	}
	if !uids.contains(cfg.defaults.default_entity_uid.as_str()) {
		return Err(Error::Validation {
			message: "defaults.default_entity_uid must name a declared content type.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}
	if cfg.defaults.update_field_name.as_deref().map(|name| name.trim().is_empty()).unwrap_or(false)
	{
		cfg.defaults.update_field_name = None;
	}

	for content_type in &mut cfg.content_types {
		content_type.api_path = content_type.api_path.trim().trim_matches('/').to_string();
	}
}

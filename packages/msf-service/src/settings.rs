use serde::{Deserialize, Serialize};
use serde_json::Value;

use msf_config::Defaults;
use msf_domain::source::QuerySource;
use msf_storage::store;

use crate::{Error, MsfService, Result};

const SETTINGS_KEY: &str = "settings";

/// Global configuration of the selection field, edited from the admin settings screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
	pub default_entity_uid: String,
	#[serde(default)]
	pub default_api_endpoint: String,
	#[serde(default)]
	pub default_published_only: bool,
	#[serde(default)]
	pub default_query_limit: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub update_field_name: Option<String>,
}

impl From<&Defaults> for Settings {
	fn from(defaults: &Defaults) -> Self {
		Self {
			default_entity_uid: defaults.default_entity_uid.clone(),
			default_api_endpoint: defaults.default_api_endpoint.clone(),
			default_published_only: defaults.default_published_only,
			default_query_limit: defaults.default_query_limit,
			update_field_name: defaults.update_field_name.clone(),
		}
	}
}

/// The admin UI posts `{ "body": settings }`; plain settings objects are accepted too.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SettingsPayload {
	Wrapped { body: Settings },
	Bare(Settings),
}
impl SettingsPayload {
	pub fn into_settings(self) -> Settings {
		match self {
			Self::Wrapped { body } => body,
			Self::Bare(settings) => settings,
		}
	}
}

impl MsfService {
	/// Reads the settings singleton, creating it from the configured defaults on first use.
	pub async fn get_settings(&self) -> Result<Settings> {
		if let Some(value) = store::get_value(&self.db.pool, SETTINGS_KEY).await? {
			return decode(value);
		}

		let defaults = Settings::from(&self.cfg.defaults);
		let value = encode(&defaults)?;

		if store::insert_value_if_absent(&self.db.pool, SETTINGS_KEY, &value).await? {
			tracing::info!(
				default_entity_uid = %defaults.default_entity_uid,
				"Created default settings."
			);
		}

		let stored = store::get_value(&self.db.pool, SETTINGS_KEY).await?.ok_or_else(|| {
			Error::Settings { message: "Settings are missing right after creation.".to_string() }
		})?;

		decode(stored)
	}

	/// Replaces the settings singleton wholesale and returns what is stored afterwards.
	pub async fn set_settings(&self, settings: Settings) -> Result<Settings> {
		self.validate_settings(&settings)?;

		let value = encode(&settings)?;

		store::set_value(&self.db.pool, SETTINGS_KEY, &value).await?;

		tracing::info!(default_entity_uid = %settings.default_entity_uid, "Settings updated.");

		self.get_settings().await
	}

	fn validate_settings(&self, settings: &Settings) -> Result<()> {
		let uid = crate::required(Some(settings.default_entity_uid.as_str()), "defaultEntityUid")?;

		if self.resolver.resolve(&QuerySource::Uid(uid.to_string())).is_none() {
			return Err(Error::InvalidRequest {
				message: format!("defaultEntityUid {uid:?} is not a declared content type."),
				field: Some("defaultEntityUid".to_string()),
			});
		}
		if settings.default_query_limit == Some(0) {
			return Err(Error::InvalidRequest {
				message: "defaultQueryLimit must be greater than zero.".to_string(),
				field: Some("defaultQueryLimit".to_string()),
			});
		}

		Ok(())
	}
}

fn encode(settings: &Settings) -> Result<Value> {
	serde_json::to_value(settings).map_err(|err| Error::Settings { message: err.to_string() })
}

fn decode(value: Value) -> Result<Settings> {
	serde_json::from_value(value).map_err(|err| Error::Settings { message: err.to_string() })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn payload_accepts_wrapped_and_bare_shapes() {
		let wrapped: SettingsPayload = serde_json::from_value(serde_json::json!({
			"body": { "defaultEntityUid": "api::article.article", "defaultQueryLimit": 20 }
		}))
		.expect("Failed to parse wrapped settings.");
		let bare: SettingsPayload = serde_json::from_value(serde_json::json!({
			"defaultEntityUid": "api::article.article",
			"defaultApiEndpoint": "/api/articles",
			"defaultPublishedOnly": true
		}))
		.expect("Failed to parse bare settings.");
		let wrapped = wrapped.into_settings();
		let bare = bare.into_settings();

		assert_eq!(wrapped.default_query_limit, Some(20));
		assert_eq!(wrapped.default_api_endpoint, "");
		assert!(bare.default_published_only);
		assert_eq!(bare.default_query_limit, None);
	}

	#[test]
	fn settings_serialize_with_camel_case_keys() {
		let settings = Settings::from(&Defaults::default());
		let json = serde_json::to_value(&settings).expect("Failed to serialize settings.");

		assert_eq!(
			json,
			serde_json::json!({
				"defaultEntityUid": "api::article.article",
				"defaultApiEndpoint": "",
				"defaultPublishedOnly": false,
				"defaultQueryLimit": 50
			})
		);
	}
}

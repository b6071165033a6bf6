use std::collections::HashMap;

use msf_config::{ContentType, SortOrder};
use msf_domain::source::{QuerySource, normalize_api_path};

/// How entries of one collection are labelled and ordered in the selection dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySettings {
	pub uid: String,
	pub main_field: String,
	pub default_sort_by: String,
	pub default_sort_order: SortOrder,
}

/// Resolves the display configuration of a collection.
pub trait DisplayFieldResolver
where
	Self: Send + Sync,
{
	fn resolve(&self, source: &QuerySource) -> Option<DisplaySettings>;

	fn display_field(&self, uid: &str) -> Option<String> {
		self.resolve(&QuerySource::Uid(uid.to_string())).map(|settings| settings.main_field)
	}
}

/// Resolver backed by the `[[content_types]]` declared in the service config.
#[derive(Debug, Default)]
pub struct ContentTypeRegistry {
	by_uid: HashMap<String, DisplaySettings>,
	uid_by_api_path: HashMap<String, String>,
}
impl ContentTypeRegistry {
	pub fn from_config(content_types: &[ContentType]) -> Self {
		let mut registry = Self::default();

		for content_type in content_types {
			registry
				.uid_by_api_path
				.insert(normalize_api_path(&content_type.api_path), content_type.uid.clone());
			registry.by_uid.insert(
				content_type.uid.clone(),
				DisplaySettings {
					uid: content_type.uid.clone(),
					main_field: content_type.main_field.clone(),
					default_sort_by: content_type.default_sort_by.clone(),
					default_sort_order: content_type.default_sort_order,
				},
			);
		}

		registry
	}
}

impl DisplayFieldResolver for ContentTypeRegistry {
	fn resolve(&self, source: &QuerySource) -> Option<DisplaySettings> {
		let uid = match source {
			QuerySource::Uid(uid) => uid.as_str(),
			QuerySource::ApiPath(path) =>
				self.uid_by_api_path.get(&normalize_api_path(path))?.as_str(),
		};

		self.by_uid.get(uid).cloned()
	}
}

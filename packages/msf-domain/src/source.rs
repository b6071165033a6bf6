/// Where the selection dropdown reads its options from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
	/// A collection addressed by its identifier, e.g. `api::article.article`.
	Uid(String),
	/// A collection addressed by its REST path, e.g. `/api/articles`.
	ApiPath(String),
}
impl QuerySource {
	pub fn api_path(raw: &str) -> Self {
		Self::ApiPath(normalize_api_path(raw))
	}

	pub fn label(&self) -> &str {
		match self {
			Self::Uid(uid) => uid,
			Self::ApiPath(path) => path,
		}
	}
}

/// Strips a leading `/api` segment and surrounding slashes: `/api/articles/` becomes `articles`.
pub fn normalize_api_path(raw: &str) -> String {
	let trimmed = raw.trim();
	let without_prefix = match trimmed.strip_prefix("/api") {
		Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
		_ => trimmed,
	};

	without_prefix.trim_matches('/').to_string()
}

use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use msf_domain::{ordering::Reference, status::Status};

/// One stored association. A draft row and its published copy share `document_id`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MultiSelectItem {
	pub id: i64,
	pub document_id: Uuid,
	pub tag: String,
	pub ref_uid: String,
	pub ref_entity_id: String,
	pub ref_published: bool,
	pub order: i32,
	pub published_at: Option<OffsetDateTime>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}
impl MultiSelectItem {
	pub fn status(&self) -> Status {
		Status::from_published(self.published_at.is_some())
	}
}

impl Reference for MultiSelectItem {
	fn ref_uid(&self) -> &str {
		&self.ref_uid
	}

	fn ref_entity_id(&self) -> &str {
		&self.ref_entity_id
	}

	fn ref_published(&self) -> bool {
		self.ref_published
	}
}

#[derive(Debug, Clone)]
pub struct NewMultiSelectItem {
	pub document_id: Uuid,
	pub tag: String,
	pub ref_uid: String,
	pub ref_entity_id: String,
	pub ref_published: bool,
	pub order: i32,
}

/// One lifecycle copy of a referenceable document.
#[derive(Debug, Clone)]
pub struct ContentEntry {
	pub uid: String,
	pub document_id: String,
	pub fields: Value,
	pub published_at: Option<OffsetDateTime>,
}

/// Projection returned to the selection dropdown: identity, publish time, and main field.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EntrySummary {
	pub id: i64,
	pub document_id: String,
	pub published_at: Option<OffsetDateTime>,
	pub display: Option<String>,
}

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use msf_domain::status::Status;
use msf_storage::items;

use crate::{MsfService, Result};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PublishRequest {
	pub tag: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
	pub tag: String,
	pub removed: u64,
	pub published: u64,
}

impl MsfService {
	/// `POST /publish`.
	pub async fn publish_by_tag(&self, req: PublishRequest) -> Result<PublishResponse> {
		let tag = crate::required(req.tag.as_deref(), "tag")?;

		self.publish(tag).await
	}

	/// Replaces the published group of `tag` with a copy of its draft group. Each published row
	/// keeps the `documentId` of the draft it was copied from.
	pub async fn publish(&self, tag: &str) -> Result<PublishResponse> {
		let tag = crate::required(Some(tag), "tag")?;
		let _guard = self.tag_locks.acquire(tag).await;
		let now = OffsetDateTime::now_utc();
		let mut tx = self.db.pool.begin().await?;

		items::lock_tag(&mut *tx, tag).await?;

		let removed = items::delete_items(&mut *tx, tag, Status::Published).await?;
		let published = items::copy_drafts_to_published(&mut *tx, tag, now).await?;

		tx.commit().await?;

		tracing::info!(tag, removed, published, "Associations published.");

		Ok(PublishResponse { tag: tag.to_string(), removed, published })
	}
}

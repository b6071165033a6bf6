//! Replacement of the draft association group of a tag.

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use msf_domain::{
	ordering::{self, Reference},
	status::Status,
};
use msf_storage::{items, models::NewMultiSelectItem};

use crate::{Error, MsfService, Result};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateRequest {
	pub tag: Option<String>,
	#[serde(default)]
	pub data: Vec<ItemRequest>,
}

/// One wanted association as posted by the field. `order` is informational only.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemRequest {
	pub ref_uid: Option<String>,
	#[serde(default, deserialize_with = "entity_id")]
	pub ref_entity_id: Option<String>,
	#[serde(default)]
	pub ref_published: bool,
	pub order: Option<i32>,
}

/// A validated association, in the position it should take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesiredItem {
	pub ref_uid: String,
	pub ref_entity_id: String,
	pub ref_published: bool,
	/// The order the client believed this item had, if it sent one.
	pub claimed_order: Option<i32>,
}

impl Reference for DesiredItem {
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

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
	pub tag: String,
	pub deleted: u64,
	pub inserted: u64,
}

impl MsfService {
	/// `POST /update`: validates the request and replaces the draft group of its tag.
	pub async fn update_by_tag(&self, req: UpdateRequest) -> Result<UpdateResponse> {
		let tag = crate::required(req.tag.as_deref(), "tag")?.to_string();
		let mut desired = Vec::with_capacity(req.data.len());

		for (index, item) in req.data.into_iter().enumerate() {
			let ref_uid =
				crate::required(item.ref_uid.as_deref(), &format!("data[{index}].ref_uid"))?;
			let ref_entity_id = crate::required(
				item.ref_entity_id.as_deref(),
				&format!("data[{index}].ref_entity_id"),
			)?;

			desired.push(DesiredItem {
				ref_uid: ref_uid.to_string(),
				ref_entity_id: ref_entity_id.to_string(),
				ref_published: item.ref_published,
				claimed_order: item.order,
			});
		}

		self.replace_associations(&tag, desired).await
	}

	/// Makes the draft group of `tag` exactly `desired`, numbered by position. Published rows are
	/// left alone.
	pub async fn replace_associations(
		&self,
		tag: &str,
		desired: Vec<DesiredItem>,
	) -> Result<UpdateResponse> {
		let tag = crate::required(Some(tag), "tag")?;

		if let Some((index, id)) = ordering::find_duplicate(&desired) {
			return Err(Error::InvalidRequest {
				message: format!("ref_entity_id {id:?} appears more than once."),
				field: Some(format!("data[{index}].ref_entity_id")),
			});
		}

		let _guard = self.tag_locks.acquire(tag).await;
		let now = OffsetDateTime::now_utc();
		let mut tx = self.db.pool.begin().await?;

		items::lock_tag(&mut *tx, tag).await?;

		let deleted = items::delete_items(&mut *tx, tag, Status::Draft).await?;
		let mut inserted = 0_u64;

		for (order, item) in ordering::rank_by_position(desired) {
			if let Some(claimed) = item.claimed_order.filter(|claimed| *claimed != order) {
				tracing::debug!(
					tag,
					ref_entity_id = %item.ref_entity_id,
					claimed,
					order,
					"Ignoring client order in favour of list position."
				);
			}

			let row = NewMultiSelectItem {
				document_id: Uuid::new_v4(),
				tag: tag.to_string(),
				ref_uid: item.ref_uid,
				ref_entity_id: item.ref_entity_id,
				ref_published: item.ref_published,
				order,
			};

			items::insert_draft_item(&mut *tx, &row, now).await?;

			inserted += 1;
		}

		tx.commit().await?;

		tracing::info!(tag, deleted, inserted, "Draft associations replaced.");

		Ok(UpdateResponse { tag: tag.to_string(), deleted, inserted })
	}
}

/// Accepts entity ids sent either as JSON strings or as numbers.
fn entity_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Text(String),
		Number(serde_json::Number),
	}

	let raw = Option::<Raw>::deserialize(deserializer)?;

	Ok(raw.map(|raw| match raw {
		Raw::Text(text) => text,
		Raw::Number(number) => number.to_string(),
	}))
}

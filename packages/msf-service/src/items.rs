use serde::{Deserialize, Serialize};
use uuid::Uuid;

use msf_domain::{
	grouping::{self, TargetIndex},
	ordering,
	status::Status,
};
use msf_storage::{
	entries, items,
	models::{EntrySummary, MultiSelectItem},
};

use crate::{MsfService, Outcome, Result};

/// One stored association as shown in the field's list, with the target's current title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
	pub id: i64,
	#[serde(rename = "documentId")]
	pub document_id: Uuid,
	pub tag: String,
	pub ref_uid: String,
	pub ref_entity_id: String,
	pub ref_published: bool,
	pub order: i32,
	/// Absent when the target no longer exists or its collection is not declared.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
}
impl ItemView {
	fn new(item: MultiSelectItem, title: Option<String>) -> Self {
		Self {
			id: item.id,
			document_id: item.document_id,
			tag: item.tag,
			ref_uid: item.ref_uid,
			ref_entity_id: item.ref_entity_id,
			ref_published: item.ref_published,
			order: item.order,
			title,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsResponse {
	pub result: Vec<ItemView>,
	pub error_message: String,
}

impl From<Outcome<Vec<ItemView>>> for ItemsResponse {
	fn from(outcome: Outcome<Vec<ItemView>>) -> Self {
		let (result, error_message) = outcome.into_parts();

		Self { result, error_message: error_message.unwrap_or_default() }
	}
}

impl MsfService {
	/// Lists the associations of `tag` in `status`, ordered by `order`, with target titles
	/// resolved in bulk.
	pub async fn items_by_tag(&self, tag: Option<&str>, status: Status) -> Result<ItemsResponse> {
		let tag = crate::required(tag, "tag")?;
		let outcome = match self.list_with_titles(tag, status).await {
			Ok(views) => Outcome::Ok(views),
			Err(err) => {
				tracing::error!(error = %err, tag, %status, "Listing associations failed.");

				Outcome::soft_fail(err.to_string())
			},
		};

		Ok(outcome.into())
	}

	async fn list_with_titles(&self, tag: &str, status: Status) -> Result<Vec<ItemView>> {
		let rows = items::list_items(&self.db.pool, tag, status).await?;

		if !ordering::is_dense(rows.iter().map(|row| row.order)) {
			tracing::warn!(tag, %status, "Association order is not contiguous.");
		}

		let targets = self.lookup_targets(&rows).await?;
		let views = rows
			.into_iter()
			.map(|row| {
				let title = targets.get(&row).and_then(|target| target.display.clone());

				ItemView::new(row, title)
			})
			.collect();

		Ok(views)
	}

	/// Bulk-fetches the targets of `rows`: one query per collection and lifecycle copy.
	pub(crate) async fn lookup_targets(
		&self,
		rows: &[MultiSelectItem],
	) -> Result<TargetIndex<EntrySummary>> {
		let mut index = TargetIndex::default();

		for group in grouping::group_by_collection(rows) {
			let Some(main_field) = self.resolver.display_field(group.uid) else {
				tracing::warn!(
					ref_uid = group.uid,
					"Associations point at an undeclared collection."
				);

				continue;
			};

			for (status, ids) in
				[(Status::Published, &group.published_ids), (Status::Draft, &group.draft_ids)]
			{
				let found = entries::find_by_document_ids(
					&self.db.pool,
					group.uid,
					&main_field,
					status,
					ids,
				)
				.await?;

				for entry in found {
					let document_id = entry.document_id.clone();

					index.insert(group.uid, status.is_published(), document_id, entry);
				}
			}
		}

		Ok(index)
	}
}

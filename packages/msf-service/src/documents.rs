//! Report of every published association, grouped by the collection it points into.

use serde::Serialize;

use msf_domain::grouping;
use msf_storage::items;

use crate::{MsfService, Outcome, Result};

/// A target entity as listed in the report, with the association's rank and tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentItem {
	pub id: i64,
	#[serde(rename = "documentId")]
	pub document_id: String,
	pub order: i32,
	pub tag: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentGroup {
	pub uid: String,
	pub items: Vec<DocumentItem>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsResponse {
	pub result: Vec<DocumentGroup>,
	pub error_message: String,
}

impl From<Outcome<Vec<DocumentGroup>>> for DocumentsResponse {
	fn from(outcome: Outcome<Vec<DocumentGroup>>) -> Self {
		let (result, error_message) = outcome.into_parts();

		Self { result, error_message: error_message.unwrap_or_default() }
	}
}

impl MsfService {
	/// `GET /documents`. Associations whose target no longer exists are left out.
	pub async fn documents_grouped_by_tag(&self) -> Outcome<Vec<DocumentGroup>> {
		match self.collect_documents().await {
			Ok(groups) => Outcome::Ok(groups),
			Err(err) => {
				tracing::error!(error = %err, "Building the documents report failed.");

				Outcome::soft_fail(err.to_string())
			},
		}
	}

	async fn collect_documents(&self) -> Result<Vec<DocumentGroup>> {
		let rows = items::list_published_items(&self.db.pool).await?;
		let targets = self.lookup_targets(&rows).await?;
		let mut groups = Vec::new();

		for group in grouping::group_by_collection(&rows) {
			let items = group
				.members
				.iter()
				.filter_map(|&index| {
					let row = &rows[index];

					targets.get(row).map(|target| DocumentItem {
						id: target.id,
						document_id: target.document_id.clone(),
						order: row.order,
						tag: row.tag.clone(),
					})
				})
				.collect::<Vec<_>>();

			if !items.is_empty() {
				groups.push(DocumentGroup { uid: group.uid.to_string(), items });
			}
		}

		Ok(groups)
	}
}

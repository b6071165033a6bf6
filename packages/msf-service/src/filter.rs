//! Filtered, paginated lookups that feed the selection dropdown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;

use msf_domain::{
	pagination::{self, PageMeta},
	source::QuerySource,
	status::Status,
};
use msf_storage::{
	entries::{self, EntryQuery, EntrySort, Window},
	models::EntrySummary,
};

use crate::{Error, MsfService, Outcome, Result};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
	pub uid: Option<String>,
	pub filter: Option<String>,
	pub published_only: Option<bool>,
	pub query_start: Option<u64>,
	pub query_limit: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpointRequest {
	pub api_endpoint: Option<String>,
	pub filter: Option<String>,
	pub published_only: Option<bool>,
	pub query_start: Option<u64>,
	pub query_limit: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryParams {
	pub source: QuerySource,
	pub filter: Option<String>,
	pub start: u64,
	/// Page size requested by the caller. Missing or zero falls back to the settings default.
	pub limit: Option<u32>,
	/// Missing falls back to the settings default.
	pub published_only: Option<bool>,
}

/// One matching entry: identity, publish time, and the main field under its own name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryView {
	pub id: i64,
	pub document_id: String,
	pub published_at: Option<OffsetDateTime>,
	pub main_field: String,
	pub display: Option<String>,
}
impl EntryView {
	fn from_summary(summary: EntrySummary, main_field: &str) -> Self {
		Self {
			id: summary.id,
			document_id: summary.document_id,
			published_at: summary.published_at,
			main_field: main_field.to_string(),
			display: summary.display,
		}
	}
}

impl Serialize for EntryView {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		#[derive(Serialize)]
		struct Wire<'a> {
			id: i64,
			#[serde(rename = "documentId")]
			document_id: &'a str,
			#[serde(
				rename = "publishedAt",
				serialize_with = "crate::time_serde::option::serialize"
			)]
			published_at: Option<OffsetDateTime>,
			#[serde(flatten)]
			display: BTreeMap<&'a str, Option<&'a str>>,
		}

		let mut display = BTreeMap::new();

		if !matches!(self.main_field.as_str(), "id" | "documentId" | "publishedAt") {
			display.insert(self.main_field.as_str(), self.display.as_deref());
		}

		Wire {
			id: self.id,
			document_id: &self.document_id,
			published_at: self.published_at,
			display,
		}
		.serialize(serializer)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryPage {
	pub result: Vec<EntryView>,
	pub main_field: String,
	/// Absent when no page size could be resolved and the whole match set was returned.
	pub meta: Option<PageMeta>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
	pub result: Vec<EntryView>,
	pub main_field: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub meta: Option<PageMeta>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error_message: Option<String>,
}

impl From<Outcome<QueryPage>> for QueryResponse {
	fn from(outcome: Outcome<QueryPage>) -> Self {
		let (page, error_message) = outcome.into_parts();

		Self { result: page.result, main_field: page.main_field, meta: page.meta, error_message }
	}
}

impl MsfService {
	/// `POST /filter`: query a collection addressed by uid.
	pub async fn filter(&self, req: FilterRequest) -> Result<QueryResponse> {
		let uid = crate::required(req.uid.as_deref(), "uid")?;
		let params = QueryParams {
			source: QuerySource::Uid(uid.to_string()),
			filter: req.filter,
			start: req.query_start.unwrap_or(0),
			limit: req.query_limit,
			published_only: req.published_only,
		};

		Ok(self.query(params).await.into())
	}

	/// `POST /api/{endpoint}`: query a collection addressed by its REST path. The path segment
	/// wins over `apiEndpoint` in the body.
	pub async fn filter_api_endpoint(
		&self,
		endpoint: &str,
		req: ApiEndpointRequest,
	) -> Result<QueryResponse> {
		let endpoint = match crate::required(Some(endpoint), "apiEndpoint") {
			Ok(endpoint) => endpoint,
			Err(_) => crate::required(req.api_endpoint.as_deref(), "apiEndpoint")?,
		};
		let params = QueryParams {
			source: QuerySource::api_path(endpoint),
			filter: req.filter,
			start: req.query_start.unwrap_or(0),
			limit: req.query_limit,
			published_only: req.published_only,
		};

		Ok(self.query(params).await.into())
	}

	/// Runs one stateless page of a filtered query. Failures come back as an empty page with a
	/// message.
	pub async fn query(&self, params: QueryParams) -> Outcome<QueryPage> {
		match self.run_query(&params).await {
			Ok(page) => Outcome::Ok(page),
			Err(err) => {
				tracing::error!(
					error = %err,
					source = params.source.label(),
					"Filtered query failed."
				);

				Outcome::soft_fail(err.to_string())
			},
		}
	}

	async fn run_query(&self, params: &QueryParams) -> Result<QueryPage> {
		let content_type = self
			.resolver
			.resolve(&params.source)
			.ok_or_else(|| Error::UnknownContentType { label: params.source.label().to_string() })?;
		let settings = self.get_settings().await?;
		let published_only = params.published_only.unwrap_or(settings.default_published_only);
		let limit = pagination::resolve_limit(params.limit, settings.default_query_limit);
		let start = i64::try_from(params.start).map_err(|_| Error::InvalidRequest {
			message: "queryStart is out of range.".to_string(),
			field: Some("queryStart".to_string()),
		})?;
		let query = EntryQuery {
			uid: content_type.uid.clone(),
			main_field: content_type.main_field.clone(),
			filter: params.filter.clone().filter(|filter| !filter.is_empty()),
			status: if published_only { Status::Published } else { Status::Draft },
			sort: if published_only {
				EntrySort::PublishedAtDesc
			} else {
				EntrySort::Field {
					name: content_type.default_sort_by.clone(),
					order: content_type.default_sort_order,
				}
			},
		};
		let window = Window { start, limit: limit.map(|limit| i64::from(limit.get())) };
		let total = entries::count_entries(&self.db.pool, &query).await?;
		let rows = entries::find_entries(&self.db.pool, &query, window).await?;
		let meta = limit.map(|limit| PageMeta::new(total.max(0) as u64, params.start, limit));

		tracing::debug!(
			uid = %content_type.uid,
			total,
			returned = rows.len(),
			published_only,
			"Filtered query served."
		);

		Ok(QueryPage {
			result: rows
				.into_iter()
				.map(|row| EntryView::from_summary(row, &content_type.main_field))
				.collect(),
			main_field: content_type.main_field,
			meta,
		})
	}
}

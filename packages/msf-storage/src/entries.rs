//! Read access to the referenceable collections. Each row is one lifecycle copy of a document;
//! field values live in the `fields` JSON object.

use sqlx::{PgExecutor, Postgres, QueryBuilder};
use time::OffsetDateTime;

use msf_config::SortOrder;
use msf_domain::status::Status;

use crate::{
	Result,
	models::{ContentEntry, EntrySummary},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySort {
	/// Most recently published first.
	PublishedAtDesc,
	Field { name: String, order: SortOrder },
}

#[derive(Debug, Clone)]
pub struct EntryQuery {
	pub uid: String,
	pub main_field: String,
	/// Case-sensitive substring match on the main field. `None` disables filtering.
	pub filter: Option<String>,
	pub status: Status,
	pub sort: EntrySort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
	pub start: i64,
	pub limit: Option<i64>,
}

pub async fn count_entries<'e, E>(executor: E, query: &EntryQuery) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let mut builder = QueryBuilder::<Postgres>::new("SELECT count(*) FROM content_entries");

	push_conditions(&mut builder, query);

	let count = builder.build_query_scalar::<i64>().fetch_one(executor).await?;

	Ok(count)
}

pub async fn find_entries<'e, E>(
	executor: E,
	query: &EntryQuery,
	window: Window,
) -> Result<Vec<EntrySummary>>
where
	E: PgExecutor<'e>,
{
	let mut builder = QueryBuilder::<Postgres>::new("");

	push_projection(&mut builder, &query.main_field);
	push_conditions(&mut builder, query);

	builder.push(" ORDER BY ");

	match &query.sort {
		EntrySort::PublishedAtDesc => {
			builder.push("published_at DESC NULLS LAST");
		},
		EntrySort::Field { name, order } => {
			push_field(&mut builder, name, false);
			builder.push(" ");
			builder.push(order.as_sql());
		},
	}

	builder.push(", id ASC OFFSET ");
	builder.push_bind(window.start);

	if let Some(limit) = window.limit {
		builder.push(" LIMIT ");
		builder.push_bind(limit);
	}

	let rows = builder.build_query_as::<EntrySummary>().fetch_all(executor).await?;

	Ok(rows)
}

/// Bulk lookup of one lifecycle copy of the given documents.
pub async fn find_by_document_ids<'e, E>(
	executor: E,
	uid: &str,
	main_field: &str,
	status: Status,
	document_ids: &[&str],
) -> Result<Vec<EntrySummary>>
where
	E: PgExecutor<'e>,
{
	if document_ids.is_empty() {
		return Ok(Vec::new());
	}

	let ids = document_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();
	let mut builder = QueryBuilder::<Postgres>::new("");

	push_projection(&mut builder, main_field);

	builder.push(" WHERE uid = ");
	builder.push_bind(uid.to_string());
	builder.push(" AND document_id = ANY(");
	builder.push_bind(ids);
	builder.push(")");

	push_status(&mut builder, status);

	let rows = builder.build_query_as::<EntrySummary>().fetch_all(executor).await?;

	Ok(rows)
}

pub async fn insert_entry<'e, E>(executor: E, entry: &ContentEntry) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let now = OffsetDateTime::now_utc();
	let id = sqlx::query_scalar::<_, i64>(
		"\
INSERT INTO content_entries (
\tuid,
\tdocument_id,
\tfields,
\tpublished_at,
\tcreated_at,
\tupdated_at
)
VALUES ($1,$2,$3,$4,$5,$5)
RETURNING id",
	)
	.bind(entry.uid.as_str())
	.bind(entry.document_id.as_str())
	.bind(&entry.fields)
	.bind(entry.published_at)
	.bind(now)
	.fetch_one(executor)
	.await?;

	Ok(id)
}

pub async fn delete_entry<'e, E>(
	executor: E,
	uid: &str,
	document_id: &str,
	status: Status,
) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
DELETE FROM content_entries
WHERE uid = $1 AND document_id = $2 AND (published_at IS NOT NULL) = $3",
	)
	.bind(uid)
	.bind(document_id)
	.bind(status.is_published())
	.execute(executor)
	.await?;

	Ok(result.rows_affected())
}

fn push_projection(builder: &mut QueryBuilder<'_, Postgres>, main_field: &str) {
	builder.push("SELECT id, document_id, published_at, ");
	push_field(builder, main_field, true);
	builder.push(" AS display FROM content_entries");
}

fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &EntryQuery) {
	builder.push(" WHERE uid = ");
	builder.push_bind(query.uid.clone());

	push_status(builder, query.status);

	if let Some(filter) = query.filter.as_deref().filter(|filter| !filter.is_empty()) {
		builder.push(" AND strpos(");
		push_field(builder, &query.main_field, true);
		builder.push(", ");
		builder.push_bind(filter.to_string());
		builder.push(") > 0");
	}
}

fn push_status(builder: &mut QueryBuilder<'_, Postgres>, status: Status) {
	match status {
		Status::Draft => builder.push(" AND published_at IS NULL"),
		Status::Published => builder.push(" AND published_at IS NOT NULL"),
	};
}

/// Top-level attributes map to columns; everything else is read from `fields`.
fn push_field(builder: &mut QueryBuilder<'_, Postgres>, name: &str, as_text: bool) {
	let column = match name {
		"id" => Some("id"),
		"documentId" => Some("document_id"),
		"publishedAt" => Some("published_at"),
		"createdAt" => Some("created_at"),
		"updatedAt" => Some("updated_at"),
		_ => None,
	};

	match column {
		Some(column) if as_text => {
			builder.push("(");
			builder.push(column);
			builder.push(")::text");
		},
		Some(column) => {
			builder.push(column);
		},
		None => {
			builder.push("(fields ->> ");
			builder.push_bind(name.to_string());
			builder.push(")");
		},
	}
}

use sqlx::PgExecutor;
use time::OffsetDateTime;

use msf_domain::status::Status;

use crate::{
	Result,
	models::{MultiSelectItem, NewMultiSelectItem},
};

const TAG_LOCK_NAMESPACE: i32 = 7_120_116;

/// Serializes writers of one tag until the surrounding transaction ends.
pub async fn lock_tag<'e, E>(executor: E, tag: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
		.bind(TAG_LOCK_NAMESPACE)
		.bind(tag)
		.execute(executor)
		.await?;

	Ok(())
}

pub async fn list_items<'e, E>(
	executor: E,
	tag: &str,
	status: Status,
) -> Result<Vec<MultiSelectItem>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, MultiSelectItem>(
		"\
SELECT
\tid,
\tdocument_id,
\ttag,
\tref_uid,
\tref_entity_id,
\tref_published,
\t\"order\",
\tpublished_at,
\tcreated_at,
\tupdated_at
FROM multiselect_items
WHERE tag = $1 AND (published_at IS NOT NULL) = $2
ORDER BY \"order\" ASC, id ASC",
	)
	.bind(tag)
	.bind(status.is_published())
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Every published association across all tags, ordered by tag then rank.
pub async fn list_published_items<'e, E>(executor: E) -> Result<Vec<MultiSelectItem>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, MultiSelectItem>(
		"\
SELECT
\tid,
\tdocument_id,
\ttag,
\tref_uid,
\tref_entity_id,
\tref_published,
\t\"order\",
\tpublished_at,
\tcreated_at,
\tupdated_at
FROM multiselect_items
WHERE published_at IS NOT NULL
ORDER BY tag ASC, \"order\" ASC, id ASC",
	)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn delete_items<'e, E>(executor: E, tag: &str, status: Status) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"DELETE FROM multiselect_items WHERE tag = $1 AND (published_at IS NOT NULL) = $2",
	)
	.bind(tag)
	.bind(status.is_published())
	.execute(executor)
	.await?;

	Ok(result.rows_affected())
}

pub async fn insert_draft_item<'e, E>(
	executor: E,
	item: &NewMultiSelectItem,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO multiselect_items (
\tdocument_id,
\ttag,
\tref_uid,
\tref_entity_id,
\tref_published,
\t\"order\",
\tpublished_at,
\tcreated_at,
\tupdated_at
)
VALUES ($1,$2,$3,$4,$5,$6,NULL,$7,$7)",
	)
	.bind(item.document_id)
	.bind(item.tag.as_str())
	.bind(item.ref_uid.as_str())
	.bind(item.ref_entity_id.as_str())
	.bind(item.ref_published)
	.bind(item.order)
	.bind(now)
	.execute(executor)
	.await?;

	Ok(())
}

/// Inserts a published copy of every draft row of `tag`. Existing published rows must be removed
/// first.
pub async fn copy_drafts_to_published<'e, E>(
	executor: E,
	tag: &str,
	now: OffsetDateTime,
) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
INSERT INTO multiselect_items (
\tdocument_id,
\ttag,
\tref_uid,
\tref_entity_id,
\tref_published,
\t\"order\",
\tpublished_at,
\tcreated_at,
\tupdated_at
)
SELECT
\tdocument_id,
\ttag,
\tref_uid,
\tref_entity_id,
\tref_published,
\t\"order\",
\t$2,
\tcreated_at,
\t$2
FROM multiselect_items
WHERE tag = $1 AND published_at IS NULL
ORDER BY \"order\" ASC",
	)
	.bind(tag)
	.bind(now)
	.execute(executor)
	.await?;

	Ok(result.rows_affected())
}

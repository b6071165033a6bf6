//! Key-value blobs owned by the service, such as the settings singleton.

use serde_json::Value;
use sqlx::PgExecutor;
use time::OffsetDateTime;

use crate::{Error, Result};

pub async fn get_value<'e, E>(executor: E, key: &str) -> Result<Option<Value>>
where
	E: PgExecutor<'e>,
{
	let value = sqlx::query_scalar::<_, Value>("SELECT value FROM plugin_store WHERE key = $1")
		.bind(key)
		.fetch_optional(executor)
		.await?;

	Ok(value)
}

/// Overwrites the blob stored under `key`.
pub async fn set_value<'e, E>(executor: E, key: &str, value: &Value) -> Result<()>
where
	E: PgExecutor<'e>,
{
	validate_key(key)?;

	sqlx::query(
		"\
INSERT INTO plugin_store (key, value, updated_at)
VALUES ($1, $2, $3)
ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at",
	)
	.bind(key)
	.bind(value)
	.bind(OffsetDateTime::now_utc())
	.execute(executor)
	.await?;

	Ok(())
}

/// Stores `value` only when `key` is absent. Returns whether a row was written.
pub async fn insert_value_if_absent<'e, E>(executor: E, key: &str, value: &Value) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	validate_key(key)?;

	let result = sqlx::query(
		"\
INSERT INTO plugin_store (key, value, updated_at)
VALUES ($1, $2, $3)
ON CONFLICT (key) DO NOTHING",
	)
	.bind(key)
	.bind(value)
	.bind(OffsetDateTime::now_utc())
	.execute(executor)
	.await?;

	Ok(result.rows_affected() == 1)
}

fn validate_key(key: &str) -> Result<()> {
	if key.trim().is_empty() {
		return Err(Error::InvalidArgument("store key must be non-empty.".to_string()));
	}

	Ok(())
}

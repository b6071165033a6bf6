use time::OffsetDateTime;

use msf_config::{Config, ContentType, Defaults, Postgres, Security, Service, SortOrder, Storage};
use msf_domain::{source::QuerySource, status::Status};
use msf_service::{
	DesiredItem, Error, FilterRequest, MsfService, QueryParams, Settings, UpdateRequest,
};
use msf_storage::{db::Db, entries, models::ContentEntry};
use msf_testkit::TestDatabase;

const ARTICLE: &str = "api::article.article";
const AUTHOR: &str = "api::author.author";

fn test_config(dsn: &str) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage { postgres: Postgres { dsn: dsn.to_string(), pool_max_conns: 4 } },
		security: Security { bind_localhost_only: true, api_auth_token: None },
		defaults: Defaults { default_query_limit: Some(10), ..Defaults::default() },
		content_types: vec![
			ContentType {
				uid: ARTICLE.to_string(),
				api_path: "articles".to_string(),
				main_field: "title".to_string(),
				default_sort_by: "title".to_string(),
				default_sort_order: SortOrder::Asc,
			},
			ContentType {
				uid: AUTHOR.to_string(),
				api_path: "authors".to_string(),
				main_field: "name".to_string(),
				default_sort_by: "name".to_string(),
				default_sort_order: SortOrder::Asc,
			},
		],
	}
}

async fn build_service(test_db: &TestDatabase) -> MsfService {
	let cfg = test_config(test_db.dsn());
	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	MsfService::new(cfg, db)
}

/// Seeds a draft copy and, when `published`, a published copy of one article.
async fn seed_article(service: &MsfService, document_id: &str, title: &str, published: bool) {
	seed_entry(service, ARTICLE, document_id, serde_json::json!({ "title": title }), published)
		.await;
}

async fn seed_entry(
	service: &MsfService,
	uid: &str,
	document_id: &str,
	fields: serde_json::Value,
	published: bool,
) {
	let mut entry = ContentEntry {
		uid: uid.to_string(),
		document_id: document_id.to_string(),
		fields,
		published_at: None,
	};

	entries::insert_entry(&service.db.pool, &entry).await.expect("Failed to seed draft entry.");

	if published {
		entry.published_at = Some(OffsetDateTime::now_utc());

		entries::insert_entry(&service.db.pool, &entry)
			.await
			.expect("Failed to seed published entry.");
	}
}

fn desired(ids: &[&str]) -> Vec<DesiredItem> {
	desired_in(ARTICLE, ids)
}

fn desired_in(uid: &str, ids: &[&str]) -> Vec<DesiredItem> {
	ids.iter()
		.map(|id| DesiredItem {
			ref_uid: uid.to_string(),
			ref_entity_id: id.to_string(),
			ref_published: true,
			claimed_order: None,
		})
		.collect()
}

fn listed(service_items: &msf_service::ItemsResponse) -> Vec<(String, i32)> {
	service_items.result.iter().map(|item| (item.ref_entity_id.clone(), item.order)).collect()
}

fn query(filter: Option<&str>, start: u64) -> QueryParams {
	QueryParams {
		source: QuerySource::Uid(ARTICLE.to_string()),
		filter: filter.map(str::to_string),
		start,
		limit: None,
		published_only: Some(false),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MSF_PG_DSN to run."]
async fn replacing_featured_list_renumbers_by_position() {
	let Some(base_dsn) = msf_testkit::env_dsn() else {
		eprintln!("Skipping replacing_featured_list_renumbers_by_position; set MSF_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;

	for (id, title) in [("d1", "First"), ("d2", "Second"), ("d3", "Third")] {
		seed_article(&service, id, title, true).await;
	}

	service.replace_associations("featured", desired(&["d1", "d2"])).await.expect("replace");

	let response =
		service.replace_associations("featured", desired(&["d2", "d3"])).await.expect("replace");

	assert_eq!(response.deleted, 2);
	assert_eq!(response.inserted, 2);

	let items = service.items_by_tag(Some("featured"), Status::Draft).await.expect("list");

	assert_eq!(items.error_message, "");
	assert_eq!(listed(&items), vec![("d2".to_string(), 1), ("d3".to_string(), 2)]);
	assert_eq!(
		items.result.iter().map(|item| item.title.as_deref()).collect::<Vec<_>>(),
		vec![Some("Second"), Some("Third")]
	);

	let published = service.items_by_tag(Some("featured"), Status::Published).await.expect("list");

	assert!(published.result.is_empty(), "Replacing drafts must not touch published rows.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MSF_PG_DSN to run."]
async fn replace_is_idempotent_and_rejects_duplicates() {
	let Some(base_dsn) = msf_testkit::env_dsn() else {
		eprintln!("Skipping replace_is_idempotent_and_rejects_duplicates; set MSF_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;

	service.replace_associations("featured", desired(&["d1", "d2"])).await.expect("replace");

	let first = service.items_by_tag(Some("featured"), Status::Draft).await.expect("list");

	service.replace_associations("featured", desired(&["d1", "d2"])).await.expect("replace");

	let second = service.items_by_tag(Some("featured"), Status::Draft).await.expect("list");

	assert_eq!(listed(&first), listed(&second));

	let err = service
		.replace_associations("featured", desired(&["d1", "d1"]))
		.await
		.expect_err("Duplicate targets must be rejected.");

	assert!(matches!(
		err,
		Error::InvalidRequest { field: Some(field), .. } if field == "data[1].ref_entity_id"
	));
	assert_eq!(
		listed(&service.items_by_tag(Some("featured"), Status::Draft).await.expect("list")),
		listed(&first),
		"A rejected replacement must leave the group unchanged."
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MSF_PG_DSN to run."]
async fn publish_mirrors_the_draft_group() {
	let Some(base_dsn) = msf_testkit::env_dsn() else {
		eprintln!("Skipping publish_mirrors_the_draft_group; set MSF_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;

	seed_article(&service, "d1", "First", true).await;
	seed_article(&service, "d2", "Second", true).await;
	service
		.update_by_tag(UpdateRequest {
			tag: Some("featured".to_string()),
			data: serde_json::from_value(serde_json::json!([
				{ "ref_uid": ARTICLE, "ref_entity_id": "d2", "ref_published": true, "order": 7 },
				{ "ref_uid": ARTICLE, "ref_entity_id": "d1", "ref_published": true }
			]))
			.expect("Failed to parse items."),
		})
		.await
		.expect("update");

	let drafts = service.items_by_tag(Some("featured"), Status::Draft).await.expect("list");
	let response = service.publish("featured").await.expect("publish");
	let published = service.items_by_tag(Some("featured"), Status::Published).await.expect("list");

	assert_eq!(response.removed, 0);
	assert_eq!(response.published, 2);
	assert_eq!(listed(&drafts), listed(&published));
	assert_eq!(
		drafts.result.iter().map(|item| item.document_id).collect::<Vec<_>>(),
		published.result.iter().map(|item| item.document_id).collect::<Vec<_>>()
	);

	let again = service.publish("featured").await.expect("publish");

	assert_eq!((again.removed, again.published), (2, 2));

	let report = service.documents_grouped_by_tag().await;

	assert!(!report.is_soft_fail());
	assert_eq!(report.data().len(), 1);
	assert_eq!(
		report.data()[0].items.iter().map(|item| item.document_id.as_str()).collect::<Vec<_>>(),
		vec!["d2", "d1"]
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MSF_PG_DSN to run."]
async fn deleted_target_keeps_association_without_title() {
	let Some(base_dsn) = msf_testkit::env_dsn() else {
		eprintln!("Skipping deleted_target_keeps_association_without_title; set MSF_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;

	seed_article(&service, "d1", "First", true).await;
	seed_article(&service, "d2", "Second", true).await;
	service.replace_associations("featured", desired(&["d1", "d2"])).await.expect("replace");
	service.publish("featured").await.expect("publish");
	entries::delete_entry(&service.db.pool, ARTICLE, "d1", Status::Published)
		.await
		.expect("Failed to delete entry.");

	let items = service.items_by_tag(Some("featured"), Status::Draft).await.expect("list");

	assert_eq!(items.result.len(), 2);
	assert_eq!(items.result[0].title, None);
	assert_eq!(items.result[1].title.as_deref(), Some("Second"));

	let report = service.documents_grouped_by_tag().await;

	assert_eq!(report.data()[0].items.len(), 1, "Missing targets are left out of the report.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MSF_PG_DSN to run."]
async fn query_pages_through_twenty_three_entries() {
	let Some(base_dsn) = msf_testkit::env_dsn() else {
		eprintln!("Skipping query_pages_through_twenty_three_entries; set MSF_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;

	for index in 0..23 {
		seed_article(&service, &format!("d{index:02}"), &format!("Article {index:02}"), false)
			.await;
	}

	let mut sizes = Vec::new();
	let mut start = 0;

	loop {
		let outcome = service.query(query(None, start)).await;
		let page = outcome.data();
		let meta = page.meta.expect("A default limit must produce page metadata.");

		assert_eq!(meta.total, 23);
		assert_eq!(meta.page_count, 3);
		assert_eq!(meta.current_page, start / 10 + 1);
		assert_eq!(page.main_field, "title");

		sizes.push(page.result.len());

		if meta.is_last_page() {
			break;
		}

		start += 10;
	}

	assert_eq!(sizes, vec![10, 10, 3]);

	let unfiltered = service.query(query(None, 0)).await;
	let empty_filter = service.query(query(Some(""), 0)).await;

	assert_eq!(unfiltered.data(), empty_filter.data());

	let nothing = service.query(query(Some("Nope"), 0)).await;

	assert!(nothing.data().result.is_empty());
	assert_eq!(nothing.data().meta.map(|meta| meta.total), Some(0));

	let published = service
		.query(QueryParams { published_only: Some(true), ..query(None, 0) })
		.await;

	assert!(published.data().result.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MSF_PG_DSN to run."]
async fn unknown_collection_soft_fails() {
	let Some(base_dsn) = msf_testkit::env_dsn() else {
		eprintln!("Skipping unknown_collection_soft_fails; set MSF_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;
	let response = service
		.filter(FilterRequest { uid: Some("api::page.page".to_string()), ..Default::default() })
		.await
		.expect("Soft failures are not errors.");

	assert!(response.result.is_empty());
	assert_eq!(response.main_field, "");
	assert!(response.meta.is_none());
	assert!(response.error_message.is_some());

	let err = service.filter(FilterRequest::default()).await.expect_err("uid is required");

	assert_eq!(err.to_string(), "uid is required.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MSF_PG_DSN to run."]
async fn settings_are_created_lazily_and_replaced_wholesale() {
	let Some(base_dsn) = msf_testkit::env_dsn() else {
		eprintln!("Skipping settings_are_created_lazily_and_replaced_wholesale; set MSF_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;
	let initial = service.get_settings().await.expect("get settings");

	assert_eq!(initial.default_entity_uid, ARTICLE);
	assert_eq!(initial.default_query_limit, Some(10));

	let updated = Settings {
		default_api_endpoint: "/api/articles".to_string(),
		default_published_only: true,
		default_query_limit: Some(5),
		..initial.clone()
	};
	let stored = service.set_settings(updated.clone()).await.expect("set settings");

	assert_eq!(stored, updated);
	assert_eq!(service.get_settings().await.expect("get settings"), updated);

	let err = service
		.set_settings(Settings { default_entity_uid: "api::page.page".to_string(), ..updated })
		.await
		.expect_err("Undeclared collections must be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MSF_PG_DSN to run."]
async fn replacing_drafts_leaves_published_group_untouched() {
	let Some(base_dsn) = msf_testkit::env_dsn() else {
		eprintln!("Skipping replacing_drafts_leaves_published_group_untouched; set MSF_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;

	for (id, title) in [("d1", "First"), ("d2", "Second"), ("d3", "Third")] {
		seed_article(&service, id, title, true).await;
	}

	service.replace_associations("featured", desired(&["d1", "d2"])).await.expect("replace");
	service.publish("featured").await.expect("publish");

	let before = service.items_by_tag(Some("featured"), Status::Published).await.expect("list");

	service.replace_associations("featured", desired(&["d3"])).await.expect("replace");
	service.replace_associations("featured", desired(&[])).await.expect("replace");

	let after = service.items_by_tag(Some("featured"), Status::Published).await.expect("list");

	assert_eq!(listed(&after), vec![("d1".to_string(), 1), ("d2".to_string(), 2)]);
	assert_eq!(after.result, before.result);
	assert!(
		service
			.items_by_tag(Some("featured"), Status::Draft)
			.await
			.expect("list")
			.result
			.is_empty()
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MSF_PG_DSN to run."]
async fn shared_document_ids_resolve_within_own_collection() {
	let Some(base_dsn) = msf_testkit::env_dsn() else {
		eprintln!("Skipping shared_document_ids_resolve_within_own_collection; set MSF_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let service = build_service(&test_db).await;

	seed_article(&service, "1", "Article one", true).await;
	seed_entry(&service, AUTHOR, "1", serde_json::json!({ "name": "Author one" }), true).await;
	service.replace_associations("featured", desired(&["1"])).await.expect("replace");
	service.replace_associations("writers", desired_in(AUTHOR, &["1"])).await.expect("replace");
	service.publish("featured").await.expect("publish");
	service.publish("writers").await.expect("publish");

	let article_id: i64 = sqlx::query_scalar(
		"\
SELECT id
FROM content_entries
WHERE uid = $1 AND document_id = '1' AND published_at IS NOT NULL",
	)
	.bind(ARTICLE)
	.fetch_one(&service.db.pool)
	.await
	.expect("Failed to read article id.");
	let author_id: i64 = sqlx::query_scalar(
		"\
SELECT id
FROM content_entries
WHERE uid = $1 AND document_id = '1' AND published_at IS NOT NULL",
	)
	.bind(AUTHOR)
	.fetch_one(&service.db.pool)
	.await
	.expect("Failed to read author id.");
	let report = service.documents_grouped_by_tag().await;
	let groups = report
		.data()
		.iter()
		.map(|group| {
			let items = group.items.iter().map(|item| (item.id, item.tag.as_str())).collect();

			(group.uid.as_str(), items)
		})
		.collect::<Vec<(&str, Vec<(i64, &str)>)>>();

	assert_ne!(article_id, author_id);
	assert!(groups.contains(&(ARTICLE, vec![(article_id, "featured")])));
	assert!(groups.contains(&(AUTHOR, vec![(author_id, "writers")])));

	let writers = service.items_by_tag(Some("writers"), Status::Published).await.expect("list");
	let featured = service.items_by_tag(Some("featured"), Status::Published).await.expect("list");

	assert_eq!(writers.result[0].title.as_deref(), Some("Author one"));
	assert_eq!(featured.result[0].title.as_deref(), Some("Article one"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

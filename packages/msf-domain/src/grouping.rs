use std::collections::HashMap;

use crate::ordering::Reference;

/// Rows that point into one collection, with target ids split by lifecycle copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionGroup<'a> {
	pub uid: &'a str,
	pub published_ids: Vec<&'a str>,
	pub draft_ids: Vec<&'a str>,
	/// Indexes into the input slice, in input order.
	pub members: Vec<usize>,
}

/// Groups rows by `ref_uid`, in order of first appearance.
pub fn group_by_collection<T>(rows: &[T]) -> Vec<CollectionGroup<'_>>
where
	T: Reference,
{
	let mut groups: Vec<CollectionGroup<'_>> = Vec::new();
	let mut positions: HashMap<&str, usize> = HashMap::new();

	for (index, row) in rows.iter().enumerate() {
		let uid = row.ref_uid();
		let position = *positions.entry(uid).or_insert_with(|| {
			groups.push(CollectionGroup {
				uid,
				published_ids: Vec::new(),
				draft_ids: Vec::new(),
				members: Vec::new(),
			});

			groups.len() - 1
		});
		let group = &mut groups[position];

		if row.ref_published() {
			group.published_ids.push(row.ref_entity_id());
		} else {
			group.draft_ids.push(row.ref_entity_id());
		}

		group.members.push(index);
	}

	groups
}

/// Targets found by the bulk lookups, keyed by collection, lifecycle copy, and document id.
/// Document ids are only unique within one collection.
#[derive(Debug)]
pub struct TargetIndex<V> {
	entries: HashMap<(String, bool, String), V>,
}
impl<V> TargetIndex<V> {
	pub fn insert(&mut self, uid: &str, published: bool, document_id: String, target: V) {
		self.entries.insert((uid.to_string(), published, document_id), target);
	}

	/// `None` when the referenced copy was deleted or unpublished since the row was written.
	pub fn get<T>(&self, row: &T) -> Option<&V>
	where
		T: Reference,
	{
		self.entries.get(&(
			row.ref_uid().to_string(),
			row.ref_published(),
			row.ref_entity_id().to_string(),
		))
	}

	pub fn contains<T>(&self, row: &T) -> bool
	where
		T: Reference,
	{
		self.get(row).is_some()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<V> Default for TargetIndex<V> {
	fn default() -> Self {
		Self { entries: HashMap::new() }
	}
}

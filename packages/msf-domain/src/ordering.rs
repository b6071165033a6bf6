use std::collections::HashSet;

/// Anything that points at a document of another collection.
pub trait Reference {
	fn ref_uid(&self) -> &str;

	fn ref_entity_id(&self) -> &str;

	fn ref_published(&self) -> bool;
}

/// Pairs every item with its 1-based position. Positions are the only source of `order`.
pub fn rank_by_position<T>(items: Vec<T>) -> Vec<(i32, T)> {
	items.into_iter().zip(1..).map(|(item, order)| (order, item)).collect()
}

/// Returns the index and id of the first reference whose `ref_entity_id` already appeared.
pub fn find_duplicate<T>(items: &[T]) -> Option<(usize, &str)>
where
	T: Reference,
{
	let mut seen = HashSet::new();

	items
		.iter()
		.enumerate()
		.find(|(_, item)| !seen.insert(item.ref_entity_id()))
		.map(|(index, item)| (index, item.ref_entity_id()))
}

/// True when `orders` is exactly 1..=N in sequence.
pub fn is_dense<I>(orders: I) -> bool
where
	I: IntoIterator<Item = i32>,
{
	orders.into_iter().zip(1..).all(|(order, expected)| order == expected)
}

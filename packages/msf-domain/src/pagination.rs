use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Pagination metadata for one window of a filtered query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
	pub total: u64,
	pub page_size: u32,
	pub page_count: u64,
	pub current_page: u64,
}
impl PageMeta {
	pub fn new(total: u64, start: u64, limit: NonZeroU32) -> Self {
		let size = u64::from(limit.get());

		Self {
			total,
			page_size: limit.get(),
			page_count: total.div_ceil(size),
			current_page: start / size + 1,
		}
	}

	/// Infinite-scroll consumers stop requesting once this returns true.
	pub fn is_last_page(&self) -> bool {
		self.current_page >= self.page_count
	}
}

/// Picks the page size for a query. A missing or zero request limit falls back to the
/// configured default; `None` means the query is unbounded.
pub fn resolve_limit(requested: Option<u32>, default: Option<u32>) -> Option<NonZeroU32> {
	requested.and_then(NonZeroU32::new).or_else(|| default.and_then(NonZeroU32::new))
}

/// Offset of the page after the one starting at `start`.
pub fn next_start(start: u64, limit: NonZeroU32) -> u64 {
	start.saturating_add(u64::from(limit.get()))
}

use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One FIFO lock per tag, so writes to a tag apply in submission order.
#[derive(Debug, Default)]
pub struct TagLocks {
	locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}
impl TagLocks {
	pub async fn acquire(&self, tag: &str) -> OwnedMutexGuard<()> {
		let lock = {
			let mut locks = self.locks.lock().unwrap_or_else(|err| err.into_inner());

			// Entries referenced only by the map have no holder and no waiter.
			locks.retain(|_, lock| Arc::strong_count(lock) > 1);

			locks.entry(tag.to_string()).or_default().clone()
		};

		lock.lock_owned().await
	}

	#[cfg(test)]
	fn tracked(&self) -> usize {
		self.locks.lock().unwrap_or_else(|err| err.into_inner()).len()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use tokio::time;

	use super::*;

	#[tokio::test]
	async fn same_tag_waits_other_tags_do_not() {
		let locks = TagLocks::default();
		let featured = locks.acquire("featured").await;

		assert!(time::timeout(Duration::from_millis(20), locks.acquire("related")).await.is_ok());
		assert!(time::timeout(Duration::from_millis(20), locks.acquire("featured")).await.is_err());

		drop(featured);

		assert!(time::timeout(Duration::from_millis(20), locks.acquire("featured")).await.is_ok());
	}

	#[tokio::test]
	async fn idle_locks_are_pruned() {
		let locks = TagLocks::default();

		drop(locks.acquire("a").await);
		drop(locks.acquire("b").await);

		let held = locks.acquire("c").await;

		assert_eq!(locks.tracked(), 1);

		drop(held);
	}
}

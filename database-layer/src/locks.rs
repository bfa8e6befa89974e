// Per-entity async locks serializing read-modify-write sequences
use crate::collection::Collection;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

pub type LockKey = (Collection, Uuid);

/// Key for a lock over a value rather than a stored entity, such as a
/// unique code or an occupied slot. Equal scopes map to the same key.
pub fn scoped_lock_key(collection: Collection, scope: &str) -> LockKey {
    let name = format!("{collection}/{scope}");
    (collection, Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
}

type Registry = Arc<DashMap<LockKey, Arc<Mutex<()>>>>;

/// Guards held until dropped. Dropping releases each lock and removes its
/// registry entry unless another task is holding or waiting on it.
#[derive(Debug)]
pub struct LockSet {
    guards: Vec<(LockKey, OwnedMutexGuard<()>)>,
    registry: Registry,
}

impl Drop for LockSet {
    fn drop(&mut self) {
        for (key, guard) in self.guards.drain(..).rev() {
            drop(guard);
            self.registry
                .remove_if(&key, |_, mutex| Arc::strong_count(mutex) == 1);
        }
    }
}

/// Registry of one mutex per entity.
///
/// Multi-entity operations must go through [`EntityLocks::acquire_all`],
/// which locks in key order so two operations never wait on each other in
/// opposite orders. The locks are not re-entrant.
#[derive(Debug, Clone, Default)]
pub struct EntityLocks {
    locks: Registry,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, collection: Collection, id: Uuid) -> LockSet {
        self.acquire_all([(collection, id)]).await
    }

    pub async fn acquire_all(&self, keys: impl IntoIterator<Item = LockKey>) -> LockSet {
        let mut keys: Vec<LockKey> = keys.into_iter().collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let mutex = self.locks.entry(key).or_default().value().clone();
            guards.push((key, mutex.lock_owned().await));
        }
        LockSet {
            guards,
            registry: self.locks.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_entity_is_exclusive() {
        let locks = EntityLocks::new();
        let id = Uuid::new_v4();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let active = active.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(Collection::Invoices, id).await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_opposite_orders_do_not_deadlock() {
        let locks = EntityLocks::new();
        let a = (Collection::Medicines, Uuid::new_v4());
        let b = (Collection::Prescriptions, Uuid::new_v4());

        let mut handles = Vec::new();
        for i in 0..16 {
            let locks = locks.clone();
            let keys = if i % 2 == 0 { vec![a, b] } else { vec![b, a] };
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire_all(keys).await;
                tokio::task::yield_now().await;
            }));
        }
        let all = async {
            for handle in handles {
                handle.await.unwrap();
            }
        };
        tokio::time::timeout(Duration::from_secs(5), all).await.unwrap();
    }

    #[test]
    fn test_scoped_keys_are_stable() {
        let bed = scoped_lock_key(Collection::Admissions, "bed:ICU:3");
        assert_eq!(bed, scoped_lock_key(Collection::Admissions, "bed:ICU:3"));
        assert_ne!(bed, scoped_lock_key(Collection::Admissions, "bed:ICU:4"));
        assert_ne!(bed, scoped_lock_key(Collection::Appointments, "bed:ICU:3"));
    }

    #[tokio::test]
    async fn test_released_entries_leave_the_registry() {
        let locks = EntityLocks::new();
        for _ in 0..1000 {
            drop(locks.acquire(Collection::Invoices, Uuid::new_v4()).await);
        }
        assert!(locks.is_empty());

        let held = locks.acquire(Collection::Patients, Uuid::new_v4()).await;
        drop(locks.acquire(Collection::Doctors, Uuid::new_v4()).await);
        assert_eq!(locks.len(), 1);
        drop(held);
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_waiter_keeps_entry_until_it_finishes() {
        let locks = EntityLocks::new();
        let id = Uuid::new_v4();
        let first = locks.acquire(Collection::Medicines, id).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(Collection::Medicines, id).await;
                tokio::time::sleep(Duration::from_millis(5)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        drop(first);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }
}

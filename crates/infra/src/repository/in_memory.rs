use std::collections::BTreeMap;
use std::sync::RwLock;

use uuid::Uuid;

use farmhub_core::{Entity, Specification};

use super::{Repository, RepositoryError};

/// In-memory repository for tests/dev.
///
/// Rows are keyed by UUID (v7, so key order is creation order), which keeps
/// ties in the specification ordering deterministic.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    inner: RwLock<BTreeMap<Uuid, T>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Backend("in-memory repository lock poisoned".to_string())
}

impl<T: Entity> InMemoryRepository<T> {
    fn matching(&self, spec: &Specification<T>) -> Result<Vec<T>, RepositoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut items: Vec<T> = map.values().filter(|e| spec.is_satisfied_by(e)).cloned().collect();
        spec.sort(&mut items);
        Ok(items)
    }
}

#[async_trait::async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn add(&self, entity: &T) -> Result<(), RepositoryError> {
        let id: Uuid = (*entity.id()).into();
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&id) {
            return Err(RepositoryError::Duplicate { kind: T::KIND, id: id.to_string() });
        }
        map.insert(id, entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &T) -> Result<(), RepositoryError> {
        let id: Uuid = (*entity.id()).into();
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(&id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound { kind: T::KIND, id: id.to_string() }),
        }
    }

    async fn get(&self, id: T::Id) -> Result<Option<T>, RepositoryError> {
        let id: Uuid = id.into();
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).filter(|e| !e.is_deleted()).cloned())
    }

    async fn list(&self, spec: &Specification<T>) -> Result<Vec<T>, RepositoryError> {
        self.matching(spec)
    }

    async fn slice(&self, spec: &Specification<T>, skip: u64, take: u64) -> Result<Vec<T>, RepositoryError> {
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let take = usize::try_from(take).unwrap_or(usize::MAX);
        Ok(self.matching(spec)?.into_iter().skip(skip).take(take).collect())
    }

    async fn count(&self, spec: &Specification<T>) -> Result<u64, RepositoryError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().filter(|e| spec.is_satisfied_by(e)).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::paged;
    use chrono::{Duration, NaiveDate, Utc};
    use farmhub_core::{FarmId, PageRequest, soft_delete};
    use farmhub_farms::{Cycle, CycleOrderBy};

    fn cycle(farm: FarmId, identifier: u32) -> Cycle {
        let start = NaiveDate::from_ymd_opt(2025, 1, identifier).unwrap();
        Cycle::create(farm, identifier, 2025, start, None, Utc::now() + Duration::seconds(identifier.into()))
            .unwrap()
    }

    #[tokio::test]
    async fn add_get_update() {
        let repo = InMemoryRepository::<Cycle>::new();
        let c = cycle(FarmId::new(), 1);
        repo.add(&c).await.unwrap();
        assert!(matches!(repo.add(&c).await, Err(RepositoryError::Duplicate { .. })));
        assert_eq!(repo.get(*c.id()).await.unwrap(), Some(c.clone()));

        let mut deleted = c.clone();
        soft_delete(&mut deleted, None, Utc::now());
        repo.update(&deleted).await.unwrap();
        assert_eq!(repo.get(*c.id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_of_unknown_row_fails() {
        let repo = InMemoryRepository::<Cycle>::new();
        let err = repo.update(&cycle(FarmId::new(), 1)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { kind: "cycles", .. }));
    }

    #[tokio::test]
    async fn soft_deleted_rows_never_exist() {
        let repo = InMemoryRepository::<Cycle>::new();
        let farm = FarmId::new();
        let mut c = cycle(farm, 4);
        repo.add(&c).await.unwrap();
        let spec = farmhub_farms::specs::cycle_number(farm, 4, 2025);
        assert!(repo.exists(&spec).await.unwrap());

        soft_delete(&mut c, None, Utc::now());
        repo.update(&c).await.unwrap();
        assert!(!repo.exists(&spec).await.unwrap());
        assert_eq!(repo.count(&spec).await.unwrap(), 0);
        assert_eq!(repo.count(&spec.including_deleted()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn paging_orders_then_windows() {
        let repo = InMemoryRepository::<Cycle>::new();
        let farm = FarmId::new();
        for n in 1..=25 {
            repo.add(&cycle(farm, n)).await.unwrap();
        }
        repo.add(&cycle(FarmId::new(), 26)).await.unwrap();

        let request = PageRequest::new(3, 10).ordered(CycleOrderBy::Identifier, false);
        let page = paged(&repo, farmhub_farms::specs::cycles_of_farm(farm), &request).await.unwrap();
        assert_eq!(page.total_count, 25);
        let ids: Vec<u32> = page.items.iter().map(|c| c.identifier()).collect();
        assert_eq!(ids, vec![21, 22, 23, 24, 25]);

        // Default ordering: newest first.
        let page = paged(&repo, farmhub_farms::specs::cycles_of_farm(farm), &PageRequest::<CycleOrderBy>::default())
            .await
            .unwrap();
        assert_eq!(page.items.first().map(|c| c.identifier()), Some(25));
        assert_eq!(page.items.len(), 10);
    }

    proptest::proptest! {
        #[test]
        fn pages_cover_every_row_once(rows in 0u32..=28, page_size in 1u32..=12) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let farm = FarmId::new();
            let repo = InMemoryRepository::<Cycle>::new();

            let mut seen: Vec<u32> = rt.block_on(async {
                for n in 1..=rows {
                    repo.add(&cycle(farm, n)).await.unwrap();
                }
                let mut seen = Vec::new();
                let mut number = 1;
                loop {
                    let request = PageRequest::<CycleOrderBy>::new(number, page_size);
                    let page = paged(&repo, farmhub_farms::specs::cycles_of_farm(farm), &request).await.unwrap();
                    assert_eq!(page.total_count, u64::from(rows));
                    if page.items.is_empty() {
                        break;
                    }
                    seen.extend(page.items.iter().map(|c| c.identifier()));
                    number += 1;
                }
                seen
            });

            seen.sort_unstable();
            proptest::prop_assert_eq!(seen, (1..=rows).collect::<Vec<_>>());
        }
    }
}

//! A process-local store.
//!
//! Each unit of work edits a private copy of the table and records which rows
//! it touched. Committing writes those rows back. Ids come from a shared
//! sequence, so like a `SERIAL` column they are never handed out twice, even
//! when the unit of work that drew them is dropped.

use super::{
    error::{ApiResult, ClientError, InternalError},
    unit_of_work::{UnitOfWork, UnitOfWorkFactory},
};
use crate::feature::item::item_repository::{Item, ItemRepository};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicI32, Ordering},
        Arc, RwLock,
    },
};
use tracing::instrument;

/// Shared in-memory item storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    rows: Arc<RwLock<BTreeMap<i32, Item>>>,
    sequence: Arc<AtomicI32>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> ApiResult<BTreeMap<i32, Item>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| InternalError::LockPoisoned("read"))?;
        Ok(rows.clone())
    }

    fn next_id(&self) -> i32 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// An item repository working on a private copy of a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryItemRepository {
    store: MemoryStore,
    rows: BTreeMap<i32, Item>,
    touched: BTreeSet<i32>,
}

#[async_trait::async_trait]
impl ItemRepository for MemoryItemRepository {
    #[instrument(skip(self))]
    async fn get_by_id(&mut self, id: i32) -> ApiResult<Option<Item>> {
        let item = self.rows.get(&id).cloned();
        tracing::debug!("Found item: {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn add(&mut self, item: Item) -> ApiResult<Item> {
        let item = Item {
            id: self.store.next_id(),
            ..item
        };
        self.rows.insert(item.id, item.clone());
        self.touched.insert(item.id);
        tracing::debug!("Created item {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn update(&mut self, item: Item) -> ApiResult<()> {
        match self.rows.get_mut(&item.id) {
            Some(row) => {
                self.touched.insert(item.id);
                *row = item;
                Ok(())
            }
            None => {
                tracing::warn!("Item not found");
                Err(ClientError::NotFound.into())
            }
        }
    }

    #[instrument(skip(self))]
    async fn remove(&mut self, item: Item) -> ApiResult<()> {
        if self.rows.remove(&item.id).is_none() {
            tracing::warn!("Item not found");
            return Err(ClientError::NotFound.into());
        }
        self.touched.insert(item.id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&mut self) -> ApiResult<Vec<Item>> {
        Ok(self.rows.values().cloned().collect())
    }
}

/// A unit of work over a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    items: MemoryItemRepository,
}

#[async_trait::async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    type Items = MemoryItemRepository;

    fn items(&mut self) -> &mut Self::Items {
        &mut self.items
    }

    #[instrument(skip(self))]
    async fn commit(self) -> ApiResult<()> {
        let MemoryItemRepository {
            store,
            rows,
            touched,
        } = self.items;
        let mut shared = store
            .rows
            .write()
            .map_err(|_| InternalError::LockPoisoned("write"))?;
        for id in touched {
            match rows.get(&id) {
                Some(item) => shared.insert(id, item.clone()),
                None => shared.remove(&id),
            };
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UnitOfWorkFactory for MemoryStore {
    type UnitOfWork = MemoryUnitOfWork;

    async fn begin(&self) -> ApiResult<Self::UnitOfWork> {
        Ok(MemoryUnitOfWork {
            items: MemoryItemRepository {
                store: self.clone(),
                rows: self.snapshot()?,
                touched: BTreeSet::new(),
            },
        })
    }
}

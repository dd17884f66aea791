//! Groups repositories under one persistence context.
//!
//! A [`UnitOfWork`] is begun once per request through a [`UnitOfWorkFactory`].
//! Changes made through its repositories become visible to other units of work
//! only after [`UnitOfWork::commit`]. Dropping it uncommitted discards them.

use super::{database::DbPool, error::ApiResult};
use crate::feature::item::item_repository::{ItemRepository, PgItemRepository};
use tracing::instrument;

/// The repositories sharing one persistence context.
#[async_trait::async_trait]
pub trait UnitOfWork: Send + Sized {
    /// The item repository type.
    type Items: ItemRepository;

    /// The item repository.
    fn items(&mut self) -> &mut Self::Items;

    /// Makes every change visible.
    async fn commit(self) -> ApiResult<()>;
}

/// Anything that can begin a [`UnitOfWork`].
#[async_trait::async_trait]
pub trait UnitOfWorkFactory: Clone + Send + Sync + 'static {
    /// The unit of work type.
    type UnitOfWork: UnitOfWork + 'static;

    /// Begins a new unit of work.
    async fn begin(&self) -> ApiResult<Self::UnitOfWork>;
}

/// A unit of work backed by a single Postgres transaction.
pub struct PgUnitOfWork {
    items: PgItemRepository,
}

#[async_trait::async_trait]
impl UnitOfWork for PgUnitOfWork {
    type Items = PgItemRepository;

    fn items(&mut self) -> &mut Self::Items {
        &mut self.items
    }

    #[instrument(skip(self))]
    async fn commit(self) -> ApiResult<()> {
        self.items.into_inner().commit().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl UnitOfWorkFactory for DbPool {
    type UnitOfWork = PgUnitOfWork;

    #[instrument(skip(self))]
    async fn begin(&self) -> ApiResult<Self::UnitOfWork> {
        let tx = sqlx::Pool::begin(self).await?;
        Ok(PgUnitOfWork {
            items: PgItemRepository::new(tx),
        })
    }
}

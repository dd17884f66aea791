//! Types and functions for storing and loading items from the database.

use crate::infra::{
    database::Tx,
    error::{ApiResult, ClientError},
};
use tracing::{instrument, Instrument};

/// A persisted item.
#[derive(Clone, Debug, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct Item {
    /// The item's id, assigned by the store.
    pub id: i32,
    /// The item's name.
    pub name: String,
    /// The item's description.
    pub description: String,
    /// Whether the item is done.
    pub is_completed: bool,
}

/// Anything that can store and load items.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ItemRepository: Send {
    /// Fetches an item, if it exists.
    async fn get_by_id(&mut self, id: i32) -> ApiResult<Option<Item>>;

    /// Stores a new item. The store ignores `item.id` and returns the item with its assigned id.
    async fn add(&mut self, item: Item) -> ApiResult<Item>;

    /// Overwrites the stored fields of `item.id`.
    async fn update(&mut self, item: Item) -> ApiResult<()>;

    /// Removes the item with `item.id`.
    async fn remove(&mut self, item: Item) -> ApiResult<()>;

    /// Lists every item ordered by id.
    async fn list(&mut self) -> ApiResult<Vec<Item>>;
}

/// An item repository running inside a Postgres transaction.
pub struct PgItemRepository {
    tx: Tx,
}

impl PgItemRepository {
    /// Creates a new repository.
    pub fn new(tx: Tx) -> Self {
        Self { tx }
    }

    /// Gives back the transaction so it can be committed.
    pub fn into_inner(self) -> Tx {
        self.tx
    }
}

#[async_trait::async_trait]
impl ItemRepository for PgItemRepository {
    #[instrument(skip(self))]
    async fn get_by_id(&mut self, id: i32) -> ApiResult<Option<Item>> {
        tracing::info!("Reading item");
        let item = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, is_completed FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .instrument(tracing::info_span!("fetch_optional"))
        .await?;
        tracing::info!("Found item: {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn add(&mut self, item: Item) -> ApiResult<Item> {
        tracing::info!("Creating item {:?}", item);
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, description, is_completed)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, is_completed
            "#,
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.is_completed)
        .fetch_one(&mut *self.tx)
        .await?;
        tracing::info!("Created item {:?}", item);
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn update(&mut self, item: Item) -> ApiResult<()> {
        tracing::info!("Updating item {:?}", item);
        let rows = sqlx::query(
            r#"
            UPDATE items
            SET name = $1, description = $2, is_completed = $3
            WHERE id = $4
            "#,
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.is_completed)
        .bind(item.id)
        .execute(&mut *self.tx)
        .await?;

        if rows.rows_affected() == 0 {
            tracing::warn!("Item not found");
            return Err(ClientError::NotFound)?;
        }

        tracing::info!("Updated item");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&mut self, item: Item) -> ApiResult<()> {
        tracing::info!("Deleting item {}", item.id);
        let rows = sqlx::query(
            r#"
            DELETE FROM items
            WHERE id = $1
            "#,
        )
        .bind(item.id)
        .execute(&mut *self.tx)
        .await?;

        if rows.rows_affected() == 0 {
            tracing::warn!("Item not found");
            return Err(ClientError::NotFound)?;
        }

        tracing::info!("Deleted item");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&mut self) -> ApiResult<Vec<Item>> {
        tracing::info!("Listing items");
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, is_completed FROM items
            ORDER BY id
            "#,
        )
        .fetch_all(&mut *self.tx)
        .instrument(tracing::info_span!("fetch_all"))
        .await?;
        tracing::info!("Listed {} items", items.len());
        Ok(items)
    }
}

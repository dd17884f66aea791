//! A service for interacting with items.
//!
//! Reads treat a missing item as a normal outcome and return `None`.
//! Updates and deletes look the item up first and fail with
//! [`DomainError::ItemNotFound`] when it is missing, without touching the store.

use super::{
    item_dto::{ItemDto, ItemMapper},
    item_repository::{Item, ItemRepository},
};
use crate::infra::{
    error::{ApiResult, DomainError},
    unit_of_work::UnitOfWork,
};
use tracing::instrument;

/// Item operations over one unit of work.
#[derive(Debug)]
pub struct ItemService<U, M> {
    unit_of_work: U,
    mapper: M,
}

impl<U: UnitOfWork, M: ItemMapper> ItemService<U, M> {
    /// Creates a new service.
    pub fn new(unit_of_work: U, mapper: M) -> Self {
        Self {
            unit_of_work,
            mapper,
        }
    }

    /// Reads an item.
    #[instrument(skip(self))]
    pub async fn get_item_by_id(&mut self, id: i32) -> ApiResult<Option<ItemDto>> {
        let item = self.unit_of_work.items().get_by_id(id).await?;
        Ok(item.map(|item| self.mapper.to_dto(item)))
    }

    /// Lists all items.
    #[instrument(skip(self))]
    pub async fn list_items(&mut self) -> ApiResult<Vec<ItemDto>> {
        let items = self.unit_of_work.items().list().await?;
        Ok(items
            .into_iter()
            .map(|item| self.mapper.to_dto(item))
            .collect())
    }

    /// Creates a new item. The returned item carries the id assigned by the store.
    #[instrument(skip(self))]
    pub async fn create_item(&mut self, dto: ItemDto) -> ApiResult<ItemDto> {
        let item = self.mapper.to_entity(dto);
        let item = self.unit_of_work.items().add(item).await?;
        Ok(self.mapper.to_dto(item))
    }

    /// Overwrites an existing item.
    #[instrument(skip(self))]
    pub async fn update_item(&mut self, id: i32, dto: ItemDto) -> ApiResult<()> {
        let existing = self.find_existing(id).await?;
        let item = self.mapper.apply(dto, existing);
        self.unit_of_work.items().update(item).await
    }

    /// Deletes an existing item.
    #[instrument(skip(self))]
    pub async fn delete_item(&mut self, id: i32) -> ApiResult<()> {
        let existing = self.find_existing(id).await?;
        self.unit_of_work.items().remove(existing).await
    }

    /// Commits every change made through this service.
    pub async fn commit(self) -> ApiResult<()> {
        self.unit_of_work.commit().await
    }

    async fn find_existing(&mut self, id: i32) -> ApiResult<Item> {
        match self.unit_of_work.items().get_by_id(id).await? {
            Some(item) => Ok(item),
            None => {
                tracing::warn!("Item {} not found", id);
                Err(DomainError::ItemNotFound.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature::item::{
            item_dto::{DtoMapper, MockItemMapper},
            item_repository::MockItemRepository,
        },
        infra::{
            error::ApiError,
            memory::{MemoryStore, MemoryUnitOfWork},
            unit_of_work::UnitOfWorkFactory,
        },
    };
    use mockall::predicate::eq;

    /// A unit of work around a mocked repository.
    struct MockUnitOfWork {
        items: MockItemRepository,
    }

    #[async_trait::async_trait]
    impl UnitOfWork for MockUnitOfWork {
        type Items = MockItemRepository;

        fn items(&mut self) -> &mut Self::Items {
            &mut self.items
        }

        async fn commit(self) -> ApiResult<()> {
            Ok(())
        }
    }

    fn service(
        items: MockItemRepository,
        mapper: MockItemMapper,
    ) -> ItemService<MockUnitOfWork, MockItemMapper> {
        ItemService::new(MockUnitOfWork { items }, mapper)
    }

    fn item(id: i32) -> Item {
        Item {
            id,
            name: "Test Item".to_string(),
            description: "Test Description".to_string(),
            is_completed: false,
        }
    }

    fn dto(id: i32) -> ItemDto {
        ItemDto {
            id,
            name: "Test Item".to_string(),
            description: "Test Description".to_string(),
            is_completed: false,
        }
    }

    fn assert_item_not_found<T: std::fmt::Debug>(result: ApiResult<T>) {
        match result {
            Err(e @ ApiError::DomainError(DomainError::ItemNotFound)) => {
                assert_eq!("Item not found.", e.to_string())
            }
            other => panic!("expected item not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_item_by_id_returns_expected_item() {
        let mut items = MockItemRepository::new();
        items
            .expect_get_by_id()
            .with(eq(1))
            .times(1)
            .returning(|id| Ok(Some(item(id))));
        let mut mapper = MockItemMapper::new();
        mapper
            .expect_to_dto()
            .with(eq(item(1)))
            .times(1)
            .returning(|_| dto(1));

        let result = service(items, mapper).get_item_by_id(1).await.unwrap();

        assert_eq!(Some(dto(1)), result);
    }

    #[tokio::test]
    async fn get_item_by_id_returns_none_when_item_is_missing() {
        let mut items = MockItemRepository::new();
        items
            .expect_get_by_id()
            .with(eq(100))
            .returning(|_| Ok(None));
        let mut mapper = MockItemMapper::new();
        mapper.expect_to_dto().never();

        let result = service(items, mapper).get_item_by_id(100).await.unwrap();

        assert_eq!(None, result);
    }

    #[tokio::test]
    async fn create_item_returns_item_with_store_assigned_id() {
        let mut items = MockItemRepository::new();
        items
            .expect_add()
            .with(eq(item(0)))
            .times(1)
            .returning(|item| Ok(Item { id: 1, ..item }));
        let mut mapper = MockItemMapper::new();
        mapper
            .expect_to_entity()
            .with(eq(dto(0)))
            .returning(|_| item(0));
        mapper
            .expect_to_dto()
            .with(eq(item(1)))
            .returning(|_| dto(1));

        let result = service(items, mapper).create_item(dto(0)).await.unwrap();

        assert_eq!(dto(1), result);
    }

    #[tokio::test]
    async fn update_item_fails_when_item_is_missing() {
        let mut items = MockItemRepository::new();
        items
            .expect_get_by_id()
            .with(eq(100))
            .returning(|_| Ok(None));
        items.expect_update().never();
        let mut mapper = MockItemMapper::new();
        mapper.expect_apply().never();

        let result = service(items, mapper).update_item(100, dto(100)).await;

        assert_item_not_found(result);
    }

    #[tokio::test]
    async fn update_item_overwrites_existing_item() {
        let changed = Item {
            name: "Changed".to_string(),
            is_completed: true,
            ..item(1)
        };
        let expected = changed.clone();
        let mut items = MockItemRepository::new();
        items
            .expect_get_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(item(id))));
        items
            .expect_update()
            .with(eq(changed.clone()))
            .times(1)
            .returning(|_| Ok(()));
        let mut mapper = MockItemMapper::new();
        mapper
            .expect_apply()
            .times(1)
            .returning(move |_, _| expected.clone());

        service(items, mapper).update_item(1, dto(1)).await.unwrap();
    }

    #[tokio::test]
    async fn delete_item_fails_when_item_is_missing() {
        let mut items = MockItemRepository::new();
        items
            .expect_get_by_id()
            .with(eq(1_000_000_000))
            .returning(|_| Ok(None));
        items.expect_remove().never();

        let result = service(items, MockItemMapper::new())
            .delete_item(1_000_000_000)
            .await;

        assert_item_not_found(result);
    }

    #[tokio::test]
    async fn delete_item_removes_existing_item() {
        let mut items = MockItemRepository::new();
        items
            .expect_get_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(item(id))));
        items
            .expect_remove()
            .with(eq(item(1)))
            .times(1)
            .returning(|_| Ok(()));

        service(items, MockItemMapper::new())
            .delete_item(1)
            .await
            .unwrap();
    }

    async fn memory_service(store: &MemoryStore) -> ItemService<MemoryUnitOfWork, DtoMapper> {
        ItemService::new(store.begin().await.unwrap(), DtoMapper)
    }

    #[tokio::test]
    async fn created_item_can_be_read_back() {
        let store = MemoryStore::new();
        let new_item = ItemDto {
            id: 0,
            name: "Test Item".to_string(),
            description: "Test Description".to_string(),
            is_completed: false,
        };

        let mut items = memory_service(&store).await;
        let created = items.create_item(new_item.clone()).await.unwrap();
        items.commit().await.unwrap();

        assert_ne!(0, created.id);
        assert_eq!(ItemDto { id: created.id, ..new_item }, created);
        let found = memory_service(&store)
            .await
            .get_item_by_id(created.id)
            .await
            .unwrap();
        assert_eq!(Some(created), found);
    }

    #[tokio::test]
    async fn updated_item_is_read_back_with_new_fields() {
        let store = MemoryStore::new();
        let mut items = memory_service(&store).await;
        let created = items.create_item(dto(0)).await.unwrap();
        let changed = ItemDto {
            name: "Renamed".to_string(),
            is_completed: true,
            ..created.clone()
        };
        items.update_item(created.id, changed.clone()).await.unwrap();
        items.commit().await.unwrap();

        let mut items = memory_service(&store).await;
        assert_eq!(Some(changed), items.get_item_by_id(created.id).await.unwrap());
        assert_eq!(1, items.list_items().await.unwrap().len());
    }

    #[tokio::test]
    async fn deleted_item_is_gone() {
        let store = MemoryStore::new();
        let mut items = memory_service(&store).await;
        let created = items.create_item(dto(0)).await.unwrap();
        items.commit().await.unwrap();

        let mut items = memory_service(&store).await;
        items.delete_item(created.id).await.unwrap();
        items.commit().await.unwrap();

        let mut items = memory_service(&store).await;
        assert_eq!(None, items.get_item_by_id(created.id).await.unwrap());
        assert_item_not_found(items.delete_item(created.id).await);
        assert_item_not_found(items.update_item(created.id, created).await);
    }

    #[tokio::test]
    async fn missing_ids_are_absent_on_read_and_rejected_on_write() {
        let store = MemoryStore::new();
        let mut items = memory_service(&store).await;
        for id in [0, 1, 100, -5, i32::MAX] {
            assert_eq!(None, items.get_item_by_id(id).await.unwrap());
            assert_item_not_found(items.update_item(id, dto(id)).await);
            assert_item_not_found(items.delete_item(id).await);
        }
    }
}

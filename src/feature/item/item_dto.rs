//! The transport shape of an item and conversions to and from [`Item`].

use super::item_repository::Item;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An item as seen by API clients.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    /// The item's id. Zero when not yet assigned.
    #[serde(default)]
    #[schema(example = 1)]
    pub id: i32,
    /// The item's name.
    #[schema(example = "Test Item")]
    pub name: String,
    /// The item's description.
    #[schema(example = "Test Description")]
    pub description: String,
    /// Whether the item is done.
    #[serde(default)]
    pub is_completed: bool,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            is_completed: item.is_completed,
        }
    }
}

impl From<ItemDto> for Item {
    fn from(dto: ItemDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            description: dto.description,
            is_completed: dto.is_completed,
        }
    }
}

/// Converts between [`Item`] and [`ItemDto`].
#[cfg_attr(test, mockall::automock)]
pub trait ItemMapper: Send + Sync {
    /// Maps an entity to its transport shape.
    fn to_dto(&self, item: Item) -> ItemDto;

    /// Maps a transport shape to a new entity.
    fn to_entity(&self, dto: ItemDto) -> Item;

    /// Overwrites the mutable fields of `item` with those of `dto`. The id is kept.
    fn apply(&self, dto: ItemDto, item: Item) -> Item {
        Item {
            id: item.id,
            ..self.to_entity(dto)
        }
    }
}

/// The field-for-field [`ItemMapper`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DtoMapper;

impl ItemMapper for DtoMapper {
    fn to_dto(&self, item: Item) -> ItemDto {
        item.into()
    }

    fn to_entity(&self, dto: ItemDto) -> Item {
        dto.into()
    }
}

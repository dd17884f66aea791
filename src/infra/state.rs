//! Global application state.
//!
//! Used for access to common resources such as the store
//! that units of work are begun against.

use super::{error::ApiResult, unit_of_work::UnitOfWorkFactory};
use crate::feature::item::{item_dto::DtoMapper, item_service::ItemService};

/// Global application state.
#[derive(Clone, Debug)]
pub struct AppState<F> {
    units: F,
    mapper: DtoMapper,
}

impl<F: UnitOfWorkFactory> AppState<F> {
    /// Constructs a new [`AppState`].
    pub fn new(units: F) -> Self {
        Self {
            units,
            mapper: DtoMapper,
        }
    }

    /// Begins a unit of work and wraps it in an [`ItemService`].
    pub async fn item_service(&self) -> ApiResult<ItemService<F::UnitOfWork, DtoMapper>> {
        let unit_of_work = self.units.begin().await?;
        Ok(ItemService::new(unit_of_work, self.mapper))
    }
}

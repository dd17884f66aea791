//! Features exposed by the application, one module per resource.

pub mod info;
pub mod item;

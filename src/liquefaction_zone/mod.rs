pub mod import;
pub mod model;
pub mod rest;
pub mod store;

pub use model::LiquefactionZone;
pub use store::SpatialZoneStore;
pub use store::SqliteZoneStore;

pub mod catalog;
pub mod converter;

pub use catalog::GeoCatalog;
pub use converter::{GeoParams, GeoReference, OutOfView};

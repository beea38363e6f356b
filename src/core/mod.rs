pub mod assistant;
pub mod catalog;
pub mod resolver;
pub mod similarity;

pub use crate::domain::model::{FacilityRecord, Resolution};
pub use crate::domain::ports::{Assistant, ConfigProvider, Storage};
pub use crate::utils::error::Result;

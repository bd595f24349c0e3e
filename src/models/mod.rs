pub mod grid_item;
pub mod project;
pub mod row_model;

pub use grid_item::*;
pub use project::*;
pub use row_model::*;

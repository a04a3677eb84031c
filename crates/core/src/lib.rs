#![forbid(unsafe_code)]

pub mod error;
pub mod filter;
pub mod model;
pub mod time;

pub use error::Error;
pub use filter::{CatalogFilter, CategoryConstraint, FilterState, QueryTerms, VisibleSet};
pub use time::Clock;

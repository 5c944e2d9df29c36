#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `SeaORM` backend for `odata_adapt`.
//!
//! - [`SeaQuery`]: a [`odata_adapt::Queryable`] wrapping `sea_orm::Select<E>`
//! - [`ODataAdaptable`] / [`ODataAdaptExt`]: explicit `adapt(url)` entry points
//!   for entities and for already-filtered selects

pub mod adaptable;
pub mod select;

pub use adaptable::{EntityVisibility, ODataAdaptExt, ODataAdaptable};
pub use select::SeaQuery;

pub mod buckets;
pub mod catalogue;
pub mod error;
pub mod questions;
pub mod recommend;
pub mod risk;
pub mod schema;

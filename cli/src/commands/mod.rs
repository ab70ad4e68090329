pub mod questions;
pub mod quiz;
pub mod recommend;
pub mod schema;

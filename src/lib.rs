#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod api;
pub mod coordinate;
pub mod error;
pub mod gps_processor;
pub mod location;
mod logs;
pub mod main_db;
pub mod profile;
pub mod route;
pub mod route_data;
pub mod storage;
pub mod tracker;
mod utils;

pub use error::{Error, Result};

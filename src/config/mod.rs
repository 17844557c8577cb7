pub mod env;
pub mod run_config;
pub mod db;

pub use env::*;
pub use run_config::*;
pub use db::*;

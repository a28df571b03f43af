pub mod config;
pub mod model;
pub mod process;
pub mod summary;
pub mod table;
pub mod verify;

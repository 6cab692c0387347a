pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod paths;
pub mod scheduler;
pub mod state;

#[cfg(test)]
pub mod testing;

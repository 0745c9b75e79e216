pub mod db;
pub mod export;
pub mod models;
pub mod ratio;
pub mod service;
pub mod stats;

pub mod angle;
pub mod compare;
pub mod config;
pub mod pose;

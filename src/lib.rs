pub mod action;
pub mod config;
pub mod parser;
pub mod project;
pub mod version;

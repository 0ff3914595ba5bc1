pub mod config;
pub mod core;
pub mod database;
mod handlers;
mod middlewares;
pub mod models;
pub mod repos;
mod routes;
pub mod services;
pub mod utils;

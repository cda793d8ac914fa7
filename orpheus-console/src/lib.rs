pub mod api;
pub mod config;
pub mod db;
pub mod gateway;
pub mod repository;
pub mod service;

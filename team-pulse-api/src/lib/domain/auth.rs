pub mod models;
pub mod password;
pub mod ports;
pub mod service;
pub mod session;
pub mod token_factory;

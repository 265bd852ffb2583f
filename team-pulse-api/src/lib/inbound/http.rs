pub mod error_handler;
pub mod handlers;
pub mod middleware;
pub mod router;

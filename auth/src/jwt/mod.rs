pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::StandardClaims;
pub use claims::TokenClaims;
pub use errors::JwtError;
pub use handler::JwtHandler;

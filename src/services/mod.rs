// Service exports
pub mod error;
pub mod provider;
pub mod token;

pub use error::ProviderError;
pub use provider::ProviderClient;
pub use token::TokenClient;

pub mod token;

pub use token::{ManagedToken, ManagedTokenView, OAuth2Token};

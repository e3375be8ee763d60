pub mod token;

pub use token::{oauth2_token_schema, CreateOAuth2TokenRequest};

pub mod error;
pub mod resolver;
pub mod store;
pub mod token;

pub use error::{AuthError, ResolveError};
pub use resolver::{ResolvedStream, StreamResolver};
pub use store::{FileTokenStore, TokenStore};
pub use token::{Credential, TokenKeeper};

//! Auth-domain models: requests, correlation identifiers, token secrets, results, and users.

pub mod correlation;
pub mod request;
pub mod result;
pub mod secret;
pub mod user;

pub use correlation::*;
pub use request::*;
pub use result::*;
pub use secret::*;
pub use user::*;

//! Protected media use cases.

mod issue_media_token;

pub use issue_media_token::{IssueMediaTokenCommand, IssueMediaTokenHandler, IssuedToken};

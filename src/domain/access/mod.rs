//! Access module - enrollments and signed media capability tokens.

mod enrollment;
mod token;

pub use enrollment::{Enrollment, EnrollmentProvisioner};
pub use token::{MediaClaims, MediaTokenService, TokenInvalid, DEFAULT_MEDIA_TTL_SECS};

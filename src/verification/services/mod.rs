//! Application services for verification codes.

mod codes;

pub use codes::{OneTimeCodeService, VerificationError, VerificationResult};

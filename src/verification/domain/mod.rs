//! Domain model for one-time verification codes.

mod code;
mod error;

pub use code::{CodePolicy, OneTimeCode, VerificationCode};
pub use error::VerificationDomainError;

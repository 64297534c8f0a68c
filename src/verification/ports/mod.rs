//! Port contracts for verification code storage.

pub mod repository;

pub use repository::{
    OneTimeCodeRepository, OneTimeCodeRepositoryError, OneTimeCodeRepositoryResult,
};

//! Authentication for the user channel.
//!
//! Admission is fail closed: a connection attempt with no credential, an
//! invalid credential, or any error while validating one is rejected.

mod claims;
mod validator;

pub use claims::Claims;
pub use validator::{
    AUTH_COOKIE, AdmissionError, AuthenticatedUser, JwtValidator, TokenValidator, admit,
};

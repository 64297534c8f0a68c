//! Projects, memberships, and role-gated authorization.
//!
//! A user joins a project either by creating it, which makes them an
//! active admin, or by redeeming an invitation token issued by an admin.
//! Every role check goes through [`domain::authorize`], which keeps the
//! "not a member" and "wrong role" outcomes distinct.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

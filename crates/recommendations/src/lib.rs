//! Recommendations - Matching Recommendation Service
//!
//! REST access to the recommendation lookup store for the admin dashboard and
//! the mobile client, plus the operator CLI that provisions the table and
//! inspects stored recommendations.

pub mod cli;
pub mod server;

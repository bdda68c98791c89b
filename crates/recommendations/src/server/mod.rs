//! REST API module for the recommendations service
//!
//! Exposes the recommendation store operations over HTTP. Collaborators never
//! reach the backend directly; every route maps onto one store call.

pub mod handlers;
pub mod middleware;
pub mod oplog;
pub mod routing;
pub mod startup;
pub mod state;
pub mod types;

//! # Storefront server
//! This crate hosts the HTTP server for the storefront order service. It is responsible for:
//! * accepting orders from the checkout page and opening hosted checkout sessions for online payments,
//! * turning paid checkout sessions into orders, whether the payment provider tells us (webhook) or the customer's
//!   browser asks us (confirmation poll),
//! * the admin routes for order status and user roles.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/orders-intake`: Accepts a new order.
//! * `/confirm-order`: Confirms a checkout session after the customer returns from the payment page.
//! * `/webhook`: Receives signed checkout events from Stripe.
//! * `/admin/...`: Role checks, order status updates, order search and role assignment.
//! * `/users`, `/orders`, `/order/{id}`: Routes for signed-in customers.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod stripe_routes;

#[cfg(test)]
mod endpoint_tests;

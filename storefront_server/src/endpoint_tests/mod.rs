mod auth;
mod helpers;
mod orders;
mod webhook;

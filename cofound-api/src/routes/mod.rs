/// API route handlers, one module per resource
///
/// - `health`: liveness and database status
/// - `auth`: registration, login, token refresh and the caller's profile
/// - `startups`: startup directory, team management

pub mod auth;
pub mod health;
pub mod startups;

/// Tower middleware for the API server
///
/// Authentication lives in `cofound_shared::auth::middleware`.

pub mod security;

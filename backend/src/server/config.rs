//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use ride_service::domain::DEFAULT_MAX_ATTEMPTS;
use ride_service::inbound::http::auth::JwtVerifier;
use ride_service::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_verifier: JwtVerifier,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) join_max_attempts: u32,
}

impl ServerConfig {
    /// Configuration serving from the in-memory store with the default
    /// retry budget.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, jwt_verifier: JwtVerifier) -> Self {
        Self {
            bind_addr,
            jwt_verifier,
            db_pool: None,
            join_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Attach a database connection pool; rides are then stored in
    /// PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_join_max_attempts(mut self, attempts: u32) -> Self {
        self.join_max_attempts = attempts;
        self
    }
}

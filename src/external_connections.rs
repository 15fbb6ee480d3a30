use sqlx::PgConnection;

/// A borrowed handle onto a live database connection
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Provides access to the external systems driven adapters talk to. Business logic only
/// passes this through, so tests can hand in a fake while the server hands in a pool.
pub trait ExternalConnectivity: Sync {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

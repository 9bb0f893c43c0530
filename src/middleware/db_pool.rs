use sqlx::PgPool;

/// Storage handle injected into every handler through an axum `Extension`.
#[derive(Clone)]
pub struct DbPool(pub PgPool);

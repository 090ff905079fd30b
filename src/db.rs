embed_migrations!("migrations/");

use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::PgConnection;

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type Conn = PgConnection;

fn connect(database_url: &str) -> diesel::ConnectionResult<PgConnection> {
    PgConnection::establish(database_url)
}

pub fn migrate(database_url: &str) -> anyhow::Result<()> {
    let connection = connect(database_url)?;
    embedded_migrations::run_with_output(&connection, &mut std::io::stdout())?;

    Ok(())
}

pub fn build_connection_pool(
    database_url: &str,
    max_size: u32,
) -> anyhow::Result<Pool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool: Pool = r2d2::Pool::builder().max_size(max_size).build(manager)?;

    Ok(pool)
}

/// Blocks other writers on `table` until the surrounding transaction ends.
///
/// Readers are not blocked. Transactions that lock both tables take `teams` first.
pub fn lock_table(table: &'static str, conn: &Conn) -> QueryResult<()> {
    diesel::sql_query(format!("LOCK TABLE {} IN EXCLUSIVE MODE", table)).execute(conn)?;

    Ok(())
}

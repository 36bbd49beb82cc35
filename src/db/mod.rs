pub mod migration;

use crate::conf::Conf;
use crate::Result;
use deadpool_sqlite::{Config, Pool, PoolConfig, Runtime};
use rusqlite::Connection;
use std::path::Path;

pub fn open_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(conn)
}

pub fn pool(conf: &Conf) -> Result<Pool> {
    let mut config = Config::new(&conf.db_path);
    if let Some(max_size) = conf.pool_size {
        config.pool = Some(PoolConfig::new(max_size));
    }
    Ok(config.builder(Runtime::Tokio1)?.build()?)
}

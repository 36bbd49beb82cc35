use crate::Result;
use include_dir::include_dir;
use include_dir::Dir;
use rusqlite::Connection;
use tracing::info;
use tracing::warn;

static MIGRATIONS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/migrations");

/// Embedded `<version>.sql` file, versions start at 1 and have no gaps.
struct Migration {
    version: i16,
    sql: String,
}

pub fn run(db: &mut Connection) -> Result<()> {
    apply_pending(&embedded_migrations()?, db)
}

fn embedded_migrations() -> Result<Vec<Migration>> {
    let mut res = vec![];
    let mut version = 1;

    while let Some(file) = MIGRATIONS_DIR.get_file(format!("{version}.sql")) {
        let sql = file
            .contents_utf8()
            .ok_or(format!("Can't read {version}.sql in UTF-8"))?;
        res.push(Migration {
            version,
            sql: sql.to_string(),
        });
        version += 1;
    }

    Ok(res)
}

fn schema_version(db: &Connection) -> Result<i16> {
    Ok(db.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn apply_pending(migrations: &[Migration], db: &mut Connection) -> Result<()> {
    let current = schema_version(db)?;

    for migration in migrations.iter().filter(|it| it.version > current) {
        warn!(
            from = current,
            to = migration.version,
            "Applying database migration"
        );
        // Schema change and version bump land in the same transaction
        let tx = db.transaction()?;
        tx.execute_batch(&migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        tx.commit()?;
    }

    info!(version = schema_version(db)?, "Database schema is up to date");

    Ok(())
}

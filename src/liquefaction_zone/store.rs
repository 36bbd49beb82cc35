use super::LiquefactionZone;
use crate::Result;
use deadpool_sqlite::Pool;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use geo::Point;
use std::sync::Arc;

/// Read access to persisted liquefaction zones.
pub trait SpatialZoneStore: Send + Sync {
    /// All zones, in store order.
    fn list_all(&self) -> BoxFuture<'_, Result<Vec<LiquefactionZone>>>;

    /// First zone whose geometry intersects the point, in store order. When several
    /// zones overlap the point, which one is returned is unspecified.
    fn find_intersecting(&self, point: Point) -> BoxFuture<'_, Result<Option<LiquefactionZone>>>;
}

#[derive(Clone)]
pub struct SqliteZoneStore {
    pool: Arc<Pool>,
}

impl SqliteZoneStore {
    pub fn new(pool: &Arc<Pool>) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn select_all(&self) -> Result<Vec<LiquefactionZone>> {
        self.pool
            .get()
            .await?
            .interact(|conn| LiquefactionZone::select_all(conn))
            .await?
    }

    pub async fn select_first_intersecting(
        &self,
        point: Point,
    ) -> Result<Option<LiquefactionZone>> {
        self.pool
            .get()
            .await?
            .interact(move |conn| LiquefactionZone::select_first_intersecting(&point, conn))
            .await?
    }
}

impl SpatialZoneStore for SqliteZoneStore {
    fn list_all(&self) -> BoxFuture<'_, Result<Vec<LiquefactionZone>>> {
        self.select_all().boxed()
    }

    fn find_intersecting(&self, point: Point) -> BoxFuture<'_, Result<Option<LiquefactionZone>>> {
        self.select_first_intersecting(point).boxed()
    }
}

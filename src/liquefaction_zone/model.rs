use crate::{Error, Result};
use geo::{Intersects, MultiPolygon, Point, Polygon};
use geojson::Geometry;
use rusqlite::types::Type;
use rusqlite::{named_params, Connection, OptionalExtension, Row};
use std::time::Instant;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info};

#[derive(PartialEq, Debug, Clone)]
pub struct LiquefactionZone {
    pub id: i64,
    pub geometry: Geometry,
    pub update_timestamp: OffsetDateTime,
}

const TABLE: &str = "liquefaction_zone";
const ALL_COLUMNS: &str = "id, geometry, update_timestamp";
const COL_ID: &str = "id";
const COL_GEOMETRY: &str = "geometry";
const COL_UPDATE_TIMESTAMP: &str = "update_timestamp";

impl LiquefactionZone {
    pub fn insert(
        geometry: &Geometry,
        update_timestamp: &OffsetDateTime,
        conn: &Connection,
    ) -> Result<LiquefactionZone> {
        let query = format!(
            r#"
                INSERT INTO {TABLE} ({COL_GEOMETRY}, {COL_UPDATE_TIMESTAMP})
                VALUES (:geometry, :update_timestamp)
            "#
        );
        debug!(query);
        conn.execute(
            &query,
            named_params! {
                ":geometry": serde_json::to_string(geometry)?,
                ":update_timestamp": update_timestamp.format(&Rfc3339)?,
            },
        )?;
        LiquefactionZone::select_by_id(conn.last_insert_rowid(), conn)?
            .ok_or(Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn select_all(conn: &Connection) -> Result<Vec<LiquefactionZone>> {
        let start = Instant::now();
        let query = format!(
            r#"
                SELECT {ALL_COLUMNS}
                FROM {TABLE}
                ORDER BY {COL_ID}
            "#
        );
        debug!(query);
        let res = conn
            .prepare(&query)?
            .query_map({}, Self::mapper())?
            .collect::<Result<Vec<_>, _>>()?;
        let time_ms = start.elapsed().as_millis();
        info!(count = res.len(), time_ms, "Loaded all liquefaction zones");
        Ok(res)
    }

    pub fn select_by_id(id: i64, conn: &Connection) -> Result<Option<LiquefactionZone>> {
        let query = format!(
            r#"
                SELECT {ALL_COLUMNS}
                FROM {TABLE}
                WHERE {COL_ID} = :id
            "#
        );
        debug!(query);
        Ok(conn
            .query_row(&query, named_params! { ":id": id }, Self::mapper())
            .optional()?)
    }

    /// Scans zones in primary key order and returns the first one whose geometry
    /// intersects the given point. Overlapping zones beyond the first are never looked at.
    pub fn select_first_intersecting(
        point: &Point,
        conn: &Connection,
    ) -> Result<Option<LiquefactionZone>> {
        let start = Instant::now();
        let query = format!(
            r#"
                SELECT {ALL_COLUMNS}
                FROM {TABLE}
                ORDER BY {COL_ID}
            "#
        );
        debug!(query);
        let mut stmt = conn.prepare(&query)?;
        let mut res = None;
        for zone in stmt.query_map({}, Self::mapper())? {
            let zone = zone?;
            if zone.intersects(point)? {
                res = Some(zone);
                break;
            }
        }
        debug!(
            lon = point.x(),
            lat = point.y(),
            found = res.is_some(),
            time_ms = start.elapsed().as_millis(),
            "Finished intersection scan",
        );
        Ok(res)
    }

    /// Points on the zone boundary count as intersecting.
    pub fn intersects(&self, point: &Point) -> Result<bool> {
        match &self.geometry.value {
            geojson::Value::Polygon(_) => {
                let poly: Polygon = (&self.geometry.value).try_into()?;
                Ok(poly.intersects(point))
            }
            geojson::Value::MultiPolygon(_) => {
                let multi_poly: MultiPolygon = (&self.geometry.value).try_into()?;
                Ok(multi_poly.intersects(point))
            }
            _ => Err(Error::Generic(format!(
                "Liquefaction zone {} is neither a polygon nor a multipolygon",
                self.id,
            ))),
        }
    }

    const fn mapper() -> fn(&Row) -> rusqlite::Result<LiquefactionZone> {
        |row: &Row| -> rusqlite::Result<LiquefactionZone> {
            let geometry: String = row.get(1)?;
            let geometry: Geometry = serde_json::from_str(&geometry)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
            let update_timestamp: String = row.get(2)?;
            let update_timestamp = OffsetDateTime::parse(&update_timestamp, &Rfc3339)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
            Ok(LiquefactionZone {
                id: row.get(0)?,
                geometry,
                update_timestamp,
            })
        }
    }
}

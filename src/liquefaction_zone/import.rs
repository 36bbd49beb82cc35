use super::LiquefactionZone;
use crate::{Error, Result};
use geojson::{Feature, GeoJson, Geometry, Value};
use rusqlite::Connection;
use std::fs::read_to_string;
use std::path::Path;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{info, warn};

pub struct ZoneImport {
    pub geometry: Geometry,
    pub update_timestamp: OffsetDateTime,
}

pub fn run(path: &Path, conn: &mut Connection) -> Result<Vec<LiquefactionZone>> {
    info!(path = %path.display(), "Reading liquefaction zones");
    let geo_json: GeoJson = read_to_string(path)?.parse()?;
    let zones = parse(geo_json, OffsetDateTime::now_utc())?;
    info!(count = zones.len(), "Importing liquefaction zones");
    let tx = conn.transaction()?;
    let mut res = vec![];
    for zone in &zones {
        res.push(LiquefactionZone::insert(
            &zone.geometry,
            &zone.update_timestamp,
            &tx,
        )?);
    }
    tx.commit()?;
    info!(count = res.len(), "Imported liquefaction zones");
    Ok(res)
}

/// Keeps polygons and multipolygons, anything else is skipped. Features may carry their own
/// `update_timestamp` property, otherwise `now` is used.
pub fn parse(geo_json: GeoJson, now: OffsetDateTime) -> Result<Vec<ZoneImport>> {
    let features: Vec<Feature> = match geo_json {
        GeoJson::FeatureCollection(v) => v.features,
        GeoJson::Feature(v) => vec![v],
        GeoJson::Geometry(v) => vec![Feature {
            geometry: Some(v),
            ..Default::default()
        }],
    };
    let mut res = vec![];
    for (index, feature) in features.into_iter().enumerate() {
        let update_timestamp = match feature.property("update_timestamp") {
            Some(serde_json::Value::String(v)) => OffsetDateTime::parse(v, &Rfc3339)?,
            Some(v) => {
                return Err(Error::Generic(format!(
                    "Feature {index} has invalid update_timestamp: {v}"
                )))
            }
            None => now,
        };
        let Some(geometry) = feature.geometry else {
            warn!(index, "Skipping feature without geometry");
            continue;
        };
        match geometry.value {
            Value::Polygon(_) | Value::MultiPolygon(_) => res.push(ZoneImport {
                geometry,
                update_timestamp,
            }),
            _ => warn!(index, "Skipping feature with non-polygonal geometry"),
        }
    }
    Ok(res)
}

#[cfg(test)]
mod test {
    use crate::db::test::conn;
    use crate::liquefaction_zone::LiquefactionZone;
    use crate::{Error, Result};
    use geojson::GeoJson;
    use serde_json::json;
    use std::io::Write;
    use time::macros::datetime;

    #[test]
    fn parse_feature_collection() -> Result<()> {
        let geo_json: GeoJson = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "update_timestamp": "2021-05-01T00:00:00Z" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }
                },
                {
                    "type": "Feature",
                    "properties": null,
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [[[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]]]
                    }
                }
            ]
        })
        .to_string()
        .parse()?;
        let now = datetime!(2024-01-01 00:00 UTC);
        let res = super::parse(geo_json, now)?;
        assert_eq!(2, res.len());
        assert_eq!(datetime!(2021-05-01 00:00 UTC), res[0].update_timestamp);
        assert_eq!(now, res[1].update_timestamp);
        Ok(())
    }

    #[test]
    fn parse_single_geometry() -> Result<()> {
        let geo_json: GeoJson = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        })
        .to_string()
        .parse()?;
        assert_eq!(1, super::parse(geo_json, datetime!(2024-01-01 00:00 UTC))?.len());
        Ok(())
    }

    #[test]
    fn parse_invalid_update_timestamp() -> Result<()> {
        let geo_json: GeoJson = json!({
            "type": "Feature",
            "properties": { "update_timestamp": 42 },
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            }
        })
        .to_string()
        .parse()?;
        let res = super::parse(geo_json, datetime!(2024-01-01 00:00 UTC));
        assert!(matches!(res, Err(Error::Generic(_))));
        Ok(())
    }

    #[test]
    fn run() -> Result<()> {
        let path = std::env::temp_dir().join(format!(
            "liquefaction-import-{}.geojson",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path)?;
        write!(
            file,
            "{}",
            json!({
                "type": "Feature",
                "properties": { "update_timestamp": "2020-02-02T02:02:02Z" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                }
            })
        )?;
        let mut conn = conn();
        let res = super::run(&path, &mut conn);
        std::fs::remove_file(&path)?;
        let res = res?;
        assert_eq!(1, res.len());
        assert_eq!(res, LiquefactionZone::select_all(&conn)?);
        assert_eq!(datetime!(2020-02-02 02:02:02 UTC), res[0].update_timestamp);
        Ok(())
    }
}

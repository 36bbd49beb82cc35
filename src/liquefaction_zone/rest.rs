use super::{LiquefactionZone, SpatialZoneStore};
use crate::log::RequestExtension;
use crate::rest::error::RestApiError;
use crate::rest::error::RestResult as Res;
use actix_web::get;
use actix_web::web::Data;
use actix_web::web::Json;
use actix_web::web::Query;
use actix_web::HttpMessage;
use actix_web::HttpRequest;
use geo::Point;
use geojson::Geometry;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{error, info, warn};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct LiquefactionFeatureCollection {
    pub r#type: String,
    pub features: Vec<LiquefactionFeature>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct LiquefactionFeature {
    pub r#type: String,
    pub geometry: Geometry,
    pub properties: LiquefactionFeatureProperties,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct LiquefactionFeatureProperties {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub update_timestamp: OffsetDateTime,
}

impl From<LiquefactionZone> for LiquefactionFeature {
    fn from(val: LiquefactionZone) -> Self {
        LiquefactionFeature {
            r#type: "Feature".into(),
            geometry: val.geometry,
            properties: LiquefactionFeatureProperties {
                id: val.id,
                update_timestamp: val.update_timestamp,
            },
        }
    }
}

impl From<Vec<LiquefactionZone>> for LiquefactionFeatureCollection {
    fn from(val: Vec<LiquefactionZone>) -> Self {
        LiquefactionFeatureCollection {
            r#type: "FeatureCollection".into(),
            features: val.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct IsInLiquefactionZoneView {
    pub exists: bool,
    #[serde(default)]
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_updated: Option<OffsetDateTime>,
}

#[get("")]
pub async fn get(
    req: HttpRequest,
    store: Data<dyn SpatialZoneStore>,
) -> Res<LiquefactionFeatureCollection> {
    let zones = store.list_all().await.map_err(|e| {
        error!(error = ?e, "Failed to load liquefaction zones");
        RestApiError::internal(format!("Failed to load liquefaction zones: {e}"))
    })?;

    if zones.is_empty() {
        warn!("No liquefaction zones found");
        return Err(RestApiError::not_found("No liquefaction zones found"));
    }

    info!(count = zones.len(), "Returning liquefaction zones");
    req.extensions_mut()
        .insert(RequestExtension::new(zones.len()));

    Ok(Json(zones.into()))
}

#[derive(Deserialize)]
pub struct IsInZoneArgs {
    lon: Option<f64>,
    lat: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    ping: bool,
}

/// Case-insensitive `true/1/yes/on` or `false/0/no/off`.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = String::deserialize(deserializer)?;
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(serde::de::Error::custom(format!(
            "invalid boolean flag: {value}"
        ))),
    }
}

// ping=true keeps the endpoint warm without touching the database
#[get("/is-in-liquefaction-zone")]
pub async fn is_in_liquefaction_zone(
    args: Query<IsInZoneArgs>,
    store: Data<dyn SpatialZoneStore>,
) -> Res<IsInLiquefactionZoneView> {
    if args.ping {
        info!("Pinging the is-in-liquefaction-zone endpoint");
        return Ok(Json(IsInLiquefactionZoneView {
            exists: false,
            last_updated: None,
        }));
    }

    let (Some(lon), Some(lat)) = (args.lon, args.lat) else {
        warn!(
            lon = args.lon,
            lat = args.lat,
            "Missing coordinates in non-ping request"
        );
        return Err(RestApiError::invalid_input(
            "Both 'lon' and 'lat' must be provided unless ping=true",
        ));
    };

    info!(lon, lat, "Checking liquefaction zone for coordinates");

    let zone = store
        .find_intersecting(Point::new(lon, lat))
        .await
        .map_err(|e| {
            error!(lon, lat, error = ?e, "Error checking liquefaction zone status");
            RestApiError::internal(format!(
                "Error checking liquefaction zone status for coordinates: lon={lon:?}, lat={lat:?}, error: {e}"
            ))
        })?;

    let view = IsInLiquefactionZoneView {
        exists: zone.is_some(),
        last_updated: zone.map(|it| it.update_timestamp),
    };

    info!(
        lon,
        lat,
        exists = view.exists,
        last_updated = ?view.last_updated,
        "Liquefaction zone check result",
    );

    Ok(Json(view))
}

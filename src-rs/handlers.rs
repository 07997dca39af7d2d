use axum::{
    extract::{rejection::QueryRejection, Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{error::ProxyError, pollen::PollenError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PollenQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl PollenQuery {
    pub fn coordinates(&self) -> Result<(f64, f64), ProxyError> {
        let lat = non_empty(self.lat.as_deref()).ok_or(ProxyError::MissingCoordinates)?;
        let lon = non_empty(self.lon.as_deref()).ok_or(ProxyError::MissingCoordinates)?;

        let lat = parse_coordinate(lat)?;
        let lon = parse_coordinate(lon)?;
        Ok((lat, lon))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_coordinate(raw: &str) -> Result<f64, ProxyError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(ProxyError::InvalidCoordinates)
}

pub async fn pollen(
    State(state): State<AppState>,
    query: Result<Query<PollenQuery>, QueryRejection>,
) -> Result<Json<Value>, ProxyError> {
    let Query(query) = query.map_err(|rejection| {
        tracing::warn!(error = %rejection, "unparseable pollen query");
        ProxyError::InvalidCoordinates
    })?;
    let (latitude, longitude) = query.coordinates()?;

    let api_key = state
        .config
        .pollen_api_key
        .as_deref()
        .ok_or(ProxyError::ApiKeyNotConfigured)?;

    match state.pollen.lookup(api_key, latitude, longitude).await {
        Ok(forecast) => Ok(Json(forecast)),
        Err(PollenError::Upstream { status, body }) => {
            tracing::error!(status = %status, body = %body, "pollen API error");
            let status =
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            Err(ProxyError::Upstream { status })
        }
        Err(error) => {
            tracing::error!(error = %error, "pollen proxy error");
            Err(ProxyError::Internal)
        }
    }
}

pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

pub async fn health(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "pollenApiConfigured": state.config.pollen_api_key.is_some(),
        })),
    )
        .into_response()
}

pub async fn not_found() -> ProxyError {
    ProxyError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(lat: Option<&str>, lon: Option<&str>) -> PollenQuery {
        PollenQuery {
            lat: lat.map(ToString::to_string),
            lon: lon.map(ToString::to_string),
        }
    }

    #[test]
    fn parses_present_coordinates() {
        let (lat, lon) = query(Some("35.6762"), Some("139.6503"))
            .coordinates()
            .expect("valid coordinates");
        assert!((lat - 35.6762).abs() < f64::EPSILON);
        assert!((lon - 139.6503).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_or_blank_coordinates_are_rejected() {
        for (lat, lon) in [(None, Some("1")), (Some("1"), None), (Some(""), Some("1")), (Some("1"), Some("  "))] {
            assert!(matches!(
                query(lat, lon).coordinates(),
                Err(ProxyError::MissingCoordinates)
            ));
        }
    }

    #[test]
    fn non_numeric_coordinates_are_invalid() {
        assert!(matches!(
            query(Some("north"), Some("1")).coordinates(),
            Err(ProxyError::InvalidCoordinates)
        ));
        assert!(matches!(
            query(Some("1"), Some("NaN")).coordinates(),
            Err(ProxyError::InvalidCoordinates)
        ));
    }
}

use crossbeam_channel::Sender;
use serde::Deserialize;
use std::thread;

use crate::annotations::{Route, RouteRequest, TransportMode};
use crate::position::LatLon;
use crate::services::{RouteOutcome, Routing, ServiceError};

/// Route calculation against an OSRM endpoint, worker-thread per request.
pub struct OsrmRouter {
    endpoint: String,
    user_agent: String,
}

impl OsrmRouter {
    pub fn new(endpoint: &str, user_agent: &str) -> Self {
        Self { endpoint: endpoint.to_string(), user_agent: user_agent.to_string() }
    }
}

impl Routing for OsrmRouter {
    fn route(&self, request: RouteRequest, reply: Sender<RouteOutcome>) {
        let endpoint = self.endpoint.clone();
        let user_agent = self.user_agent.clone();
        thread::spawn(move || {
            let outcome = perform(&endpoint, &user_agent, request);
            reply.send(outcome).ok();
        });
    }
}

fn profile(mode: TransportMode) -> &'static str {
    match mode {
        TransportMode::Automobile => "driving",
        TransportMode::Walking => "walking",
        TransportMode::Cycling => "cycling",
    }
}

fn perform(endpoint: &str, user_agent: &str, request: RouteRequest) -> RouteOutcome {
    // OSRM takes lon,lat pairs
    let url = format!(
        "{}/route/v1/{}/{},{};{},{}",
        endpoint,
        profile(request.transport_mode),
        request.origin.lon,
        request.origin.lat,
        request.destination.lon,
        request.destination.lat,
    );
    let response = ureq::get(&url)
        .query("alternatives", if request.allow_alternates { "true" } else { "false" })
        .query("geometries", "geojson")
        .query("overview", "full")
        .set("User-Agent", user_agent)
        .call()
        .map_err(|e| ServiceError::RouteFailed(e.to_string()))?;
    let body = response
        .into_string()
        .map_err(|e| ServiceError::RouteFailed(e.to_string()))?;
    parse_routes(&body)
}

#[derive(Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    /// GeoJSON LineString coordinates, [lon, lat] order.
    coordinates: Vec<[f64; 2]>,
}

pub(crate) fn parse_routes(body: &str) -> RouteOutcome {
    let raw: OsrmResponse =
        serde_json::from_str(body).map_err(|e| ServiceError::RouteFailed(e.to_string()))?;
    if raw.code != "Ok" {
        let detail = raw.message.unwrap_or(raw.code);
        return Err(ServiceError::RouteFailed(detail));
    }

    let routes = raw
        .routes
        .into_iter()
        .map(|r| Route {
            path: r.geometry.coordinates.iter().map(|c| LatLon::new(c[1], c[0])).collect(),
            distance_meters: r.distance,
            duration_seconds: r.duration,
        })
        .collect();
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "code": "Ok",
        "routes": [
            {"distance": 459876.1, "duration": 16490.3,
             "geometry": {"type": "LineString",
                          "coordinates": [[-0.1275, 51.5072], [1.1, 50.2], [2.3508, 48.8567]]}},
            {"distance": 470102.9, "duration": 17204.0,
             "geometry": {"type": "LineString",
                          "coordinates": [[-0.1275, 51.5072], [2.3508, 48.8567]]}}
        ],
        "waypoints": []
    }"#;

    #[test]
    fn test_parse_routes_alternatives_and_axis_order() {
        let routes = parse_routes(FIXTURE).unwrap();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].path.len(), 3);
        // coordinates arrive lon-first and must come out lat-first
        assert!((routes[0].path[0].lat - 51.5072).abs() < 1e-9);
        assert!((routes[0].path[0].lon + 0.1275).abs() < 1e-9);
        assert!((routes[0].distance_meters - 459876.1).abs() < 1e-6);
    }

    #[test]
    fn test_parse_routes_error_code() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        match parse_routes(body) {
            Err(ServiceError::RouteFailed(msg)) => {
                assert_eq!(msg, "Impossible route between points")
            }
            other => panic!("expected RouteFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_routes_error_code_without_message() {
        match parse_routes(r#"{"code": "InvalidUrl"}"#) {
            Err(ServiceError::RouteFailed(msg)) => assert_eq!(msg, "InvalidUrl"),
            other => panic!("expected RouteFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(profile(TransportMode::Automobile), "driving");
        assert_eq!(profile(TransportMode::Walking), "walking");
        assert_eq!(profile(TransportMode::Cycling), "cycling");
    }
}

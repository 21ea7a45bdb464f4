use crate::position::LatLon;

/// Identity handed out by the controller for every annotation it installs.
/// Removal is a pure set operation on these ids, never an identity
/// comparison against whatever the map surface stores internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapRenderMode {
    #[default]
    Standard,
    Hybrid,
    Satellite,
}

impl MapRenderMode {
    pub const ALL: [MapRenderMode; 3] =
        [MapRenderMode::Standard, MapRenderMode::Hybrid, MapRenderMode::Satellite];

    pub fn label(&self) -> &'static str {
        match self {
            MapRenderMode::Standard => "Standard",
            MapRenderMode::Hybrid => "Hybrid",
            MapRenderMode::Satellite => "Satellite",
        }
    }

    pub fn from_name(name: &str) -> Option<MapRenderMode> {
        match name.to_lowercase().as_str() {
            "standard" => Some(MapRenderMode::Standard),
            "hybrid" => Some(MapRenderMode::Hybrid),
            "satellite" => Some(MapRenderMode::Satellite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationKind {
    /// Fixed point of interest with a blurb shown in its callout.
    Capital { blurb: String },
    /// Fixed address pin. No callout action.
    Placemark,
    /// Transient search hit, replaced wholesale on every new search.
    SearchResult,
    /// "You are here" pin from a location fix.
    UserLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub label: String,
    pub position: LatLon,
    pub kind: AnnotationKind,
}

/// One row of the fixed capital table.
pub struct Capital {
    pub label: &'static str,
    pub position: LatLon,
    pub blurb: &'static str,
}

pub const CAPITALS: [Capital; 6] = [
    Capital {
        label: "London",
        position: LatLon::new(51.507222, -0.1275),
        blurb: "Home to the 2012 Summer Olympics.",
    },
    Capital {
        label: "Oslo",
        position: LatLon::new(59.95, 10.75),
        blurb: "Founded over a thousand years ago.",
    },
    Capital {
        label: "Paris",
        position: LatLon::new(48.8567, 2.3508),
        blurb: "Often called the City of Light.",
    },
    Capital {
        label: "Rome",
        position: LatLon::new(41.9, 12.5),
        blurb: "Has a whole country inside it.",
    },
    Capital {
        label: "Washington DC",
        position: LatLon::new(38.895111, -77.036667),
        blurb: "Named after George himself.",
    },
    Capital {
        label: "Riga",
        position: LatLon::new(56.948889, 24.106389),
        blurb: "Heart of the Baltics",
    },
];

/// The one fixed street-address pin that is not a capital.
pub const PLACEMARK_LABEL: &str = "181 Piccadilly, St. James's, London";
pub const PLACEMARK_POSITION: LatLon = LatLon::new(51.5083, -0.1384);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Automobile,
    Walking,
    Cycling,
}

/// A one-shot routing query. Consumed by the routing service; never retained.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest {
    pub origin: LatLon,
    pub destination: LatLon,
    pub allow_alternates: bool,
    pub transport_mode: TransportMode,
}

/// One hit from the place-search service.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceResult {
    pub name: Option<String>,
    pub position: LatLon,
}

/// One alternative returned by the routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub path: Vec<LatLon>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

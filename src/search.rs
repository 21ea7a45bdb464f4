use crossbeam_channel::Sender;
use serde::Deserialize;
use std::thread;

use crate::annotations::PlaceResult;
use crate::position::{LatLon, Region};
use crate::services::{PlaceSearch, SearchOutcome, ServiceError};

const RESULT_LIMIT: usize = 10;

/// Place search against a Nominatim endpoint. Each request runs on its own
/// worker thread and reports back over the caller's channel; the request is
/// bounded to the visible region so results stay on screen.
pub struct NominatimSearch {
    endpoint: String,
    user_agent: String,
}

impl NominatimSearch {
    pub fn new(endpoint: &str, user_agent: &str) -> Self {
        Self { endpoint: endpoint.to_string(), user_agent: user_agent.to_string() }
    }
}

impl PlaceSearch for NominatimSearch {
    fn search(&self, query: &str, region: Region, reply: Sender<SearchOutcome>) {
        let endpoint = self.endpoint.clone();
        let user_agent = self.user_agent.clone();
        let query = query.to_string();
        thread::spawn(move || {
            let outcome = perform(&endpoint, &user_agent, &query, region);
            // The receiver may be gone if the app shut down mid-request.
            reply.send(outcome).ok();
        });
    }
}

fn perform(endpoint: &str, user_agent: &str, query: &str, region: Region) -> SearchOutcome {
    let (south, west, north, east) = region.bounds();
    let viewbox = format!("{west},{north},{east},{south}");
    let response = ureq::get(endpoint)
        .query("q", query)
        .query("format", "jsonv2")
        .query("limit", &RESULT_LIMIT.to_string())
        .query("viewbox", &viewbox)
        .query("bounded", "1")
        .set("User-Agent", user_agent)
        .call()
        .map_err(|e| ServiceError::SearchFailed(e.to_string()))?;
    let body = response
        .into_string()
        .map_err(|e| ServiceError::SearchFailed(e.to_string()))?;
    parse_places(&body)
}

#[derive(Deserialize)]
struct NominatimPlace {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    lat: String,
    lon: String,
}

/// Nominatim jsonv2 reply -> place results. Entries with unparseable or
/// out-of-range coordinates are dropped, not fatal.
pub(crate) fn parse_places(body: &str) -> SearchOutcome {
    let raw: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|e| ServiceError::SearchFailed(e.to_string()))?;

    let mut places = Vec::with_capacity(raw.len());
    for entry in raw {
        let (Ok(lat), Ok(lon)) = (entry.lat.parse::<f64>(), entry.lon.parse::<f64>()) else {
            log::warn!("dropping search hit with bad coordinates {:?},{:?}", entry.lat, entry.lon);
            continue;
        };
        let position = LatLon::new(lat, lon);
        if !position.is_valid() {
            log::warn!("dropping search hit outside WGS84 bounds: {position:?}");
            continue;
        }
        let name = entry
            .name
            .filter(|n| !n.is_empty())
            .or(entry.display_name.filter(|n| !n.is_empty()));
        places.push(PlaceResult { name, position });
    }
    Ok(places)
}

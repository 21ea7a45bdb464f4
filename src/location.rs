use crossbeam_channel::Sender;
use serde::Deserialize;
use std::thread;

use crate::position::LatLon;
use crate::services::{AuthStatus, LocationOutcome, LocationProvider, ServiceError};

/// Approximate device location from an IP geolocation lookup. There is no
/// OS location service in play here, so "authorization" is the user's
/// consent flag: without it no lookup ever leaves the machine.
pub struct IpLocator {
    endpoint: String,
    user_agent: String,
    consent: bool,
}

impl IpLocator {
    pub fn new(endpoint: &str, user_agent: &str, consent: bool) -> Self {
        Self { endpoint: endpoint.to_string(), user_agent: user_agent.to_string(), consent }
    }
}

impl LocationProvider for IpLocator {
    fn request_authorization(&self, reply: Sender<AuthStatus>) {
        let status =
            if self.consent { AuthStatus::AllowedWhileActive } else { AuthStatus::Denied };
        reply.send(status).ok();
    }

    fn request_location(&self, reply: Sender<LocationOutcome>) {
        if !self.consent {
            reply
                .send(Err(ServiceError::AuthorizationDenied("location lookups are off".into())))
                .ok();
            return;
        }
        let endpoint = self.endpoint.clone();
        let user_agent = self.user_agent.clone();
        thread::spawn(move || {
            let outcome = perform(&endpoint, &user_agent);
            reply.send(outcome).ok();
        });
    }
}

fn perform(endpoint: &str, user_agent: &str) -> LocationOutcome {
    let response = ureq::get(endpoint)
        .set("User-Agent", user_agent)
        .call()
        .map_err(|e| ServiceError::LocationFailed(e.to_string()))?;
    let body = response
        .into_string()
        .map_err(|e| ServiceError::LocationFailed(e.to_string()))?;
    parse_fix(&body)
}

#[derive(Deserialize)]
struct IpApiReply {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

pub(crate) fn parse_fix(body: &str) -> LocationOutcome {
    let raw: IpApiReply =
        serde_json::from_str(body).map_err(|e| ServiceError::LocationFailed(e.to_string()))?;
    if raw.status != "success" {
        let detail = raw.message.unwrap_or(raw.status);
        return Err(ServiceError::LocationFailed(detail));
    }
    let (Some(lat), Some(lon)) = (raw.lat, raw.lon) else {
        return Err(ServiceError::LocationFailed("reply carried no coordinates".into()));
    };
    let position = LatLon::new(lat, lon);
    if !position.is_valid() {
        return Err(ServiceError::LocationFailed(format!("bad coordinates {lat},{lon}")));
    }
    Ok(vec![position])
}

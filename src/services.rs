use crossbeam_channel::Sender;
use thiserror::Error;

use crate::annotations::{Annotation, AnnotationId, MapRenderMode, PlaceResult, Route, RouteRequest};
use crate::position::{LatLon, Region};

/// Everything a collaborating service can fail with. All of these are
/// log-only: the screen stays interactive, nothing is retried.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("place search failed: {0}")]
    SearchFailed(String),
    #[error("route calculation failed: {0}")]
    RouteFailed(String),
    #[error("location fix failed: {0}")]
    LocationFailed(String),
    #[error("location authorization denied: {0}")]
    AuthorizationDenied(String),
}

pub type SearchOutcome = Result<Vec<PlaceResult>, ServiceError>;
pub type RouteOutcome = Result<Vec<Route>, ServiceError>;
/// A batch of fixes. Only the first entry is consumed.
pub type LocationOutcome = Result<Vec<LatLon>, ServiceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// Location may be used while the application is active.
    AllowedWhileActive,
    Denied,
    Restricted,
}

/// The map the controller draws on. Implemented by the GUI's tile-map view
/// and by the stub surface in controller tests.
pub trait MapSurface {
    fn add_annotation(&mut self, annotation: Annotation);
    fn add_annotations(&mut self, batch: Vec<Annotation>);
    fn remove_annotations(&mut self, ids: &[AnnotationId]);
    fn add_overlay(&mut self, path: Vec<LatLon>);
    fn set_visible_region(&mut self, region: Region);
    fn visible_region(&self) -> Region;
    fn set_render_mode(&mut self, mode: MapRenderMode);
}

/// Asynchronous place search. The outcome arrives later on `reply`; there is
/// no cancellation and no ordering guarantee between overlapping requests.
pub trait PlaceSearch {
    fn search(&self, query: &str, region: Region, reply: Sender<SearchOutcome>);
}

/// Asynchronous route calculation.
pub trait Routing {
    fn route(&self, request: RouteRequest, reply: Sender<RouteOutcome>);
}

/// Device (or device-like) location. Authorization status and fixes are both
/// delivered asynchronously.
pub trait LocationProvider {
    fn request_authorization(&self, reply: Sender<AuthStatus>);
    fn request_location(&self, reply: Sender<LocationOutcome>);
}

/// Optional detail screen that renders external content about a topic.
/// When absent, the controller falls back to a plain alert dialog.
pub trait WebDetail {
    fn open(&self, topic: &str);
}

/// Modal presentation. Answers come back through the event loop, not as
/// return values: the shell renders the pending dialog and feeds the pick
/// into the controller on a later frame.
pub trait DialogPresenter {
    fn present_alert(&mut self, title: &str, message: &str);
    fn present_choice(&mut self, title: &str, options: &[&str]);
    fn present_text_input(&mut self, title: &str);
}

use std::collections::HashSet;

use crossbeam_channel::{Receiver, Sender, unbounded};
use rustc_hash::FxHashMap;

use crate::annotations::{
    Annotation, AnnotationId, AnnotationKind, CAPITALS, MapRenderMode, PLACEMARK_LABEL,
    PLACEMARK_POSITION, PlaceResult, RouteRequest,
};
use crate::position::Region;
use crate::services::{
    AuthStatus, DialogPresenter, LocationOutcome, LocationProvider, MapSurface, PlaceSearch,
    RouteOutcome, Routing, SearchOutcome, ServiceError, WebDetail,
};

const MAP_TYPE_TITLE: &str = "Choose a map type";
const SEARCH_TITLE: &str = "Search for a place";
const FALLBACK_PLACE_LABEL: &str = "Unknown place";
const USER_LOCATION_LABEL: &str = "You are here";

/// Owns everything shown on the map and routes UI events to the right
/// collaborator. All state changes happen on the UI thread: collaborators
/// reply over channels and `pump` drains them once per frame.
///
/// The transient search-result annotations are tracked as an id set, so
/// replacing them is a set removal plus one batch insert. The fixed
/// capitals and the placemark are never part of that set and can never be
/// removed by a search or a route.
pub struct MapScreen<M: MapSurface, D: DialogPresenter> {
    surface: M,
    dialogs: D,
    web: Option<Box<dyn WebDetail>>,
    search: Box<dyn PlaceSearch>,
    routing: Box<dyn Routing>,
    location: Box<dyn LocationProvider>,

    annotations: FxHashMap<AnnotationId, Annotation>,
    search_ids: HashSet<AnnotationId>,
    render_mode: MapRenderMode,
    next_id: u64,

    search_tx: Sender<SearchOutcome>,
    search_rx: Receiver<SearchOutcome>,
    route_tx: Sender<RouteOutcome>,
    route_rx: Receiver<RouteOutcome>,
    auth_tx: Sender<AuthStatus>,
    auth_rx: Receiver<AuthStatus>,
    fix_tx: Sender<LocationOutcome>,
    fix_rx: Receiver<LocationOutcome>,
}

impl<M: MapSurface, D: DialogPresenter> MapScreen<M, D> {
    pub fn new(
        surface: M,
        dialogs: D,
        search: Box<dyn PlaceSearch>,
        routing: Box<dyn Routing>,
        location: Box<dyn LocationProvider>,
        web: Option<Box<dyn WebDetail>>,
        start_mode: MapRenderMode,
    ) -> Self {
        let (search_tx, search_rx) = unbounded();
        let (route_tx, route_rx) = unbounded();
        let (auth_tx, auth_rx) = unbounded();
        let (fix_tx, fix_rx) = unbounded();

        MapScreen {
            surface,
            dialogs,
            web,
            search,
            routing,
            location,
            annotations: FxHashMap::default(),
            search_ids: HashSet::new(),
            render_mode: start_mode,
            next_id: 1,
            search_tx,
            search_rx,
            route_tx,
            route_rx,
            auth_tx,
            auth_rx,
            fix_tx,
            fix_rx,
        }
    }

    /// Installs the fixed annotations and kicks off the location
    /// authorization request. The capitals are on the map before this
    /// returns; the authorization reply lands in a later `pump`.
    pub fn initialize(&mut self) {
        let mut capitals = Vec::with_capacity(CAPITALS.len());
        for capital in &CAPITALS {
            capitals.push(self.register(Annotation {
                id: AnnotationId(0),
                label: capital.label.to_string(),
                position: capital.position,
                kind: AnnotationKind::Capital { blurb: capital.blurb.to_string() },
            }));
        }
        let first = capitals.remove(0);
        self.surface.add_annotation(first);
        self.surface.add_annotations(capitals);

        let placemark = self.register(Annotation {
            id: AnnotationId(0),
            label: PLACEMARK_LABEL.to_string(),
            position: PLACEMARK_POSITION,
            kind: AnnotationKind::Placemark,
        });
        self.surface.add_annotation(placemark);

        self.surface.set_render_mode(self.render_mode);
        self.location.request_authorization(self.auth_tx.clone());
        log::info!("map screen up with {} fixed annotations", self.annotations.len());
    }

    /// Drains every completion channel. Called once per frame. Overlapping
    /// requests resolve in arrival order: a stale search that completes
    /// after a newer one overwrites it (kept as-is, see DESIGN.md).
    pub fn pump(&mut self) {
        while let Ok(outcome) = self.search_rx.try_recv() {
            self.search_completed(outcome);
        }
        while let Ok(outcome) = self.route_rx.try_recv() {
            self.route_completed(outcome);
        }
        while let Ok(status) = self.auth_rx.try_recv() {
            self.authorization_changed(status);
        }
        while let Ok(outcome) = self.fix_rx.try_recv() {
            self.location_completed(outcome);
        }
    }

    pub fn annotation_tapped(&mut self, id: AnnotationId) {
        let Some(annotation) = self.annotations.get(&id) else {
            log::debug!("tap on unknown annotation {id:?}");
            return;
        };
        match &annotation.kind {
            AnnotationKind::Capital { blurb } => {
                if let Some(web) = &self.web {
                    web.open(&annotation.label);
                } else {
                    self.dialogs.present_alert(&annotation.label, blurb);
                }
            }
            // Placemarks, search results and the user pin get no callout
            // action beyond the surface's own.
            _ => {}
        }
    }

    /// Opens the map-type sheet. The pick comes back via
    /// `render_mode_chosen`; cancel comes back as `None`.
    pub fn change_render_mode(&mut self) {
        let options: Vec<&str> = MapRenderMode::ALL.iter().map(|m| m.label()).collect();
        self.dialogs.present_choice(MAP_TYPE_TITLE, &options);
    }

    pub fn render_mode_chosen(&mut self, choice: Option<MapRenderMode>) {
        if let Some(mode) = choice {
            self.render_mode = mode;
            self.surface.set_render_mode(mode);
        }
    }

    pub fn render_mode(&self) -> MapRenderMode {
        self.render_mode
    }

    /// Opens the search prompt; the submitted text lands in `search_place`.
    pub fn request_search(&mut self) {
        self.dialogs.present_text_input(SEARCH_TITLE);
    }

    /// Issues a place search scoped to the visible region. An empty query
    /// issues nothing.
    pub fn search_place(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let region = self.surface.visible_region();
        log::debug!("searching {query:?} in {region:?}");
        self.search.search(query, region, self.search_tx.clone());
    }

    pub fn draw_route(&mut self, request: RouteRequest) {
        self.routing.route(request, self.route_tx.clone());
    }

    /// Fires a one-shot location request. Also triggered automatically when
    /// authorization arrives as allowed.
    pub fn locate(&mut self) {
        self.location.request_location(self.fix_tx.clone());
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut M {
        &mut self.surface
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn dialogs_mut(&mut self) -> &mut D {
        &mut self.dialogs
    }

    fn search_completed(&mut self, outcome: SearchOutcome) {
        match outcome {
            Ok(results) => self.show_results(results),
            // A failed search leaves whatever was on the map untouched.
            Err(err) => log::warn!("{err}"),
        }
    }

    /// Replaces the whole search-result set: removes the previous batch and
    /// installs the new one in a single update.
    fn show_results(&mut self, results: Vec<PlaceResult>) {
        let stale: Vec<AnnotationId> = self.search_ids.drain().collect();
        for id in &stale {
            self.annotations.remove(id);
        }
        self.surface.remove_annotations(&stale);

        let mut batch = Vec::with_capacity(results.len());
        for result in results {
            let label = result.name.unwrap_or_else(|| FALLBACK_PLACE_LABEL.to_string());
            let annotation = self.register(Annotation {
                id: AnnotationId(0),
                label,
                position: result.position,
                kind: AnnotationKind::SearchResult,
            });
            self.search_ids.insert(annotation.id);
            batch.push(annotation);
        }
        log::info!("search: {} stale pins out, {} in", stale.len(), batch.len());
        self.surface.add_annotations(batch);
    }

    fn route_completed(&mut self, outcome: RouteOutcome) {
        match outcome {
            Ok(routes) => {
                for route in routes {
                    let Some(region) = Region::from_points(&route.path) else {
                        log::warn!("dropping route alternative with empty path");
                        continue;
                    };
                    log::info!(
                        "route alternative: {} over {} points",
                        crate::position::format_distance(route.distance_meters),
                        route.path.len()
                    );
                    self.surface.add_overlay(route.path);
                    // Each alternative re-fits the view, so the last one wins.
                    self.surface.set_visible_region(region);
                }
            }
            // No overlay, no region change, no user-visible error.
            Err(err) => log::warn!("{err}"),
        }
    }

    fn authorization_changed(&mut self, status: AuthStatus) {
        match status {
            AuthStatus::AllowedWhileActive => self.locate(),
            other => log::info!("location authorization: {other:?}"),
        }
    }

    fn location_completed(&mut self, outcome: LocationOutcome) {
        match outcome {
            Ok(batch) => self.location_update(batch),
            Err(err @ ServiceError::AuthorizationDenied(_)) => log::info!("{err}"),
            Err(err) => log::warn!("{err}"),
        }
    }

    /// Takes the first fix of the batch and appends a "You are here" pin.
    /// Every update appends another pin; earlier ones stay on the map.
    fn location_update(&mut self, batch: Vec<crate::position::LatLon>) {
        let Some(first) = batch.first() else {
            return;
        };
        let pin = self.register(Annotation {
            id: AnnotationId(0),
            label: USER_LOCATION_LABEL.to_string(),
            position: *first,
            kind: AnnotationKind::UserLocation,
        });
        self.surface.add_annotation(pin);
    }

    /// Assigns a fresh id and records the annotation in the controller's
    /// book. The surface only ever sees annotations that went through here.
    fn register(&mut self, mut annotation: Annotation) -> Annotation {
        let id = AnnotationId(self.next_id);
        self.next_id += 1;
        annotation.id = id;
        self.annotations.insert(id, annotation.clone());
        annotation
    }
}

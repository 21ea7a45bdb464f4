// Tile map widget using the walkers crate: annotations as colored markers,
// routes as polyline overlays, tiles picked per render mode.
use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui;
use rustc_hash::FxHashMap;
use walkers::sources::{Attribution, TileSource};
use walkers::{HttpTiles, Map, MapMemory, Plugin, Position, Projector, TileId};

use crate::annotations::{Annotation, AnnotationId, AnnotationKind, MapRenderMode};
use crate::config::TileConfig;
use crate::position::{LatLon, Region};
use crate::services::MapSurface;

const DEFAULT_STANDARD_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const DEFAULT_SATELLITE_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
const DEFAULT_HYBRID_URL: &str = "https://mt1.google.com/vt/lyrs=y&x={x}&y={y}&z={z}";

/// How close a click has to land to a marker to count as a tap, in points.
const TAP_RADIUS: f32 = 12.0;

const ROUTE_STROKE: egui::Stroke =
    egui::Stroke { width: 4.0, color: egui::Color32::from_rgb(0, 122, 255) };

fn to_position(p: LatLon) -> Position {
    walkers::lat_lon(p.lat, p.lon)
}

/// A tile source described by a URL template with {x}/{y}/{z} placeholders.
struct UrlSource {
    template: String,
    attribution_text: &'static str,
    attribution_url: &'static str,
}

impl TileSource for UrlSource {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.template
            .replace("{x}", &tile_id.x.to_string())
            .replace("{y}", &tile_id.y.to_string())
            .replace("{z}", &tile_id.zoom.to_string())
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: self.attribution_text,
            url: self.attribution_url,
            logo_light: None,
            logo_dark: None,
        }
    }
}

/// The interactive map. Owns everything the controller put on it plus the
/// walkers camera state, and doubles as the controller's `MapSurface`.
pub struct MapView {
    annotations: Vec<Annotation>,
    overlays: Vec<Vec<LatLon>>,
    mode: MapRenderMode,
    templates: FxHashMap<MapRenderMode, String>,
    tiles: FxHashMap<MapRenderMode, HttpTiles>,
    map_memory: MapMemory,
    /// Current best estimate of what is on screen. Refreshed every frame
    /// from the camera, overwritten immediately by `set_visible_region`.
    region: Region,
    /// Region requested by the controller, applied on the next frame when
    /// the viewport size is known.
    pending: Option<Region>,
    viewport: egui::Vec2,
}

impl MapView {
    pub fn new(tiles: &TileConfig) -> Self {
        let mut templates = FxHashMap::default();
        templates.insert(
            MapRenderMode::Standard,
            tiles.standard.clone().unwrap_or_else(|| DEFAULT_STANDARD_URL.to_string()),
        );
        templates.insert(
            MapRenderMode::Satellite,
            tiles.satellite.clone().unwrap_or_else(|| DEFAULT_SATELLITE_URL.to_string()),
        );
        templates.insert(
            MapRenderMode::Hybrid,
            tiles.hybrid.clone().unwrap_or_else(|| DEFAULT_HYBRID_URL.to_string()),
        );

        MapView {
            annotations: Vec::new(),
            overlays: Vec::new(),
            mode: MapRenderMode::default(),
            templates,
            tiles: FxHashMap::default(),
            map_memory: MapMemory::default(),
            region: Region::default(),
            pending: Some(Region::default()),
            viewport: egui::vec2(1280.0, 720.0),
        }
    }

    fn source_for(&self, mode: MapRenderMode) -> UrlSource {
        let (text, url) = match mode {
            MapRenderMode::Standard => {
                ("OpenStreetMap contributors", "https://www.openstreetmap.org/copyright")
            }
            MapRenderMode::Satellite => ("Esri World Imagery", "https://www.esri.com"),
            MapRenderMode::Hybrid => ("Map data providers", "https://www.google.com/maps"),
        };
        UrlSource {
            template: self.templates[&mode].clone(),
            attribution_text: text,
            attribution_url: url,
        }
    }

    /// Renders the map and reports a tapped annotation, if any.
    pub fn render(&mut self, ui: &mut egui::Ui) -> Option<AnnotationId> {
        self.viewport = ui.available_size();

        if let Some(region) = self.pending.take() {
            self.map_memory.center_at(to_position(region.center));
            let _ = self.map_memory.set_zoom(zoom_for(&region, self.viewport));
        }

        let anchor = to_position(self.region.center);
        let tapped = Rc::new(RefCell::new(None));

        let routes = RoutesPlugin {
            paths: self
                .overlays
                .iter()
                .map(|path| path.iter().map(|p| to_position(*p)).collect())
                .collect(),
        };
        let markers = MarkersPlugin {
            markers: self
                .annotations
                .iter()
                .map(|a| {
                    let (color, radius) = marker_style(&a.kind);
                    Marker {
                        position: to_position(a.position),
                        color,
                        radius,
                        id: a.id,
                        label: a.label.clone(),
                    }
                })
                .collect(),
            tapped: tapped.clone(),
        };

        let ctx = ui.ctx().clone();
        let source = self.source_for(self.mode);
        let tiles = self
            .tiles
            .entry(self.mode)
            .or_insert_with(|| HttpTiles::new(source, ctx));
        let map = Map::new(Some(tiles), &mut self.map_memory, anchor)
            .with_plugin(routes)
            .with_plugin(markers);
        ui.add(map);

        self.refresh_region_estimate();
        tapped.take()
    }

    fn refresh_region_estimate(&mut self) {
        let center = self
            .map_memory
            .detached()
            .map(|p| LatLon::new(p.y(), p.x()))
            .unwrap_or(self.region.center);
        let scale = 256.0 * 2f64.powf(self.map_memory.zoom());
        // Equirectangular approximation; plenty at the zoom levels where
        // search makes sense.
        let lon_span = (self.viewport.x.max(1.0) as f64 / scale) * 360.0;
        let lat_span = (self.viewport.y.max(1.0) as f64 / scale) * 180.0;
        self.region = Region::new(center, lat_span, lon_span);
    }
}

impl MapSurface for MapView {
    fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    fn add_annotations(&mut self, batch: Vec<Annotation>) {
        self.annotations.extend(batch);
    }

    fn remove_annotations(&mut self, ids: &[AnnotationId]) {
        self.annotations.retain(|a| !ids.contains(&a.id));
    }

    fn add_overlay(&mut self, path: Vec<LatLon>) {
        self.overlays.push(path);
    }

    fn set_visible_region(&mut self, region: Region) {
        self.region = region;
        self.pending = Some(region);
    }

    fn visible_region(&self) -> Region {
        self.region
    }

    fn set_render_mode(&mut self, mode: MapRenderMode) {
        self.mode = mode;
    }
}

fn marker_style(kind: &AnnotationKind) -> (egui::Color32, f32) {
    match kind {
        AnnotationKind::Capital { .. } => (egui::Color32::from_rgb(250, 205, 50), 8.0),
        AnnotationKind::SearchResult => (egui::Color32::from_rgb(220, 60, 60), 7.0),
        AnnotationKind::Placemark => (egui::Color32::from_rgb(220, 60, 60), 6.0),
        AnnotationKind::UserLocation => (egui::Color32::from_rgb(50, 130, 250), 7.0),
    }
}

/// Zoom that fits `region` into a viewport of `size` points, clamped to
/// sane slippy-map levels.
fn zoom_for(region: &Region, size: egui::Vec2) -> f64 {
    let w = size.x.max(1.0) as f64;
    let h = size.y.max(1.0) as f64;
    let zx = (w / 256.0 * 360.0 / region.lon_span.max(1e-6)).log2();
    let zy = (h / 256.0 * 180.0 / region.lat_span.max(1e-6)).log2();
    zx.min(zy).clamp(1.0, 19.0)
}

struct Marker {
    position: Position,
    color: egui::Color32,
    radius: f32,
    id: AnnotationId,
    label: String,
}

/// Draws annotation markers and turns nearby clicks into taps.
struct MarkersPlugin {
    markers: Vec<Marker>,
    tapped: Rc<RefCell<Option<AnnotationId>>>,
}

impl Plugin for MarkersPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter();
        let pointer = response.hover_pos();
        let click = if response.clicked() { response.interact_pointer_pos() } else { None };

        for marker in &self.markers {
            let screen_vec = projector.project(marker.position);
            let screen_pos = egui::pos2(screen_vec.x, screen_vec.y);

            painter.circle_filled(screen_pos, marker.radius, marker.color);
            painter.circle_stroke(
                screen_pos,
                marker.radius,
                egui::Stroke::new(1.5, egui::Color32::WHITE),
            );

            if pointer.is_some_and(|p| p.distance(screen_pos) <= TAP_RADIUS) {
                painter.text(
                    screen_pos - egui::vec2(0.0, marker.radius + 4.0),
                    egui::Align2::CENTER_BOTTOM,
                    &marker.label,
                    egui::FontId::proportional(13.0),
                    egui::Color32::WHITE,
                );
            }
            if click.is_some_and(|p| p.distance(screen_pos) <= TAP_RADIUS) {
                *self.tapped.borrow_mut() = Some(marker.id);
            }
        }
    }
}

/// Draws route polylines under the markers.
struct RoutesPlugin {
    paths: Vec<Vec<Position>>,
}

impl Plugin for RoutesPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter();
        for path in &self.paths {
            let points: Vec<egui::Pos2> = path
                .iter()
                .map(|pos| {
                    let v = projector.project(*pos);
                    egui::pos2(v.x, v.y)
                })
                .collect();
            if points.len() >= 2 {
                painter.add(egui::Shape::line(points, ROUTE_STROKE));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MapView {
        MapView::new(&TileConfig::default())
    }

    #[test]
    fn test_templates_default_and_override() {
        let custom = TileConfig {
            standard: Some("https://tiles.example/{z}/{x}/{y}.png".to_string()),
            hybrid: None,
            satellite: None,
        };
        let view = MapView::new(&custom);
        assert_eq!(view.templates[&MapRenderMode::Standard], "https://tiles.example/{z}/{x}/{y}.png");
        assert_eq!(view.templates[&MapRenderMode::Hybrid], DEFAULT_HYBRID_URL);
    }

    #[test]
    fn test_url_source_substitutes_placeholders() {
        let source = UrlSource {
            template: DEFAULT_STANDARD_URL.to_string(),
            attribution_text: "",
            attribution_url: "",
        };
        let url = source.tile_url(TileId { x: 4, y: 9, zoom: 5 });
        assert_eq!(url, "https://tile.openstreetmap.org/5/4/9.png");
    }

    #[test]
    fn test_surface_bookkeeping() {
        let mut view = view();
        let a = Annotation {
            id: AnnotationId(1),
            label: "a".into(),
            position: LatLon::new(1.0, 2.0),
            kind: AnnotationKind::SearchResult,
        };
        let b = Annotation { id: AnnotationId(2), ..a.clone() };
        view.add_annotation(a);
        view.add_annotations(vec![b]);
        assert_eq!(view.annotations.len(), 2);
        view.remove_annotations(&[AnnotationId(1)]);
        assert_eq!(view.annotations.len(), 1);
        assert_eq!(view.annotations[0].id, AnnotationId(2));
    }

    #[test]
    fn test_set_visible_region_is_applied_next_frame() {
        let mut view = view();
        view.pending = None;
        let region = Region::new(LatLon::new(48.0, 2.0), 1.0, 2.0);
        view.set_visible_region(region);
        assert_eq!(view.visible_region(), region);
        assert_eq!(view.pending, Some(region));
    }

    #[test]
    fn test_zoom_for_scales_with_span() {
        let size = egui::vec2(1280.0, 720.0);
        let wide = Region::new(LatLon::new(50.0, 10.0), 30.0, 50.0);
        let tight = Region::new(LatLon::new(50.0, 10.0), 0.05, 0.08);
        assert!(zoom_for(&tight, size) > zoom_for(&wide, size));
        assert!(zoom_for(&wide, size) >= 1.0);
        assert!(zoom_for(&tight, size) <= 19.0);
    }
}

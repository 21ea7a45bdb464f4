use eframe::egui;
use std::time::Duration;

use crate::annotations::{MapRenderMode, RouteRequest, TransportMode};
use crate::config::Config;
use crate::controller::MapScreen;
use crate::location::IpLocator;
use crate::position::LatLon;
use crate::routing::OsrmRouter;
use crate::search::NominatimSearch;
use crate::services::WebDetail;

use super::dialogs::{DialogAnswer, Dialogs};
use super::map_view::MapView;

pub const APP_TITLE: &str = "Capital Cities";

// The demo route goes between two fixed points: London and Paris.
const ROUTE_ORIGIN: LatLon = LatLon::new(51.507222, -0.1275);
const ROUTE_DESTINATION: LatLon = LatLon::new(48.8567, 2.3508);

fn demo_route() -> RouteRequest {
    RouteRequest {
        origin: ROUTE_ORIGIN,
        destination: ROUTE_DESTINATION,
        allow_alternates: true,
        transport_mode: TransportMode::Automobile,
    }
}

/// Capital callouts open the Wikipedia article in the system browser.
struct BrowserDetail {
    ctx: egui::Context,
}

impl WebDetail for BrowserDetail {
    fn open(&self, topic: &str) {
        let url = format!("https://en.wikipedia.org/wiki/{}", topic.replace(' ', "_"));
        log::info!("opening {url}");
        self.ctx.open_url(egui::OpenUrl::new_tab(url));
    }
}

pub struct GuiApp {
    screen: MapScreen<MapView, Dialogs>,
}

impl GuiApp {
    fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let user_agent = config.user_agent().to_string();
        let search = NominatimSearch::new(config.search_url(), &user_agent);
        let routing = OsrmRouter::new(config.route_url(), &user_agent);
        let location = IpLocator::new(config.location_url(), &user_agent, config.allow_location);
        let web: Option<Box<dyn WebDetail>> = if config.plain_callouts {
            None
        } else {
            Some(Box::new(BrowserDetail { ctx: cc.egui_ctx.clone() }))
        };

        let mut screen = MapScreen::new(
            MapView::new(&config.tiles),
            Dialogs::default(),
            Box::new(search),
            Box::new(routing),
            Box::new(location),
            web,
            config.start_mode(),
        );
        screen.initialize();
        GuiApp { screen }
    }
}

pub fn run(config: Config) -> Result<(), eframe::Error> {
    let width = config.gui.width.unwrap_or(1280) as f32;
    let height = config.gui.height.unwrap_or(720) as f32;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([width, height]),
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(GuiApp::new(cc, config)))),
    )
}

impl eframe::App for GuiApp {
    fn ui(&mut self, ui: &mut egui::Ui, _frame: &mut eframe::Frame) {
        let ctx = ui.ctx();
        self.screen.pump();

        if let Some(answer) = self.screen.dialogs_mut().show(ctx) {
            match answer {
                DialogAnswer::Choice(pick) => {
                    let mode = pick.and_then(|index| MapRenderMode::ALL.get(index).copied());
                    self.screen.render_mode_chosen(mode);
                }
                DialogAnswer::Text(Some(query)) => self.screen.search_place(&query),
                DialogAnswer::Text(None) | DialogAnswer::Dismissed => {}
            }
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(APP_TITLE);
                ui.separator();
                if ui.button("Search").clicked() {
                    self.screen.request_search();
                }
                if ui.button("Map type").clicked() {
                    self.screen.change_render_mode();
                }
                if ui.button("Route London → Paris").clicked() {
                    self.screen.draw_route(demo_route());
                }
                if ui.button("Where am I?").clicked() {
                    self.screen.locate();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(self.screen.render_mode().label());
                });
            });
        });

        egui::CentralPanel::default().frame(egui::Frame::NONE).show(ctx, |ui| {
            if let Some(id) = self.screen.surface_mut().render(ui) {
                self.screen.annotation_tapped(id);
            }
        });

        // Service completions arrive over channels; keep pumping while idle.
        ctx.request_repaint_after(Duration::from_millis(150));
    }
}

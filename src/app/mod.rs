use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use retrieval_lens::{LayoutSettings, Point, Snapshot, ViewConfig};
use tracing::{info, warn};

mod canvas;
mod render_utils;
mod ui;

type LoadResult = Result<Snapshot, String>;

pub struct LensApp {
    snapshot_path: PathBuf,
    settings: LayoutSettings,
    initial_view: ViewConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    snapshot: Snapshot,
    settings: LayoutSettings,
    view: ViewConfig,
    search: String,
    /// Key of the selected point; survives rebuilds when the entity does.
    selected: Option<String>,
    points: Vec<Point>,
    points_dirty: bool,
    points_revision: u64,
    canvas_size: Vec2,
    search_match_cache: Option<SearchMatchCache>,
}

struct SearchMatchCache {
    query: String,
    points_revision: u64,
    matches: Arc<HashSet<usize>>,
}

impl LensApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        snapshot_path: PathBuf,
        settings: LayoutSettings,
        initial_view: ViewConfig,
    ) -> Self {
        let state = Self::start_load(snapshot_path.clone());
        Self {
            snapshot_path,
            settings,
            initial_view,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(snapshot_path: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = Snapshot::load(&snapshot_path).map_err(|error| error.to_string());
            match &result {
                Ok(snapshot) => info!(
                    path = %snapshot_path.display(),
                    questions = snapshot.questions.len(),
                    records = snapshot.record_count(),
                    "snapshot loaded"
                ),
                Err(error) => warn!(path = %snapshot_path.display(), %error, "snapshot load failed"),
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(snapshot_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(snapshot_path),
        }
    }

    fn ready(snapshot: Snapshot, settings: LayoutSettings, view: ViewConfig) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(snapshot, settings, view)))
    }
}

impl eframe::App for LensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let settings = self.settings;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(snapshot) => Self::ready(snapshot, settings, self.initial_view),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading retrieval snapshot...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load retrieval snapshot");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.snapshot_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                let source = self.snapshot_path.display().to_string();
                model.show(ctx, &source, &mut reload_requested, is_reloading);
                let current_view = model.view;

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.snapshot_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(snapshot) => Self::ready(snapshot, settings, current_view),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

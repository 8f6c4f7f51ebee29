use client_core::{error::RETRY_MESSAGE, SelectedFile, Settings};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{domain::CategoryPalette, protocol::decode_jpeg_data_uri};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::upload::{CycleOutcome, UploadController, UploadPhase};
use crate::ui::page::{Document, NodeId, Tag};
use crate::ui::theme;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];
const RESULT_IMAGE_MAX_WIDTH: f32 = 360.0;

fn err_label(err: &UiError) -> &'static str {
    match (err.context(), err.category()) {
        (UiErrorContext::BackendStartup, _) => "Worker",
        (_, UiErrorCategory::Validation) => "Validation",
        (_, UiErrorCategory::Backend) => "Classifier",
        (_, UiErrorCategory::Transport) => "Connection",
        (_, UiErrorCategory::Unknown) => "Unexpected",
    }
}

/// What the user did to the page during one frame. Applied after rendering.
#[derive(Default)]
struct FrameActions {
    clicks: Vec<NodeId>,
    hovered_card: Option<NodeId>,
}

/// The result image texture, keyed by element and source revision. Only the latest result
/// image is ever on screen. A `None` texture records a payload that failed to decode.
#[derive(Default)]
struct TextureCache {
    key: Option<(NodeId, u64)>,
    texture: Option<egui::TextureHandle>,
}

impl TextureCache {
    fn get_or_load(
        &mut self,
        ctx: &egui::Context,
        node: NodeId,
        revision: u64,
        src: &str,
    ) -> Option<egui::TextureHandle> {
        if self.key != Some((node, revision)) {
            self.texture = decode_texture(ctx, src);
            self.key = Some((node, revision));
        }
        self.texture.clone()
    }
}

fn decode_texture(ctx: &egui::Context, src: &str) -> Option<egui::TextureHandle> {
    let bytes = match decode_jpeg_data_uri(src) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!("result image payload rejected: {err}");
            return None;
        }
    };
    let decoded = match image::load_from_memory(&bytes) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::warn!("result image could not be decoded: {err}");
            return None;
        }
    };

    let rgba = decoded.to_rgba8();
    let [w, h] = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied([w, h], rgba.as_raw());
    Some(ctx.load_texture("result-image", color_image, egui::TextureOptions::LINEAR))
}

struct PageRenderer<'a> {
    doc: &'a Document,
    textures: &'a mut TextureCache,
    scroll_target: Option<NodeId>,
    actions: FrameActions,
}

impl PageRenderer<'_> {
    fn render(&mut self, ui: &mut egui::Ui, node: NodeId) {
        let doc = self.doc;
        let Some(el) = doc.element(node) else {
            return;
        };
        if !el.is_visible() {
            return;
        }

        let response = match el.tag {
            Tag::Root => {
                self.render_children(ui, node);
                None
            }
            Tag::Nav => Some(
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("EcoSort").strong().size(20.0).color(theme::ACCENT));
                    ui.add_space(24.0);
                    self.render_children(ui, node);
                })
                .response,
            ),
            Tag::Anchor => {
                let response = ui.link(el.text.as_str());
                if response.clicked() {
                    self.actions.clicks.push(node);
                }
                Some(response)
            }
            Tag::Section if el.id.as_deref() == Some("upload-area") => {
                Some(self.render_upload_area(ui, node))
            }
            Tag::Section => Some(
                egui::Frame::new()
                    .inner_margin(egui::Margin::symmetric(16, 12))
                    .show(ui, |ui| {
                        ui.vertical(|ui| self.render_children(ui, node));
                    })
                    .response,
            ),
            Tag::Heading => Some(ui.heading(el.text.as_str())),
            Tag::Paragraph => Some(ui.label(el.text.as_str())),
            Tag::Button => {
                let response = ui.button(egui::RichText::new(&el.text).strong());
                if response.clicked() {
                    self.actions.clicks.push(node);
                }
                Some(response)
            }
            Tag::FileInput => None,
            Tag::Spinner => Some(
                ui.horizontal(|ui| {
                    ui.add(egui::Spinner::new());
                    ui.label(egui::RichText::new(&el.text).color(theme::MUTED_TEXT));
                })
                .response,
            ),
            Tag::Badge => {
                let fill = el
                    .background
                    .map(theme::to_color32)
                    .unwrap_or_else(|| theme::to_color32(CategoryPalette::DEFAULT_COLOR));
                Some(
                    egui::Frame::new()
                        .fill(fill)
                        .corner_radius(12)
                        .inner_margin(egui::Margin::symmetric(12, 4))
                        .show(ui, |ui| {
                            ui.label(
                                egui::RichText::new(&el.text)
                                    .strong()
                                    .color(theme::CARD_TEXT),
                            );
                        })
                        .response,
                )
            }
            Tag::Image => el.src.as_deref().map(|src| {
                match self.textures.get_or_load(ui.ctx(), node, el.src_revision(), src) {
                    Some(texture) => {
                        ui.add(egui::Image::new(&texture).max_width(RESULT_IMAGE_MAX_WIDTH))
                    }
                    None => ui.label(egui::RichText::new("Preview unavailable").italics()),
                }
            }),
            Tag::List => Some(
                ui.vertical(|ui| self.render_children(ui, node)).response,
            ),
            Tag::ListItem => Some(ui.label(el.text.as_str())),
            Tag::Card => Some(self.render_card(ui, node)),
        };

        if self.scroll_target == Some(node) {
            if let Some(response) = &response {
                response.scroll_to_me(Some(egui::Align::TOP));
                self.scroll_target = None;
            }
        }
    }

    fn render_children(&mut self, ui: &mut egui::Ui, node: NodeId) {
        let doc = self.doc;
        let Some(el) = doc.element(node) else {
            return;
        };
        for child in el.children() {
            self.render(ui, *child);
        }
    }

    fn render_upload_area(&mut self, ui: &mut egui::Ui, node: NodeId) -> egui::Response {
        let clicks_before = self.actions.clicks.len();
        let response = ui
            .scope_builder(
                egui::UiBuilder::new()
                    .id_salt(("upload-area", node))
                    .sense(egui::Sense::click()),
                |ui| {
                    egui::Frame::new()
                        .stroke(egui::Stroke::new(2.0, theme::ACCENT))
                        .corner_radius(10)
                        .inner_margin(egui::Margin::same(24))
                        .show(ui, |ui| {
                            ui.set_min_width(ui.available_width());
                            ui.vertical_centered(|ui| self.render_children(ui, node));
                        });
                },
            )
            .response;

        // A child widget that took the click already queued its own node.
        if response.clicked() && self.actions.clicks.len() == clicks_before {
            self.actions.clicks.push(node);
        }
        response.on_hover_cursor(egui::CursorIcon::PointingHand)
    }

    fn render_card(&mut self, ui: &mut egui::Ui, node: NodeId) -> egui::Response {
        let doc = self.doc;
        let Some(el) = doc.element(node) else {
            return ui.label("");
        };
        let fill = el
            .background
            .map(theme::to_color32)
            .unwrap_or_else(|| theme::to_color32(CategoryPalette::DEFAULT_COLOR));

        // Cards rest 10px down so a -10px lift stays inside the row.
        ui.vertical(|ui| {
            ui.add_space((10.0 + el.translate_y).max(0.0));
            let response = egui::Frame::new()
                .fill(fill)
                .corner_radius(8)
                .inner_margin(egui::Margin::same(14))
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(&el.text).strong().color(theme::CARD_TEXT));
                })
                .response;
            if response.hovered() {
                self.actions.hovered_card = Some(node);
            }
            ui.add_space((-el.translate_y).max(0.0));
            response
        })
        .inner
    }
}

pub struct EcoSortApp {
    doc: Document,
    controller: UploadController,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    status: String,
    status_banner: Option<UiError>,
    hovered_card: Option<NodeId>,
    pending_scroll: Option<NodeId>,
    textures: TextureCache,
    theme_applied: bool,
}

impl EcoSortApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>, settings: &Settings) -> Self {
        let doc = Document::index_page();
        let controller =
            UploadController::bind_with(&doc, CategoryPalette::default(), settings.max_upload_bytes);
        Self {
            doc,
            controller,
            cmd_tx,
            ui_rx,
            status: format!("Classifier at {}", settings.server_url),
            status_banner: None,
            hovered_card: None,
            pending_scroll: None,
            textures: TextureCache::default(),
            theme_applied: false,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => {
                    self.status = err.message().to_string();
                    self.status_banner = Some(err);
                }
                UiEvent::ClassificationFinished { cycle, outcome } => {
                    match self.controller.on_response(&mut self.doc, cycle, outcome) {
                        CycleOutcome::ResultsShown => {
                            self.status = "Classification complete".to_string();
                            self.status_banner = None;
                        }
                        CycleOutcome::ErrorShown(err) => {
                            self.status_banner = Some(UiError::from_upload_error(&err));
                        }
                    }
                }
            }
        }
    }

    fn handle_selection(&mut self, files: Vec<SelectedFile>) {
        let Some(job) = self.controller.on_file_selected(&mut self.doc, files) else {
            return;
        };
        let cycle = job.cycle;
        self.status = format!("Uploading {}...", job.file.file_name);

        if dispatch_backend_command(&self.cmd_tx, job.into(), &mut self.status).is_err() {
            let reason = self.status.clone();
            if let CycleOutcome::ErrorShown(err) =
                self.controller.on_dispatch_failed(&mut self.doc, cycle, reason)
            {
                self.status_banner = Some(UiError::from_upload_error(&err));
            }
        }
    }

    fn open_pending_picker(&mut self) {
        if self.doc.take_picker_requests() == 0 {
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        match SelectedFile::from_path(&path) {
            Ok(file) => self.handle_selection(vec![file]),
            Err(err) => {
                tracing::error!("failed to inspect '{}': {err}", path.display());
                self.status_banner = Some(UiError::from_message(
                    UiErrorContext::General,
                    format!("could not open {}: {err}", path.display()),
                ));
                self.doc.alert(RETRY_MESSAGE);
            }
        }
    }

    fn collect_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(first) = dropped.into_iter().next() else {
            return;
        };

        let file = if let Some(path) = first.path.as_ref() {
            SelectedFile::from_path(path).map_err(|err| (path.display().to_string(), err))
        } else if let Some(bytes) = first.bytes.as_ref() {
            Ok(SelectedFile::from_bytes(first.name.clone(), bytes.to_vec()))
        } else {
            return;
        };

        match file {
            Ok(file) => self.handle_selection(vec![file]),
            Err((path, err)) => {
                tracing::error!("failed to inspect dropped file '{path}': {err}");
                self.status_banner = Some(UiError::from_message(
                    UiErrorContext::General,
                    format!("could not open {path}: {err}"),
                ));
                self.doc.alert(RETRY_MESSAGE);
            }
        }
    }

    fn apply_actions(&mut self, actions: FrameActions) {
        for node in actions.clicks {
            if self.controller.on_click(&mut self.doc, node).picker_opens > 0 {
                self.status = "Choose an image to classify".to_string();
            }
        }

        if actions.hovered_card != self.hovered_card {
            if let Some(previous) = self.hovered_card.take() {
                self.controller.on_pointer_leave(&mut self.doc, previous);
            }
            if let Some(current) = actions.hovered_card {
                self.controller.on_pointer_enter(&mut self.doc, current);
            }
            self.hovered_card = actions.hovered_card;
        }

        if let Some(request) = self.doc.take_scroll_request() {
            self.pending_scroll = Some(request.target);
        }
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(banner) = &self.status_banner {
                    egui::Frame::new()
                        .fill(theme::ERROR_FILL)
                        .corner_radius(4)
                        .inner_margin(egui::Margin::symmetric(6, 2))
                        .show(ui, |ui| {
                            ui.label(format!("{}: {}", err_label(banner), banner.message()));
                        });
                } else {
                    ui.label(egui::RichText::new(&self.status).color(theme::MUTED_TEXT));
                }
            });
        });
    }

    /// Returns true while an alert is blocking the page.
    fn show_alert(&mut self, ctx: &egui::Context) -> bool {
        let Some(message) = self.doc.front_alert().map(str::to_string) else {
            return false;
        };

        let mut dismissed = false;
        egui::Window::new("EcoSort")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            self.doc.dismiss_alert();
        }
        true
    }
}

impl eframe::App for EcoSortApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            theme::apply(ctx);
            self.theme_applied = true;
        }

        self.process_ui_events();

        let blocked = self.show_alert(ctx);
        if !blocked {
            self.collect_dropped_files(ctx);
        }

        self.show_status_bar(ctx);

        let root = self.doc.root();
        let mut renderer = PageRenderer {
            doc: &self.doc,
            textures: &mut self.textures,
            scroll_target: self.pending_scroll,
            actions: FrameActions::default(),
        };
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_enabled_ui(!blocked, |ui| renderer.render(ui, root));
            });
        });
        let scroll_done = renderer.scroll_target.is_none();
        let actions = renderer.actions;

        if scroll_done {
            self.pending_scroll = None;
        }
        if !blocked {
            self.apply_actions(actions);
            self.open_pending_picker();
        }

        if self.controller.phase() == UploadPhase::AwaitingResponse {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

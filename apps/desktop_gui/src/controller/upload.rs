//! Upload-and-classify controller.
//!
//! Binds to the page once, turns clicks and file selections into classify jobs, and renders
//! each job's outcome. Cycles are independent: nothing is cancelled or serialized, so when two
//! uploads overlap the response applied last owns the results panel.

use std::collections::BTreeSet;

use client_core::{check_upload_size, SelectedFile, UploadError, MAX_UPLOAD_BYTES};
use shared::{domain::CategoryPalette, protocol::ClassificationResult};
use tracing::{debug, error, info, warn};

use crate::ui::page::{Display, Document, Element, NodeId, Tag};

pub const CHECK_GLYPH: char = '\u{2714}';
pub const CARD_LIFT_PX: f32 = -10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleId(pub u64);

#[derive(Debug, Clone)]
pub struct ClassifyJob {
    pub cycle: CycleId,
    pub file: SelectedFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    ResultsShown,
    ErrorShown(UploadError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    /// Picker requests queued by this click. The upload button stops propagation, so at most one.
    pub picker_opens: u32,
}

/// Element handles resolved once at bind time. `None` means the element is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bindings {
    pub upload_area: Option<NodeId>,
    pub file_input: Option<NodeId>,
    pub upload_btn: Option<NodeId>,
    pub loading: Option<NodeId>,
    pub results_section: Option<NodeId>,
    pub category_badge: Option<NodeId>,
    pub confidence: Option<NodeId>,
    pub result_image: Option<NodeId>,
    pub recycling_description: Option<NodeId>,
    pub recycling_tips: Option<NodeId>,
}

impl Bindings {
    pub fn resolve(doc: &Document) -> Self {
        Self {
            upload_area: doc.get_element_by_id("upload-area"),
            file_input: doc.get_element_by_id("file-input"),
            upload_btn: doc.get_element_by_id("upload-btn"),
            loading: doc.get_element_by_id("loading"),
            results_section: doc.get_element_by_id("results-section"),
            category_badge: doc.get_element_by_id("category-badge"),
            confidence: doc.get_element_by_id("confidence"),
            result_image: doc.get_element_by_id("result-image"),
            recycling_description: doc.get_element_by_id("recycling-description"),
            recycling_tips: doc.get_element_by_id("recycling-tips"),
        }
    }
}

pub struct UploadController {
    bindings: Bindings,
    cards: Vec<NodeId>,
    anchors: Vec<NodeId>,
    palette: CategoryPalette,
    max_upload_bytes: u64,
    next_cycle: u64,
    in_flight: BTreeSet<CycleId>,
}

impl UploadController {
    pub fn bind(doc: &Document) -> Self {
        Self::bind_with(doc, CategoryPalette::default(), MAX_UPLOAD_BYTES)
    }

    pub fn bind_with(doc: &Document, palette: CategoryPalette, max_upload_bytes: u64) -> Self {
        let bindings = Bindings::resolve(doc);
        let cards = doc.query_class("category-card");
        let anchors = doc.hash_anchors();
        debug!(
            cards = cards.len(),
            anchors = anchors.len(),
            has_file_input = bindings.file_input.is_some(),
            "upload controller bound"
        );

        Self {
            bindings,
            cards,
            anchors,
            palette,
            max_upload_bytes,
            next_cycle: 0,
            in_flight: BTreeSet::new(),
        }
    }

    pub fn phase(&self) -> UploadPhase {
        if self.in_flight.is_empty() {
            UploadPhase::Idle
        } else {
            UploadPhase::AwaitingResponse
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_card(&self, node: NodeId) -> bool {
        self.cards.contains(&node)
    }

    /// Runs click handlers from `target` outwards until one stops propagation.
    pub fn on_click(&mut self, doc: &mut Document, target: NodeId) -> ClickOutcome {
        let mut outcome = ClickOutcome::default();

        for node in doc.propagation_path(target) {
            let mut propagation_stopped = false;
            if Some(node) == self.bindings.upload_btn {
                propagation_stopped = true;
                self.open_file_picker(doc, &mut outcome);
            } else if Some(node) == self.bindings.upload_area {
                self.open_file_picker(doc, &mut outcome);
            }

            // Hash anchors never navigate; they only scroll to an existing target.
            if self.anchors.contains(&node) {
                let dest = doc
                    .element(node)
                    .and_then(|el| el.href.as_deref())
                    .and_then(|href| doc.query_selector_href(href));
                if let Some(dest) = dest {
                    doc.scroll_into_view(dest);
                }
            }

            if propagation_stopped {
                break;
            }
        }

        outcome
    }

    fn open_file_picker(&self, doc: &mut Document, outcome: &mut ClickOutcome) {
        if self.bindings.file_input.is_some() {
            doc.request_file_picker();
            outcome.picker_opens += 1;
        } else {
            debug!("file input missing; picker not opened");
        }
    }

    /// Validates the first selected file and starts a cycle. Returns the job to dispatch.
    pub fn on_file_selected(
        &mut self,
        doc: &mut Document,
        files: Vec<SelectedFile>,
    ) -> Option<ClassifyJob> {
        let file = files.into_iter().next()?;

        if let Err(err) = check_upload_size(file.size_bytes, self.max_upload_bytes) {
            warn!(file = %file.file_name, size_bytes = file.size_bytes, "rejected oversized upload");
            doc.alert(err.user_message());
            return None;
        }

        if let Some(loading) = self.bindings.loading {
            doc.set_display(loading, Display::Block);
        }
        if let Some(results) = self.bindings.results_section {
            doc.set_display(results, Display::None);
        }

        self.next_cycle += 1;
        let cycle = CycleId(self.next_cycle);
        self.in_flight.insert(cycle);
        info!(cycle = cycle.0, file = %file.file_name, "classification cycle started");

        Some(ClassifyJob { cycle, file })
    }

    pub fn on_response(
        &mut self,
        doc: &mut Document,
        cycle: CycleId,
        outcome: Result<ClassificationResult, UploadError>,
    ) -> CycleOutcome {
        self.in_flight.remove(&cycle);

        if let Some(loading) = self.bindings.loading {
            doc.set_display(loading, Display::None);
        }

        match outcome {
            Ok(result) => {
                self.render_result(doc, &result);
                info!(cycle = cycle.0, category = %result.category, "classification shown");
                CycleOutcome::ResultsShown
            }
            Err(err) => {
                if err.is_transport() {
                    error!(cycle = cycle.0, error = %err, "classification request failed");
                } else {
                    warn!(cycle = cycle.0, error = %err, "classification rejected");
                }
                doc.alert(err.user_message());
                CycleOutcome::ErrorShown(err)
            }
        }
    }

    /// Closes a cycle whose job never reached the worker.
    pub fn on_dispatch_failed(
        &mut self,
        doc: &mut Document,
        cycle: CycleId,
        reason: String,
    ) -> CycleOutcome {
        warn!(cycle = cycle.0, %reason, "classify job was not dispatched");
        self.on_response(doc, cycle, Err(UploadError::TransportOrParse(reason)))
    }

    fn render_result(&self, doc: &mut Document, result: &ClassificationResult) {
        let b = self.bindings;

        if let Some(badge) = b.category_badge {
            doc.set_text(badge, result.category.clone());
            doc.set_background(badge, self.palette.color_for(&result.category));
        }
        if let Some(confidence) = b.confidence {
            doc.set_text(confidence, result.confidence_text());
        }
        if let Some(image) = b.result_image {
            doc.set_src(image, result.image_data_uri());
        }
        if let Some(description) = b.recycling_description {
            doc.set_text(description, result.recycling_info.description.clone());
        }
        if let Some(tips) = b.recycling_tips {
            doc.clear_children(tips);
            for tip in &result.recycling_info.tips {
                doc.append_child(
                    tips,
                    Element::new(Tag::ListItem).with_text(format!("{CHECK_GLYPH} {tip}")),
                );
            }
        }

        if let Some(results) = b.results_section {
            doc.set_display(results, Display::Block);
            doc.scroll_into_view(results);
        }
    }

    pub fn on_pointer_enter(&self, doc: &mut Document, node: NodeId) {
        if self.is_card(node) {
            doc.set_translate_y(node, CARD_LIFT_PX);
        }
    }

    pub fn on_pointer_leave(&self, doc: &mut Document, node: NodeId) {
        if self.is_card(node) {
            doc.set_translate_y(node, 0.0);
        }
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;

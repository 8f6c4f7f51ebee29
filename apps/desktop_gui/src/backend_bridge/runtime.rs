//! Runtime bridge between the UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{Classifier, HttpClassifier, Settings};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Wakes the UI thread after an event has been queued.
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

pub fn launch(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    settings: &Settings,
    repaint: RepaintHook,
) -> thread::JoinHandle<()> {
    let classifier: Arc<dyn Classifier> = Arc::new(HttpClassifier::from_settings(settings));
    spawn_worker(classifier, cmd_rx, ui_tx, repaint)
}

pub fn spawn_worker(
    classifier: Arc<dyn Classifier>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    repaint: RepaintHook,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                repaint();
                return;
            }
        };

        let _ = ui_tx.try_send(UiEvent::Info("Ready to classify".to_string()));
        repaint();

        runtime.block_on(async move {
            let mut tasks = Vec::new();
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Classify { cycle, file } => {
                        let classifier = classifier.clone();
                        let ui_tx = ui_tx.clone();
                        let repaint = repaint.clone();
                        // One task per upload: overlapping cycles run side by side.
                        tasks.push(tokio::spawn(async move {
                            let outcome = classifier.classify(&file).await;
                            if ui_tx
                                .send(UiEvent::ClassificationFinished { cycle, outcome })
                                .is_err()
                            {
                                tracing::warn!(cycle = cycle.0, "ui closed before result delivery");
                            }
                            repaint();
                        }));
                        tasks.retain(|task| !task.is_finished());
                    }
                }
            }

            for task in tasks {
                let _ = task.await;
            }
            tracing::debug!("backend worker command queue closed");
        });
    })
}

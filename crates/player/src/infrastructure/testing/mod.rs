//! Test doubles for the outbound ports.
//!
//! Mocks (`MockSceneRenderer`, `MockStatusSink`) suit single-call
//! expectations. The recorders here suit scenario tests that inspect the
//! whole sequence of display calls after the fact.

pub mod fixtures;

use std::sync::{Arc, Mutex};

use pixeltales_domain::SceneSnapshot;

use crate::ports::outbound::{SceneRenderer, StatusIndicator, StatusSink};
use crate::state::{EffectFrame, HistoricalView, NavigationDirection};

/// One call made on a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Snapshot(SceneSnapshot),
    Effects(EffectFrame),
    Historical(HistoricalView),
    InvalidNavigation(NavigationDirection),
}

/// Renderer that records every call. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<RenderCall>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    pub fn snapshots(&self) -> Vec<SceneSnapshot> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RenderCall::Snapshot(snapshot) => Some(snapshot),
                _ => None,
            })
            .collect()
    }

    pub fn last_effects(&self) -> Option<EffectFrame> {
        self.calls().into_iter().rev().find_map(|call| match call {
            RenderCall::Effects(frame) => Some(frame),
            _ => None,
        })
    }

    pub fn historical(&self) -> Vec<HistoricalView> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RenderCall::Historical(view) => Some(view),
                _ => None,
            })
            .collect()
    }

    pub fn invalid_navigations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RenderCall::InvalidNavigation(_)))
            .count()
    }

    fn record(&self, call: RenderCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl SceneRenderer for RecordingRenderer {
    fn on_snapshot_for_display(&mut self, snapshot: &SceneSnapshot) {
        self.record(RenderCall::Snapshot(snapshot.clone()));
    }

    fn on_effects_for_display(&mut self, frame: &EffectFrame) {
        self.record(RenderCall::Effects(frame.clone()));
    }

    fn on_historical_message_for_display(&mut self, view: &HistoricalView) {
        self.record(RenderCall::Historical(view.clone()));
    }

    fn on_invalid_navigation(&mut self, direction: NavigationDirection) {
        self.record(RenderCall::InvalidNavigation(direction));
    }
}

/// Status sink that records every indicator shown. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingStatusSink {
    shown: Arc<Mutex<Vec<StatusIndicator>>>,
}

impl RecordingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<StatusIndicator> {
        self.shown.lock().map(|shown| shown.clone()).unwrap_or_default()
    }
}

impl StatusSink for RecordingStatusSink {
    fn show_status(&mut self, indicator: StatusIndicator) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(indicator);
        }
    }
}

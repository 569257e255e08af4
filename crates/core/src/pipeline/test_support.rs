//! Stubs shared by the pipeline tests.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::detection::domain::detected_face::{BoundingBox, DetectedFace};
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::domain::face_descriptor::FaceDescriptor;
use crate::imaging::domain::image_decoder::ImageDecoder;
use crate::pipeline::errors::ItemError;
use crate::pipeline::progress_reporter::ProgressReporter;
use crate::pipeline::run_summary::RunSummary;
use crate::shared::capability::CapabilityError;
use crate::shared::decoded_image::DecodedImage;
use crate::sorting::domain::directory_lister::DirectoryLister;
use crate::sorting::domain::dispatch_pair::DispatchPair;
use crate::sorting::domain::file_action::{ActionOutcome, FileAction};

/// Fake image set: each known file name decodes to an image whose width
/// identifies it, and the analyzer answers with the faces registered for it.
#[derive(Default)]
pub struct StubImages {
    names: Vec<String>,
    faces: Vec<Vec<Vec<f32>>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
}

impl StubImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faces(mut self, name: &str, faces: Vec<Vec<f32>>) -> Self {
        self.names.push(name.to_string());
        self.faces.push(faces);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn slow(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn build(self) -> (Arc<dyn ImageDecoder>, Arc<dyn FaceAnalyzer>) {
        let images = Arc::new(self);
        (
            Arc::new(StubDecoder(images.clone())),
            Arc::new(StubAnalyzer(images)),
        )
    }
}

struct StubDecoder(Arc<StubImages>);

impl ImageDecoder for StubDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage, CapabilityError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if let Some(delay) = self.0.delays.get(name) {
            thread::sleep(*delay);
        }
        if self.0.failing.contains(name) {
            return Err(format!("cannot decode {name}").into());
        }
        let id = self
            .0
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| format!("unknown image {name}"))?
            + 1;
        Ok(DecodedImage::new(vec![0; id * 3], id as u32, 1))
    }
}

struct StubAnalyzer(Arc<StubImages>);

impl FaceAnalyzer for StubAnalyzer {
    fn detect_and_describe(
        &self,
        image: &DecodedImage,
    ) -> Result<Vec<DetectedFace>, CapabilityError> {
        let faces = &self.0.faces[image.width() as usize - 1];
        Ok(faces
            .iter()
            .map(|values| DetectedFace {
                descriptor: FaceDescriptor::new(values.clone()),
                bbox: BoundingBox {
                    x1: 0.0,
                    y1: 0.0,
                    x2: 1.0,
                    y2: 1.0,
                    score: 0.9,
                },
            })
            .collect())
    }
}

/// File action that records every pair it is given.
#[derive(Default)]
pub struct RecordingAction {
    pub pairs: Mutex<Vec<DispatchPair>>,
    pub failing: HashSet<String>,
}

impl RecordingAction {
    pub fn failing_on(name: &str) -> Self {
        Self {
            failing: HashSet::from([name.to_string()]),
            ..Default::default()
        }
    }

    pub fn pairs(&self) -> Vec<DispatchPair> {
        self.pairs.lock().unwrap().clone()
    }

    pub fn performed(&self) -> Vec<DispatchPair> {
        self.pairs()
            .into_iter()
            .filter(|p| p.destination.is_some())
            .collect()
    }
}

impl FileAction for RecordingAction {
    fn execute(&self, pair: &DispatchPair) -> io::Result<ActionOutcome> {
        self.pairs.lock().unwrap().push(pair.clone());
        if pair.destination.is_none() {
            return Ok(ActionOutcome::Skipped);
        }
        let name = pair
            .source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if self.failing.contains(name) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        Ok(ActionOutcome::Performed)
    }
}

/// Lister returning a fixed listing, or an error when `None`.
pub struct FixedLister(pub Option<Vec<String>>);

impl DirectoryLister for FixedLister {
    fn list(&self, _dir: &Path) -> io::Result<Vec<String>> {
        self.0
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Processed(String),
    Failed(String),
    Info(String),
    Done,
    Summary(usize),
}

/// Reporter that records every call.
#[derive(Default)]
pub struct RecordingReporter {
    pub events: Vec<Event>,
    pub summaries: Mutex<Vec<usize>>,
}

impl RecordingReporter {
    pub fn processed(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Processed(item) => Some(item.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn failed(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Failed(item) => Some(item.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn done_count(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Done).count()
    }
}

impl ProgressReporter for RecordingReporter {
    fn item_processed(&mut self, item: &str, _elapsed: Duration) {
        self.events.push(Event::Processed(item.to_string()));
    }

    fn item_failed(&mut self, error: &ItemError) {
        self.events.push(Event::Failed(error.item().to_string()));
    }

    fn info(&mut self, message: &str) {
        self.events.push(Event::Info(message.to_string()));
    }

    fn done(&mut self) {
        self.events.push(Event::Done);
    }

    fn summary(&self, summary: &RunSummary) {
        self.summaries.lock().unwrap().push(summary.total());
    }
}

use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use facesort_core::detection::infrastructure::onnx_face_analyzer::{
    ModelLoadOptions, OnnxFaceAnalyzer,
};
use facesort_core::imaging::infrastructure::image_file_decoder::ImageFileDecoder;
use facesort_core::pipeline::classification_stage::ClassificationStage;
use facesort_core::pipeline::errors::SortError;
use facesort_core::pipeline::infrastructure::threaded_window_scheduler::ThreadedWindowScheduler;
use facesort_core::pipeline::pipeline_config::{ItemFailurePolicy, PipelineConfig};
use facesort_core::pipeline::progress_reporter::LogProgressReporter;
use facesort_core::pipeline::sort_faces_use_case::SortFacesUseCase;
use facesort_core::pipeline::sorter_settings::SorterSettings;
use facesort_core::shared::model_resolver::ProgressFn;
use facesort_core::sorting::domain::file_action::ActionMode;
use facesort_core::sorting::infrastructure::fs_directory_lister::FsDirectoryLister;
use facesort_core::sorting::infrastructure::fs_file_action::FsFileAction;

/// Sort images into match / no-match folders by comparing their faces with
/// a reference image.
#[derive(Parser, Debug)]
#[command(name = "facesort")]
struct Cli {
    /// Reference image containing the face to look for [default: ./reference.jpg].
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Directory of images to sort [default: ./input].
    #[arg(long)]
    input: Option<PathBuf>,

    /// Destination for images whose face matches [default: ./output/match].
    #[arg(long)]
    match_dir: Option<PathBuf>,

    /// Destination for everything else [default: ./output/no_match].
    #[arg(long)]
    no_match_dir: Option<PathBuf>,

    /// Directory holding the ONNX models [default: ./weights].
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Maximum number of images classified at once [default: 1].
    #[arg(long)]
    concurrency: Option<usize>,

    /// Cosine distance below which a face matches [default: 0.5].
    #[arg(long)]
    threshold: Option<f64>,

    /// Per-image classification deadline in seconds, 0 to disable [default: 120].
    #[arg(long)]
    item_timeout_secs: Option<u64>,

    /// What to do with images that fail to classify: skip or no-match [default: skip].
    #[arg(long)]
    on_error: Option<ItemFailurePolicy>,

    /// How images reach their folder: copy or move [default: copy].
    #[arg(long)]
    mode: Option<ActionMode>,

    /// Treat an unreadable input directory as empty instead of failing.
    #[arg(long)]
    allow_unreadable_input: bool,

    /// Download missing models into the weights directory.
    #[arg(long)]
    download_models: bool,

    /// Face detection confidence threshold (0.0-1.0) [default: 0.5].
    #[arg(long)]
    detector_confidence: Option<f64>,

    /// Only sort files with these extensions (comma-separated).
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// JSON settings file; flags on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn to_settings(&self) -> SorterSettings {
        SorterSettings {
            reference: self.reference.clone(),
            input_dir: self.input.clone(),
            match_dir: self.match_dir.clone(),
            no_match_dir: self.no_match_dir.clone(),
            weights_dir: self.weights.clone(),
            concurrency: self.concurrency,
            threshold: self.threshold,
            item_timeout_secs: self.item_timeout_secs,
            on_error: self.on_error,
            mode: self.mode,
            allow_unreadable_input: self.allow_unreadable_input.then_some(true),
            extensions: self.extensions.clone(),
            detector_confidence: self.detector_confidence,
            download_models: self.download_models.then_some(true),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    let config = settings.pipeline_config().map_err(SortError::from)?;
    validate(&settings)?;
    prepare_output_dirs(&config)?;

    let options = ModelLoadOptions {
        detector_confidence: settings.detector_confidence(),
        download: settings
            .download_models()
            .then_some(download_progress as fn(&str) -> ProgressFn),
    };
    let analyzer =
        OnnxFaceAnalyzer::load(&settings.weights_dir(), &options).map_err(SortError::from)?;

    let lister = match &config.extensions {
        Some(extensions) => FsDirectoryLister::with_extensions(extensions),
        None => FsDirectoryLister::images(),
    };
    let scheduler = ThreadedWindowScheduler::new(config.concurrency, config.item_timeout);
    let action = FsFileAction::new(config.action_mode);

    let use_case = SortFacesUseCase::new(
        config,
        ClassificationStage::new(Arc::new(ImageFileDecoder::new()), Arc::new(analyzer)),
        Box::new(lister),
        Arc::new(action),
        Box::new(scheduler),
    )?;

    let mut reporter = LogProgressReporter::new();
    let summary = use_case.execute(&settings.reference(), &mut reporter)?;

    let failed = summary.failures.len();
    if failed > 0 {
        log::warn!("{failed} image(s) could not be sorted; see warnings above");
    }
    log_timeout_hint(summary.timeouts(), use_case.config().item_timeout);
    Ok(())
}

fn load_settings(cli: &Cli) -> Result<SorterSettings, SortError> {
    let base = match &cli.config {
        Some(path) => SorterSettings::load(path)?,
        None => SorterSettings::default(),
    };
    Ok(base.overlay(cli.to_settings()))
}

fn validate(settings: &SorterSettings) -> Result<(), Box<dyn std::error::Error>> {
    let confidence = settings.detector_confidence();
    if !(0.0..=1.0).contains(&confidence) {
        return Err(format!(
            "Detector confidence must be between 0.0 and 1.0, got {confidence}"
        )
        .into());
    }
    let reference = settings.reference();
    if !reference.is_file() {
        return Err(format!("Reference image not found: {}", reference.display()).into());
    }
    Ok(())
}

fn prepare_output_dirs(config: &PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    for dir in [&config.directories.matched, &config.directories.unmatched] {
        fs::create_dir_all(dir)
            .map_err(|e| format!("Cannot create output directory {}: {e}", dir.display()))?;
    }
    Ok(())
}

fn log_timeout_hint(timeouts: usize, limit: Option<Duration>) {
    if let (true, Some(limit)) = (timeouts > 0, limit) {
        log::warn!(
            "{timeouts} image(s) exceeded the {}s limit; raise --item-timeout-secs for very large images",
            limit.as_secs()
        );
    }
}

fn download_progress(name: &str) -> ProgressFn {
    let name = name.to_string();
    Box::new(move |downloaded, total| {
        if total > 0 {
            let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
            eprint!("\rDownloading {name}... {pct}%");
        } else {
            eprint!("\rDownloading {name}... {downloaded} bytes");
        }
        if total > 0 && downloaded >= total {
            eprintln!();
        }
    })
}

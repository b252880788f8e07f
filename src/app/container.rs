use std::sync::Arc;

use crate::adapters::{FfmpegSilenceDetector, FfprobeAdapter, ProcessExecAdapter, WhichToolLocator};
use crate::app::{autocut_interactor::AutoCutInteractor, batch_interactor::BatchInteractor};
use crate::config::Settings;
use crate::engine::FfmpegInvoker;
use crate::ports::{ExecutePort, ProbePort, SilenceDetectPort, ToolLocator};

pub trait AppContainer: Send + Sync {
    fn autocut_interactor(&self) -> Arc<AutoCutInteractor>;
    fn batch_interactor(&self) -> Arc<BatchInteractor>;
    fn tool_locator(&self) -> Arc<dyn ToolLocator>;
}

pub struct DefaultAppContainer {
    locator: Arc<dyn ToolLocator>,
    autocut_interactor: Arc<AutoCutInteractor>,
    batch_interactor: Arc<BatchInteractor>,
}

impl DefaultAppContainer {
    /// Wire the real adapters: `which` lookup and tokio child processes
    pub fn new(settings: Settings) -> Self {
        let locator: Arc<dyn ToolLocator> = Arc::new(WhichToolLocator::new(
            settings.tools.ffmpeg_path.clone(),
            settings.tools.ffprobe_path.clone(),
        ));
        let executor: Arc<dyn ExecutePort> = Arc::new(ProcessExecAdapter::new());
        Self::with_ports(locator, executor, settings)
    }

    /// Wire everything on top of the given locator and executor
    pub fn with_ports(
        locator: Arc<dyn ToolLocator>,
        executor: Arc<dyn ExecutePort>,
        settings: Settings,
    ) -> Self {
        let probe_port: Arc<dyn ProbePort> = Arc::new(FfprobeAdapter::new(
            Arc::clone(&locator),
            Arc::clone(&executor),
        ));
        let detect_port: Arc<dyn SilenceDetectPort> = Arc::new(FfmpegSilenceDetector::new(
            Arc::clone(&locator),
            Arc::clone(&executor),
        ));
        let ffmpeg = FfmpegInvoker::new(Arc::clone(&locator), executor);

        let autocut_interactor = Arc::new(AutoCutInteractor::new(
            probe_port,
            detect_port,
            ffmpeg,
            settings,
        ));
        let batch_interactor = Arc::new(BatchInteractor::new(Arc::clone(&autocut_interactor)));

        Self {
            locator,
            autocut_interactor,
            batch_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn autocut_interactor(&self) -> Arc<AutoCutInteractor> {
        Arc::clone(&self.autocut_interactor)
    }

    fn batch_interactor(&self) -> Arc<BatchInteractor> {
        Arc::clone(&self.batch_interactor)
    }

    fn tool_locator(&self) -> Arc<dyn ToolLocator> {
        Arc::clone(&self.locator)
    }
}

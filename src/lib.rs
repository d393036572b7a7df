#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod clock;
pub mod config;
pub mod errors;
pub mod preloader;
pub mod render_gate;
pub mod scene;
pub mod scroll;
pub mod signal;
pub mod stage;
pub mod utils;

pub use animation::{
    AnimationTarget, AnimatorConfig, ContinuousAnimator, Ease, EntranceConfig, EntrancePhase,
    EntranceSequencer, EntranceTimeline, SceneFrame,
};
pub use assets::{AssetId, AssetManifest, AssetReadinessStore, AssetReportingAdapter, LoadProgress};
pub use clock::{FrameClock, FrameTime};
pub use config::StageConfig;
pub use errors::{Result, VitrineError};
pub use preloader::{PreloaderConfig, PreloaderPhase, ReadinessGatedPreloader};
pub use render_gate::{RenderGate, RenderGateConfig, RenderMode};
pub use scene::{SceneDescriptor, SceneNode, SharedTransform, Transform};
pub use scroll::{Region, ScrollLock, ScrollProgress, ScrollSignal, Viewport};
pub use signal::{Broadcaster, Subscription};
pub use stage::Stage;

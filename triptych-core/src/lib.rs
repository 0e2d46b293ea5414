pub mod error;

pub mod config;

pub mod logging;
pub use logging::Logger;

pub mod fs {
    pub mod classifier;
    pub mod entry;
    pub mod gateway;
}

pub mod model {
    pub mod cursor;
    pub use cursor::CursorState;

    pub mod pane;
    pub use pane::{PaneModel, PaneSnapshot, PreviewTarget};
}

pub mod ops {
    pub mod engine;
    pub use engine::{FileOperationEngine, RunningOperation};
}

pub mod controller {
    pub mod intents;
    pub use intents::{Intent, OperationKind, OperationOutcome};

    pub mod navigator;
    pub use navigator::{HandleResult, NavigationController, RenderSnapshot};
}

pub mod view {
    pub mod theme;

    pub mod overlay;
    pub use overlay::{ConfirmKind, Overlay, PromptKind};

    pub mod ui;
    pub use ui::UIRenderer;
}

pub use error::AppError;

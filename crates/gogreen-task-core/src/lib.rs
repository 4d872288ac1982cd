/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public task lifecycle crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod clock;
pub mod engine;
pub mod error;
pub mod state_machine;
pub mod timer;
pub mod types;
pub mod upload;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{TaskLifecycleEngine, TickReport};
pub use error::{Result, TaskError, UploadError};
pub use state_machine::{Intent, IntentKind, Transition, TransitionCause, allowed_intents};
pub use timer::{DEFAULT_WINDOW_SECS, TaskTimers, WindowSettings, WindowTimer, format_countdown};
pub use upload::{MemoryPhotoUploader, PhotoUploader};

// Re-export all types
pub use types::*;

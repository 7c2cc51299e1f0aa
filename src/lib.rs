pub mod browser;
pub mod completion;
pub mod config;
pub mod context;
pub mod element;
pub mod error;
pub mod fields;
pub mod filler;
pub mod generator;
pub mod orchestrator;
pub mod page;
pub mod prompt;
pub mod session;
pub mod similarity;

pub use browser::{ChromiumLauncher, ChromiumSession};
pub use completion::{ChatCompletionClient, Completion};
pub use config::{BrowserConfig, CompletionConfig, FlowSettings, ValuePolicy};
pub use context::EventContext;
pub use error::{Error, Result};
pub use fields::{CollectedField, ControlType, FieldDescriptor};
pub use filler::{FieldOutcome, FillReport};
pub use generator::{GeneratedValues, ValueGenerator};
pub use orchestrator::{EventRun, EventTarget, Orchestrator};
pub use session::{SessionLauncher, WebSession};

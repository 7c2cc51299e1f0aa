//! One registration pass per event, and the loop over the event list.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::completion::Completion;
use crate::config::FlowSettings;
use crate::context::extract_context;
use crate::error::Result;
use crate::fields::{collect_fields, FieldDescriptor};
use crate::filler::{fill_form, FillReport};
use crate::generator::ValueGenerator;
use crate::session::{SessionLauncher, WebSession};

/// An event to register for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventTarget {
    pub name: String,
    #[serde(alias = "registrationUrl", alias = "luma_link", alias = "url")]
    pub registration_url: String,
}

/// Read the whole event list from a JSON array.
pub fn load_targets(path: impl AsRef<Path>) -> Result<Vec<EventTarget>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Result of one event's pass.
#[derive(Debug)]
pub struct EventRun {
    pub event: String,
    pub result: Result<FillReport>,
}

impl EventRun {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Drives the browser through registration and fills the form.
pub struct Orchestrator<L, C> {
    launcher: L,
    generator: ValueGenerator<C>,
    settings: FlowSettings,
}

impl<L: SessionLauncher, C: Completion> Orchestrator<L, C> {
    pub fn new(launcher: L, completion: C, settings: FlowSettings) -> Self {
        let generator = ValueGenerator::new(completion).with_policy(settings.value_policy);
        Self {
            launcher,
            generator,
            settings,
        }
    }

    /// Open a session, fill the form at `url`, hold it open for review and
    /// close the session whether or not filling succeeded.
    #[instrument(skip(self, additional_context))]
    pub async fn fill_event(&self, url: &str, additional_context: &str) -> Result<FillReport> {
        let session = self.launcher.launch().await?;
        let result = self.fill_in_session(&session, url, additional_context).await;
        if let Err(e) = session.close().await {
            warn!(error = %e, "failed to close browser session");
        }
        result
    }

    async fn fill_in_session(
        &self,
        session: &L::Session,
        url: &str,
        additional_context: &str,
    ) -> Result<FillReport> {
        let settings = &self.settings;

        session.navigate(url).await?;

        let trigger = session
            .locate(&settings.trigger_selector, settings.trigger_timeout)
            .await?;
        session.click(&trigger).await?;
        info!("opened registration form");

        let form = session
            .locate(&settings.form_selector, settings.form_timeout)
            .await?;

        let context = extract_context(session, &settings.context_selectors).await;
        let fields = collect_fields(session, &form).await;
        let descriptors: Vec<FieldDescriptor> =
            fields.iter().map(|f| f.descriptor.clone()).collect();

        let values = self
            .generator
            .generate(&descriptors, &context, additional_context)
            .await;
        let report = fill_form(session, &fields, &values).await;

        info!(
            applied = report.applied(),
            skipped = report.skipped(),
            failed = report.failed(),
            "form filled, waiting {:?} for review",
            settings.review_pause
        );
        if !settings.review_pause.is_zero() {
            tokio::time::sleep(settings.review_pause).await;
        }
        Ok(report)
    }

    /// Process every target in order. A failed event is logged and the loop
    /// moves on.
    pub async fn run_all(&self, targets: &[EventTarget], additional_context: &str) -> Vec<EventRun> {
        info!(events = targets.len(), "starting form filling");
        let mut runs = Vec::with_capacity(targets.len());

        for target in targets {
            info!(event = %target.name, url = %target.registration_url, "processing event");
            let result = self
                .fill_event(&target.registration_url, additional_context)
                .await;
            match &result {
                Ok(report) => info!(event = %target.name, applied = report.applied(), "filled form"),
                Err(e) => error!(event = %target.name, error = %e, "failed to fill form"),
            }
            runs.push(EventRun {
                event: target.name.clone(),
                result,
            });
        }

        info!("form filling completed");
        runs
    }
}

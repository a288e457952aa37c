pub mod ask;
pub mod doctor;
pub mod export;
pub mod import;
pub mod progress;
pub mod reminders;
pub mod report;
pub mod sync;
pub mod tutorial;

use anyhow::Result;
use std::sync::Arc;

use gabu_tutor::ai::gemini::GeminiClient;
use gabu_tutor::app::TutorApp;
use gabu_tutor::config::TutorConfig;
use gabu_tutor::services::Services;

/// Open the configured database and wire every service around it.
pub fn open_services(config: TutorConfig) -> Result<Arc<Services>> {
    Ok(Arc::new(Services::open(config)?))
}

/// Services plus the Gemini-backed state machine.
pub fn open_app(config: TutorConfig) -> Result<TutorApp> {
    let client = GeminiClient::new(&config.ai)?;
    if !client.has_api_key() {
        eprintln!("warning: no Gemini API key configured; set GEMINI_API_KEY or [ai].api_key");
    }
    let services = open_services(config)?;
    Ok(TutorApp::new(services, Arc::new(client)))
}

/// First `max` characters of `text` on one line, with an ellipsis when cut.
pub fn preview(text: &str, max: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod intent;
pub mod models;
pub mod platforms;
pub mod summary;
pub mod synth;
pub mod transport;

use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::handlers::AppState;
use crate::intent::KeywordIntent;
use crate::platforms::{GoogleSource, MetaSource};
use crate::synth::TemplateSynth;
use crate::transport::{HttpTransport, Transport};

/// Wire the production dispatcher: keyword intents, template replies and
/// both platform adapters sharing one HTTP transport.
pub fn build_dispatcher(cfg: Arc<Config>) -> Result<Dispatcher> {
    let transport = Arc::new(HttpTransport::new(cfg.request_timeout())?);

    let meta = Arc::new(MetaSource::new(
        Arc::clone(&cfg),
        Arc::clone(&transport) as Arc<dyn Transport>,
    ));
    let google = Arc::new(GoogleSource::new(
        Arc::clone(&cfg),
        Arc::clone(&transport) as Arc<dyn Transport>,
    ));

    Ok(Dispatcher::new(
        Arc::new(KeywordIntent),
        Arc::new(TemplateSynth),
        meta,
        google.clone(),
        google,
    ))
}

/// Build the HTTP application for a loaded configuration.
pub fn app(cfg: Arc<Config>) -> Result<axum::Router> {
    let dispatcher = Arc::new(build_dispatcher(Arc::clone(&cfg))?);
    Ok(handlers::router(AppState {
        dispatcher,
        config: cfg,
    }))
}

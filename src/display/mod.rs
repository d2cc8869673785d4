pub mod braille;
pub mod panel;
pub mod print;
pub mod terminal;

use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::backend::http::HttpBackend;
use crate::backend::{BackendEvent, Client};
use crate::config::Config;
use crate::form::MaterialForm;
use crate::plot::{PlotContext, PlotStyle};
use crate::session::Session;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Terminal,
    Print,
}

/// Build a session for a plot of `width` x `height` dots and issue the first
/// request: the configured material, or numbers for the configured constants.
pub fn start_session(config: &Config, width: usize, height: usize) -> (Session, mpsc::UnboundedReceiver<BackendEvent>) {
    let backend = HttpBackend::new(&config.backend.url, config.timeout());
    info!("Backend at {}", backend.url());
    let (client, rx) = Client::new(Arc::new(backend));

    let plot = PlotContext::new(
        PlotStyle::from(&config.plot),
        width,
        height,
        &config.selection.angle,
        config.selection.plane,
        config.selection.variable,
    );
    let form = match config.material.stiffness {
        Some(ref c) => MaterialForm::new(c, config.material.density),
        None => MaterialForm::default(),
    };

    let mut session = Session::new(plot, form, client);
    match config.material.startup_material() {
        Some(name) => session.choose_material(Some(name)),
        None => session.request_numbers(),
    }

    (session, rx)
}

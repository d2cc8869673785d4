//! Non-interactive mode: fetch once, sample the configured selection and
//! print the values, the polarization matrix and the plot.

use anyhow::{bail, Result};
use std::fmt::Write as _;
use tracing::info;

use super::braille::BrailleGrid;
use super::panel::format_matrix;
use crate::config::Config;
use crate::session::Session;

const PRINT_COLS: u16 = 60;
const PRINT_ROWS: u16 = 30;

pub async fn run(config: Config) -> Result<()> {
    let (width, height) = BrailleGrid::canvas_size(PRINT_COLS, PRINT_ROWS);
    let (mut session, mut rx) = super::start_session(&config, width, height);

    while session.is_loading() {
        let Some(event) = rx.recv().await else {
            break;
        };
        session.handle_event(event);
    }

    if let Some(ref status) = session.status {
        bail!("{}", status);
    }
    if let Some(ref e) = session.plot.last_error {
        bail!("{}", e);
    }

    info!("Printing {} at {}°", session.plot.selection.variable, session.plot.angle_text);
    print!("{}", report(&session));
    Ok(())
}

pub fn report(session: &Session) -> String {
    let form = &session.form;
    let selection = &session.plot.selection;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Material: {} ({})",
        form.material.as_deref().unwrap_or("-"),
        form.symmetry
    );
    let _ = writeln!(out, "Density: {} kg/m³", form.density);
    let _ = writeln!(
        out,
        "Angle: {}°  Plane: {}  {}",
        session.plot.angle_text,
        selection.plane,
        selection.variable.label()
    );
    if let Some(values) = session.plot.outputs() {
        for (mode, value) in values.iter().enumerate() {
            let _ = writeln!(out, "  mode {}: {}", mode + 1, value);
        }
    }
    let _ = writeln!(out, "A:");
    for row in format_matrix(&selection.a) {
        let _ = writeln!(out, "  {}", row);
    }
    out.push('\n');
    for line in BrailleGrid::from_canvas(session.plot.visible()).lines() {
        let _ = writeln!(out, "{}", line);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, BackendError, BackendReply, BackendRequest, Client};
    use crate::form::MaterialForm;
    use crate::model::{Curves, Plane, PlaneMap, ResponseGrid, Variable};
    use crate::plot::{PlotContext, PlotStyle};
    use std::f64::consts::TAU;
    use std::sync::Arc;

    struct Offline;

    impl Backend for Offline {
        fn post(&self, _request: &BackendRequest) -> Result<BackendReply, BackendError> {
            Err(BackendError::Transport("offline".into()))
        }
    }

    #[test]
    fn test_report_lists_values_and_matrix() {
        let (client, _rx) = Client::new(Arc::new(Offline));
        let plot = PlotContext::new(PlotStyle::default(), 80, 80, "0", Plane::Xy, Variable::Velocity);
        let mut form = MaterialForm::default();
        form.material = Some("Cu (cobre)".into());
        let mut session = Session::new(plot, form, client);

        let n = 90;
        let t: Vec<f64> = (0..n).map(|k| TAU * k as f64 / n as f64).collect();
        let mut values = vec![[1000.0, 500.0, 250.0]; n];
        values[0] = [3000.0, 2000.0, 1000.0];
        let a = vec![[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]; n];
        let grid = ResponseGrid {
            t,
            velocity: Curves {
                r: PlaneMap { xy: values.clone(), xz: values.clone(), yz: values },
                max: PlaneMap { xy: 3000.0, xz: 3000.0, yz: 3000.0 },
            },
            a: PlaneMap { xy: a.clone(), xz: a.clone(), yz: a },
            ..Default::default()
        };
        session.plot.apply_grid(1, grid);

        let text = report(&session);
        assert!(text.starts_with("Material: Cu (cobre) (Triclinic)\n"));
        assert!(text.contains("  mode 1: 3000\n  mode 2: 2000\n  mode 3: 1000\n"));
        assert!(text.contains("  [1 0 0]\n"));
        assert!(text.contains("0°"));
    }
}

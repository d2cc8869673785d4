//! One running viewer: the material form, the plot and the requests that
//! connect them. Shared by the interactive and print front ends.

use tracing::{debug, info, warn};

use crate::backend::cache::SequenceGuard;
use crate::backend::{BackendEvent, BackendReply, BackendRequest, Client, NumbersReply, RequestKind};
use crate::form::{FormError, MaterialForm};
use crate::materials::{self, Symmetry};
use crate::plot::PlotContext;

pub struct Session {
    pub plot: PlotContext,
    pub form: MaterialForm,
    client: Client,
    /// Orders material and symmetry replies, which both rewrite the form
    form_guard: SequenceGuard,
    /// Last backend failure, cleared by the next successful reply
    pub status: Option<String>,
}

impl Session {
    pub fn new(plot: PlotContext, form: MaterialForm, client: Client) -> Self {
        Self {
            plot,
            form,
            client,
            form_guard: SequenceGuard::default(),
            status: None,
        }
    }

    /// A request whose answer would change what is shown is outstanding.
    pub fn is_loading(&self) -> bool {
        self.plot.cache.is_loading() || self.form_guard.is_pending()
    }

    /// Fetch the response grid for the constants currently in the form.
    pub fn request_numbers(&mut self) {
        let seq = self.client.send(BackendRequest::Numbers {
            c: self.form.stiffness(),
            rho: self.form.density_value(),
        });
        self.plot.cache.issue(seq);
    }

    pub fn edit_stiffness(&mut self, row: usize, col: usize, text: &str) -> Result<(), FormError> {
        self.form.edit_cell(row, col, text)?;
        self.request_numbers();
        Ok(())
    }

    pub fn edit_density(&mut self, text: &str) {
        self.form.density = text.to_string();
        self.request_numbers();
    }

    /// Load a catalog material. `None` is an empty picker choice and changes nothing.
    pub fn choose_material(&mut self, choice: Option<&str>) {
        if !self.form.choose_material(choice) {
            debug!("No material chosen; keeping {:?}", self.form.material);
            return;
        }
        let material = choice.unwrap_or_default().to_string();
        if let Some(symmetry) = materials::symmetry_of(&material) {
            self.form.symmetry = symmetry;
        }
        info!("Loading material {}", material);
        let seq = self.client.send(BackendRequest::Material { material });
        self.form_guard.issue(seq);
    }

    /// Project the current constants onto `symmetry`.
    pub fn choose_symmetry(&mut self, symmetry: Symmetry) {
        self.form.symmetry = symmetry;
        let seq = self.client.send(BackendRequest::Symmetry {
            symmetry: symmetry.index(),
            c: self.form.stiffness(),
        });
        self.form_guard.issue(seq);
    }

    pub fn handle_event(&mut self, event: BackendEvent) {
        let BackendEvent { seq, kind, result } = event;

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Request {} ({:?}) failed: {}", seq, kind, e);
                match kind {
                    RequestKind::Numbers => self.plot.cache.reject(seq),
                    RequestKind::Material | RequestKind::Symmetry => {
                        self.form_guard.accept(seq);
                    }
                }
                self.status = Some(e.to_string());
                return;
            }
        };

        match reply {
            BackendReply::Numbers(NumbersReply {
                material,
                symmetry,
                plot_data,
            }) => {
                debug!("Grid {} with {} samples", seq, plot_data.t.len());
                if !self.plot.apply_grid(seq, plot_data) {
                    return;
                }
                self.form.material = material;
                match symmetry.resolve() {
                    Some(s) => self.form.symmetry = s,
                    None => warn!("Unknown symmetry class {:?}", symmetry),
                }
            }
            BackendReply::Material(reply) => {
                if !self.form_guard.accept(seq) {
                    warn!("Dropping stale material reply {}", seq);
                    return;
                }
                self.form.fill(&reply.c);
                self.form.set_density(reply.rho);
                self.request_numbers();
            }
            BackendReply::Symmetry(reply) => {
                if !self.form_guard.accept(seq) {
                    warn!("Dropping stale symmetry reply {}", seq);
                    return;
                }
                self.form.fill(&reply.c);
                self.request_numbers();
            }
        }

        self.status = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, BackendError, MaterialReply, SymmetryReply, SymmetryValue};
    use crate::model::{Curves, Plane, PlaneMap, ResponseGrid, Variable};
    use crate::plot::PlotStyle;
    use std::f64::consts::TAU;
    use std::sync::Arc;

    fn grid(first: [f64; 3]) -> ResponseGrid {
        let n = 360;
        let t: Vec<f64> = (0..n).map(|k| TAU * k as f64 / n as f64).collect();
        let mut values = vec![[1.0, 1.0, 1.0]; n];
        values[0] = first;
        let a = vec![[[0.0; 3]; 3]; n];
        ResponseGrid {
            t,
            velocity: Curves {
                r: PlaneMap { xy: values.clone(), xz: values.clone(), yz: values },
                max: PlaneMap { xy: 3000.0, xz: 3000.0, yz: 3000.0 },
            },
            a: PlaneMap { xy: a.clone(), xz: a.clone(), yz: a },
            ..Default::default()
        }
    }

    /// Serves the silicon constants and a grid whose first sample scales with C11.
    struct FakeBackend;

    impl Backend for FakeBackend {
        fn post(&self, request: &BackendRequest) -> Result<BackendReply, BackendError> {
            match request {
                BackendRequest::Material { material } if material == "Si (silicio)" => {
                    let mut c = vec![vec![None; 6]; 6];
                    c[0][0] = Some(165.7);
                    c[0][1] = Some(63.9);
                    c[1][0] = Some(63.9);
                    Ok(BackendReply::Material(MaterialReply { c, rho: 2336.0 }))
                }
                BackendRequest::Material { .. } => Err(BackendError::Status(400)),
                BackendRequest::Numbers { c, .. } => Ok(BackendReply::Numbers(NumbersReply {
                    material: Some("Si (silicio)".into()),
                    symmetry: SymmetryValue::Index(5),
                    plot_data: grid([c[0][0] * 10.0, 2000.0, 1000.0]),
                })),
                BackendRequest::Symmetry { .. } => Ok(BackendReply::Symmetry(SymmetryReply { c: vec![] })),
            }
        }
    }

    fn session() -> (Session, tokio::sync::mpsc::UnboundedReceiver<BackendEvent>) {
        let (client, rx) = Client::new(Arc::new(FakeBackend));
        let plot = PlotContext::new(PlotStyle::default(), 120, 120, "0", Plane::Xy, Variable::Velocity);
        (Session::new(plot, MaterialForm::default(), client), rx)
    }

    #[tokio::test]
    async fn test_material_then_numbers() {
        let (mut session, mut rx) = session();
        session.choose_material(Some("Si (silicio)"));
        assert!(session.is_loading());

        // Material reply fills the form and triggers a numbers request
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, RequestKind::Material);
        session.handle_event(event);
        assert_eq!(session.form.cell(0, 0), "165.7");
        assert_eq!(session.form.density, "2336");
        assert!(session.is_loading());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, RequestKind::Numbers);
        session.handle_event(event);
        assert!(!session.is_loading());
        assert_eq!(session.form.symmetry, Symmetry::Cubic);
        assert_eq!(
            session.plot.outputs(),
            Some(["1657".to_string(), "2000".to_string(), "1000".to_string()])
        );
    }

    #[tokio::test]
    async fn test_newer_grid_wins() {
        let (mut session, mut rx) = session();
        session.edit_stiffness(0, 0, "300").unwrap();
        session.edit_stiffness(0, 0, "100").unwrap();

        let mut events = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        events.sort_by_key(|e| std::cmp::Reverse(e.seq));
        for event in events {
            session.handle_event(event);
        }

        assert!(!session.is_loading());
        assert_eq!(session.plot.selection.r[0], 1000.0);
    }

    #[tokio::test]
    async fn test_failure_clears_loading_and_reports() {
        let (mut session, mut rx) = session();
        session.choose_material(Some("Xx (desconocido)"));
        let event = rx.recv().await.unwrap();
        session.handle_event(event);
        assert!(!session.is_loading());
        assert_eq!(session.status.as_deref(), Some("backend answered HTTP 400"));
        assert!(session.plot.outputs().is_none());
    }

    #[tokio::test]
    async fn test_empty_material_choice_sends_nothing() {
        let (mut session, mut rx) = session();
        session.form.material = Some("Cu (cobre)".into());
        session.choose_material(None);
        assert!(!session.is_loading());
        assert!(rx.try_recv().is_err());
        assert_eq!(session.form.material.as_deref(), Some("Cu (cobre)"));
    }

    #[test]
    fn test_lower_triangle_edit_is_refused() {
        let (mut session, _rx) = session();
        assert!(session.edit_stiffness(3, 1, "5").is_err());
        assert!(!session.is_loading());
    }
}

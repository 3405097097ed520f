/// Fetch-and-normalize pipeline for the dashboard views.
///
/// Every view has the same shape: one fixed endpoint, a raw payload type
/// whose aggregates are all optional, and a normalization step that
/// resolves defaults into the view's display model. [`ViewLoader`] runs a
/// view against the gateway and tracks what the page should show.
///
/// A load always starts by dropping the previous display model, so a page
/// never shows stale numbers while a reload is in flight or after it fails.
/// Nothing is cached or merged between loads, and nothing is retried; a
/// retry is simply another [`ViewLoader::load`].
use serde::de::DeserializeOwned;

use crate::api::{ApiClient, Method};

pub mod classify;
pub mod employees;
pub mod engagement;
mod lenient;
pub mod overview;
pub mod population_health;
pub mod reports;

pub use classify::{ErrorKind, FetchError};

/// A dashboard page's data contract.
pub trait DashboardView {
    /// Payload inside the envelope's `data`.
    type Raw: DeserializeOwned;
    /// UI-ready shape handed to the renderer.
    type Model;

    /// What the view shows, used in default messages
    /// ("You need to login to view {subject}").
    const SUBJECT: &'static str;

    /// Endpoint path, relative to the API base URL.
    fn path(&self) -> String;

    /// Resolve defaults and derived fields.
    fn normalize(&self, raw: Self::Raw) -> Self::Model;
}

/// Fetch and normalize a view once.
///
/// Always requests with auth. Envelope failures and transport failures are
/// both turned into a classified [`FetchError`].
pub fn fetch<V: DashboardView>(view: &V, client: &ApiClient) -> Result<V::Model, FetchError> {
    let result = client
        .request::<V::Raw>(Method::Get, &view.path(), None, true)
        .map_err(|err| FetchError::from_transport(&err, V::SUBJECT))?;

    if !result.success {
        return Err(FetchError::from_failed(&result, V::SUBJECT));
    }
    match result.data {
        Some(raw) => Ok(view.normalize(raw)),
        None => Err(FetchError::from_failed(&result, V::SUBJECT)),
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// What a page should currently render.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<M> {
    /// Nothing requested yet.
    Idle,
    /// A load is in flight; any previous model is gone.
    Loading,
    Ready(M),
    Failed(FetchError),
}

/// Holds one view and its current state.
pub struct ViewLoader<V: DashboardView> {
    view: V,
    state: ViewState<V::Model>,
}

impl<V: DashboardView> ViewLoader<V> {
    pub fn new(view: V) -> Self {
        Self {
            view,
            state: ViewState::Idle,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view's parameters (e.g. the current page).
    /// Takes effect on the next load.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn state(&self) -> &ViewState<V::Model> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading)
    }

    pub fn model(&self) -> Option<&V::Model> {
        match &self.state {
            ViewState::Ready(model) => Some(model),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.state {
            ViewState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Enter `Loading`, discarding whatever was shown before.
    pub fn begin(&mut self) {
        self.state = ViewState::Loading;
    }

    /// Settle the state with the outcome of a load.
    pub fn finish(&mut self, outcome: Result<V::Model, FetchError>) {
        self.state = match outcome {
            Ok(model) => ViewState::Ready(model),
            Err(err) => ViewState::Failed(err),
        };
    }

    /// Load (or reload) the view from scratch.
    pub fn load(&mut self, client: &ApiClient) -> &ViewState<V::Model> {
        self.begin();
        let outcome = fetch(&self.view, client);
        self.finish(outcome);
        &self.state
    }

    pub fn into_state(self) -> ViewState<V::Model> {
        self.state
    }
}

// ---------------------------------------------------------------------------
// Shared normalization helpers
// ---------------------------------------------------------------------------

/// A labelled count in a distribution chart.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Segment {
    pub label: String,
    pub count: u64,
    /// Backend-supplied share, when the endpoint sends one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl Segment {
    pub fn new(label: &str, count: Option<u64>) -> Self {
        Self {
            label: label.to_string(),
            count: count.unwrap_or(0),
            percentage: None,
        }
    }
}

/// `part / whole × 100`, with an empty whole yielding 0.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl DashboardView for Echo {
        type Raw = u32;
        type Model = u32;
        const SUBJECT: &'static str = "echo";

        fn path(&self) -> String {
            "/echo".to_string()
        }

        fn normalize(&self, raw: u32) -> u32 {
            raw * 2
        }
    }

    #[test]
    fn begin_discards_previous_model() {
        let mut loader = ViewLoader::new(Echo);
        assert_eq!(loader.state(), &ViewState::Idle);

        loader.finish(Ok(10));
        assert_eq!(loader.model(), Some(&10));

        loader.begin();
        assert!(loader.is_loading());
        assert_eq!(loader.model(), None);
        assert!(loader.error().is_none());
    }

    #[test]
    fn failure_replaces_model() {
        let mut loader = ViewLoader::new(Echo);
        loader.finish(Ok(1));
        loader.finish(Err(FetchError::from_text("HTTP 500", "echo")));
        assert_eq!(loader.model(), None);
        assert_eq!(loader.error().map(|e| e.kind), Some(ErrorKind::Server));
    }

    #[test]
    fn percent_handles_zero_whole() {
        assert_eq!(percent(5, 0), 0.0);
        assert!((percent(45, 150) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn segment_defaults_missing_count() {
        assert_eq!(Segment::new("High", None).count, 0);
        assert_eq!(Segment::new("Low", Some(4)).count, 4);
    }
}

use load_timeline_model::{load_test_runs, TestRun};
use std::path::Path;

/// Dataset shown when no data source is given
const INITIAL_DATA: &str = include_str!("../data/initial_data.json");

/// An error while loading a dataset
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("HTTP error! status: {0}")]
    Http(u16),
    #[error("Request failed: {0}")]
    Transport(#[from] ureq::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the loader is
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    /// Nothing has been requested yet
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    Ready(Vec<TestRun>),
    /// The load failed. The message is shown instead of any data.
    Error(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn data(&self) -> Option<&[TestRun]> {
        match self {
            LoadState::Ready(runs) => Some(runs),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Loads the dataset once, from a URL, a file or the bundled data
#[derive(Debug, Default)]
pub struct DataLoader {
    state: LoadState,
}

impl DataLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn into_state(self) -> LoadState {
        self.state
    }

    /// Load the dataset from `source`, or the bundled dataset if there is none.
    ///
    /// `http` and `https` URLs are fetched with a single request, with no retry and no timeout
    /// beyond the transport's own. Anything else is read as a file path. Only the first call
    /// loads. Later calls return the state reached by the first one.
    pub fn load(&mut self, source: Option<&str>) -> &LoadState {
        if self.state != LoadState::Idle {
            log::warn!("Data has already been loaded, ignoring load request");
            return &self.state;
        }

        self.state = LoadState::Loading;
        let result = match source {
            Some(source) => {
                log::debug!("Loading data from {source}");
                load_source(source)
            }
            None => {
                log::debug!("No data source given, using the bundled dataset");
                initial_data()
            }
        };

        self.state = match result {
            Ok(runs) => {
                log::debug!("Loaded {} test runs", runs.len());
                LoadState::Ready(runs)
            }
            Err(e) => {
                log::error!("Error loading data: {e}");
                LoadState::Error(e.to_string())
            }
        };

        &self.state
    }

    /// Replace the dataset, as an import does
    pub fn replace_data(&mut self, runs: Vec<TestRun>) {
        self.state = LoadState::Ready(runs);
    }
}

/// The bundled dataset
pub fn initial_data() -> Result<Vec<TestRun>, LoadError> {
    Ok(load_test_runs(INITIAL_DATA.as_bytes())?)
}

fn load_source(source: &str) -> Result<Vec<TestRun>, LoadError> {
    match url::Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => fetch(url.as_str()),
        _ => import_file(Path::new(source)),
    }
}

fn fetch(url: &str) -> Result<Vec<TestRun>, LoadError> {
    let agent = ureq::config::Config::builder()
        .http_status_as_error(false)
        .build()
        .new_agent();
    let response = agent.get(url).call()?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Http(status.as_u16()));
    }

    let mut body = response.into_body();
    Ok(load_test_runs(body.as_reader())?)
}

/// Read a dataset from a local JSON file
pub fn import_file(path: &Path) -> Result<Vec<TestRun>, LoadError> {
    let file = std::fs::File::open(path)?;
    Ok(load_test_runs(file)?)
}

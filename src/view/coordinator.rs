//! View coordinator
//!
//! The state machine deciding which view is active. `update` is a pure
//! function of the current state, the incoming event and a snapshot of the
//! catalog store: it never fetches or touches history itself, it returns the
//! effects the runtime has to carry out.

use clap::ValueEnum;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{SelectionError, VideoId, VideoRecord};
use crate::catalog::{
    filter_records, related_to, resolve, sort_records, CatalogStore, Resolution, SortKey,
    DEFAULT_RELATED_LIMIT,
};

/// Which initial-state rules a page follows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageMode {
    /// Grid only; opening a video redirects to the player page
    Catalog,
    /// Player only; going home redirects to the catalog page
    Player,
    /// Grid and player on one page
    #[default]
    Single,
}

/// Why the player could not show a video
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerFailure {
    #[error("video {0} was not found")]
    NotFound(VideoId),
    #[error("{0:?} is not a valid video id")]
    InvalidIdentifier(String),
    #[error("could not load video {id}: {reason}")]
    Fetch { id: VideoId, reason: String },
}

impl PlayerFailure {
    /// Video the failed navigation asked for, when it was well-formed
    pub fn requested(&self) -> Option<VideoId> {
        match self {
            PlayerFailure::NotFound(id) | PlayerFailure::Fetch { id, .. } => Some(*id),
            PlayerFailure::InvalidIdentifier(_) => None,
        }
    }
}

/// Current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Initial,
    /// Waiting for the catalog; `target` is the video to open once it lands
    Loading { target: Option<VideoId> },
    Grid,
    Player(VideoId),
    ErrorGrid { reason: String },
    ErrorPlayer(PlayerFailure),
}

/// Everything that can drive a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Page load with the raw `id` query value, if any
    Start { requested: Option<String> },
    FetchSucceeded,
    FetchFailed { reason: String },
    /// User picked a card
    Select(VideoId),
    GoHome,
    /// Back/forward consumed an existing history entry
    HistoryPopped { selection: Option<VideoId> },
    SortChanged(SortKey),
    FilterChanged(String),
    ConnectionRestored,
    ConnectionLost,
    /// Explicit reload
    Retry,
    Share,
}

/// Work the runtime performs after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace the store from the data source, then report back
    Fetch,
    /// Push exactly one history entry carrying this selection
    PushHistory(Option<VideoId>),
    /// Leave for the player page showing this video
    OpenPlayer(VideoId),
    /// Leave for the catalog page
    NavigateHome,
    /// Share or copy the current address
    Share { title: Option<String> },
}

/// Grid data handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct GridView<'a> {
    pub records: Vec<&'a VideoRecord>,
    pub sort: SortKey,
    pub filter: &'a str,
    /// Nothing to show; the catalog is empty or the filter matched nothing
    pub no_results: bool,
}

/// Player data handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView<'a> {
    pub record: &'a VideoRecord,
    pub related: Vec<&'a VideoRecord>,
}

/// What the renderer should draw for the current state
#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a> {
    Blank,
    Loading { target: Option<VideoId> },
    Grid(GridView<'a>),
    Player(PlayerView<'a>),
    GridError { reason: &'a str },
    PlayerError(PlayerFailure),
}

/// The view state machine of one page
#[derive(Debug, Clone)]
pub struct Coordinator {
    mode: PageMode,
    state: ViewState,
    sort: SortKey,
    filter: String,
    related_limit: usize,
    /// Grid order derived from the last snapshot
    grid: Vec<VideoId>,
    rng: StdRng,
}

impl Coordinator {
    pub fn new(mode: PageMode) -> Self {
        Self {
            mode,
            state: ViewState::Initial,
            sort: SortKey::default(),
            filter: String::new(),
            related_limit: DEFAULT_RELATED_LIMIT,
            grid: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_related_limit(mut self, limit: usize) -> Self {
        self.related_limit = limit;
        self
    }

    /// Fix the shuffle placeholder's randomness
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Video currently open in the player
    pub fn selection(&self) -> Option<VideoId> {
        match self.state {
            ViewState::Player(id) => Some(id),
            _ => None,
        }
    }

    /// Apply one event and return the effects it requires
    pub fn update(&mut self, event: Event, store: &CatalogStore) -> Vec<Effect> {
        let before = self.state.clone();
        let effects = self.transition(event, store);

        if self.state != before {
            debug!("View {:?} -> {:?}", before, self.state);
        }
        effects
    }

    fn transition(&mut self, event: Event, store: &CatalogStore) -> Vec<Effect> {
        match event {
            Event::Start { requested } => self.start(requested, store),
            Event::FetchSucceeded => self.fetch_succeeded(store),
            Event::FetchFailed { reason } => self.fetch_failed(reason),
            Event::Select(id) => self.select(id, store),
            Event::GoHome => self.go_home(store),
            Event::HistoryPopped { selection } => self.popped(selection, store),
            Event::SortChanged(sort) => {
                self.sort = sort;
                self.refresh_grid(store);
                Vec::new()
            }
            Event::FilterChanged(filter) => {
                self.filter = filter;
                Vec::new()
            }
            Event::ConnectionRestored => {
                if store.is_empty() {
                    self.reload()
                } else {
                    Vec::new()
                }
            }
            Event::ConnectionLost => Vec::new(),
            Event::Retry => self.reload(),
            Event::Share => {
                let title = self
                    .selection()
                    .and_then(|id| store.find(id))
                    .map(|record| record.title.clone());
                vec![Effect::Share { title }]
            }
        }
    }

    fn start(&mut self, requested: Option<String>, store: &CatalogStore) -> Vec<Effect> {
        let requested = requested.map(|raw| raw.parse::<VideoId>());

        match (self.mode, requested) {
            (PageMode::Catalog, Some(Ok(id))) => self.load(Some(id)),
            (PageMode::Catalog, Some(Err(err))) => {
                warn!("Ignoring selection on catalog page: {}", err);
                self.load(None)
            }
            (PageMode::Catalog | PageMode::Single, None) => self.load(None),
            (PageMode::Player, None) => vec![Effect::NavigateHome],
            (_, Some(Err(SelectionError::InvalidIdentifier(raw)))) => {
                self.state = ViewState::ErrorPlayer(PlayerFailure::InvalidIdentifier(raw));
                Vec::new()
            }
            (_, Some(Ok(id))) => self.show(id, store),
        }
    }

    fn fetch_succeeded(&mut self, store: &CatalogStore) -> Vec<Effect> {
        self.refresh_grid(store);

        match self.state.clone() {
            ViewState::Loading { target: None } => {
                self.state = ViewState::Grid;
                Vec::new()
            }
            ViewState::Loading { target: Some(id) } if self.mode == PageMode::Catalog => {
                self.state = ViewState::Grid;
                if store.is_empty() {
                    Vec::new()
                } else {
                    vec![Effect::OpenPlayer(id)]
                }
            }
            ViewState::Loading { target: Some(id) } => {
                self.state = match resolve(id, store) {
                    Resolution::Found(_) => ViewState::Player(id),
                    Resolution::NotFound | Resolution::PendingFetch => {
                        ViewState::ErrorPlayer(PlayerFailure::NotFound(id))
                    }
                };
                Vec::new()
            }
            // a re-entrant fetch replaced the catalog under an open player
            ViewState::Player(id) if store.find(id).is_none() => {
                self.state = ViewState::ErrorPlayer(PlayerFailure::NotFound(id));
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn fetch_failed(&mut self, reason: String) -> Vec<Effect> {
        match self.state.clone() {
            ViewState::Loading { target: Some(id) } if self.mode != PageMode::Catalog => {
                self.state = ViewState::ErrorPlayer(PlayerFailure::Fetch { id, reason });
            }
            ViewState::Loading { .. } => {
                self.state = ViewState::ErrorGrid { reason };
            }
            _ => {
                debug!("Keeping current view after failed refresh: {}", reason);
            }
        }
        Vec::new()
    }

    fn select(&mut self, id: VideoId, store: &CatalogStore) -> Vec<Effect> {
        match self.state {
            ViewState::Player(current) if current == id => return Vec::new(),
            ViewState::Grid | ViewState::Player(_) => {}
            _ => {
                debug!("Ignoring selection of {} while {:?}", id, self.state);
                return Vec::new();
            }
        }

        if self.mode == PageMode::Catalog {
            return vec![Effect::OpenPlayer(id)];
        }

        let mut effects = vec![Effect::PushHistory(Some(id))];
        effects.extend(self.show(id, store));
        effects
    }

    fn go_home(&mut self, store: &CatalogStore) -> Vec<Effect> {
        match self.mode {
            PageMode::Player => vec![Effect::NavigateHome],
            PageMode::Catalog => Vec::new(),
            PageMode::Single => match self.state {
                ViewState::Grid
                | ViewState::ErrorGrid { .. }
                | ViewState::Loading { target: None }
                | ViewState::Initial => Vec::new(),
                _ => {
                    let mut effects = vec![Effect::PushHistory(None)];
                    effects.extend(self.show_grid(store));
                    effects
                }
            },
        }
    }

    /// Consuming an existing entry never pushes a new one
    fn popped(&mut self, selection: Option<VideoId>, store: &CatalogStore) -> Vec<Effect> {
        match (self.mode, selection) {
            (PageMode::Catalog, _) => {
                debug!("Catalog page ignores history pops");
                Vec::new()
            }
            (PageMode::Player, None) => vec![Effect::NavigateHome],
            (PageMode::Single, None) => self.show_grid(store),
            (_, Some(id)) if self.state == ViewState::Player(id) => Vec::new(),
            (_, Some(id)) => self.show(id, store),
        }
    }

    /// Fetch again for whatever the current view was trying to show
    fn reload(&mut self) -> Vec<Effect> {
        let target = match &self.state {
            ViewState::Grid | ViewState::ErrorGrid { .. } => None,
            ViewState::Player(id) => Some(*id),
            ViewState::ErrorPlayer(failure) => match failure.requested() {
                Some(id) => Some(id),
                None => return Vec::new(),
            },
            ViewState::Initial | ViewState::Loading { .. } => return Vec::new(),
        };

        self.load(target)
    }

    fn load(&mut self, target: Option<VideoId>) -> Vec<Effect> {
        self.state = ViewState::Loading { target };
        vec![Effect::Fetch]
    }

    fn show(&mut self, id: VideoId, store: &CatalogStore) -> Vec<Effect> {
        match resolve(id, store) {
            Resolution::Found(_) => {
                self.state = ViewState::Player(id);
                Vec::new()
            }
            Resolution::PendingFetch => self.load(Some(id)),
            Resolution::NotFound => {
                self.state = ViewState::ErrorPlayer(PlayerFailure::NotFound(id));
                Vec::new()
            }
        }
    }

    fn show_grid(&mut self, store: &CatalogStore) -> Vec<Effect> {
        if !store.is_loaded() {
            return self.load(None);
        }
        self.refresh_grid(store);
        self.state = ViewState::Grid;
        Vec::new()
    }

    fn refresh_grid(&mut self, store: &CatalogStore) {
        self.grid = sort_records(store.records(), self.sort, &mut self.rng)
            .into_iter()
            .map(|record| record.id)
            .collect();
    }

    /// Data the renderer needs for the current state
    pub fn screen<'a>(&'a self, store: &'a CatalogStore) -> Screen<'a> {
        match &self.state {
            ViewState::Initial => Screen::Blank,
            ViewState::Loading { target } => Screen::Loading { target: *target },
            ViewState::Grid => {
                let ordered: Vec<&VideoRecord> =
                    self.grid.iter().filter_map(|id| store.find(*id)).collect();
                let records = filter_records(ordered, &self.filter);
                Screen::Grid(GridView {
                    no_results: records.is_empty(),
                    records,
                    sort: self.sort,
                    filter: &self.filter,
                })
            }
            ViewState::Player(id) => match store.find(*id) {
                Some(record) => Screen::Player(PlayerView {
                    record,
                    related: related_to(*id, store.records(), self.related_limit),
                }),
                None => Screen::PlayerError(PlayerFailure::NotFound(*id)),
            },
            ViewState::ErrorGrid { reason } => Screen::GridError { reason },
            ViewState::ErrorPlayer(failure) => Screen::PlayerError(failure.clone()),
        }
    }
}

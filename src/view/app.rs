//! Page runtime
//!
//! Owns the catalog store, the coordinator and the tab's history, and turns
//! coordinator effects into work. Events are queued and handled one at a
//! time to completion; the only suspension point is an awaited fetch.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{CatalogSource, VideoId};
use crate::catalog::{CatalogStore, SortKey, DEFAULT_RELATED_LIMIT};

use super::coordinator::{Coordinator, Effect, Event, PageMode, Screen, ViewState};
use super::history::{raw_selection, with_selection, History, PopEvent, ID_PARAM};

/// Page addresses under the site root
#[derive(Debug, Clone)]
pub struct Routes {
    catalog: Url,
    player: Url,
}

impl Routes {
    pub const CATALOG_PAGE: &'static str = "index.html";
    pub const PLAYER_PAGE: &'static str = "video-player.html";

    pub fn new(site: &str) -> Result<Self> {
        let mut site = Url::parse(site).with_context(|| format!("Invalid site URL: {}", site))?;
        if !site.path().ends_with('/') {
            let path = format!("{}/", site.path());
            site.set_path(&path);
        }

        Ok(Self {
            catalog: site.join(Self::CATALOG_PAGE)?,
            player: site.join(Self::PLAYER_PAGE)?,
        })
    }

    pub fn catalog(&self) -> &Url {
        &self.catalog
    }

    pub fn player(&self, id: VideoId) -> Url {
        with_selection(&self.player, Some(id))
    }

    /// Address a page is opened with, carrying the raw `id` value untouched
    fn entry(&self, mode: PageMode, requested: Option<&str>) -> Url {
        let mut url = match mode {
            PageMode::Player => self.player.clone(),
            PageMode::Catalog | PageMode::Single => self.catalog.clone(),
        };
        if let Some(raw) = requested {
            url.query_pairs_mut().append_pair(ID_PARAM, raw);
        }
        url
    }

    fn is_player(&self, url: &Url) -> bool {
        url.path() == self.player.path()
    }
}

/// Per-page view preferences
#[derive(Debug, Clone, Copy)]
pub struct ViewSettings {
    pub sort: SortKey,
    pub related_limit: usize,
    /// Seed for the shuffle placeholder; random when unset
    pub seed: Option<u64>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            sort: SortKey::default(),
            related_limit: DEFAULT_RELATED_LIMIT,
            seed: None,
        }
    }
}

impl ViewSettings {
    fn coordinator(&self, mode: PageMode) -> Coordinator {
        let coordinator = Coordinator::new(mode)
            .with_sort(self.sort)
            .with_related_limit(self.related_limit);
        match self.seed {
            Some(seed) => coordinator.with_seed(seed),
            None => coordinator,
        }
    }
}

/// Things the front end should tell the user about
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Shared { title: Option<String>, link: Url },
    Navigated(Url),
    ConnectionLost,
    ConnectionRestored,
}

/// One browser tab: the current page plus its session history
pub struct App<S: ?Sized> {
    source: Arc<S>,
    routes: Routes,
    settings: ViewSettings,
    /// Catalog and player live on separate pages
    split_pages: bool,
    store: CatalogStore,
    coordinator: Coordinator,
    history: History,
    notices: Vec<Notice>,
}

impl<S> App<S>
where
    S: CatalogSource + ?Sized,
{
    /// Open `mode`'s page, with `requested` as the raw `id` query value
    pub fn new(
        source: Arc<S>,
        routes: Routes,
        settings: ViewSettings,
        mode: PageMode,
        requested: Option<&str>,
    ) -> Self {
        let history = History::new(routes.entry(mode, requested));

        Self {
            source,
            split_pages: mode != PageMode::Single,
            coordinator: settings.coordinator(mode),
            store: CatalogStore::new(),
            routes,
            settings,
            history,
            notices: Vec::new(),
        }
    }

    /// Run the page's initial load
    pub async fn start(&mut self) {
        let requested = raw_selection(self.history.location());
        self.dispatch(Event::Start { requested }).await;
    }

    pub fn mode(&self) -> PageMode {
        self.coordinator.mode()
    }

    pub fn state(&self) -> &ViewState {
        self.coordinator.state()
    }

    pub fn sort(&self) -> SortKey {
        self.coordinator.sort()
    }

    pub fn filter(&self) -> &str {
        self.coordinator.filter()
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn location(&self) -> &Url {
        self.history.location()
    }

    pub fn screen(&self) -> Screen<'_> {
        self.coordinator.screen(&self.store)
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Browser back button
    pub async fn back(&mut self) -> bool {
        match self.history.back() {
            Some(pop) => {
                self.popped(pop).await;
                true
            }
            None => false,
        }
    }

    /// Browser forward button
    pub async fn forward(&mut self) -> bool {
        match self.history.forward() {
            Some(pop) => {
                self.popped(pop).await;
                true
            }
            None => false,
        }
    }

    async fn popped(&mut self, pop: PopEvent) {
        let page = self.page_for(&pop.url);
        let event = if page == self.mode() {
            Event::HistoryPopped {
                selection: pop.selection,
            }
        } else {
            // the entry belongs to another document, which loads from scratch
            self.open_document(page);
            Event::Start {
                requested: raw_selection(&pop.url),
            }
        };

        // whatever the pop sets off consumes the entry instead of adding one
        self.run(event, true).await;
    }

    /// Feed one event through the coordinator and carry out its effects
    pub async fn dispatch(&mut self, event: Event) {
        self.run(event, false).await;
    }

    /// Drain the event queue. While `popping`, history is never pushed:
    /// pushes are dropped and redirects replace the current entry.
    async fn run(&mut self, event: Event, popping: bool) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            match event {
                Event::ConnectionLost => {
                    info!("Connection lost");
                    self.notices.push(Notice::ConnectionLost);
                }
                Event::ConnectionRestored => {
                    info!("Connection restored");
                    self.notices.push(Notice::ConnectionRestored);
                }
                _ => {}
            }

            let effects = self.coordinator.update(event, &self.store);
            self.perform(effects, popping, &mut queue).await;
        }
    }

    async fn perform(&mut self, effects: Vec<Effect>, popping: bool, queue: &mut VecDeque<Event>) {
        for effect in effects {
            match effect {
                Effect::Fetch => match self.store.load(self.source.as_ref()).await {
                    Ok(records) => {
                        info!("Loaded {} videos", records.len());
                        queue.push_back(Event::FetchSucceeded);
                    }
                    Err(e) => {
                        warn!("Failed to load videos: {}", e);
                        queue.push_back(Event::FetchFailed {
                            reason: e.to_string(),
                        });
                    }
                },
                Effect::PushHistory(selection) => {
                    if popping {
                        warn!("Refusing history push while handling a pop");
                        continue;
                    }
                    self.history.push_selection(selection);
                }
                Effect::OpenPlayer(id) => {
                    let url = self.routes.player(id);
                    self.redirect(PageMode::Player, url, popping, queue);
                    return;
                }
                Effect::NavigateHome => {
                    let url = self.routes.catalog().clone();
                    self.redirect(PageMode::Catalog, url, popping, queue);
                    return;
                }
                Effect::Share { title } => {
                    let link = self.history.location().clone();
                    debug!("Sharing {}", link);
                    self.notices.push(Notice::Shared { title, link });
                }
            }
        }
    }

    /// Leave the current document for `url`; pending work of the old page is dropped.
    ///
    /// A redirect reached through a pop replaces the entry being visited, so the
    /// rest of the stack, forward entries included, stays as it was.
    fn redirect(&mut self, mode: PageMode, url: Url, popping: bool, queue: &mut VecDeque<Event>) {
        info!("Navigating to {}", url);
        queue.clear();

        if popping {
            self.history.replace(url.clone());
        } else {
            self.history.navigate(url.clone());
        }
        self.open_document(mode);
        self.notices.push(Notice::Navigated(url.clone()));
        queue.push_back(Event::Start {
            requested: raw_selection(&url),
        });
    }

    /// A new document starts with an empty store and a fresh state machine
    fn open_document(&mut self, mode: PageMode) {
        debug!("Opening {:?} page", mode);
        self.store = CatalogStore::new();
        self.coordinator = self.settings.coordinator(mode);
    }

    fn page_for(&self, url: &Url) -> PageMode {
        if !self.split_pages {
            PageMode::Single
        } else if self.routes.is_player(url) {
            PageMode::Player
        } else {
            PageMode::Catalog
        }
    }
}

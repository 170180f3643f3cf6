//! Address bar and back/forward stack
//!
//! Emulates a browser tab's session history. Each entry remembers the
//! selection it was pushed with, so popping an entry hands the selection back
//! without re-parsing the address.

use tracing::debug;
use url::Url;

use crate::api::{SelectionError, VideoId};

/// Query parameter carrying the selection
pub const ID_PARAM: &str = "id";

/// One navigable frame of the session history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub url: Url,
    pub selection: Option<VideoId>,
}

/// Delivered when back/forward lands on an existing entry
#[derive(Debug, Clone, PartialEq)]
pub struct PopEvent {
    pub url: Url,
    pub selection: Option<VideoId>,
}

impl From<&HistoryEntry> for PopEvent {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            url: entry.url.clone(),
            selection: entry.selection,
        }
    }
}

/// Raw `id` query value of `url`, if present
pub fn raw_selection(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == ID_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Parsed selection of `url`; absence of the parameter means no selection
pub fn selection_from_url(url: &Url) -> Result<Option<VideoId>, SelectionError> {
    raw_selection(url).map(|raw| raw.parse()).transpose()
}

/// `url` with its query replaced by the selection, or removed for none
pub fn with_selection(url: &Url, selection: Option<VideoId>) -> Url {
    let mut url = url.clone();
    match selection {
        Some(id) => {
            url.query_pairs_mut()
                .clear()
                .append_pair(ID_PARAM, &id.to_string());
        }
        None => url.set_query(None),
    }
    url
}

/// Session history of one tab
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    /// Start a history whose first entry is `url`.
    ///
    /// The first entry carries the selection found in the address; a malformed
    /// id carries none.
    pub fn new(url: Url) -> Self {
        let selection = selection_from_url(&url).ok().flatten();
        Self {
            entries: vec![HistoryEntry { url, selection }],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    /// The address currently shown
    pub fn location(&self) -> &Url {
        &self.current().url
    }

    /// Number of entries in the stack, including forward entries
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Encode `selection` in the current page address and push one entry.
    ///
    /// Returns `false` without pushing when the address would not change.
    pub fn push_selection(&mut self, selection: Option<VideoId>) -> bool {
        let url = with_selection(self.location(), selection);
        self.push(HistoryEntry { url, selection })
    }

    /// Push an entry for a different document (a page-level redirect)
    pub fn navigate(&mut self, url: Url) -> bool {
        let selection = selection_from_url(&url).ok().flatten();
        self.push(HistoryEntry { url, selection })
    }

    /// Swap the current entry for `url`, keeping the cursor and every other entry
    pub fn replace(&mut self, url: Url) {
        let selection = selection_from_url(&url).ok().flatten();
        debug!("History replace {}", url);
        self.entries[self.cursor] = HistoryEntry { url, selection };
    }

    /// Step back one entry
    pub fn back(&mut self) -> Option<PopEvent> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        debug!("History back to {}", self.location());
        Some(PopEvent::from(self.current()))
    }

    /// Step forward one entry
    pub fn forward(&mut self) -> Option<PopEvent> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        debug!("History forward to {}", self.location());
        Some(PopEvent::from(self.current()))
    }

    fn push(&mut self, entry: HistoryEntry) -> bool {
        if entry.url == self.current().url {
            debug!("Skipping redundant history entry for {}", entry.url);
            return false;
        }

        // a new entry discards everything forward of the cursor
        self.entries.truncate(self.cursor + 1);
        debug!("History push {}", entry.url);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("http://localhost/index.html").unwrap()
    }

    #[test]
    fn test_initial_entry_carries_url_selection() {
        let history = History::new(Url::parse("http://localhost/video-player.html?id=5").unwrap());
        assert_eq!(history.current().selection, Some(VideoId(5)));
        assert_eq!(history.depth(), 1);

        let history = History::new(Url::parse("http://localhost/video-player.html?id=abc").unwrap());
        assert_eq!(history.current().selection, None);
    }

    #[test]
    fn test_push_selection_encodes_id() {
        let mut history = History::new(page());
        assert!(history.push_selection(Some(VideoId(2))));
        assert_eq!(history.location().as_str(), "http://localhost/index.html?id=2");
        assert_eq!(history.depth(), 2);

        assert!(history.push_selection(None));
        assert_eq!(history.location().as_str(), "http://localhost/index.html");
        assert_eq!(history.current().selection, None);
    }

    #[test]
    fn test_push_drops_other_query_parameters() {
        let mut history = History::new(Url::parse("http://localhost/index.html?utm=x&id=1").unwrap());
        history.push_selection(Some(VideoId(3)));
        assert_eq!(history.location().query(), Some("id=3"));
    }

    #[test]
    fn test_redundant_push_is_refused() {
        let mut history = History::new(page());
        assert!(history.push_selection(Some(VideoId(2))));
        assert!(!history.push_selection(Some(VideoId(2))));
        assert_eq!(history.depth(), 2);
    }

    #[test]
    fn test_back_and_forward_return_carried_selection() {
        let mut history = History::new(page());
        history.push_selection(Some(VideoId(2)));
        history.push_selection(Some(VideoId(3)));

        let pop = history.back().unwrap();
        assert_eq!(pop.selection, Some(VideoId(2)));
        let pop = history.back().unwrap();
        assert_eq!(pop.selection, None);
        assert!(history.back().is_none());

        let pop = history.forward().unwrap();
        assert_eq!(pop.selection, Some(VideoId(2)));
        assert_eq!(history.depth(), 3);
    }

    #[test]
    fn test_push_after_back_truncates_forward_entries() {
        let mut history = History::new(page());
        history.push_selection(Some(VideoId(2)));
        history.push_selection(Some(VideoId(3)));
        history.back();
        history.back();

        history.push_selection(Some(VideoId(7)));
        assert_eq!(history.depth(), 2);
        assert!(!history.can_go_forward());
        assert_eq!(history.back().unwrap().selection, None);
    }

    #[test]
    fn test_navigate_pushes_document_entry() {
        let mut history = History::new(page());
        let player = Url::parse("http://localhost/video-player.html?id=4").unwrap();
        assert!(history.navigate(player.clone()));
        assert_eq!(history.location(), &player);
        assert_eq!(history.current().selection, Some(VideoId(4)));
    }

    #[test]
    fn test_replace_keeps_depth_and_forward_entries() {
        let mut history = History::new(page());
        history.push_selection(Some(VideoId(2)));
        history.push_selection(Some(VideoId(3)));
        history.back();

        let player = Url::parse("http://localhost/video-player.html?id=2").unwrap();
        history.replace(player.clone());
        assert_eq!(history.location(), &player);
        assert_eq!(history.current().selection, Some(VideoId(2)));
        assert_eq!(history.depth(), 3);
        assert_eq!(history.position(), 1);
        assert_eq!(history.forward().unwrap().selection, Some(VideoId(3)));
    }

    #[test]
    fn test_selection_from_url() {
        let url = Url::parse("http://localhost/?id=12").unwrap();
        assert_eq!(selection_from_url(&url), Ok(Some(VideoId(12))));
        assert_eq!(selection_from_url(&page()), Ok(None));

        let url = Url::parse("http://localhost/?id=1e3").unwrap();
        assert!(selection_from_url(&url).is_err());
        assert_eq!(raw_selection(&url).as_deref(), Some("1e3"));
    }
}

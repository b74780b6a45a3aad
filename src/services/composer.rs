// snippet-service/src/services/composer.rs
//
// Insertion-matching engine for the email composer, kept independent of any
// UI toolkit. The inline picker watches a text buffer for an in-progress
// "/query" trigger; the modal picker offers the same filtering and
// navigation over the full candidate set without a trigger. All offsets are
// byte offsets into the buffer.
use crate::models::{Snippet, Status};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A slash followed by word characters or hyphens, anchored at the caret
    static ref TRIGGER_RE: Regex = Regex::new(r"/[\w-]*$").unwrap();
}

// An active trigger: the slash's offset (start of the replacement range)
// and the live query typed after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    pub start: usize,
    pub query: String,
}

// Scan the buffer up to the caret for a trigger sequence. Returns None when
// the caret does not sit on a char boundary or no "/word" run ends there.
pub fn detect_trigger(buffer: &str, caret: usize) -> Option<TriggerMatch> {
    let before = buffer.get(..caret)?;
    let found = TRIGGER_RE.find(before)?;

    Some(TriggerMatch {
        start: found.start(),
        query: before[found.start() + 1..].to_string(),
    })
}

// Result of confirming a candidate: the new buffer, the caret placed right
// after the inserted body, and the id to report to the usage tracker. The
// caller fires the track call without awaiting it; the buffer update is
// already complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    pub buffer: String,
    pub caret: usize,
    pub snippet_id: String,
}

// Replace buffer[start..end] with the body; caret lands after the body
fn splice(buffer: &str, start: usize, end: usize, body: &str) -> Option<(String, usize)> {
    let head = buffer.get(..start)?;
    let tail = buffer.get(end..)?;

    let mut out = String::with_capacity(head.len() + body.len() + tail.len());
    out.push_str(head);
    out.push_str(body);
    out.push_str(tail);

    Some((out, start + body.len()))
}

// The filtered candidate list shared by both pickers: published snippets
// whose name or shortcut contains the query as a case-insensitive
// substring, with a selection index reset whenever the list changes.
#[derive(Debug, Default)]
pub struct CandidateList {
    items: Vec<Snippet>,
    filtered: Vec<usize>,
    selected: usize,
    query: String,
}

impl CandidateList {
    pub fn new() -> Self {
        CandidateList::default()
    }

    // Replace the backing set. Only published snippets are eligible for
    // insertion; anything else in the fetch response is dropped here.
    pub fn set_items(&mut self, items: Vec<Snippet>) {
        self.items = items
            .into_iter()
            .filter(|snippet| snippet.status == Status::Published)
            .collect();
        self.refilter();
    }

    pub fn set_query(&mut self, query: &str) {
        if self.query != query {
            self.query = query.to_string();
            self.refilter();
        }
    }

    fn refilter(&mut self) {
        let query = self.query.to_lowercase();

        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, snippet)| {
                query.is_empty()
                    || snippet.name.to_lowercase().contains(&query)
                    || snippet
                        .shortcut
                        .as_ref()
                        .map_or(false, |shortcut| shortcut.to_lowercase().contains(&query))
            })
            .map(|(index, _)| index)
            .collect();

        // The filtered list changed, so the selection starts over
        self.selected = 0;
    }

    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    // Move the selection down, clamped to the end of the list
    pub fn move_down(&mut self) {
        if self.selected + 1 < self.filtered.len() {
            self.selected += 1;
        }
    }

    // Move the selection up, clamped to the start of the list
    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn selected(&self) -> Option<&Snippet> {
        self.get(self.selected)
    }

    pub fn get(&self, index: usize) -> Option<&Snippet> {
        self.filtered.get(index).and_then(|&i| self.items.get(i))
    }

    // The candidates currently shown, in order
    pub fn visible(&self) -> impl Iterator<Item = &Snippet> {
        self.filtered.iter().filter_map(|&i| self.items.get(i))
    }
}

// Inline slash-trigger picker. Feed it every text-change event via
// handle_input; when it asks for a fetch, deliver the result through
// complete_fetch with the same generation. Keystrokes keep filtering the
// last delivered candidate set while a fetch is outstanding, and a stale
// or post-dismissal fetch result is discarded rather than reopening the
// dropdown.
#[derive(Debug, Default)]
pub struct InlinePicker {
    list: CandidateList,
    buffer: String,
    caret: usize,
    trigger: Option<TriggerMatch>,
    generation: u64,
    open: bool,
}

impl InlinePicker {
    pub fn new() -> Self {
        InlinePicker::default()
    }

    // Process a text-change event. Returns Some(generation) when the picker
    // just became active and the caller should refetch published snippets.
    pub fn handle_input(&mut self, buffer: &str, caret: usize) -> Option<u64> {
        match detect_trigger(buffer, caret) {
            Some(trigger) => {
                let became_active = !self.open;
                self.open = true;
                self.buffer = buffer.to_string();
                self.caret = caret;
                self.list.set_query(&trigger.query);
                self.trigger = Some(trigger);

                if became_active {
                    self.generation += 1;
                    Some(self.generation)
                } else {
                    None
                }
            }
            None => {
                self.dismiss();
                None
            }
        }
    }

    // Deliver a completed candidate fetch. Results for an older generation,
    // or arriving after the trigger was dismissed, are dropped.
    pub fn complete_fetch(&mut self, generation: u64, items: Vec<Snippet>) {
        if !self.open || generation != self.generation {
            return;
        }

        self.list.set_items(items);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> Option<&str> {
        self.trigger.as_ref().map(|trigger| trigger.query.as_str())
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.list
    }

    pub fn move_down(&mut self) {
        if self.open {
            self.list.move_down();
        }
    }

    pub fn move_up(&mut self) {
        if self.open {
            self.list.move_up();
        }
    }

    // Confirm the keyboard selection: replaces the trigger span (slash
    // through caret) with the snippet body and closes the picker
    pub fn confirm(&mut self) -> Option<Insertion> {
        let index = self.list.selected_index();
        self.activate(index)
    }

    // Pointer activation of a visible candidate, bypassing the keyboard index
    pub fn select_at(&mut self, index: usize) -> Option<Insertion> {
        self.activate(index)
    }

    // Explicit dismiss: closes the list without mutating the buffer
    pub fn cancel(&mut self) {
        self.dismiss();
    }

    fn activate(&mut self, index: usize) -> Option<Insertion> {
        if !self.open {
            return None;
        }

        let snippet = self.list.get(index)?.clone();
        let trigger = self.trigger.as_ref()?;
        let (buffer, caret) = splice(&self.buffer, trigger.start, self.caret, &snippet.body)?;

        self.dismiss();

        Some(Insertion {
            buffer,
            caret,
            snippet_id: snippet.id,
        })
    }

    fn dismiss(&mut self) {
        self.open = false;
        self.trigger = None;
    }
}

// Modal picker: opened by an explicit user action, same filtering and
// navigation contract over the full fetched set, no trigger required.
// Confirming replaces the current selection range, or inserts at the caret
// when the range is empty.
#[derive(Debug, Default)]
pub struct ModalPicker {
    list: CandidateList,
    open: bool,
}

impl ModalPicker {
    pub fn new() -> Self {
        ModalPicker::default()
    }

    pub fn open(&mut self, items: Vec<Snippet>) {
        self.list.set_items(items);
        self.list.set_query("");
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_query(&mut self, query: &str) {
        self.list.set_query(query);
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.list
    }

    pub fn move_down(&mut self) {
        self.list.move_down();
    }

    pub fn move_up(&mut self) {
        self.list.move_up();
    }

    pub fn cancel(&mut self) {
        self.open = false;
    }

    // Replace buffer[sel_start..sel_end] with the selected snippet's body.
    // Pass sel_start == sel_end to insert at the caret.
    pub fn confirm_into(
        &mut self,
        buffer: &str,
        sel_start: usize,
        sel_end: usize,
    ) -> Option<Insertion> {
        let index = self.list.selected_index();
        self.activate_into(index, buffer, sel_start, sel_end)
    }

    pub fn select_at_into(
        &mut self,
        index: usize,
        buffer: &str,
        sel_start: usize,
        sel_end: usize,
    ) -> Option<Insertion> {
        self.activate_into(index, buffer, sel_start, sel_end)
    }

    fn activate_into(
        &mut self,
        index: usize,
        buffer: &str,
        sel_start: usize,
        sel_end: usize,
    ) -> Option<Insertion> {
        if !self.open || sel_start > sel_end {
            return None;
        }

        let snippet = self.list.get(index)?.clone();
        let (buffer, caret) = splice(buffer, sel_start, sel_end, &snippet.body)?;

        self.open = false;

        Some(Insertion {
            buffer,
            caret,
            snippet_id: snippet.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scope;
    use chrono::Utc;

    fn snippet(id: &str, name: &str, shortcut: Option<&str>, status: Status) -> Snippet {
        let now = Utc::now();
        Snippet {
            id: id.to_string(),
            name: name.to_string(),
            body: format!("{} body", name),
            shortcut: shortcut.map(|s| s.to_string()),
            category: None,
            owner_id: "owner".to_string(),
            scope: Scope::Org,
            status,
            version: 1,
            tags: None,
            usage_count: 0,
            last_used_at: None,
            created_at: now,
            updated_at: now,
            owner_name: None,
            owner_email: None,
        }
    }

    fn published(id: &str, name: &str, shortcut: Option<&str>) -> Snippet {
        snippet(id, name, shortcut, Status::Published)
    }

    #[test]
    fn detects_trigger_at_caret() {
        let found = detect_trigger("Hello /in", 9).unwrap();
        assert_eq!(found.start, 6);
        assert_eq!(found.query, "in");

        // Bare slash: empty query, trigger active
        let found = detect_trigger("Hello /", 7).unwrap();
        assert_eq!(found.start, 6);
        assert_eq!(found.query, "");

        // Hyphens are part of the query run
        let found = detect_trigger("/intro-demo", 11).unwrap();
        assert_eq!(found.start, 0);
        assert_eq!(found.query, "intro-demo");
    }

    #[test]
    fn no_trigger_without_slash_run_at_caret() {
        assert!(detect_trigger("Hello in", 8).is_none());
        // A space after the slash run breaks the suffix match
        assert!(detect_trigger("/intro now", 10).is_none());
        // Only the text before the caret counts
        assert!(detect_trigger("Hello /in", 5).is_none());
        // Caret inside a multi-byte character is not a valid offset
        assert!(detect_trigger("héllo /x", 2).is_none());
    }

    #[test]
    fn candidate_filtering_is_case_insensitive_over_name_and_shortcut() {
        let mut list = CandidateList::new();
        list.set_items(vec![
            published("1", "Intro - Product Demo", Some("/intro-demo")),
            published("2", "Follow-up", Some("/followup")),
            published("3", "Meeting Request", None),
        ]);

        list.set_query("INTRO");
        assert_eq!(list.len(), 1);
        assert_eq!(list.selected().unwrap().id, "1");

        // Shortcut matches too
        list.set_query("followup");
        assert_eq!(list.len(), 1);
        assert_eq!(list.selected().unwrap().id, "2");

        // Empty query shows everything
        list.set_query("");
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn only_published_snippets_are_candidates() {
        let mut list = CandidateList::new();
        list.set_items(vec![
            published("1", "Live", None),
            snippet("2", "Draft", None, Status::Draft),
            snippet("3", "Gone", None, Status::Archived),
        ]);

        assert_eq!(list.len(), 1);
        assert_eq!(list.selected().unwrap().id, "1");
    }

    #[test]
    fn selection_navigation_clamps_and_resets() {
        let mut list = CandidateList::new();
        list.set_items(vec![
            published("1", "Alpha", None),
            published("2", "Beta", None),
            published("3", "Alpine", None),
        ]);

        list.move_down();
        list.move_down();
        list.move_down(); // clamped at the last entry
        assert_eq!(list.selected_index(), 2);

        list.move_up();
        list.move_up();
        list.move_up(); // clamped at the first entry
        assert_eq!(list.selected_index(), 0);

        list.move_down();
        assert_eq!(list.selected_index(), 1);

        // Filter change resets the selection to the top
        list.set_query("al");
        assert_eq!(list.selected_index(), 0);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn inline_picker_confirm_replaces_trigger_span() {
        let mut picker = InlinePicker::new();

        let generation = picker.handle_input("Hello /in", 9).unwrap();
        picker.complete_fetch(
            generation,
            vec![{
                let mut s = published("1", "Intro", Some("/intro"));
                s.body = "Hi there".to_string();
                s
            }],
        );

        let insertion = picker.confirm().unwrap();
        assert_eq!(insertion.buffer, "Hello Hi there");
        assert_eq!(insertion.caret, 14);
        assert_eq!(insertion.snippet_id, "1");
        assert!(!picker.is_open());
    }

    #[test]
    fn inline_picker_refetches_only_when_becoming_active() {
        let mut picker = InlinePicker::new();

        assert!(picker.handle_input("/f", 2).is_some());
        // Still active: typing more characters filters locally, no refetch
        assert!(picker.handle_input("/fo", 3).is_none());
        assert_eq!(picker.query(), Some("fo"));

        // Dismissing and retriggering asks for a fresh fetch
        picker.handle_input("done ", 5);
        assert!(!picker.is_open());
        assert!(picker.handle_input("done /x", 7).is_some());
    }

    #[test]
    fn keystrokes_filter_last_fetched_set_while_fetch_outstanding() {
        let mut picker = InlinePicker::new();

        let generation = picker.handle_input("/", 1).unwrap();
        picker.complete_fetch(
            generation,
            vec![
                published("1", "Intro", None),
                published("2", "Follow-up", None),
            ],
        );

        // New fetch outstanding after reopen; the old set keeps serving
        picker.handle_input("x ", 2);
        let generation2 = picker.handle_input("x /fo", 5).unwrap();
        assert!(generation2 > generation);
        assert_eq!(picker.candidates().len(), 1);
        assert_eq!(picker.candidates().selected().unwrap().id, "2");
    }

    #[test]
    fn stale_fetch_results_are_discarded() {
        let mut picker = InlinePicker::new();

        let generation = picker.handle_input("/in", 3).unwrap();

        // Trigger dismissed before the fetch lands: the response must not
        // reopen the dropdown
        picker.handle_input("done", 4);
        picker.complete_fetch(generation, vec![published("1", "Intro", None)]);
        assert!(!picker.is_open());

        // Reopened with a newer generation: the old generation is ignored
        let generation2 = picker.handle_input("/in", 3).unwrap();
        picker.complete_fetch(generation, vec![published("stale", "Old", None)]);
        assert!(picker.candidates().is_empty());
        picker.complete_fetch(generation2, vec![published("fresh", "Intro", None)]);
        assert_eq!(picker.candidates().selected().unwrap().id, "fresh");
    }

    #[test]
    fn inline_picker_cancel_leaves_buffer_untouched() {
        let mut picker = InlinePicker::new();

        let generation = picker.handle_input("Hello /in", 9).unwrap();
        picker.complete_fetch(generation, vec![published("1", "Intro", None)]);

        picker.cancel();
        assert!(!picker.is_open());
        assert!(picker.confirm().is_none());
    }

    #[test]
    fn inline_picker_pointer_activation() {
        let mut picker = InlinePicker::new();

        let generation = picker.handle_input("Say /", 5).unwrap();
        picker.complete_fetch(
            generation,
            vec![
                published("1", "Alpha", None),
                {
                    let mut s = published("2", "Beta", None);
                    s.body = "beta!".to_string();
                    s
                },
            ],
        );

        // Click the second row without moving the keyboard selection
        let insertion = picker.select_at(1).unwrap();
        assert_eq!(insertion.buffer, "Say beta!");
        assert_eq!(insertion.snippet_id, "2");
    }

    #[test]
    fn modal_picker_replaces_selection_range() {
        let mut picker = ModalPicker::new();
        picker.open(vec![{
            let mut s = published("1", "Greeting", None);
            s.body = "Hi there".to_string();
            s
        }]);

        // Replace an explicit selection
        let insertion = picker.confirm_into("Hello world", 6, 11).unwrap();
        assert_eq!(insertion.buffer, "Hello Hi there");
        assert_eq!(insertion.caret, 14);
        assert!(!picker.is_open());

        // Empty range: insert at the caret
        picker.open(vec![{
            let mut s = published("1", "Greeting", None);
            s.body = "Hi".to_string();
            s
        }]);
        let insertion = picker.confirm_into("ab", 1, 1).unwrap();
        assert_eq!(insertion.buffer, "aHib");
        assert_eq!(insertion.caret, 3);
    }

    #[test]
    fn modal_picker_filters_like_inline() {
        let mut picker = ModalPicker::new();
        picker.open(vec![
            published("1", "Intro", None),
            published("2", "Follow-up", Some("/followup")),
        ]);

        picker.set_query("follow");
        assert_eq!(picker.candidates().len(), 1);

        picker.move_down(); // clamped, single entry
        let insertion = picker.confirm_into("", 0, 0).unwrap();
        assert_eq!(insertion.snippet_id, "2");
    }
}

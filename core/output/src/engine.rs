//! FILENAME: core/output/src/engine.rs
//! PURPOSE: Output engines and the stack that holds them.
//! CONTEXT: Procedures submit items to the current engine, which routes
//! each one to its drivers. Consecutive text items are merged before they
//! are routed. Items submitted while a group is open become children of
//! that group and reach the drivers when the outermost group closes.
//!
//! Architecture:
//! - `Engine` - drivers, the deferred text slot, open groups, headings
//! - `OutputStack` - nested engines; the innermost receives all output
//! - routing: each driver sees the subset of an item tree its device type
//!   and visibility policy select

use crate::driver::Driver;
use crate::item::{ItemKind, OutputItem, TextSubtype};
use crate::message::Severity;
use pivot_table::{settings, OutputDevices, OutputType, Settings};
use rustc_hash::FxHashMap;

// ============================================================================
// ROUTING
// ============================================================================

/// The routing class of `item`.
pub fn output_type(item: &OutputItem) -> OutputType {
    match &item.kind {
        ItemKind::Message(d) if d.severity == Severity::Note => OutputType::Note,
        ItemKind::Message(_) => OutputType::Error,
        ItemKind::Text {
            subtype: TextSubtype::Syntax,
            ..
        } => OutputType::Syntax,
        _ => OutputType::Result,
    }
}

fn should_show(item: &OutputItem, driver: &dyn Driver, settings: &Settings) -> bool {
    settings
        .output_routing(output_type(item))
        .intersects(driver.device_type())
}

/// Adds to `parent` the parts of `item` that `driver` should receive.
/// Groups are kept whole for drivers that handle them and flattened for the
/// rest.
fn add_driver_subset(item: &OutputItem, driver: &dyn Driver, settings: &Settings, parent: &mut OutputItem) {
    if item.is_group() {
        if should_show(item, driver, settings) && driver.handles_groups() {
            let mut group = item.clone_empty();
            for child in item.children() {
                add_driver_subset(child, driver, settings, &mut group);
            }
            parent.add_child(group);
        } else {
            for child in item.children() {
                add_driver_subset(child, driver, settings, parent);
            }
        }
    } else if should_show(item, driver, settings) && (item.show || driver.handles_show()) {
        parent.add_child(item.clone());
    }
}

/// The items of `item` that `driver` should receive, in order.
pub fn driver_output_subset(item: &OutputItem, driver: &dyn Driver) -> Vec<OutputItem> {
    let mut root = OutputItem::group(None);
    add_driver_subset(item, driver, &settings(), &mut root);
    match root.kind {
        ItemKind::Group(children) => children,
        _ => Vec::new(),
    }
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct Engine {
    drivers: Vec<Box<dyn Driver>>,
    /// At most one text item waiting to absorb the texts that follow it.
    deferred_text: Option<OutputItem>,
    /// Open groups, outermost first.
    groups: Vec<OutputItem>,
    title: Option<String>,
    subtitle: Option<String>,
    heading_vars: FxHashMap<String, String>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// An engine with no drivers. The `Date` and `Time` heading variables
    /// hold the current local date and time.
    pub fn new() -> Self {
        let now = chrono::Local::now();
        let mut heading_vars = FxHashMap::default();
        heading_vars.insert("Date".to_string(), now.format("%x").to_string());
        heading_vars.insert("Time".to_string(), now.format("%X").to_string());
        Engine {
            drivers: Vec::new(),
            deferred_text: None,
            groups: Vec::new(),
            title: None,
            subtitle: None,
            heading_vars,
        }
    }

    pub fn register(&mut self, driver: Box<dyn Driver>) {
        log::debug!("registered {} driver", driver.name());
        self.drivers.push(driver);
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn drivers(&self) -> impl Iterator<Item = &dyn Driver> + '_ {
        self.drivers.iter().map(|d| d.as_ref())
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    pub fn submit(&mut self, item: OutputItem) {
        if item.text_subtype().is_some() {
            self.defer_text(item);
            return;
        }
        self.flush_deferred_text();
        self.submit_now(item);
    }

    fn defer_text(&mut self, item: OutputItem) {
        match &mut self.deferred_text {
            None => self.deferred_text = Some(item),
            Some(deferred) => {
                if !deferred.append_text(&item) {
                    self.flush_deferred_text();
                    self.deferred_text = Some(item);
                }
            }
        }
    }

    fn flush_deferred_text(&mut self) {
        if let Some(text) = self.deferred_text.take() {
            self.submit_now(text);
        }
    }

    /// Adds `item` to the innermost open group, or routes it to the drivers
    /// if there is none.
    fn submit_now(&mut self, item: OutputItem) {
        if let Some(group) = self.groups.last_mut() {
            group.add_child(item);
            return;
        }
        for driver in &mut self.drivers {
            for child in driver_output_subset(&item, driver.as_ref()) {
                driver.submit(&child);
            }
        }
    }

    /// Submits any deferred text and flushes terminal drivers.
    pub fn flush(&mut self) {
        self.flush_deferred_text();
        for driver in &mut self.drivers {
            if driver.device_type().intersects(OutputDevices::TERMINAL) {
                driver.flush();
            }
        }
    }

    // ------------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------------

    /// Opens `group`, which must be a group item, and returns its nesting
    /// level for `close_groups`.
    pub fn open_group(&mut self, group: OutputItem) -> usize {
        assert!(group.is_group(), "open_group on a {} item", group.label());
        self.groups.push(group);
        self.groups.len() - 1
    }

    /// Closes groups until only `level` remain open. A closed group joins
    /// its parent, or goes to the drivers if it was outermost.
    pub fn close_groups(&mut self, level: usize) {
        while self.groups.len() > level {
            self.flush_deferred_text();
            let Some(group) = self.groups.pop() else {
                break;
            };
            self.submit_now(group);
        }
    }

    pub fn group_depth(&self) -> usize {
        self.groups.len()
    }

    /// The command name of the innermost open group that has one.
    pub fn command_name(&self) -> Option<&str> {
        self.groups.iter().rev().find_map(|g| g.command_name.as_deref())
    }

    // ------------------------------------------------------------------------
    // Titles and headings
    // ------------------------------------------------------------------------

    pub fn set_title(&mut self, title: Option<&str>) {
        self.title = title.map(str::to_string);
        self.submit_page_title();
    }

    pub fn set_subtitle(&mut self, subtitle: Option<&str>) {
        self.subtitle = subtitle.map(str::to_string);
        self.submit_page_title();
    }

    /// The title and subtitle on separate lines, or whichever is set.
    pub fn page_title(&self) -> String {
        match (&self.title, &self.subtitle) {
            (Some(title), Some(subtitle)) => format!("{}\n{}", title, subtitle),
            (Some(title), None) => title.clone(),
            (None, Some(subtitle)) => subtitle.clone(),
            (None, None) => String::new(),
        }
    }

    fn submit_page_title(&mut self) {
        let text = self.page_title();
        self.submit(OutputItem::text(TextSubtype::PageTitle, text));
    }

    pub fn output_log(&mut self, text: impl Into<String>) {
        self.submit(OutputItem::text(TextSubtype::Log, text));
    }

    pub fn heading_var(&self, name: &str) -> Option<&str> {
        self.heading_vars.get(name).map(String::as_str)
    }

    pub fn set_filename(&mut self, file_name: &str) {
        self.heading_vars
            .insert("Filename".to_string(), file_name.to_string());
    }
}

/// Dropping an engine discards deferred text and open groups without
/// delivering them; only output already routed reaches the drivers.
impl Drop for Engine {
    fn drop(&mut self) {
        if self.deferred_text.is_some() || !self.groups.is_empty() {
            log::debug!(
                "discarding {} open group(s) and {} deferred text item(s)",
                self.groups.len(),
                usize::from(self.deferred_text.is_some())
            );
        }
    }
}

// ============================================================================
// STACK
// ============================================================================

/// Nested engines. Output goes to the innermost; with no engine at all it
/// is discarded.
pub struct OutputStack {
    engines: Vec<Engine>,
}

impl Default for OutputStack {
    fn default() -> Self {
        OutputStack::new()
    }
}

impl OutputStack {
    /// A stack holding one engine.
    pub fn new() -> Self {
        OutputStack {
            engines: vec![Engine::new()],
        }
    }

    pub fn push(&mut self) {
        self.engines.push(Engine::new());
    }

    /// Removes the innermost engine. Dropping it closes its drivers and
    /// discards any output it has not yet routed.
    pub fn pop(&mut self) -> Option<Engine> {
        self.engines.pop()
    }

    pub fn depth(&self) -> usize {
        self.engines.len()
    }

    pub fn current(&self) -> Option<&Engine> {
        self.engines.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Engine> {
        self.engines.last_mut()
    }

    pub fn register(&mut self, driver: Box<dyn Driver>) {
        if let Some(engine) = self.current_mut() {
            engine.register(driver);
        }
    }

    pub fn submit(&mut self, item: OutputItem) {
        if let Some(engine) = self.current_mut() {
            engine.submit(item);
        }
    }

    pub fn flush(&mut self) {
        if let Some(engine) = self.current_mut() {
            engine.flush();
        }
    }

    pub fn open_group(&mut self, group: OutputItem) -> usize {
        self.current_mut().map_or(0, |e| e.open_group(group))
    }

    pub fn close_groups(&mut self, level: usize) {
        if let Some(engine) = self.current_mut() {
            engine.close_groups(level);
        }
    }

    pub fn group_depth(&self) -> usize {
        self.current().map_or(0, Engine::group_depth)
    }

    pub fn command_name(&self) -> Option<&str> {
        self.current().and_then(Engine::command_name)
    }

    pub fn set_title(&mut self, title: Option<&str>) {
        if let Some(engine) = self.current_mut() {
            engine.set_title(title);
        }
    }

    pub fn set_subtitle(&mut self, subtitle: Option<&str>) {
        if let Some(engine) = self.current_mut() {
            engine.set_subtitle(subtitle);
        }
    }

    pub fn output_log(&mut self, text: impl Into<String>) {
        if let Some(engine) = self.current_mut() {
            engine.output_log(text);
        }
    }

    pub fn set_filename(&mut self, file_name: &str) {
        if let Some(engine) = self.current_mut() {
            engine.set_filename(file_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Diagnostic;
    use pivot_table::{PivotTable, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records a one-line summary of every item it receives.
    struct Recorder {
        log: Log,
        groups: bool,
        show: bool,
        flushes: Rc<RefCell<usize>>,
    }

    impl Recorder {
        fn new(groups: bool, show: bool) -> (Self, Log) {
            let log = Log::default();
            let recorder = Recorder {
                log: log.clone(),
                groups,
                show,
                flushes: Rc::default(),
            };
            (recorder, log)
        }
    }

    fn describe(item: &OutputItem) -> String {
        match &item.kind {
            ItemKind::Group(children) => {
                let inner: Vec<String> = children.iter().map(describe).collect();
                format!("{}[{}]", item.label(), inner.join(", "))
            }
            ItemKind::Text { .. } => format!("{}:{}", item.label(), item.plain_text()),
            _ => item.label(),
        }
    }

    impl Driver for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn device_type(&self) -> OutputDevices {
            OutputDevices::TERMINAL
        }

        fn handles_groups(&self) -> bool {
            self.groups
        }

        fn handles_show(&self) -> bool {
            self.show
        }

        fn submit(&mut self, item: &OutputItem) {
            self.log.borrow_mut().push(describe(item));
        }

        fn flush(&mut self) {
            *self.flushes.borrow_mut() += 1;
        }
    }

    fn engine_with(groups: bool, show: bool) -> (Engine, Log) {
        let mut engine = Engine::new();
        let (recorder, log) = Recorder::new(groups, show);
        engine.register(Box::new(recorder));
        (engine, log)
    }

    #[test]
    fn test_consecutive_titles_merge() {
        let (mut engine, log) = engine_with(false, false);
        engine.submit(OutputItem::text(TextSubtype::Title, "one"));
        engine.submit(OutputItem::text(TextSubtype::Title, "two"));
        assert!(log.borrow().is_empty());
        engine.flush();
        assert_eq!(*log.borrow(), vec!["Title:one\ntwo"]);
    }

    #[test]
    fn test_title_then_log_flushes_title() {
        let (mut engine, log) = engine_with(false, false);
        engine.submit(OutputItem::text(TextSubtype::Title, "heading"));
        engine.output_log("details");
        assert_eq!(*log.borrow(), vec!["Title:heading"]);
        engine.submit(OutputItem::page_break());
        assert_eq!(
            *log.borrow(),
            vec!["Title:heading", "Log:details", "Page Break"]
        );
    }

    #[test]
    fn test_group_delivered_on_close() {
        let (mut engine, log) = engine_with(true, false);
        let level = engine.open_group(OutputItem::group(Some("FREQUENCIES".into())));
        assert_eq!(level, 0);
        engine.submit(OutputItem::table(PivotTable::new(Value::text("Counts"))));
        engine.open_group(OutputItem::group(Some("CHART".into())));
        assert_eq!(engine.command_name(), Some("CHART"));
        engine.submit(OutputItem::page_break());
        assert!(log.borrow().is_empty());

        engine.close_groups(level);
        assert_eq!(engine.group_depth(), 0);
        assert_eq!(
            *log.borrow(),
            vec!["FREQUENCIES[Counts, CHART[Page Break]]"]
        );
    }

    #[test]
    fn test_groups_flattened_for_simple_drivers() {
        let (mut engine, log) = engine_with(false, false);
        engine.open_group(OutputItem::group(Some("LIST".into())));
        engine.submit(OutputItem::page_break());
        engine.submit(OutputItem::message(Diagnostic::warning("careful")));
        engine.close_groups(0);
        assert_eq!(*log.borrow(), vec!["Page Break", "Warning"]);
    }

    #[test]
    fn test_deferred_text_flushed_into_group() {
        let (mut engine, log) = engine_with(true, false);
        let level = engine.open_group(OutputItem::group(Some("ECHO".into())));
        engine.output_log("hello");
        engine.close_groups(level);
        assert_eq!(*log.borrow(), vec!["ECHO[Log:hello]"]);
    }

    #[test]
    fn test_hidden_items_need_handles_show() {
        let hidden = || OutputItem::page_break().with_show(false);

        let (mut engine, log) = engine_with(false, false);
        engine.submit(hidden());
        assert!(log.borrow().is_empty());

        let (mut engine, log) = engine_with(false, true);
        engine.submit(hidden());
        assert_eq!(*log.borrow(), vec!["Page Break"]);
    }

    #[test]
    fn test_page_title() {
        let (mut engine, log) = engine_with(false, false);
        engine.set_title(Some("Survey"));
        engine.set_subtitle(Some("Wave 2"));
        assert_eq!(engine.page_title(), "Survey\nWave 2");
        engine.flush();
        // Page titles never merge, so the first was flushed by the second.
        assert_eq!(
            *log.borrow(),
            vec!["Page Title:Survey", "Page Title:Survey\nWave 2"]
        );
        engine.set_title(None);
        assert_eq!(engine.page_title(), "Wave 2");
    }

    #[test]
    fn test_heading_vars() {
        let mut engine = Engine::new();
        assert!(engine.heading_var("Date").is_some());
        assert!(engine.heading_var("Time").is_some());
        assert_eq!(engine.heading_var("Filename"), None);
        engine.set_filename("survey.sps");
        assert_eq!(engine.heading_var("Filename"), Some("survey.sps"));
    }

    #[test]
    fn test_flush_reaches_terminal_drivers() {
        let mut engine = Engine::new();
        let (recorder, _log) = Recorder::new(false, false);
        let flushes = recorder.flushes.clone();
        engine.register(Box::new(recorder));
        engine.flush();
        assert_eq!(*flushes.borrow(), 1);
    }

    #[test]
    fn test_stack_routes_to_innermost() {
        let mut stack = OutputStack::new();
        let (outer, outer_log) = Recorder::new(false, false);
        stack.register(Box::new(outer));
        stack.push();
        let (inner, inner_log) = Recorder::new(false, false);
        stack.register(Box::new(inner));

        stack.submit(OutputItem::page_break());
        assert_eq!(inner_log.borrow().len(), 1);
        assert!(outer_log.borrow().is_empty());

        stack.output_log("pending");
        stack.open_group(OutputItem::group(None));
        stack.submit(OutputItem::page_break());
        drop(stack.pop());
        assert_eq!(*inner_log.borrow(), vec!["Page Break"]);
        assert!(outer_log.borrow().is_empty());

        stack.submit(OutputItem::page_break());
        assert_eq!(outer_log.borrow().len(), 1);

        drop(stack.pop());
        assert_eq!(stack.depth(), 0);
        stack.submit(OutputItem::page_break());
        assert_eq!(stack.open_group(OutputItem::group(None)), 0);
        assert_eq!(stack.command_name(), None);
    }
}

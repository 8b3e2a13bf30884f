//! The grid orchestrator.
//!
//! [`Grid`] owns every piece of grid state and turns [`Action`]s into
//! [`Patch`]es. Each action maps to an [`UpdateScope`]; the grid rebuilds only
//! that scope. Debounced input and animation-frame work goes through a
//! [`Scheduler`] driven by the host's clock.
//!
//! ```
//! use std::time::Instant;
//! use lumina::{Action, Grid, HeadlessSurface, WidgetPayload};
//!
//! let payload = WidgetPayload::from_json(
//!     r#"{"data": [["b", 2], ["a", 1]], "columns": ["name", "val"]}"#,
//! )
//! .unwrap();
//! let mut grid = Grid::new(payload).unwrap();
//! let mut surface = HeadlessSurface::default();
//!
//! let patch = grid.dispatch(Action::ToggleSort("val".into()), &mut surface, Instant::now());
//! assert_eq!(patch.body().unwrap().rows[0].cells[0].html, "a");
//! ```

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Instant;

use serde::Serialize;

use crate::config::GridOptions;
use crate::config::WidgetPayload;
use crate::error::ConfigError;
use crate::error::ExportError;
use crate::export::ExportFile;
use crate::export::ExportFormat;
use crate::export::ExportPlan;
use crate::export::ExportScope;
use crate::export::Exporter;
use crate::export::Exclusions;
use crate::export::base_name;
use crate::focus::FocusTracker;
use crate::focus::FocusedInput;
use crate::focus::InputFocus;
use crate::focus::InputTarget;
use crate::format::FormattingEngine;
use crate::format::Highlighter;
use crate::format::RowFormat;
use crate::format::RuleEdit;
use crate::format::RuleSet;
use crate::host::HostBridge;
use crate::host::NullBridge;
use crate::host::selection_channel;
use crate::host::selection_payload;
use crate::model::CellValue;
use crate::model::Dataset;
use crate::model::RowId;
use crate::overlay::OverlayEvent;
use crate::overlay::OverlayState;
use crate::query::FilterSortEngine;
use crate::query::FilterState;
use crate::query::OrderedRows;
use crate::query::Query;
use crate::query::SortState;
use crate::render::BodyFrame;
use crate::render::ChromeFrame;
use crate::render::FooterFrame;
use crate::render::GridFrame;
use crate::render::HeaderCell;
use crate::render::HeaderFrame;
use crate::render::Patch;
use crate::render::RenderedCell;
use crate::render::RenderedRow;
use crate::render::SortBadge;
use crate::render::SortHighlight;
use crate::schedule::DebounceSlot;
use crate::schedule::FrameTask;
use crate::schedule::Scheduler;
use crate::selection::Modifiers;
use crate::selection::SelectionManager;
use crate::view::ColumnToggle;
use crate::view::ColumnVisibility;
use crate::view::Pager;
use crate::view::Summary;
use crate::view::ViewState;
use crate::view::VirtualViewport;
use crate::view::WindowMode;
use crate::view::slice;

/// Host message that clears the selection.
pub const RESET_SELECTION_MESSAGE: &str = "lumina-reset-selection";

/// Unique identifier of a grid instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridId(usize);

impl GridId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__lumina_{}", self.0)
    }
}

/// A user or host action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Search(String),
    ColumnFilter { column: String, term: String },
    ClearFilters,
    ToggleSort(String),
    GoToPage(usize),
    NextPage,
    PreviousPage,
    SetRowsPerPage(usize),
    ActivateRow { id: RowId, modifiers: Modifiers },
    ClearSelection,
    HideSelected,
    UnhideAll,
    ToggleColumn(String),
    ResetColumns,
    EditRule { index: usize, edit: RuleEdit },
    ResetRules,
    SetTheme(String),
    ToggleFullscreen,
    ToggleMinimized,
    Overlay(OverlayEvent),
    /// The viewport scrolled.
    Scroll,
}

impl Action {
    /// Maps a host message to an action.
    pub fn from_host_message(message: &str) -> Option<Action> {
        match message {
            RESET_SELECTION_MESSAGE => Some(Action::ClearSelection),
            _ => None,
        }
    }

    /// The text input this action is typed into, if any.
    fn input_target(&self) -> Option<InputTarget> {
        match self {
            Action::Search(_) => Some(InputTarget::Search),
            Action::ColumnFilter { column, .. } => Some(InputTarget::ColumnFilter(column.clone())),
            _ => None,
        }
    }
}

/// How much of the rendered grid an update touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UpdateScope {
    None,
    /// Outer chrome only.
    Chrome,
    /// Body rows only; row set and order are unchanged.
    Body,
    /// Header, body and footer; the chrome stays.
    TableAndFooter,
    Full,
}

impl UpdateScope {
    /// The scope an action needs when it changes something.
    pub fn for_action(action: &Action) -> Self {
        match action {
            Action::ToggleColumn(_)
            | Action::ResetColumns
            | Action::SetRowsPerPage(_)
            | Action::SetTheme(_) => UpdateScope::Full,
            Action::Search(_)
            | Action::ColumnFilter { .. }
            | Action::ClearFilters
            | Action::ToggleSort(_)
            | Action::GoToPage(_)
            | Action::NextPage
            | Action::PreviousPage
            | Action::ActivateRow { .. }
            | Action::ClearSelection
            | Action::HideSelected
            | Action::UnhideAll => UpdateScope::TableAndFooter,
            Action::EditRule { .. } | Action::ResetRules | Action::Scroll => UpdateScope::Body,
            Action::ToggleFullscreen | Action::ToggleMinimized | Action::Overlay(_) => {
                UpdateScope::Chrome
            }
        }
    }

    /// Smallest scope covering both.
    pub fn merge(self, other: UpdateScope) -> UpdateScope {
        match (self, other) {
            (UpdateScope::Chrome, UpdateScope::Body | UpdateScope::TableAndFooter)
            | (UpdateScope::Body | UpdateScope::TableAndFooter, UpdateScope::Chrome) => {
                UpdateScope::Full
            }
            (a, b) => a.max(b),
        }
    }

    pub fn rebuilds_table(self) -> bool {
        matches!(
            self,
            UpdateScope::Body | UpdateScope::TableAndFooter | UpdateScope::Full
        )
    }
}

/// The viewport hosting a grid.
pub trait Surface: InputFocus {
    /// Vertical scroll offset in pixels.
    fn scroll_top(&self) -> f64;

    /// Viewport height in pixels, zero when unknown.
    fn viewport_height(&self) -> f64;
}

/// In-memory surface for hosts without a real viewport.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub focused: Option<FocusedInput>,
    /// Text of every rendered input.
    pub inputs: HashMap<InputTarget, String>,
}

impl HeadlessSurface {
    /// Sets an input's text and focuses it with the cursor at the end.
    pub fn type_into(&mut self, target: InputTarget, text: &str) {
        let cursor = text.chars().count();
        self.inputs.insert(target.clone(), text.to_string());
        self.focused = Some(FocusedInput { target, cursor });
    }

    /// Syncs input texts from a patch.
    pub fn apply(&mut self, patch: &Patch) {
        if let Some(chrome) = patch.chrome() {
            match &chrome.search {
                Some(text) => {
                    self.inputs.insert(InputTarget::Search, text.clone());
                }
                None => {
                    self.inputs.remove(&InputTarget::Search);
                }
            }
        }
        if let Some(header) = patch.header() {
            self.inputs.retain(|t, _| !matches!(t, InputTarget::ColumnFilter(_)));
            for cell in &header.columns {
                if let Some(text) = &cell.filter {
                    self.inputs
                        .insert(InputTarget::ColumnFilter(cell.name.clone()), text.clone());
                }
            }
        }
    }
}

impl InputFocus for HeadlessSurface {
    fn focused_input(&self) -> Option<FocusedInput> {
        self.focused.clone()
    }

    fn input_len(&self, target: &InputTarget) -> Option<usize> {
        self.inputs.get(target).map(|t| t.chars().count())
    }

    fn focus_input(&mut self, target: &InputTarget, cursor: usize) -> bool {
        if !self.inputs.contains_key(target) {
            return false;
        }
        self.focused = Some(FocusedInput {
            target: target.clone(),
            cursor,
        });
        true
    }
}

impl Surface for HeadlessSurface {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }
}

/// Filter, sort and page state forwarded to an external data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteQuery {
    pub search: String,
    pub column_filters: BTreeMap<String, String>,
    pub sort: SortState,
    pub page: usize,
    pub rows_per_page: usize,
}

#[derive(Debug, Clone, Default)]
struct ChromeState {
    theme: String,
    fullscreen: bool,
    minimized: bool,
    minimized_before_search: bool,
}

/// A data grid.
pub struct Grid {
    id: GridId,
    options: GridOptions,
    dataset: Dataset,
    columns: ColumnVisibility,
    filter: FilterState,
    search_input: String,
    /// Column-filter text typed but not yet applied.
    filter_inputs: BTreeMap<String, String>,
    sort: SortState,
    view: ViewState,
    selection: SelectionManager,
    engine: FilterSortEngine,
    formatting: FormattingEngine,
    scheduler: Scheduler<String>,
    focus: FocusTracker,
    overlay: OverlayState,
    chrome: ChromeState,
    bridge: Box<dyn HostBridge>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("id", &self.id)
            .field("rows", &self.dataset.len())
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}

impl Grid {
    /// Builds a grid from a widget payload.
    pub fn new(payload: WidgetPayload) -> Result<Self, ConfigError> {
        let options = payload.config.resolve();
        let dataset = Dataset::load(payload.columns, options.html_columns.clone(), payload.data)?;
        Ok(Self::from_parts(dataset, options))
    }

    /// Builds a grid over an already loaded dataset.
    pub fn from_parts(dataset: Dataset, options: GridOptions) -> Self {
        let id = GridId::new();
        let columns = ColumnVisibility::new(
            dataset.columns(),
            options.column_view.visible_columns.as_deref(),
        );
        let rules = RuleSet::from_values(&options.rules, options.rules_editable);
        let formatting = FormattingEngine::new(&dataset, options.heatmap.clone(), rules);
        log::info!(
            "grid {} ready: {} rows, {} columns, {:?} pipeline",
            id,
            dataset.len(),
            dataset.columns().len(),
            options.pipeline_mode
        );
        Self {
            id,
            columns,
            filter: FilterState::default(),
            search_input: String::new(),
            filter_inputs: BTreeMap::new(),
            sort: SortState::default(),
            view: ViewState::new(options.rows_per_page),
            selection: SelectionManager::new(options.selection_enabled, options.selection_mode),
            engine: FilterSortEngine::new(options.pipeline_mode),
            formatting,
            scheduler: Scheduler::new(),
            focus: FocusTracker::default(),
            overlay: OverlayState::default(),
            chrome: ChromeState {
                theme: options.theme.clone(),
                ..ChromeState::default()
            },
            bridge: Box::new(NullBridge),
            dataset,
            options,
        }
    }

    /// Routes selection reports to `bridge`.
    pub fn with_bridge(mut self, bridge: Box<dyn HostBridge>) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn id(&self) -> GridId {
        self.id
    }

    /// Configured element id, or the grid id when none was given.
    pub fn element_id(&self) -> String {
        if self.options.element_id.is_empty() {
            self.id.to_string()
        } else {
            self.options.element_id.clone()
        }
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn columns(&self) -> &ColumnVisibility {
        &self.columns
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn formatting(&self) -> &FormattingEngine {
        &self.formatting
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn scheduler(&self) -> &Scheduler<String> {
        &self.scheduler
    }

    pub fn is_fullscreen(&self) -> bool {
        self.chrome.fullscreen
    }

    pub fn is_minimized(&self) -> bool {
        self.chrome.minimized
    }

    /// Display order, recomputed if stale.
    pub fn ordered(&mut self) -> &OrderedRows {
        let query = Query {
            filter: &self.filter,
            sort: &self.sort,
            hidden: self.selection.hidden(),
            visible_columns: self.columns.visible(),
        };
        self.engine.refresh(&self.dataset, query)
    }

    pub fn ordered_ids(&mut self) -> Vec<RowId> {
        self.ordered().ids().to_vec()
    }

    /// State to forward when an external source owns filtering and sorting.
    pub fn remote_query(&self) -> RemoteQuery {
        RemoteQuery {
            search: self.filter.search().to_string(),
            column_filters: self
                .filter
                .columns()
                .map(|(c, t)| (c.to_string(), t.to_string()))
                .collect(),
            sort: self.sort.clone(),
            page: self.view.page(),
            rows_per_page: self.view.rows_per_page(),
        }
    }

    /// Renders everything.
    pub fn render(&mut self, surface: &dyn Surface) -> Patch {
        self.build(UpdateScope::Full, surface)
    }

    /// Applies an action and returns what to rebuild.
    pub fn dispatch(&mut self, action: Action, surface: &mut dyn Surface, now: Instant) -> Patch {
        log::debug!("grid {}: {:?}", self.id, action);
        let target = action.input_target();
        let scope = self.apply(action, now);
        self.commit(scope, target.as_ref(), surface)
    }

    /// Handles a message from the embedding application.
    pub fn handle_host_message(
        &mut self,
        message: &str,
        surface: &mut dyn Surface,
        now: Instant,
    ) -> Patch {
        match Action::from_host_message(message) {
            Some(action) => self.dispatch(action, surface, now),
            None => {
                log::warn!("grid {}: unknown host message {:?}", self.id, message);
                Patch::Nothing
            }
        }
    }

    /// Applies debounced input whose delay has elapsed.
    pub fn tick(&mut self, now: Instant, surface: &mut dyn Surface) -> Patch {
        let due = self.scheduler.due(now);
        if due.is_empty() {
            return Patch::Nothing;
        }
        let mut scope = UpdateScope::None;
        let mut target = None;
        for (slot, term) in due {
            let applied = match slot {
                DebounceSlot::Search => {
                    target = Some(InputTarget::Search);
                    self.apply_search(&term)
                }
                DebounceSlot::ColumnFilter(column) => {
                    target = Some(InputTarget::ColumnFilter(column.clone()));
                    self.apply_column_filter(column, &term)
                }
            };
            scope = scope.merge(applied);
        }
        self.commit(scope, target.as_ref(), surface)
    }

    /// Runs work deferred to the next animation frame.
    pub fn animation_frame(&mut self, surface: &mut dyn Surface) -> Patch {
        let mut patch = Patch::Nothing;
        for task in self.scheduler.take_frames() {
            match task {
                FrameTask::VirtualScroll if self.is_virtual() => {
                    patch = self.build(UpdateScope::Body, &*surface);
                }
                FrameTask::VirtualScroll => {}
                FrameTask::RestoreFocus => {
                    self.focus.restore(&mut *surface);
                }
            }
        }
        patch
    }

    /// Swaps in a new dataset, dropping all pending work and the selection.
    pub fn replace_data(
        &mut self,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
        surface: &dyn Surface,
    ) -> Result<Patch, ConfigError> {
        let next = Dataset::load(columns, self.options.html_columns.clone(), rows)?;
        self.scheduler.clear();
        self.filter_inputs.clear();
        self.focus.clear();
        self.overlay.close();
        self.dataset.replace(next);

        self.columns = ColumnVisibility::new(
            self.dataset.columns(),
            self.options.column_view.visible_columns.as_deref(),
        );
        let stale: Vec<String> = self
            .filter
            .columns()
            .map(|(c, _)| c.to_string())
            .chain(self.sort.keys().iter().map(|k| k.column.clone()))
            .filter(|c| !self.dataset.columns().contains(c))
            .collect();
        for column in &stale {
            self.filter.remove_column(column);
            self.sort.remove(column);
        }

        let had_selection = !self.selection.state().is_empty();
        self.selection.reset();
        if had_selection {
            self.emit_selection();
        }
        self.engine.invalidate();
        self.view.reset_page();
        log::info!(
            "grid {}: data replaced, {} rows (generation {})",
            self.id,
            self.dataset.len(),
            self.dataset.generation()
        );
        Ok(self.render(surface))
    }

    /// Decides which rows and columns an export contains.
    pub fn plan_export(&mut self, scope: ExportScope, format: &str) -> Result<ExportPlan, ExportError> {
        let format: ExportFormat = format.parse()?;
        let offered = &self.options.downloads.formats;
        if !offered.iter().any(|f| f.trim().eq_ignore_ascii_case(format.extension())) {
            return Err(ExportError::unsupported(format.extension()));
        }
        let exclusions = self.exclusions();
        let (rows, columns) = match scope {
            ExportScope::CurrentView => (self.ordered_ids(), self.columns.visible().to_vec()),
            ExportScope::All => (self.dataset.ids(), self.dataset.columns().names().to_vec()),
        };
        if columns.is_empty() {
            return Err(ExportError::NoColumns);
        }
        Ok(ExportPlan {
            scope,
            format,
            base_name: base_name(
                self.options.downloads.filename.as_deref(),
                &self.options.element_id,
            ),
            rows,
            columns,
            exclusions,
        })
    }

    /// Plans an export and hands it to `exporter`.
    pub fn export(
        &mut self,
        scope: ExportScope,
        format: &str,
        exporter: &dyn Exporter,
    ) -> Result<ExportFile, ExportError> {
        let plan = self.plan_export(scope, format).inspect_err(|e| {
            log::warn!("grid {}: export rejected: {}", self.id, e);
        })?;
        if !exporter.supports(plan.format) {
            log::warn!("grid {}: no exporter for {}", self.id, plan.format);
            return Err(ExportError::unsupported(plan.format.extension()));
        }
        let table = plan.materialize(&self.dataset);
        let bytes = exporter.export(plan.format, &table)?;
        log::info!(
            "grid {}: exported {} rows x {} columns to {}",
            self.id,
            table.rows.len(),
            table.columns.len(),
            plan.file_name()
        );
        Ok(ExportFile {
            name: plan.file_name(),
            mime_type: plan.format.mime_type(),
            bytes,
            plan,
        })
    }

    /// What a current-view export leaves out.
    pub fn exclusions(&self) -> Exclusions {
        Exclusions {
            hidden_rows: self.selection.hidden().len(),
            hidden_columns: self.columns.hidden(),
            search: self
                .filter
                .has_search()
                .then(|| self.filter.search().to_string()),
            column_filters: self
                .filter
                .columns()
                .map(|(c, t)| (c.to_string(), t.to_string()))
                .collect(),
        }
    }

    fn apply(&mut self, action: Action, now: Instant) -> UpdateScope {
        let scope = UpdateScope::for_action(&action);
        match action {
            Action::Search(term) => {
                if !self.options.search_enabled {
                    return UpdateScope::None;
                }
                let delay = self.options.search_debounce;
                if !delay.is_zero() {
                    self.search_input = term.clone();
                    self.scheduler.debounce(DebounceSlot::Search, delay, now, term);
                    return UpdateScope::None;
                }
                self.apply_search(&term)
            }
            Action::ColumnFilter { column, term } => {
                if !self.options.filters_enabled {
                    return UpdateScope::None;
                }
                let delay = self.options.filter_debounce;
                if !delay.is_zero() {
                    self.filter_inputs.insert(column.clone(), term.clone());
                    self.scheduler
                        .debounce(DebounceSlot::ColumnFilter(column), delay, now, term);
                    return UpdateScope::None;
                }
                self.apply_column_filter(column, &term)
            }
            Action::ClearFilters => {
                self.filter_inputs.clear();
                let cancelled = self.scheduler.cancel_column_filters();
                if !self.filter.clear_columns() && cancelled == 0 {
                    return UpdateScope::None;
                }
                self.view.reset_page();
                self.engine.invalidate();
                scope
            }
            Action::ToggleSort(column) => {
                if !self.options.sortable || !self.columns.is_visible(&column) {
                    log::debug!("sort on {} ignored", column);
                    return UpdateScope::None;
                }
                self.sort.toggle(&column);
                self.engine.invalidate();
                scope
            }
            Action::GoToPage(page) => self.go_to(page, scope),
            Action::NextPage => self.go_to(self.view.page() + 1, scope),
            Action::PreviousPage => self.go_to(self.view.page().saturating_sub(1), scope),
            Action::SetRowsPerPage(rows) => {
                if self.view.set_rows_per_page(rows) {
                    scope
                } else {
                    UpdateScope::None
                }
            }
            Action::ActivateRow { id, modifiers } => {
                if !self.selection.is_enabled() || self.dataset.row(id).is_none() {
                    return UpdateScope::None;
                }
                let order = self.ordered_ids();
                let change = self.selection.handle_row_activate(id, modifiers, &order);
                log::debug!("selection +{:?} -{:?}", change.added, change.removed);
                self.emit_selection();
                scope
            }
            Action::ClearSelection => {
                if !self.selection.is_enabled() {
                    return UpdateScope::None;
                }
                self.selection.clear_selection();
                self.emit_selection();
                scope
            }
            Action::HideSelected => {
                let hidden = self.selection.hide_selected_rows();
                if hidden == 0 {
                    return UpdateScope::None;
                }
                log::info!("grid {}: hid {} rows", self.id, hidden);
                self.engine.invalidate();
                self.view.reset_page();
                self.emit_selection();
                scope
            }
            Action::UnhideAll => {
                if self.selection.unhide_all_rows() == 0 {
                    return UpdateScope::None;
                }
                self.engine.invalidate();
                scope
            }
            Action::ToggleColumn(column) => {
                self.scheduler
                    .cancel(&DebounceSlot::ColumnFilter(column.clone()));
                self.filter_inputs.remove(&column);
                match self.columns.toggle(&column) {
                    ColumnToggle::Unknown => {
                        log::warn!("grid {}: unknown column {}", self.id, column);
                        return UpdateScope::None;
                    }
                    ColumnToggle::Hidden => {
                        self.filter.remove_column(&column);
                        self.sort.remove(&column);
                    }
                    ColumnToggle::Shown => {}
                }
                self.engine.invalidate();
                scope
            }
            Action::ResetColumns => {
                self.scheduler.cancel_column_filters();
                self.filter_inputs.clear();
                self.columns.reset();
                self.filter.clear_columns();
                let hidden = self.columns.hidden();
                for column in &hidden {
                    self.sort.remove(column);
                }
                self.engine.invalidate();
                scope
            }
            Action::EditRule { index, edit } => {
                if self.formatting.rules_mut().edit(index, edit) {
                    scope
                } else {
                    UpdateScope::None
                }
            }
            Action::ResetRules => {
                if self.formatting.rules_mut().reset() {
                    scope
                } else {
                    UpdateScope::None
                }
            }
            Action::SetTheme(theme) => {
                if theme == self.chrome.theme {
                    return UpdateScope::None;
                }
                self.chrome.theme = theme;
                scope
            }
            Action::ToggleFullscreen => {
                if !self.options.maximizable {
                    return UpdateScope::None;
                }
                self.chrome.fullscreen = !self.chrome.fullscreen;
                scope
            }
            Action::ToggleMinimized => {
                if !self.options.minimizable {
                    return UpdateScope::None;
                }
                self.chrome.minimized = !self.chrome.minimized;
                scope
            }
            Action::Overlay(event) => {
                if self.overlay.handle(event) {
                    scope
                } else {
                    UpdateScope::None
                }
            }
            Action::Scroll => {
                if self.is_virtual() && self.scheduler.request_frame(FrameTask::VirtualScroll) {
                    log::trace!("virtual scroll recompute queued");
                }
                UpdateScope::None
            }
        }
    }

    fn apply_search(&mut self, term: &str) -> UpdateScope {
        self.search_input = term.to_string();
        let had_search = self.filter.has_search();
        if !self.filter.set_search(term) {
            return UpdateScope::None;
        }
        let has_search = self.filter.has_search();

        let mut scope = UpdateScope::TableAndFooter;
        if !had_search && has_search {
            self.chrome.minimized_before_search = self.chrome.minimized;
            if self.chrome.minimized {
                log::debug!("search started, expanding grid {}", self.id);
                self.chrome.minimized = false;
                scope = UpdateScope::Full;
            }
        } else if had_search
            && !has_search
            && self.chrome.minimized_before_search
            && !self.chrome.minimized
        {
            self.chrome.minimized = true;
            scope = UpdateScope::Full;
        }

        self.view.reset_page();
        self.engine.invalidate();
        scope
    }

    fn apply_column_filter(&mut self, column: String, term: &str) -> UpdateScope {
        self.filter_inputs.remove(&column);
        if !self.columns.is_visible(&column) {
            return UpdateScope::None;
        }
        if !self.filter.set_column(column, term) {
            return UpdateScope::None;
        }
        self.view.reset_page();
        self.engine.invalidate();
        UpdateScope::TableAndFooter
    }

    fn go_to(&mut self, page: usize, scope: UpdateScope) -> UpdateScope {
        if !self.is_paged() {
            return UpdateScope::None;
        }
        let total = self.ordered().len();
        if self.view.go_to(page, total) {
            scope
        } else {
            UpdateScope::None
        }
    }

    fn commit(
        &mut self,
        scope: UpdateScope,
        target: Option<&InputTarget>,
        surface: &mut dyn Surface,
    ) -> Patch {
        if scope == UpdateScope::None {
            return Patch::Nothing;
        }
        log::debug!("grid {}: update scope {:?}", self.id, scope);
        if scope.rebuilds_table() && self.focus.capture(&*surface, target) {
            self.scheduler.request_frame(FrameTask::RestoreFocus);
        }
        self.build(scope, &*surface)
    }

    fn emit_selection(&mut self) {
        let payload = selection_payload(&self.dataset, self.selection.state());
        let channel = selection_channel(&self.element_id());
        self.bridge.emit(&channel, payload);
    }

    fn is_paged(&self) -> bool {
        self.options.pagination_enabled && !self.options.scroller
    }

    fn is_virtual(&self) -> bool {
        self.options.pagination_enabled && self.options.scroller && self.options.virtualization
    }

    fn window_mode(&self, surface: &dyn Surface) -> WindowMode {
        if self.is_virtual() {
            let h = self.options.row_height;
            let viewport = match surface.viewport_height() {
                v if v > 0.0 => v,
                _ => self.view.rows_per_page() as f64 * h,
            };
            WindowMode::Virtual(VirtualViewport::new(
                h,
                surface.scroll_top(),
                viewport,
                self.options.virtualization_buffer,
            ))
        } else if self.is_paged() {
            WindowMode::Paged
        } else {
            WindowMode::Scroller
        }
    }

    /// Brings the ordering, page and heatmap stats up to date.
    fn settle(&mut self) {
        let total = self.ordered().len();
        if self.is_paged() {
            let page = self.view.page();
            self.view.go_to(page, total);
        }
        self.formatting.refresh_stats(&self.dataset);
    }

    fn build(&mut self, scope: UpdateScope, surface: &dyn Surface) -> Patch {
        self.settle();
        match scope {
            UpdateScope::None => Patch::Nothing,
            UpdateScope::Chrome => Patch::Chrome(self.chrome_frame()),
            UpdateScope::Body => Patch::Body(self.body_frame(surface)),
            UpdateScope::TableAndFooter => Patch::Table {
                header: self.header_frame(),
                body: self.body_frame(surface),
                footer: self.footer_frame(),
            },
            UpdateScope::Full => Patch::Full(GridFrame {
                chrome: self.chrome_frame(),
                header: self.header_frame(),
                body: self.body_frame(surface),
                footer: self.footer_frame(),
            }),
        }
    }

    fn current_ids(&self) -> &[RowId] {
        self.engine
            .output(&self.dataset)
            .map(OrderedRows::ids)
            .unwrap_or(&[])
    }

    fn chrome_frame(&self) -> ChromeFrame {
        let buttons = self.options.buttons_enabled;
        let column_menu = buttons && self.options.column_view.enabled;
        let downloads = buttons && self.options.downloads.enabled;
        let exclusions = self.exclusions();
        ChromeFrame {
            element_id: self.element_id(),
            title: self.options.title.clone(),
            caption: self.options.caption.clone(),
            theme: self.chrome.theme.clone(),
            search: self
                .options
                .search_enabled
                .then(|| self.search_input.clone()),
            fullscreen: self.chrome.fullscreen,
            minimized: self.chrome.minimized,
            overlay: self.overlay.open().cloned(),
            column_options: if column_menu {
                self.dataset
                    .columns()
                    .names()
                    .iter()
                    .map(|c| (c.clone(), self.columns.is_visible(c)))
                    .collect()
            } else {
                Vec::new()
            },
            download_formats: if downloads {
                self.options.downloads.formats.clone()
            } else {
                Vec::new()
            },
            download_exclusions: (downloads && !exclusions.is_empty()).then_some(exclusions),
            selection_controls: self.options.selection_enabled,
            reset_selection_control: self.options.selection_enabled && self.options.selection_reset,
        }
    }

    fn header_frame(&self) -> HeaderFrame {
        let columns = self
            .columns
            .visible()
            .iter()
            .map(|c| HeaderCell {
                name: c.clone(),
                sort: self
                    .sort
                    .direction_of(c)
                    .zip(self.sort.priority_of(c))
                    .map(|(direction, priority)| SortBadge {
                        direction,
                        priority,
                    }),
                filter: self.options.filters_enabled.then(|| {
                    self.filter_inputs
                        .get(c)
                        .map(String::as_str)
                        .or_else(|| self.filter.column(c))
                        .unwrap_or_default()
                        .to_string()
                }),
                has_rules: self.formatting.rules().has_rules_for(c),
                hideable: self.options.col_hide,
            })
            .collect();
        HeaderFrame { columns }
    }

    fn highlighter_for(&self, column: &str) -> Highlighter {
        let search = (self.options.search_highlight && self.filter.has_search())
            .then(|| self.filter.search());
        let column_term = self
            .options
            .filters_highlight
            .then(|| self.filter.column(column))
            .flatten();
        Highlighter::new(search.into_iter().chain(column_term))
    }

    fn sort_highlight(&self, column: &str) -> Option<SortHighlight> {
        if !self.options.sort_highlight || self.sort.direction_of(column).is_none() {
            return None;
        }
        Some(if self.formatting.is_formatted(column) {
            SortHighlight::Border
        } else {
            SortHighlight::Fill
        })
    }

    fn body_frame(&self, surface: &dyn Surface) -> BodyFrame {
        let ids = self.current_ids();
        let window = slice(
            ids.len(),
            &self.view,
            &self.window_mode(surface),
            self.filter.has_search(),
        );
        let visible = self.columns.visible();
        let schema = self.dataset.columns();
        let indices: Vec<Option<usize>> = visible.iter().map(|c| schema.index_of(c)).collect();
        let highlighters: Vec<Highlighter> =
            visible.iter().map(|c| self.highlighter_for(c)).collect();
        let marks: Vec<Option<SortHighlight>> =
            visible.iter().map(|c| self.sort_highlight(c)).collect();

        let rows = window
            .visible(ids)
            .iter()
            .filter_map(|&id| self.dataset.row(id))
            .map(|row| {
                let RowFormat {
                    row: row_style,
                    cells: cell_styles,
                } = self.formatting.format_row(&self.dataset, row, visible);
                let cells = visible
                    .iter()
                    .zip(cell_styles)
                    .enumerate()
                    .map(|(i, (column, style))| {
                        let text = indices[i]
                            .map(|x| row.cell(x).display())
                            .unwrap_or_default();
                        let html = if schema.is_html(column) {
                            text
                        } else {
                            highlighters[i].render(&text)
                        };
                        RenderedCell {
                            column: column.clone(),
                            html,
                            style,
                            sort_highlight: marks[i],
                        }
                    })
                    .collect();
                RenderedRow {
                    id: row.id(),
                    selected: self.selection.state().is_selected(row.id()),
                    style: row_style,
                    cells,
                }
            })
            .collect();

        BodyFrame {
            rows,
            start_offset: window.start_offset(),
            leading_spacer: window.leading_spacer,
            trailing_spacer: window.trailing_spacer,
            placeholder: window.placeholder,
            column_count: visible.len(),
        }
    }

    fn footer_frame(&self) -> FooterFrame {
        let total = self.current_ids().len();
        let selected = if self.selection.is_enabled() {
            self.selection.state().len()
        } else {
            0
        };
        let hidden = self.selection.hidden().len();
        if !self.options.pagination_enabled {
            return FooterFrame {
                rows_per_page: self.view.rows_per_page(),
                selected,
                hidden,
                ..FooterFrame::default()
            };
        }
        let paged = self.is_paged();
        let summary = self.options.show_summary.then(|| {
            let summary = if paged {
                Summary::paged(&self.view, total)
            } else {
                Summary::scrolling(total)
            };
            summary
                .with_counts(selected, hidden, !self.sort.is_empty())
                .to_string()
        });
        FooterFrame {
            summary,
            pager: paged.then(|| Pager::new(&self.view, total)),
            rows_per_page: self.view.rows_per_page(),
            rows_per_page_options: self.options.rows_per_page_options.clone(),
            selected,
            hidden,
        }
    }
}

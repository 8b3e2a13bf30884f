use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use std::time::Instant;

use lumina::Action;
use lumina::CellValue;
use lumina::ExportScope;
use lumina::Grid;
use lumina::HeadlessSurface;
use lumina::HostBridge;
use lumina::Modifiers;
use lumina::Patch;
use lumina::RESET_SELECTION_MESSAGE;
use lumina::RowId;
use lumina::WidgetPayload;
use lumina::focus::FocusedInput;
use lumina::focus::InputTarget;
use lumina::format::Operator;
use lumina::format::RuleEdit;
use lumina::format::StyleProps;
use lumina::query::Direction;
use lumina::render::SortHighlight;
use serde_json::Value;
use serde_json::json;

fn grid(config: Value) -> Grid {
    let payload = WidgetPayload::from_value(json!({
        "data": [["b", 2, 0], ["a", 1, 1], ["c", 3, 2], ["ab", 4, 3]],
        "columns": ["name", "val", "__rowIndex__"],
        "config": config,
    }))
    .unwrap();
    Grid::new(payload).unwrap()
}

fn names(patch: &Patch) -> Vec<String> {
    patch
        .body()
        .unwrap()
        .rows
        .iter()
        .map(|r| r.cells[0].html.clone())
        .collect()
}

#[derive(Clone, Default)]
struct SharedBridge(Rc<RefCell<Vec<(String, Value)>>>);

impl HostBridge for SharedBridge {
    fn emit(&mut self, channel: &str, payload: Value) {
        self.0.borrow_mut().push((channel.to_string(), payload));
    }
}

#[test]
fn test_sort_rebuilds_table_with_badges() {
    let mut grid = grid(json!({}));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();

    let patch = grid.dispatch(Action::ToggleSort("val".into()), &mut surface, now);
    assert!(matches!(patch, Patch::Table { .. }));
    assert_eq!(names(&patch), ["a", "b", "c", "ab"]);
    let badge = patch.header().unwrap().columns[1].sort.unwrap();
    assert_eq!((badge.direction, badge.priority), (Direction::Asc, 1));
    assert_eq!(
        patch.footer().unwrap().summary.as_deref(),
        Some("Showing 1 to 4 of 4 results (sorted)")
    );

    let patch = grid.dispatch(Action::ToggleSort("val".into()), &mut surface, now);
    assert_eq!(names(&patch), ["ab", "c", "b", "a"]);
    let patch = grid.dispatch(Action::ToggleSort("val".into()), &mut surface, now);
    assert_eq!(names(&patch), ["b", "a", "c", "ab"]);
}

#[test]
fn test_search_highlights_and_escapes() {
    let mut grid = grid(json!({}));
    let mut surface = HeadlessSurface::default();
    let patch = grid.dispatch(Action::Search("A".into()), &mut surface, Instant::now());
    assert_eq!(
        names(&patch),
        [
            "<mark class=\"lumina-highlight\">a</mark>",
            "<mark class=\"lumina-highlight\">a</mark>b"
        ]
    );

    let patch = grid.dispatch(Action::Search("zzz".into()), &mut surface, Instant::now());
    let body = patch.body().unwrap();
    assert!(body.rows.is_empty());
    assert_eq!(
        body.placeholder.map(|p| p.message()),
        Some("No matching records found")
    );
}

#[test]
fn test_debounced_search_last_call_wins() {
    let mut grid = grid(json!({"performance": {"debounceSearchMs": 300}}));
    let mut surface = HeadlessSurface::default();
    let start = Instant::now();

    assert!(grid.dispatch(Action::Search("a".into()), &mut surface, start).is_nothing());
    let later = start + Duration::from_millis(100);
    assert!(grid.dispatch(Action::Search("c".into()), &mut surface, later).is_nothing());
    assert!(grid.tick(start + Duration::from_millis(350), &mut surface).is_nothing());

    let patch = grid.tick(later + Duration::from_millis(300), &mut surface);
    assert_eq!(names(&patch), ["<mark class=\"lumina-highlight\">c</mark>"]);
    assert_eq!(grid.filter().search(), "c");
}

#[test]
fn test_column_toggle_cancels_pending_filter() {
    let mut grid = grid(json!({
        "filters": {"enabled": true},
        "performance": {"debounceFiltersMs": 200},
    }));
    let mut surface = HeadlessSurface::default();
    let start = Instant::now();

    let filter = Action::ColumnFilter {
        column: "name".into(),
        term: "a".into(),
    };
    assert!(grid.dispatch(filter, &mut surface, start).is_nothing());
    let patch = grid.dispatch(Action::ToggleColumn("name".into()), &mut surface, start);
    assert!(matches!(patch, Patch::Full(_)));
    assert_eq!(patch.header().unwrap().columns.len(), 1);

    assert!(grid.tick(start + Duration::from_secs(1), &mut surface).is_nothing());
    assert!(grid.filter().column("name").is_none());
    assert_eq!(grid.ordered().len(), 4);
}

#[test]
fn test_pending_filter_text_survives_rebuild() {
    let mut grid = grid(json!({
        "filters": {"enabled": true},
        "performance": {"debounceFiltersMs": 200},
    }));
    let mut surface = HeadlessSurface::default();
    let start = Instant::now();

    let filter = Action::ColumnFilter {
        column: "name".into(),
        term: "Ab".into(),
    };
    assert!(grid.dispatch(filter, &mut surface, start).is_nothing());
    let patch = grid.dispatch(Action::ToggleSort("val".into()), &mut surface, start);
    let header = patch.header().unwrap();
    assert_eq!(header.columns[0].filter.as_deref(), Some("Ab"));
    assert_eq!(header.columns[1].filter.as_deref(), Some(""));
    assert_eq!(names(&patch).len(), 4);

    let patch = grid.tick(start + Duration::from_millis(200), &mut surface);
    assert_eq!(patch.header().unwrap().columns[0].filter.as_deref(), Some("ab"));
    assert_eq!(patch.body().unwrap().rows.len(), 1);

    grid.dispatch(
        Action::ColumnFilter {
            column: "val".into(),
            term: "9".into(),
        },
        &mut surface,
        start,
    );
    let patch = grid.dispatch(Action::ClearFilters, &mut surface, start);
    assert!(
        patch
            .header()
            .unwrap()
            .columns
            .iter()
            .all(|c| c.filter.as_deref() == Some(""))
    );
}

#[test]
fn test_clear_filters_cancels_pending_work() {
    let mut grid = grid(json!({
        "filters": {"enabled": true},
        "performance": {"debounceFiltersMs": 200},
    }));
    let mut surface = HeadlessSurface::default();
    let start = Instant::now();
    grid.dispatch(
        Action::ColumnFilter {
            column: "val".into(),
            term: "3".into(),
        },
        &mut surface,
        start,
    );
    let patch = grid.dispatch(Action::ClearFilters, &mut surface, start);
    assert!(matches!(patch, Patch::Table { .. }));
    assert_eq!(grid.scheduler().pending_count(), 0);
    assert!(grid.tick(start + Duration::from_secs(1), &mut surface).is_nothing());
}

#[test]
fn test_focus_restored_on_next_frame() {
    let mut grid = grid(json!({}));
    let mut surface = HeadlessSurface::default();
    surface.type_into(InputTarget::Search, "ab");
    if let Some(focused) = surface.focused.as_mut() {
        focused.cursor = 1;
    }

    let patch = grid.dispatch(Action::Search("ab".into()), &mut surface, Instant::now());
    assert!(!patch.is_nothing());
    // the rebuild drops focus
    surface.focused = None;

    assert!(grid.animation_frame(&mut surface).is_nothing());
    assert_eq!(
        surface.focused,
        Some(FocusedInput {
            target: InputTarget::Search,
            cursor: 1
        })
    );
}

#[test]
fn test_unrelated_focus_is_left_alone() {
    let mut grid = grid(json!({"filters": {"enabled": true}}));
    let mut surface = HeadlessSurface::default();
    surface.type_into(InputTarget::ColumnFilter("val".into()), "1");
    grid.dispatch(Action::Search("a".into()), &mut surface, Instant::now());
    surface.focused = None;
    grid.animation_frame(&mut surface);
    assert_eq!(surface.focused, None);
}

#[test]
fn test_selection_reported_after_each_mutation() {
    let bridge = SharedBridge::default();
    let mut grid = grid(json!({
        "elementId": "grid1",
        "selection": {"enabled": true, "mode": "multiple"},
    }))
    .with_bridge(Box::new(bridge.clone()));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();

    grid.dispatch(
        Action::ActivateRow {
            id: RowId(2),
            modifiers: Modifiers::NONE,
        },
        &mut surface,
        now,
    );
    let patch = grid.dispatch(
        Action::ActivateRow {
            id: RowId(0),
            modifiers: Modifiers::SHIFT,
        },
        &mut surface,
        now,
    );
    let selected: Vec<bool> = patch.body().unwrap().rows.iter().map(|r| r.selected).collect();
    assert_eq!(selected, [true, true, true, false]);

    {
        let messages = bridge.0.borrow();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].0, "grid1_selected");
        assert_eq!(messages[1].1.as_array().unwrap().len(), 3);
        assert_eq!(messages[1].1[0], json!({"name": "b", "val": 2, "__rowIndex__": 0}));
    }

    let patch = grid.handle_host_message(RESET_SELECTION_MESSAGE, &mut surface, now);
    assert!(patch.body().unwrap().rows.iter().all(|r| !r.selected));
    assert_eq!(bridge.0.borrow().last().unwrap().1, json!([]));
}

#[test]
fn test_hide_and_unhide_selected() {
    let mut grid = grid(json!({"selection": {"enabled": true, "mode": "multiple"}}));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();
    grid.dispatch(
        Action::ActivateRow {
            id: RowId(1),
            modifiers: Modifiers::NONE,
        },
        &mut surface,
        now,
    );

    let patch = grid.dispatch(Action::HideSelected, &mut surface, now);
    assert_eq!(names(&patch), ["b", "c", "ab"]);
    let footer = patch.footer().unwrap();
    assert_eq!(footer.hidden, 1);
    assert_eq!(footer.selected, 0);
    assert_eq!(
        footer.summary.as_deref(),
        Some("Showing 1 to 3 of 3 results (1 hidden)")
    );

    let patch = grid.dispatch(Action::UnhideAll, &mut surface, now);
    assert_eq!(names(&patch), ["b", "a", "c", "ab"]);
    assert!(grid.dispatch(Action::UnhideAll, &mut surface, now).is_nothing());
}

#[test]
fn test_selection_persists_across_filters() {
    let mut grid = grid(json!({"selection": {"enabled": true}}));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();
    grid.dispatch(
        Action::ActivateRow {
            id: RowId(2),
            modifiers: Modifiers::NONE,
        },
        &mut surface,
        now,
    );
    grid.dispatch(Action::Search("a".into()), &mut surface, now);
    assert!(grid.selection().state().is_selected(RowId(2)));
    let patch = grid.dispatch(Action::Search(String::new()), &mut surface, now);
    assert!(patch.body().unwrap().rows[2].selected);
}

#[test]
fn test_paging_actions() {
    let mut grid = grid(json!({"pagination": {"limit": 3}}));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();

    let patch = grid.dispatch(Action::NextPage, &mut surface, now);
    assert_eq!(names(&patch), ["ab"]);
    assert_eq!(patch.body().unwrap().start_offset, 3);
    assert!(grid.dispatch(Action::NextPage, &mut surface, now).is_nothing());

    let patch = grid.dispatch(Action::SetRowsPerPage(2), &mut surface, now);
    assert!(matches!(patch, Patch::Full(_)));
    assert_eq!(grid.view().page(), 1);
    let pager = patch.footer().unwrap().pager.clone().unwrap();
    assert_eq!(pager.total_pages, 2);
}

#[test]
fn test_minimized_grid_expands_while_searching() {
    let mut grid = grid(json!({"minimizable": true}));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();

    let patch = grid.dispatch(Action::ToggleMinimized, &mut surface, now);
    assert!(patch.chrome().unwrap().minimized);
    assert!(matches!(patch, Patch::Chrome(_)));

    let patch = grid.dispatch(Action::Search("a".into()), &mut surface, now);
    assert!(matches!(patch, Patch::Full(_)));
    assert!(!grid.is_minimized());

    grid.dispatch(Action::Search("ab".into()), &mut surface, now);
    assert!(!grid.is_minimized());
    grid.dispatch(Action::Search(String::new()), &mut surface, now);
    assert!(grid.is_minimized());
}

#[test]
fn test_fullscreen_is_chrome_only() {
    let mut grid = grid(json!({"maximizable": true}));
    let mut surface = HeadlessSurface::default();
    let patch = grid.dispatch(Action::ToggleFullscreen, &mut surface, Instant::now());
    assert!(matches!(patch, Patch::Chrome(ref c) if c.fullscreen));
    assert!(patch.body().is_none());
    assert!(grid.is_fullscreen());

    let mut fixed = crate::grid(json!({"maximizable": false}));
    assert!(fixed.dispatch(Action::ToggleFullscreen, &mut surface, Instant::now()).is_nothing());
    assert!(!fixed.is_fullscreen());
}

#[test]
fn test_virtual_scroll_is_coalesced_per_frame() {
    let data: Vec<Value> = (0..500).map(|i| json!([format!("row{}", i)])).collect();
    let payload = WidgetPayload::from_value(json!({
        "data": data,
        "columns": ["name"],
        "config": {
            "pagination": {"scroller": true},
            "performance": {"virtualization": true, "virtualizationBuffer": 2},
            "layout": {"rowHeight": 20},
        },
    }))
    .unwrap();
    let mut grid = Grid::new(payload).unwrap();
    let mut surface = HeadlessSurface {
        viewport_height: 200.0,
        ..HeadlessSurface::default()
    };
    let now = Instant::now();

    let initial = grid.render(&surface);
    assert_eq!(initial.body().unwrap().rows.len(), 14);

    surface.scroll_top = 100.0;
    assert!(grid.dispatch(Action::Scroll, &mut surface, now).is_nothing());
    surface.scroll_top = 2000.0;
    assert!(grid.dispatch(Action::Scroll, &mut surface, now).is_nothing());

    let patch = grid.animation_frame(&mut surface);
    let body = patch.body().unwrap();
    assert!(matches!(patch, Patch::Body(_)));
    assert_eq!(body.start_offset, 98);
    assert_eq!(body.rows.len(), 14);
    assert_eq!(body.leading_spacer, 98.0 * 20.0);
    assert_eq!(body.trailing_spacer, (500.0 - 112.0) * 20.0);
    assert!(grid.animation_frame(&mut surface).is_nothing());
}

#[test]
fn test_search_while_scrolled_deep_keeps_rows() {
    let data: Vec<Value> = (0..1000).map(|i| json!([format!("r{}", i)])).collect();
    let payload = WidgetPayload::from_value(json!({
        "data": data,
        "columns": ["name"],
        "config": {
            "pagination": {"scroller": true},
            "performance": {"virtualization": true},
        },
    }))
    .unwrap();
    let mut grid = Grid::new(payload).unwrap();
    let mut surface = HeadlessSurface {
        viewport_height: 400.0,
        scroll_top: 36000.0,
        ..HeadlessSurface::default()
    };

    let patch = grid.dispatch(Action::Search("r99".into()), &mut surface, Instant::now());
    let body = patch.body().unwrap();
    assert_eq!(grid.ordered().len(), 11);
    assert_eq!(body.rows.len(), 11);
    assert_eq!(body.placeholder, None);
    assert_eq!(body.start_offset, 0);
    assert_eq!(body.rows[0].id, RowId(99));
    assert_eq!(body.rows[10].id, RowId(999));
}

#[test]
fn test_rule_edit_patches_body_only() {
    let mut grid = grid(json!({
        "condformat": {
            "edit": true,
            "rules": [{"column": "val", "op": "gt", "value": 2, "style": {"bg": "red"}}],
        },
    }));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();

    let edit = RuleEdit {
        operator: Operator::Lt,
        operand: json!(2),
        style: StyleProps {
            bg: Some("green".into()),
            ..StyleProps::default()
        },
    };
    let patch = grid.dispatch(Action::EditRule { index: 0, edit }, &mut surface, now);
    assert!(matches!(patch, Patch::Body(_)));
    let rows = &patch.body().unwrap().rows;
    assert_eq!(rows[1].cells[1].style.background.as_deref(), Some("green"));
    assert_eq!(rows[2].cells[1].style.background, None);
    assert!(grid.formatting().rules().is_dirty());

    let patch = grid.dispatch(Action::ResetRules, &mut surface, now);
    assert_eq!(
        patch.body().unwrap().rows[2].cells[1].style.background.as_deref(),
        Some("red")
    );
    assert!(grid.dispatch(Action::ResetRules, &mut surface, now).is_nothing());
}

#[test]
fn test_sort_highlight_uses_border_on_formatted_columns() {
    let mut grid = grid(json!({"heatmap": {"columns": ["val"]}}));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();
    grid.dispatch(Action::ToggleSort("name".into()), &mut surface, now);
    let patch = grid.dispatch(Action::ToggleSort("val".into()), &mut surface, now);
    let cells = &patch.body().unwrap().rows[0].cells;
    assert_eq!(cells[0].sort_highlight, Some(SortHighlight::Fill));
    assert_eq!(cells[1].sort_highlight, Some(SortHighlight::Border));
    assert!(cells[1].style.background.is_some());
}

#[test]
fn test_export_current_view_and_all() {
    let mut grid = grid(json!({
        "elementId": "grid1",
        "buttons": {"enabled": true, "downloads": {"enabled": true}},
    }));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();
    grid.dispatch(Action::Search("a".into()), &mut surface, now);
    grid.dispatch(Action::ToggleColumn("val".into()), &mut surface, now);

    let plan = grid.plan_export(ExportScope::CurrentView, "CSV").unwrap();
    assert_eq!(plan.rows, [RowId(1), RowId(3)]);
    assert_eq!(plan.columns, ["name"]);
    assert_eq!(plan.file_name(), "grid1.csv");
    assert_eq!(plan.exclusions.hidden_columns, ["val"]);
    assert_eq!(plan.exclusions.search.as_deref(), Some("a"));

    let plan = grid.plan_export(ExportScope::All, "json").unwrap();
    assert_eq!(plan.rows.len(), 4);
    assert_eq!(plan.columns, ["name", "val"]);
    let table = plan.materialize(grid.dataset());
    assert_eq!(table.rows[0], [CellValue::from("b"), CellValue::from(2)]);

    assert!(grid.plan_export(ExportScope::All, "pdf").unwrap_err().is_rejection());
    // not offered by the download menu
    assert!(grid.plan_export(ExportScope::All, "xlsx").unwrap_err().is_rejection());
}

#[test]
fn test_replace_data_drops_pending_work_and_selection() {
    let mut grid = grid(json!({
        "selection": {"enabled": true},
        "performance": {"debounceSearchMs": 100},
    }));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();
    grid.dispatch(
        Action::ActivateRow {
            id: RowId(0),
            modifiers: Modifiers::NONE,
        },
        &mut surface,
        now,
    );
    grid.dispatch(Action::Search("x".into()), &mut surface, now);

    let patch = grid
        .replace_data(
            vec!["name".into()],
            vec![vec!["x".into()], vec!["y".into()]],
            &surface,
        )
        .unwrap();
    assert!(matches!(patch, Patch::Full(_)));
    assert_eq!(names(&patch), ["x", "y"]);
    assert!(grid.selection().state().is_empty());
    assert!(grid.tick(now + Duration::from_secs(1), &mut surface).is_nothing());
    assert_eq!(grid.dataset().generation(), 1);
}

#[test]
fn test_remote_mode_forwards_state() {
    let mut grid = grid(json!({"performance": {"serverSide": true}}));
    let mut surface = HeadlessSurface::default();
    let now = Instant::now();
    let patch = grid.dispatch(Action::Search("zzz".into()), &mut surface, now);
    assert_eq!(names(&patch).len(), 4);
    grid.dispatch(Action::ToggleSort("val".into()), &mut surface, now);

    let query = serde_json::to_value(grid.remote_query()).unwrap();
    assert_eq!(
        query,
        json!({
            "search": "zzz",
            "columnFilters": {},
            "sort": [{"column": "val", "direction": "asc"}],
            "page": 1,
            "rowsPerPage": 10,
        })
    );
}

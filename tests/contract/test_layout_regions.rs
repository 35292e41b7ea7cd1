//! Contract Tests for Screen Regions and Results Scrolling

use tview::layout::{
    Regions, COMPACT_ACTION_LINES_LARGE, COMPACT_ACTION_LINES_SMALL, HEADER_LINES,
    MIN_RESULT_LINES, MIN_TERMINAL_HEIGHT, STATUS_LINES,
};
use tview::{LayoutEngine, ScrollDirection};

fn thirty_lines() -> String {
    (1..=30)
        .map(|i| format!("line{}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

fn assert_ordered(regions: &Regions, height: usize) {
    assert_eq!(regions.header.start, 0);
    assert!(regions.header.end <= regions.action_list.start);
    assert_eq!(regions.header.end, regions.action_list.start);
    assert_eq!(regions.action_list.end, regions.results.start);
    assert_eq!(regions.results.end, regions.status.start);
    assert_eq!(regions.total_height(), height);
}

#[test]
fn test_regions_partition_every_height() {
    for height in MIN_TERMINAL_HEIGHT..=80 {
        for visible in [false, true] {
            let regions = Regions::compute(height, visible);
            assert_ordered(&regions, height);
            assert_eq!(regions.header.len(), HEADER_LINES);
            assert_eq!(regions.status.len(), STATUS_LINES);
            assert!(!regions.action_list.is_empty());
        }
    }
}

#[test]
fn test_hidden_results_have_no_lines() {
    let regions = Regions::compute(24, false);
    assert!(regions.results.is_empty());
    assert_eq!(regions.action_list.len(), 24 - HEADER_LINES - STATUS_LINES);
}

#[test]
fn test_compact_action_list_by_terminal_size() {
    assert_eq!(
        Regions::compute(24, true).action_list.len(),
        COMPACT_ACTION_LINES_SMALL
    );
    assert_eq!(
        Regions::compute(50, true).action_list.len(),
        COMPACT_ACTION_LINES_LARGE
    );
}

#[test]
fn test_results_keep_minimum_on_small_terminals() {
    let regions = Regions::compute(12, true);
    assert!(regions.results.len() >= MIN_RESULT_LINES);
    assert!(regions.action_list.len() >= 1);
}

#[test]
fn test_tiny_terminal_uses_minimum_height() {
    let layout = LayoutEngine::new(80, 3);
    assert_eq!(layout.height(), MIN_TERMINAL_HEIGHT);
    assert_ordered(layout.regions(), MIN_TERMINAL_HEIGHT);
}

/// Thirty lines of results in a six-line panel
#[test]
fn test_scroll_clamps_at_max_scroll() {
    let mut layout = LayoutEngine::new(80, 17);
    layout.show_results(&thirty_lines());

    assert_eq!(layout.visible_result_count(), 6);
    assert_eq!(layout.scroll_offset(), 0);
    assert_eq!(layout.max_scroll(), 25);

    layout.scroll_results(ScrollDirection::Down, 5);
    layout.scroll_results(ScrollDirection::Down, 5);
    assert_eq!(layout.scroll_offset(), 10);
    assert_eq!(layout.visible_result_lines()[0], "line11");

    layout.scroll_results(ScrollDirection::Down, 100);
    assert_eq!(layout.scroll_offset(), layout.max_scroll());
    assert_eq!(layout.visible_result_lines().last().map(String::as_str), Some("line30"));

    layout.scroll_results(ScrollDirection::Up, 1000);
    assert_eq!(layout.scroll_offset(), 0);
}

#[test]
fn test_scroll_without_content_is_noop() {
    let mut layout = LayoutEngine::new(80, 24);
    layout.scroll_results(ScrollDirection::Down, 3);
    assert_eq!(layout.scroll_offset(), 0);
    assert_eq!(layout.max_scroll(), 0);
    assert!(layout.visible_result_lines().is_empty());
}

#[test]
fn test_show_results_resets_scroll() {
    let mut layout = LayoutEngine::new(80, 17);
    layout.show_results(&thirty_lines());
    layout.scroll_to_bottom();
    assert!(layout.scroll_offset() > 0);

    layout.show_results("fresh");
    assert_eq!(layout.scroll_offset(), 0);
    assert_eq!(layout.total_result_lines(), 1);
}

use pocketmd::document::{Document, Heading};
use pocketmd::formula::PlainFormula;
use pocketmd::render::{LayoutState, Renderer, Target, Viewport};
use pocketmd::source::FsSource;
use pocketmd::surface::{DrawCommand, Rect, RecordingSurface};
use pocketmd::theme::{ColorRole, Palette};

fn document(text: &str) -> Document<RecordingSurface> {
    let mut doc = Document::new(RecordingSurface::new());
    doc.load(text);
    doc
}

fn texts(doc: &Document<RecordingSurface>) -> Vec<(i32, i32, String)> {
    doc.surface()
        .texts()
        .into_iter()
        .map(|(x, y, t)| (x, y, t.to_string()))
        .collect()
}

/// Drives a bare [`Renderer`] against a recording surface.
struct Bench {
    surface: RecordingSurface,
    palette: Palette,
    renderer: Renderer,
}

impl Bench {
    fn new() -> Self {
        Self {
            surface: RecordingSurface::new(),
            palette: Palette::light(),
            renderer: Renderer::new(Viewport::default()),
        }
    }

    fn render(&mut self, content: &str) {
        self.renderer.render(
            content,
            Target {
                surface: &mut self.surface,
                palette: &self.palette,
                formula: &PlainFormula,
                bookmarks: &[],
            },
        );
    }

    fn texts(&self) -> Vec<(i32, i32, String)> {
        self.surface
            .texts()
            .into_iter()
            .map(|(x, y, t)| (x, y, t.to_string()))
            .collect()
    }
}

#[test]
fn test_heading_blank_paragraph_scenario() {
    let mut doc = document("# Title\n\nHello **world**.");
    doc.render();

    assert_eq!(doc.content_height(), 48);
    let lines = doc.renderer().unwrap().layout().lines().unwrap();
    assert_eq!(lines.line_ys(), &[0, 30, 36]);

    let drawn = texts(&doc);
    assert_eq!(drawn[0], (5, 8, "Title".to_string()));
    assert!(drawn.contains(&(5, 41, "Hello".to_string())));
    assert!(drawn.contains(&(41, 41, "world".to_string())));
    assert!(drawn.contains(&(42, 41, "world".to_string())));

    assert_eq!(
        doc.headers(),
        vec![Heading {
            level: 1,
            title: "Title".to_string(),
            line: 0,
        }]
    );
}

#[test]
fn test_wide_table_fills_viewport() {
    let cell = "x".repeat(60);
    let row = format!("| {cell} | {cell} | {cell} |");
    let mut text = vec![row.clone(), "|---|---|---|".to_string()];
    text.extend(std::iter::repeat_n(row, 49));
    let mut doc = document(&text.join("\n"));
    doc.render();

    let border = doc.palette().get(ColorRole::TableBorder);
    let cells: Vec<Rect> = doc
        .surface()
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Rect { rect, edge, .. } if *edge == border => Some(*rect),
            _ => None,
        })
        .collect();
    // Three 96px columns with 3px padding each side, sharing borders.
    assert_eq!(cells[0], Rect::new(5, 5, 104, 15));
    assert_eq!(cells[1].x, 5 + 103);
    assert_eq!(cells[2].right(), 5 + 310);
    assert_eq!(doc.content_height(), 50 * 14 + 4);
}

#[test]
fn test_six_column_table_is_a_warning() {
    let mut doc = document("| a | b | c | d | e | f |\n|---|---|---|---|---|---|\n| 1 | 2 | 3 | 4 | 5 | 6 |");
    doc.render();
    assert_eq!(texts(&doc), vec![(5, 5, "[Table too wide (6 cols)]".to_string())]);
    assert_eq!(doc.content_height(), 12);
}

#[test]
fn test_ratio_one_is_max_scroll() {
    let text = (0..300).map(|i| format!("row {i}")).collect::<Vec<_>>().join("\n");
    let mut doc = document(&text);
    doc.scroll_to_ratio(1.0);
    let max = doc.renderer().unwrap().max_scroll();
    assert_eq!(max, 300 * 12 - 230);
    assert_eq!(doc.scroll_position(), max);
}

#[test]
fn test_search_round_trip_cycles_matches() {
    let mut lines: Vec<String> = (0..200).map(|i| format!("filler {i}")).collect();
    lines[20] = "the Needle one".to_string();
    lines[150] = "needle two".to_string();
    let mut doc = document(&lines.join("\n"));

    assert!(doc.search("needle", false));
    assert_eq!(doc.search_positions(), &[240, 1800]);
    assert_eq!(doc.scroll_position(), 240);

    doc.search_next();
    assert_eq!(doc.scroll_position(), 1800);
    doc.search_next();
    assert_eq!(doc.scroll_position(), 240);

    assert!(doc.search("Needle", true));
    assert_eq!(doc.search_positions(), &[240]);
}

#[test]
fn test_search_highlights_only_visible_matches() {
    let mut doc = document("alpha beta\nbeta gamma");
    assert!(doc.search("beta", false));
    let highlight = doc.palette().get(ColorRole::SearchHighlight);
    assert_eq!(doc.surface().rects_filled_with(highlight).len(), 2);
}

#[test]
fn test_missing_file_loads_error_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = Document::new(RecordingSurface::new());
    let result = doc.load_from(&FsSource::new(dir.path()), "nope.md");

    assert!(result.is_err());
    assert_eq!(doc.content(), "# Error\n\nCould not load file: nope.md");
    doc.render();
    assert_eq!(doc.headers()[0].title, "Error");
    assert!(texts(&doc).iter().any(|(_, _, t)| t == "nope.md"));
}

#[test]
fn test_load_from_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.md"), "## Notes\nbody").unwrap();
    let mut doc = Document::new(RecordingSurface::new());
    doc.load_from(&FsSource::new(dir.path()), "notes.md").unwrap();
    assert_eq!(doc.stats().lines, 2);
}

#[test]
fn test_changed_line_count_walks_stale_layout() {
    let mut bench = Bench::new();
    bench.render("a\nb\nc");
    assert!(bench.renderer.layout().is_cached());

    bench.render("a\nb\nc\nd\ne");
    assert_eq!(
        bench.renderer.layout(),
        &LayoutState::Stale { content_height: 60 }
    );
    assert!(bench.texts().iter().any(|(_, y, t)| t == "e" && *y == 53));

    bench.renderer.invalidate("reload");
    bench.render("a\nb\nc\nd\ne");
    assert!(bench.renderer.layout().is_cached());
}

#[test]
fn test_bookmarks_draw_scrollbar_ticks() {
    let text = (0..100).map(|i| format!("row {i}")).collect::<Vec<_>>().join("\n");
    let mut doc = document(&text);
    doc.set_bookmarks(vec![600]);
    doc.render();
    let mark = doc.palette().get(ColorRole::BookmarkMark);
    let ticks = doc.surface().rects_filled_with(mark);
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].width, 6);
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn line() -> impl Strategy<Value = String> {
        prop_oneof![
            4 => "[a-z]{1,10}( [a-z]{1,10}){0,30}",
            1 => "#{1,3} [a-z]{1,12}",
            2 => Just(String::new()),
            1 => "- [a-z]{1,8}( [a-z]{1,8}){0,10}",
            1 => "> [a-z]{1,8}( [a-z]{1,8}){0,10}",
            1 => Just("| col | other |".to_string()),
            1 => Just("```".to_string()),
            1 => Just("---".to_string()),
        ]
    }

    fn doc_text() -> impl Strategy<Value = String> {
        proptest::collection::vec(line(), 1..120).prop_map(|lines| lines.join("\n"))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn cached_render_matches_full_measure(text in doc_text(), ratio in 0.0f64..=1.0) {
            let mut cached = Bench::new();
            cached.render(&text);
            let max = cached.renderer.max_scroll();
            let offset = (f64::from(max) * ratio) as i32;
            cached.renderer.set_scroll_offset(offset);
            cached.render(&text);
            prop_assert!(cached.renderer.layout().is_cached());

            let mut full = Bench::new();
            full.renderer.set_scroll_offset(offset);
            full.render(&text);

            prop_assert_eq!(full.renderer.scroll_offset(), offset);
            prop_assert_eq!(cached.texts(), full.texts());
        }

        #[test]
        fn rendering_twice_is_idempotent(text in doc_text(), ratio in 0.0f64..=1.0) {
            let mut doc = document(&text);
            doc.scroll_to_ratio(ratio);
            let height = doc.content_height();
            let first = doc.surface().commands().to_vec();
            doc.render();
            prop_assert_eq!(doc.content_height(), height);
            prop_assert_eq!(doc.surface().commands(), first.as_slice());
        }

        #[test]
        fn scroll_stays_in_bounds(
            text in doc_text(),
            steps in proptest::collection::vec(-2000i32..2000, 1..20),
        ) {
            let mut doc = document(&text);
            for step in steps {
                doc.scroll_by(step);
                let max = doc.renderer().unwrap().max_scroll();
                let offset = doc.scroll_position();
                prop_assert!((0..=max).contains(&offset), "offset {} max {}", offset, max);
            }
        }
    }
}

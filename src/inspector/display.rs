//! Three-column live view: controls legend, current-selection dump, history.
//!
//! Building the view is split in two: [`snapshot`] is a pure function from
//! session state to a padded grid (called on every tick, trivially testable),
//! and [`render`] draws a prepared grid as a ratatui table. The one-line
//! notice area under the table is the single feedback channel for save
//! operations, success and failure alike.

use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::inspector::cache::HistoryEntry;
use crate::inspector::descriptor::ElementDescriptor;

/// Static controls legend, one cell per body row of the first column.
const CONTROL_ROWS: [&str; 4] = [
    "q: Quit",
    "c: Clear selection",
    "s: Save to JSON",
    "g: Generate scraper",
];

const COLUMN_WIDTHS: [u16; 3] = [20, 40, 30];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// One-line status notice shown under the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }
}

/// Prepared frame content: a header row, body rows padded to equal length,
/// and the latest notice, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub header: [String; 3],
    pub rows: Vec<[String; 3]>,
    pub status: Option<Notice>,
}

/// Build the grid for one tick. Pure: no mutation, no I/O.
///
/// Body row count is the max of the three column lengths; shorter columns
/// pad with empty cells.
pub fn snapshot(
    selection: Option<&ElementDescriptor>,
    history: &[HistoryEntry],
    notice: Option<&Notice>,
) -> Snapshot {
    let control_rows: Vec<String> = CONTROL_ROWS.iter().map(|s| s.to_string()).collect();
    let info_rows = selection.map(info_rows).unwrap_or_default();
    let history_rows: Vec<String> = history.iter().map(history_line).collect();

    let max_rows = control_rows
        .len()
        .max(info_rows.len())
        .max(history_rows.len());

    let cell = |col: &[String], i: usize| col.get(i).cloned().unwrap_or_default();
    let rows = (0..max_rows)
        .map(|i| {
            [
                cell(&control_rows, i),
                cell(&info_rows, i),
                cell(&history_rows, i),
            ]
        })
        .collect();

    Snapshot {
        header: [
            "Click: Select element".to_string(),
            "Current Selection:".to_string(),
            "Recent Elements:".to_string(),
        ],
        rows,
        status: notice.cloned(),
    }
}

/// Field dump for the middle column; the nested dimensions record flattens
/// into indented sub-rows.
fn info_rows(descriptor: &ElementDescriptor) -> Vec<String> {
    vec![
        format!("tag: {}", descriptor.tag),
        format!("class: {}", descriptor.class_attr),
        format!("id: {}", descriptor.id),
        format!("attributes: {}", descriptor.attributes),
        format!("text: {}", descriptor.text),
        format!("html: {}", descriptor.html),
        "dimensions".to_string(),
        format!("  width: {}", descriptor.dimensions.width),
        format!("  height: {}", descriptor.dimensions.height),
        format!("  position: {}", descriptor.dimensions.position),
        format!("children: {}", descriptor.child_count),
        format!("parent: {}", descriptor.parent_tag),
    ]
}

fn history_line(entry: &HistoryEntry) -> String {
    format!(
        "{} - <{}> {} {}",
        entry.captured_at, entry.tag, entry.id, entry.class_attr
    )
}

/// Draw a prepared snapshot: the table fills the frame, the notice line sits
/// at the bottom.
pub fn render(frame: &mut Frame, snap: &Snapshot) {
    let [table_area, status_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(frame.area());

    let column_styles = [
        Style::default().fg(Color::Cyan),
        Style::default().fg(Color::Green),
        Style::default().fg(Color::Yellow),
    ];

    let header = Row::new(
        snap.header
            .iter()
            .zip(column_styles)
            .map(|(text, style)| Cell::from(text.as_str()).style(style.bold())),
    );

    let rows = snap.rows.iter().map(|cells| {
        Row::new(
            cells
                .iter()
                .zip(column_styles)
                .map(|(text, style)| Cell::from(text.as_str()).style(style)),
        )
    });

    let widths = COLUMN_WIDTHS.map(Constraint::Length);
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::bordered().title("Element Inspector"));
    frame.render_widget(table, table_area);

    if let Some(notice) = &snap.status {
        let style = match notice.severity {
            Severity::Success => Style::default().fg(Color::Green),
            Severity::Error => Style::default().fg(Color::Red),
        };
        let status = Paragraph::new(Line::styled(notice.text.as_str(), style));
        frame.render_widget(status, status_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::descriptor::Dimensions;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn sample_descriptor() -> ElementDescriptor {
        ElementDescriptor {
            tag: "div".to_string(),
            class_attr: "box".to_string(),
            id: "main".to_string(),
            attributes: "data-x=\"1\"".to_string(),
            text: "hello".to_string(),
            html: "<b>hello</b>".to_string(),
            dimensions: Dimensions {
                width: "640px".to_string(),
                height: "480px".to_string(),
                position: "static".to_string(),
            },
            child_count: 3,
            parent_tag: "body".to_string(),
        }
    }

    fn sample_entry(tag: &str) -> HistoryEntry {
        HistoryEntry {
            captured_at: "12:34:56".to_string(),
            tag: tag.to_string(),
            id: "-".to_string(),
            class_attr: "-".to_string(),
        }
    }

    fn column(snap: &Snapshot, idx: usize) -> Vec<&str> {
        snap.rows.iter().map(|r| r[idx].as_str()).collect()
    }

    #[test]
    fn fresh_session_shows_only_controls() {
        let snap = snapshot(None, &[], None);
        assert_eq!(snap.rows.len(), CONTROL_ROWS.len());
        assert_eq!(column(&snap, 0), CONTROL_ROWS.to_vec());
        assert!(column(&snap, 1).iter().all(|c| c.is_empty()));
        assert!(column(&snap, 2).iter().all(|c| c.is_empty()));
    }

    #[test]
    fn row_count_is_max_of_column_lengths() {
        let d = sample_descriptor();
        // 12 info rows dominate 4 controls and 2 history lines.
        let history = vec![sample_entry("a"), sample_entry("b")];
        let snap = snapshot(Some(&d), &history, None);
        assert_eq!(snap.rows.len(), 12);
        // Shorter columns padded with empty cells.
        assert_eq!(snap.rows[11][0], "");
        assert_eq!(snap.rows[11][2], "");

        // History dominates when selection is absent.
        let history: Vec<HistoryEntry> = (0..7).map(|i| sample_entry(&format!("t{i}"))).collect();
        let snap = snapshot(None, &history, None);
        assert_eq!(snap.rows.len(), 7);
    }

    #[test]
    fn dimensions_flatten_into_indented_sub_rows() {
        let snap = snapshot(Some(&sample_descriptor()), &[], None);
        let info = column(&snap, 1);
        let dims_at = info.iter().position(|c| *c == "dimensions").unwrap();
        assert_eq!(info[dims_at + 1], "  width: 640px");
        assert_eq!(info[dims_at + 2], "  height: 480px");
        assert_eq!(info[dims_at + 3], "  position: static");
    }

    #[test]
    fn empty_optional_fields_do_not_panic() {
        let d = ElementDescriptor {
            tag: "br".to_string(),
            class_attr: String::new(),
            id: String::new(),
            attributes: String::new(),
            text: String::new(),
            html: String::new(),
            dimensions: Dimensions::default(),
            child_count: 0,
            parent_tag: "none".to_string(),
        };
        let snap = snapshot(Some(&d), &[], None);
        assert!(column(&snap, 1).contains(&"class: "));
        assert!(column(&snap, 1).contains(&"parent: none"));
    }

    #[test]
    fn history_lines_render_oldest_first_in_cache_order() {
        let history = vec![sample_entry("first"), sample_entry("second")];
        let snap = snapshot(None, &history, None);
        assert_eq!(snap.rows[0][2], "12:34:56 - <first> - -");
        assert_eq!(snap.rows[1][2], "12:34:56 - <second> - -");
    }

    #[test]
    fn notice_is_carried_into_the_snapshot() {
        let notice = Notice::error("Error saving element: disk full");
        let snap = snapshot(None, &[], Some(&notice));
        assert_eq!(snap.status, Some(notice));
    }

    #[test]
    fn renders_on_a_test_backend() {
        let d = sample_descriptor();
        let history = vec![sample_entry("div")];
        let notice = Notice::success("Element saved to scraped_elements/element_x.json");
        let snap = snapshot(Some(&d), &history, Some(&notice));

        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|frame| render(frame, &snap)).expect("draw");

        let buffer = terminal.backend().buffer().clone();
        let content: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        assert!(content.contains("Element Inspector"));
        assert!(content.contains("Current Selection:"));
        assert!(content.contains("q: Quit"));
    }
}

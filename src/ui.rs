use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};

use crate::selector::{FrameRow, SelectorFrame};

const BG: Color = Color::Rgb(9, 15, 25);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const CURSOR_BG: Color = Color::Rgb(24, 36, 58);

pub fn render(frame: &mut Frame, view: &SelectorFrame<'_>) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(frame.area());

    render_prompt(frame, root[0], view);
    render_counter(frame, root[1], view);
    render_rows(frame, root[2], view);
}

fn render_prompt(frame: &mut Frame, area: Rect, view: &SelectorFrame<'_>) {
    let line = Line::from(vec![
        Span::styled(
            view.prompt.to_string(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(view.query.to_string(), Style::default().fg(Color::White)),
    ]);
    let width = spans_width(&line.spans) as u16;
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(BG)), area);

    let x = area.x.saturating_add(width).min(area.right().saturating_sub(1));
    frame.set_cursor_position((x, area.y));
}

fn render_counter(frame: &mut Frame, area: Rect, view: &SelectorFrame<'_>) {
    let counter = format!("  {}/{}", view.rows.len(), view.total);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(counter, Style::default().fg(MUTED))))
            .style(Style::default().bg(BG)),
        area,
    );
}

fn render_rows(frame: &mut Frame, area: Rect, view: &SelectorFrame<'_>) {
    let rows = view
        .rows
        .iter()
        .map(|row| Row::new(vec![Cell::from(highlight_label(row))]));

    let table = Table::new(rows, [Constraint::Percentage(100)])
        .style(Style::default().bg(BG).fg(Color::White))
        .row_highlight_style(Style::default().bg(CURSOR_BG).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    if !view.rows.is_empty() {
        state.select(Some(view.cursor));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

/// Splits a label into spans so matched characters stand out.
pub fn highlight_label(row: &FrameRow<'_>) -> Line<'static> {
    let plain = Style::default();
    let matched = Style::default().fg(ACCENT).add_modifier(Modifier::BOLD);

    let mut spans = Vec::new();
    let mut chunk = String::new();
    let mut chunk_matched = false;
    let mut wanted = row.positions.iter().peekable();

    for (at, ch) in row.label.chars().enumerate() {
        let is_match = wanted.next_if(|position| **position == at).is_some();
        if is_match != chunk_matched && !chunk.is_empty() {
            let style = if chunk_matched { matched } else { plain };
            spans.push(Span::styled(std::mem::take(&mut chunk), style));
        }
        chunk_matched = is_match;
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        let style = if chunk_matched { matched } else { plain };
        spans.push(Span::styled(chunk, style));
    }

    Line::from(spans)
}

fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|span| span.content.chars().count()).sum()
}

#[cfg(test)]
mod tests {
    use super::{highlight_label, render};
    use crate::selector::{FrameRow, SelectorFrame};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::style::Modifier;

    #[test]
    fn matched_characters_are_split_into_bold_spans() {
        let row = FrameRow {
            label: "production",
            positions: &[0, 1, 2],
        };
        let line = highlight_label(&row);
        let parts = line
            .spans
            .iter()
            .map(|span| {
                (
                    span.content.to_string(),
                    span.style.add_modifier.contains(Modifier::BOLD),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(
            parts,
            vec![("pro".to_string(), true), ("duction".to_string(), false)]
        );
    }

    #[test]
    fn unmatched_label_is_one_plain_span() {
        let row = FrameRow {
            label: "default",
            positions: &[],
        };
        let line = highlight_label(&row);
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "default");
    }

    #[test]
    fn frame_shows_prompt_counter_and_rows() {
        let backend = TestBackend::new(30, 5);
        let mut terminal = Terminal::new(backend).expect("test backend");
        let view = SelectorFrame {
            prompt: "Select pod > ",
            query: "we",
            rows: vec![
                FrameRow {
                    label: "web-0",
                    positions: &[0, 1],
                },
                FrameRow {
                    label: "web-1",
                    positions: &[0, 1],
                },
            ],
            cursor: 1,
            total: 7,
        };
        terminal
            .draw(|frame| render(frame, &view))
            .expect("draw frame");

        let buffer = terminal.backend().buffer();
        let text = buffer
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert!(text.contains("Select pod > we"));
        assert!(text.contains("2/7"));
        assert!(text.contains("web-0"));
        assert!(text.contains("> web-1"));
    }
}

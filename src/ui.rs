use ratatui::{
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::app::{App, FocusPane, InputMode, NoticeKind, MAX_PROMPT_CHARS};

// Bordered input card: two border rows around three text rows.
const INPUT_HEIGHT: u16 = 5;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, input card, result panel, footer
    let [header_area, input_area, result_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(INPUT_HEIGHT),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_input(app, frame, input_area);
    render_result(app, frame, result_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" PRD Generator ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            "product requirement documents in seconds",
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let focused = app.focus == FocusPane::Input;
    let border_color = if focused || editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let count = app.prompt_char_count();
    let counter_style = if count >= MAX_PROMPT_CHARS {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Describe your product idea ")
        .title_bottom(
            Line::from(Span::styled(
                format!(" {}/{} ", count, MAX_PROMPT_CHARS),
                counter_style,
            ))
            .right_aligned(),
        );

    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if app.prompt.is_empty() {
        let placeholder = Paragraph::new("Describe your product idea...")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(placeholder, inner);
        if editing {
            frame.set_cursor_position((inner.x, inner.y));
        }
        return;
    }

    // Wrap by characters so cursor math matches the displayed rows exactly
    let (rows, (cursor_col, cursor_row)) =
        layout_input(&app.prompt, app.prompt_cursor, inner.width as usize);

    // Keep the cursor row visible
    let visible_rows = inner.height;
    let scroll = cursor_row.saturating_sub(visible_rows.saturating_sub(1));

    let text: Vec<Line> = rows.into_iter().map(Line::from).collect();
    let input = Paragraph::new(Text::from(text))
        .style(Style::default().fg(Color::Cyan))
        .scroll((scroll, 0));
    frame.render_widget(input, inner);

    if editing {
        frame.set_cursor_position((inner.x + cursor_col, inner.y + cursor_row - scroll));
    }
}

fn render_result(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Result;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let title = if app.has_copied {
        " Generated PRD [copied!] "
    } else {
        " Generated PRD "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    if app.is_generating() {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        let busy = Paragraph::new(Line::from(Span::styled(
            format!("Generating{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )))
        .block(block);
        frame.render_widget(busy, area);
        return;
    }

    let Some(result) = &app.result else {
        let placeholder =
            Paragraph::new("No PRD yet. Describe your product above and press Enter.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let lines: Vec<Line> = result.lines().map(render_markdown_line).collect();

    app.total_result_lines = lines.len() as u16;
    app.result_height = area.height.saturating_sub(2);
    // Scroll bound is in logical lines; wrapping can add display rows
    // beyond it on very long lines.
    let max_scroll = app.total_result_lines.saturating_sub(app.result_height);
    if app.result_scroll > max_scroll {
        app.result_scroll = max_scroll;
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.result_scroll, 0));
    frame.render_widget(paragraph, area);

    // Render scrollbar
    if app.total_result_lines > app.result_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(app.total_result_lines as usize)
            .position(app.result_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // An active notice takes over the footer line
    if let Some(notice) = &app.notice {
        let style = match notice.kind {
            NoticeKind::Success => Style::default().bg(Color::Green).fg(Color::Black),
            NoticeKind::Error => Style::default().bg(Color::Red).fg(Color::White),
            NoticeKind::Validation => Style::default().bg(Color::Yellow).fg(Color::Black),
        };
        let line = Paragraph::new(format!(" {} ", notice.text)).style(style);
        frame.render_widget(line, area);
        return;
    }

    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " VIEW ",
        InputMode::Editing => " EDIT ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints: Vec<Span> = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];

    if app.is_generating() {
        hints.extend([
            Span::styled(" Esc ", key_style),
            Span::styled(" stop ", label_style),
        ]);
    }

    match app.input_mode {
        InputMode::Editing => {
            hints.extend([
                Span::styled(" Enter ", key_style),
                Span::styled(" generate ", label_style),
                Span::styled(" Tab ", key_style),
                Span::styled(" result ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" done ", label_style),
            ]);
        }
        InputMode::Normal => {
            if app.result.is_some() {
                hints.extend([
                    Span::styled(" c ", key_style),
                    Span::styled(" copy ", label_style),
                    Span::styled(" s ", key_style),
                    Span::styled(" save ", label_style),
                    Span::styled(" j/k ", key_style),
                    Span::styled(" scroll ", label_style),
                ]);
            }
            hints.extend([
                Span::styled(" Enter ", key_style),
                Span::styled(" generate ", label_style),
                Span::styled(" i ", key_style),
                Span::styled(" edit ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
        }
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

/// Char-wrap `prompt` into rows of `width`, returning the rows and the
/// cursor's (col, row) in that grid.
fn layout_input(prompt: &str, cursor: usize, width: usize) -> (Vec<String>, (u16, u16)) {
    if width == 0 {
        return (vec![String::new()], (0, 0));
    }

    let chars: Vec<char> = prompt.chars().collect();
    let mut rows: Vec<String> = chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect();
    if rows.is_empty() {
        rows.push(String::new());
    }

    let cursor = cursor.min(chars.len());
    let row = cursor / width;
    let col = cursor % width;
    // Cursor sitting just past a full last row lands on a fresh empty row
    if row >= rows.len() {
        rows.push(String::new());
    }

    (rows, (col as u16, row as u16))
}

fn render_markdown_line(text: &str) -> Line<'static> {
    let trimmed = text.trim_start();
    if trimmed.starts_with("# ") || trimmed.starts_with("## ") || trimmed.starts_with("### ") {
        return Line::from(Span::styled(
            text.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    }

    // Bullet marker gets the accent color, the rest still parses for bold
    if let Some(rest) = trimmed.strip_prefix("* ").or_else(|| trimmed.strip_prefix("- ")) {
        let marker_len = text.len() - rest.len();
        let mut line = parse_markdown_line(rest);
        line.spans.insert(
            0,
            Span::styled(text[..marker_len].to_string(), Style::default().fg(Color::Cyan)),
        );
        return line;
    }

    parse_markdown_line(text)
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut current_text = String::new();

    while let Some((_, c)) = chars.next() {
        if c == '*' {
            // Check for ** (bold)
            if chars.peek().map(|(_, c)| *c) == Some('*') {
                // Consume the second *
                chars.next();

                // Push any accumulated plain text
                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }

                // Find closing **
                let mut bold_text = String::new();
                let mut found_close = false;

                while let Some((_, c)) = chars.next() {
                    if c == '*' && chars.peek().map(|(_, c)| *c) == Some('*') {
                        chars.next(); // consume second *
                        found_close = true;
                        break;
                    }
                    bold_text.push(c);
                }

                if found_close && !bold_text.is_empty() {
                    spans.push(Span::styled(
                        bold_text,
                        Style::default().add_modifier(Modifier::BOLD),
                    ));
                } else {
                    // No closing **, treat as literal
                    current_text.push_str("**");
                    current_text.push_str(&bold_text);
                }
            } else {
                // Single * - could be italic, but for now treat as literal
                current_text.push(c);
            }
        } else {
            current_text.push(c);
        }
    }

    // Push any remaining text
    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

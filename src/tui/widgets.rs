//! TUI rendering: ingest panel, transcript, query input, status bar.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::message::{ChatMessage, Role};
use crate::session::{IngestMode, IngestStatus, Session};

use super::Focus;

/// Placeholder shown in the empty query input.
const QUERY_PLACEHOLDER: &str = "Ask a question based on your documents...";

// ---------------------------------------------------------------------------
// Message rendering
// ---------------------------------------------------------------------------

/// Render one transcript entry as styled lines.
///
/// User entries are plain text behind a prompt marker; assistant entries are
/// styled as lightweight markup, with a dim confidence/source footer when a
/// score is attached.
pub fn message_to_lines(msg: &ChatMessage) -> Vec<Line<'static>> {
    match msg.role {
        Role::User => vec![Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Green)),
            Span::raw(msg.content.clone()),
        ])],
        Role::Assistant => {
            let mut lines = markup_lines(&msg.content);
            if let Some(confidence) = msg.confidence_label() {
                let footer = match msg.source_label() {
                    Some(sources) => format!("confidence {confidence} · {sources}"),
                    None => format!("confidence {confidence}"),
                };
                lines.push(Line::from(Span::styled(
                    footer,
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines
        }
    }
}

/// Style a block of lightweight markup: headings, bullets, code fences,
/// inline `**bold**` and `` `code` `` runs.
pub fn markup_lines(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for raw in text.lines() {
        if raw.trim_start().starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            lines.push(Line::from(Span::styled(
                format!("    {raw}"),
                Style::default().fg(Color::DarkGray),
            )));
            continue;
        }

        let trimmed = raw.trim_start();
        if let Some(heading) = trimmed
            .strip_prefix("### ")
            .or_else(|| trimmed.strip_prefix("## "))
            .or_else(|| trimmed.strip_prefix("# "))
        {
            lines.push(Line::from(Span::styled(
                heading.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            let mut spans = vec![Span::styled("  • ", Style::default().fg(Color::Cyan))];
            spans.extend(inline_spans(item));
            lines.push(Line::from(spans));
        } else {
            lines.push(Line::from(inline_spans(raw)));
        }
    }

    if lines.is_empty() {
        lines.push(Line::raw(""));
    }
    lines
}

/// Split a markup line into styled spans, toggling on `**` and backticks.
/// Unbalanced markers degrade to styling the rest of the line.
fn inline_spans(text: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut bold = false;
    for (i, segment) in text.split("**").enumerate() {
        if i > 0 {
            bold = !bold;
        }
        if segment.is_empty() {
            continue;
        }
        let mut code = false;
        for (j, piece) in segment.split('`').enumerate() {
            if j > 0 {
                code = !code;
            }
            if piece.is_empty() {
                continue;
            }
            let mut style = Style::default();
            if bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            if code {
                style = style.fg(Color::Yellow);
            }
            spans.push(Span::styled(piece.to_string(), style));
        }
    }
    if spans.is_empty() {
        spans.push(Span::raw(""));
    }
    spans
}

// ---------------------------------------------------------------------------
// Frame layout
// ---------------------------------------------------------------------------

/// Main TUI layout rendering.
///
/// `scroll` counts transcript lines hidden below the viewport (0 = stick to
/// bottom); it is clamped here against the actual line count so callers can
/// adjust it blindly.
pub fn render(
    frame: &mut Frame,
    session: &Session,
    focus: Focus,
    scroll: &mut usize,
    server: &str,
    notice: Option<&str>,
) {
    let [header_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [sidebar_area, chat_area] =
        Layout::horizontal([Constraint::Length(34), Constraint::Fill(1)]).areas(main_area);

    let [transcript_area, input_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(chat_area);

    render_header(frame, header_area, server);
    render_ingest_panel(frame, sidebar_area, session, focus);
    render_transcript(frame, transcript_area, session, scroll);
    render_query_input(frame, input_area, session, focus);
    render_status_bar(frame, status_area, session, notice);
}

fn render_header(frame: &mut Frame, area: Rect, server: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " lectern ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" :: research assistant :: {server} ")),
    ]));
    frame.render_widget(header, area);
}

fn render_ingest_panel(frame: &mut Frame, area: Rect, session: &Session, focus: Focus) {
    let border_style = if focus == Focus::Ingest {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut lines: Vec<Line> = Vec::new();

    // Mode tabs.
    let mut tabs = Vec::new();
    for mode in IngestMode::ALL {
        let style = if mode == session.mode() {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tabs.push(Span::styled(format!(" {} ", mode.label()), style));
        tabs.push(Span::raw(" "));
    }
    lines.push(Line::from(tabs));
    lines.push(Line::raw(""));

    let hint = match session.mode() {
        IngestMode::Url => "page URL to fetch and index",
        IngestMode::File => "path to a .pdf file",
        IngestMode::Text => "raw text to index",
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(Color::DarkGray),
    )));

    // Active buffer, with a cursor mark while the panel has focus.
    let mut buffer = session.active_buffer().to_string();
    if focus == Focus::Ingest {
        buffer.push('▏');
    }
    lines.push(Line::raw(buffer));
    lines.push(Line::raw(""));

    // Status indicator.
    lines.push(if session.is_ingesting() {
        Line::from(Span::styled(
            "… ingesting",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        match session.status() {
            IngestStatus::Success => {
                let mut spans = vec![Span::styled(
                    "✓ added",
                    Style::default().fg(Color::Green),
                )];
                if let Some(receipt) = session.last_receipt() {
                    spans.push(Span::styled(
                        format!(" — {receipt}"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                Line::from(spans)
            }
            IngestStatus::Error => Line::from(Span::styled(
                "✗ failed to ingest",
                Style::default().fg(Color::Red),
            )),
            IngestStatus::Idle => Line::from(Span::styled(
                "enter: ingest",
                Style::default().fg(Color::DarkGray),
            )),
        }
    });

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" knowledge base "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn render_transcript(frame: &mut Frame, area: Rect, session: &Session, scroll: &mut usize) {
    let mut lines: Vec<Line> = Vec::new();
    for msg in session.transcript() {
        lines.extend(message_to_lines(msg));
        lines.push(Line::raw(""));
    }
    if session.is_researching() {
        lines.push(Line::from(Span::styled(
            "… researching",
            Style::default().fg(Color::Yellow),
        )));
    }

    let visible = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible);
    *scroll = (*scroll).min(max_scroll);
    let top = lines.len().saturating_sub(visible + *scroll);

    let transcript = Paragraph::new(lines[top..].to_vec())
        .block(Block::default().borders(Borders::ALL).title(" research "))
        .wrap(Wrap { trim: false });
    frame.render_widget(transcript, area);
}

fn render_query_input(frame: &mut Frame, area: Rect, session: &Session, focus: Focus) {
    let border_style = if focus == Focus::Query {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let content = if session.query().is_empty() && focus != Focus::Query {
        Line::from(Span::styled(
            QUERY_PLACEHOLDER,
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut text = session.query().to_string();
        if focus == Focus::Query {
            text.push('▏');
        }
        Line::raw(text)
    };

    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" ask "),
    );
    frame.render_widget(input, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, session: &Session, notice: Option<&str>) {
    let mut spans = vec![Span::styled(
        format!(" messages: {} ", session.transcript().len()),
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(notice) = notice {
        spans.push(Span::raw("| "));
        spans.push(Span::styled(
            format!("{notice} "),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::raw("| "));
    spans.push(Span::styled(
        "tab: focus · ←/→: mode · enter: submit · pgup/pgdn: scroll · esc: quit ",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

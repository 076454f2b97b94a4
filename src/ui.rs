use ratatui::prelude::*;
use ratatui::widgets::{Block, Padding, Paragraph};

use crate::app::{App, Stage};
use crate::link::{self, ROADMAP_AFFORDANCE_LABEL};
use crate::message_store::Sender;
use crate::questionnaire::{FieldKind, STATUS_OPTIONS};
use crate::roadmap::RoadmapView;
use crate::theme::Theme;

const STATUS_HEIGHT: u16 = 3;
const INPUT_HEIGHT: u16 = 3;
const TEXT_PADDING: u16 = 1;
const CARD_WIDTH: u16 = 64;
const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const COUNSELOR_NAME: &str = "Marvin";

pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    let screen = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.screen_bg)),
        screen,
    );
    let [body, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)]).areas(screen);
    match app.stage() {
        Stage::Questionnaire => render_questionnaire(frame, app, theme, body),
        Stage::Loading => render_loading(frame, app, theme, body),
        Stage::Chat => render_chat(frame, app, theme, body),
        Stage::Roadmap => render_roadmap(frame, app, theme, body),
    }
    render_status(frame, app, theme, status);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_questionnaire(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let form = app.intake();
    let question = form.current_question();
    let wrap_width = CARD_WIDTH.saturating_sub(4).max(10);

    let mut lines: Vec<Line> = vec![
        Line::styled("Vision Track", Style::default().fg(theme.accent_fg)).centered(),
        Line::default(),
    ];
    for part in wrap_text(question.prompt, wrap_width) {
        lines.push(Line::styled(part, Style::default().fg(theme.text_fg)).centered());
    }
    lines.push(Line::default());

    match question.kind {
        FieldKind::Select => {
            for (idx, (_, label)) in STATUS_OPTIONS.iter().enumerate() {
                let highlighted = idx == form.option_cursor();
                let marker = if highlighted { "▸ " } else { "  " };
                let style = if highlighted {
                    Style::default().fg(theme.accent_fg)
                } else {
                    Style::default().fg(theme.muted_fg)
                };
                lines.push(Line::styled(format!("{marker}{label}"), style));
            }
        }
        FieldKind::Text | FieldKind::Number => {
            let answer = form.current_answer();
            if answer.is_empty() {
                lines.push(
                    Line::styled(
                        format!("> {}", question.placeholder),
                        Style::default().fg(theme.muted_fg),
                    )
                    .centered(),
                );
            } else {
                lines.push(
                    Line::styled(format!("> {answer}_"), Style::default().fg(theme.text_fg))
                        .centered(),
                );
            }
        }
    }

    lines.push(Line::default());
    if let Some(error) = form.error() {
        for part in error.lines() {
            lines.push(Line::styled(part.to_string(), Style::default().fg(theme.error_fg)).centered());
        }
        lines.push(Line::default());
    }
    let progress = if form.is_submitting() {
        "Submitting...".to_string()
    } else {
        format!("Question {} of {}", form.index() + 1, form.question_count())
    };
    lines.push(Line::styled(progress, Style::default().fg(theme.muted_fg)).centered());

    let height = (lines.len() as u16 + 2 * TEXT_PADDING).min(area.height);
    let card = centered_rect(area, CARD_WIDTH, height);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .style(Style::default().bg(theme.card_bg))
            .padding(Padding::uniform(TEXT_PADDING)),
    );
    frame.render_widget(paragraph, card);
}

fn render_loading(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let spinner = SPINNER_FRAMES[(app.ticks() / 8) as usize % SPINNER_FRAMES.len()];
    let lines = vec![
        Line::styled(
            format!("{spinner} Preparing Your Session... {spinner}"),
            Style::default().fg(theme.text_fg),
        )
        .centered(),
        Line::default(),
        Line::styled(
            "Your AI counselor is getting ready to chat with you.",
            Style::default().fg(theme.muted_fg),
        )
        .centered(),
    ];
    let card = centered_rect(area, CARD_WIDTH, 5);
    frame.render_widget(Paragraph::new(lines), card);
}

fn chat_areas(area: Rect) -> (Rect, Rect) {
    let [messages, input] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(INPUT_HEIGHT)]).areas(area);
    (messages, input)
}

fn chat_wrap_width(messages_area: Rect) -> u16 {
    messages_area
        .width
        .saturating_sub(2 * TEXT_PADDING + 2)
        .max(10)
}

/// The full message pane content: bubbles, the roadmap affordance, and the
/// typing indicator. Scroll math reuses this so offsets stay exact.
fn chat_lines<'a>(app: &'a App, theme: &Theme, wrap_width: u16) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    if app.is_history_loading() {
        lines.push(
            Line::styled("Loading conversation...", Style::default().fg(theme.muted_fg)).centered(),
        );
        return lines;
    }
    for message in app.messages() {
        match message.sender {
            Sender::User => {
                for part in wrap_text(&message.text, wrap_width) {
                    lines.push(
                        Line::styled(
                            format!(" {part} "),
                            Style::default().fg(theme.text_fg).bg(theme.user_bubble_bg),
                        )
                        .right_aligned(),
                    );
                }
            }
            Sender::Ai => {
                let ai_style = Style::default().fg(theme.text_fg).bg(theme.ai_bubble_bg);
                if let Some(before) = link::split_roadmap_link(&message.text) {
                    for part in wrap_text(before, wrap_width) {
                        lines.push(Line::styled(format!(" {part} "), ai_style));
                    }
                    lines.push(Line::styled(
                        format!(" [ {ROADMAP_AFFORDANCE_LABEL} ] "),
                        Style::default().fg(theme.accent_fg).bg(theme.ai_bubble_bg),
                    ));
                } else {
                    for part in wrap_text(&message.text, wrap_width) {
                        lines.push(Line::styled(format!(" {part} "), ai_style));
                    }
                }
            }
        }
        lines.push(Line::default());
    }
    if app.is_in_flight() {
        let dots = ".".repeat(1 + (app.ticks() / 8) as usize % 3);
        lines.push(Line::styled(
            format!("{COUNSELOR_NAME} is typing{dots}"),
            Style::default().fg(theme.muted_fg),
        ));
    }
    lines
}

fn render_chat(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let (messages_area, input_area) = chat_areas(area);
    let wrap_width = chat_wrap_width(messages_area);
    let lines = chat_lines(app, theme, wrap_width);
    let messages = Paragraph::new(lines)
        .scroll((app.chat_scroll(), 0))
        .block(
            Block::default()
                .style(Style::default().bg(theme.card_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        );
    frame.render_widget(messages, messages_area);

    let compose_style = if app.is_in_flight() || app.is_history_loading() {
        Style::default().fg(theme.muted_fg)
    } else {
        Style::default().fg(theme.text_fg)
    };
    let compose_text = if app.compose().is_empty() {
        Line::styled(
            "Type Your Career Question...",
            Style::default().fg(theme.muted_fg),
        )
    } else {
        Line::styled(app.compose(), compose_style)
    };
    let input = Paragraph::new(compose_text).block(
        Block::default()
            .style(Style::default().bg(theme.input_bg))
            .padding(Padding::uniform(TEXT_PADDING)),
    );
    frame.render_widget(input, input_area);

    if !app.is_in_flight() && !app.is_history_loading() {
        let cursor_col = (app.compose_cursor() as u16).min(
            input_area
                .width
                .saturating_sub(2 * TEXT_PADDING + 1),
        );
        frame.set_cursor_position((
            input_area.x + TEXT_PADDING + cursor_col,
            input_area.y + TEXT_PADDING,
        ));
    }
}

pub fn chat_max_scroll(screen: Rect, app: &App, theme: &Theme) -> u16 {
    let [body, _status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)]).areas(screen);
    let (messages_area, _input_area) = chat_areas(body);
    if messages_area.height <= 2 * TEXT_PADDING {
        return 0;
    }
    let wrap_width = chat_wrap_width(messages_area);
    let total = chat_lines(app, theme, wrap_width).len() as u16;
    let visible = messages_area.height - 2 * TEXT_PADDING;
    total.saturating_sub(visible)
}

fn roadmap_lines<'a>(app: &'a App, theme: &Theme, wrap_width: u16) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    match app.roadmap_view() {
        RoadmapView::Loading => {
            lines.push(
                Line::styled(
                    "Loading your personalized roadmap...",
                    Style::default().fg(theme.muted_fg),
                )
                .centered(),
            );
        }
        RoadmapView::Failed(error) => {
            lines.push(Line::styled(error.clone(), Style::default().fg(theme.error_fg)).centered());
        }
        RoadmapView::Ready(data) => {
            if data.career_options.is_empty() {
                lines.push(
                    Line::styled(
                        "No career options were generated for this session.",
                        Style::default().fg(theme.muted_fg),
                    )
                    .centered(),
                );
            }
            for option in &data.career_options {
                lines.push(Line::styled(
                    option.title.clone(),
                    Style::default()
                        .fg(theme.accent_fg)
                        .add_modifier(Modifier::BOLD),
                ));
                for part in wrap_text(&option.reasoning, wrap_width) {
                    lines.push(Line::styled(part, Style::default().fg(theme.text_fg)));
                }
                if !option.skills.is_empty() {
                    for part in
                        wrap_text(&format!("Key skills: {}", option.skills.join(", ")), wrap_width)
                    {
                        lines.push(Line::styled(part, Style::default().fg(theme.muted_fg)));
                    }
                }
                if let Some(salary) = &option.salary {
                    lines.push(Line::styled(
                        format!("Expected salary: {salary}"),
                        Style::default().fg(theme.muted_fg),
                    ));
                }
                if let Some(growth) = &option.growth {
                    lines.push(Line::styled(
                        format!("5-year growth: {growth}"),
                        Style::default().fg(theme.muted_fg),
                    ));
                }
                for course in &option.courses {
                    let entry = if course.url.is_empty() {
                        format!("  • {}", course.name)
                    } else {
                        format!("  • {} — {}", course.name, course.url)
                    };
                    for part in wrap_text(&entry, wrap_width) {
                        lines.push(Line::styled(part, Style::default().fg(theme.text_fg)));
                    }
                }
                lines.push(Line::default());
            }
        }
    }
    lines
}

fn render_roadmap(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let wrap_width = area.width.saturating_sub(2 * TEXT_PADDING).max(10);
    let mut lines = vec![
        Line::styled(
            "Your Career Roadmap",
            Style::default()
                .fg(theme.text_fg)
                .add_modifier(Modifier::BOLD),
        )
        .centered(),
        Line::default(),
    ];
    lines.extend(roadmap_lines(app, theme, wrap_width));
    let paragraph = Paragraph::new(lines)
        .scroll((app.roadmap_scroll(), 0))
        .block(
            Block::default()
                .style(Style::default().bg(theme.card_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        );
    frame.render_widget(paragraph, area);
}

pub fn roadmap_max_scroll(screen: Rect, app: &App, theme: &Theme) -> u16 {
    let [body, _status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)]).areas(screen);
    if body.height <= 2 * TEXT_PADDING {
        return 0;
    }
    let wrap_width = body.width.saturating_sub(2 * TEXT_PADDING).max(10);
    let total = roadmap_lines(app, theme, wrap_width).len() as u16 + 2;
    let visible = body.height - 2 * TEXT_PADDING;
    total.saturating_sub(visible)
}

fn render_status(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let help = match app.stage() {
        Stage::Questionnaire => "Enter confirm · ↑/↓ choose · Shift+Tab back · Ctrl+C quit",
        Stage::Loading => "Ctrl+C quit",
        Stage::Chat => {
            "Enter send · /attach <path> attach a file · Shift+↑/↓ scroll · Ctrl+C quit"
        }
        Stage::Roadmap => "n new session · ↑/↓ scroll · Ctrl+C quit",
    };
    let paragraph = Paragraph::new(Line::styled(help, Style::default().fg(theme.muted_fg))).block(
        Block::default()
            .style(Style::default().bg(theme.status_bg))
            .padding(Padding::uniform(TEXT_PADDING)),
    );
    frame.render_widget(paragraph, area);
}

/// Greedy word wrap that preserves explicit newlines and hard-splits words
/// longer than the width. Kept simple so line counts match what Paragraph
/// renders without its own wrapping.
fn wrap_text(text: &str, width: u16) -> Vec<String> {
    let width = width.max(1) as usize;
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut current_len = 0usize;
        for word in raw.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if word_len > width {
                // The overlong word starts on a fresh line; the check above
                // already flushed anything pending.
                let mut piece = String::new();
                let mut piece_len = 0usize;
                for c in word.chars() {
                    if piece_len == width {
                        lines.push(std::mem::take(&mut piece));
                        piece_len = 0;
                    }
                    piece.push(c);
                    piece_len += 1;
                }
                current = piece;
                current_len = piece_len;
                continue;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(word);
            current_len += word_len;
        }
        if !current.is_empty() || raw.trim().is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

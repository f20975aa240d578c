use crate::app::{App, AppMode};
use crate::config::Theme;
use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine, Points},
        Block, BorderType, Borders, Clear, Gauge, Paragraph,
    },
    Frame,
};
use std::f64::consts::TAU;
use tempo_core::{Phase, SessionSnapshot};

pub const MIN_WIDTH: u16 = 34;
pub const MIN_HEIGHT: u16 = 9;

/// Hand length relative to the clock face radius.
const HAND_LENGTH: f64 = 0.6;
const FACE_RADIUS: f64 = 0.95;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        f.render_widget(Paragraph::new("screen too small"), area);
        return;
    }

    let snapshot = app.snapshot();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, chunks[0], app, &snapshot);
    draw_body(f, chunks[1], app, &snapshot);
    draw_status_bar(f, chunks[2], app, &snapshot);

    if app.mode == AppMode::ShowHelp {
        draw_help_overlay(f, &app.settings.theme);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App, snapshot: &SessionSnapshot) {
    let theme = &app.settings.theme;
    let text = Line::from(vec![
        Span::raw("⟪ "),
        Span::styled(
            snapshot.phase.label().to_uppercase(),
            Style::default()
                .fg(theme.phase_color(snapshot.phase))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ⟫"),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.surface)),
        ),
        area,
    );
}

fn draw_body(f: &mut Frame, area: Rect, app: &App, snapshot: &SessionSnapshot) {
    let display = &app.settings.display;
    if !display.show_analog {
        draw_info(f, area, app, snapshot);
        return;
    }

    // Terminal cells are roughly twice as tall as they are wide.
    let clock_width = (area.height * 2).min(area.width / 2);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(clock_width), Constraint::Min(0)])
        .split(area);

    draw_analog_clock(f, columns[0], &app.settings.theme, snapshot);
    draw_info(f, columns[1], app, snapshot);
}

fn draw_analog_clock(f: &mut Frame, area: Rect, theme: &Theme, snapshot: &SessionSnapshot) {
    let color = theme.phase_color(snapshot.phase);
    let hand_color = theme.foreground;
    let progress = snapshot.progress();
    let show_hand = progress < 1.0;
    let (hand_x, hand_y) = hand_tip(progress);
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: FACE_RADIUS,
                color,
            });
            ctx.draw(&Points {
                coords: &[(0.0, 0.8), (0.8, 0.0), (0.0, -0.8), (-0.8, 0.0)],
                color,
            });
            if show_hand {
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: 0.0,
                    x2: hand_x,
                    y2: hand_y,
                    color: hand_color,
                });
            }
        });
    f.render_widget(canvas, area);
}

/// End point of the clock hand for `progress` in `0.0..=1.0`, starting at
/// twelve o'clock and sweeping clockwise.
pub fn hand_tip(progress: f64) -> (f64, f64) {
    let angle = progress.clamp(0.0, 1.0) * TAU;
    (angle.sin() * HAND_LENGTH, angle.cos() * HAND_LENGTH)
}

fn draw_info(f: &mut Frame, area: Rect, app: &App, snapshot: &SessionSnapshot) {
    let theme = &app.settings.theme;
    let display = &app.settings.display;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.phase_color(snapshot.phase)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::new();
    if display.show_completed {
        lines.push(Line::from(format!(
            "Rounds completed: {}",
            snapshot.cycles_completed
        )));
    }
    if display.show_next_long {
        lines.push(Line::from(next_long_break_text(snapshot)));
    }
    if display.show_digital {
        lines.push(Line::from(vec![
            Span::raw("Time remaining: "),
            Span::styled(
                snapshot.remaining_clock(),
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        if snapshot.running {
            if let Some(ends) = ends_at(snapshot) {
                lines.push(Line::styled(
                    format!("Ends at {ends}"),
                    Style::default().fg(theme.muted),
                ));
            }
        }
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);
    f.render_widget(
        Paragraph::new(lines).style(Style::default().fg(theme.foreground)),
        rows[0],
    );
    if display.show_digital {
        f.render_widget(
            Gauge::default()
                .gauge_style(
                    Style::default()
                        .fg(theme.phase_color(snapshot.phase))
                        .bg(theme.surface),
                )
                .ratio(snapshot.progress()),
            rows[1],
        );
    }
}

pub fn next_long_break_text(snapshot: &SessionSnapshot) -> String {
    if snapshot.phase == Phase::LongBreak {
        return "Long break in progress".to_string();
    }
    let rounds = snapshot.work_sessions_until_long_break();
    format!(
        "Next long break in {} round{}",
        rounds,
        if rounds == 1 { "" } else { "s" }
    )
}

fn ends_at(snapshot: &SessionSnapshot) -> Option<String> {
    let remaining = chrono::Duration::from_std(snapshot.remaining()).ok()?;
    let ends = Local::now().checked_add_signed(remaining)?;
    Some(ends.format("%H:%M").to_string())
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App, snapshot: &SessionSnapshot) {
    let theme = &app.settings.theme;
    let (mode_text, mode_color) = if snapshot.running {
        ("RUNNING", theme.phase_color(snapshot.phase))
    } else {
        ("PAUSED", theme.paused)
    };
    let help = if app.mode == AppMode::Normal {
        "space:start/pause │ s:skip │ r:reset │ ?:help │ q:quit"
    } else {
        "esc:close"
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", mode_text),
                Style::default()
                    .bg(mode_color)
                    .fg(theme.surface)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(help),
        ]))
        .block(Block::default().style(Style::default().bg(theme.surface).fg(theme.muted))),
        area,
    );
}

fn draw_help_overlay(f: &mut Frame, theme: &Theme) {
    let area = centered_rect(70, 80, f.area());
    f.render_widget(Clear, area);

    let shortcuts = [
        ("space", "Start / pause"),
        ("s", "Skip to the next phase"),
        ("r", "Reset the session"),
        ("?", "Toggle help"),
        ("q", "Quit"),
    ];
    let lines: Vec<Line> = shortcuts
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{key:>6}  "), Style::default().fg(theme.paused)),
                Span::raw(*action),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(theme.long_break)),
        ),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

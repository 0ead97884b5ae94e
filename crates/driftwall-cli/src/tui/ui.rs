//! TUI rendering — the wall fills the terminal, messages drift right to left.
//!
//! ┌──────────────────────────────────────────────┐
//! │  driftwall   feed.json   18/20   overlay: on │
//! ├──────────────────────────────────────────────┤
//! │        first message · ada                   │
//! │                  ░░██████░░                  │
//! │   lurking · Anonymous  ░██░                  │
//! │                  ░░██████░░                  │
//! │              drift on · lin                  │
//! ├──────────────────────────────────────────────┤
//! │  q: quit  r: reload  b: overlay  space: play │
//! └──────────────────────────────────────────────┘

use ratatui::{prelude::*, widgets::*};

use driftwall_core::{FlyingItem, PlaybackState};

use super::app::App;

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Min(5),    // wall
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    draw_wall(f, rows[1], app);
    draw_keys(f, rows[2], app);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let swarm = app.swarm();
    let overlay = match app.playback().state() {
        PlaybackState::Idle => "off",
        PlaybackState::Loading => "loading",
        PlaybackState::Ready => "ready",
        PlaybackState::PendingGesture => "waiting for gesture",
        PlaybackState::Playing => "playing",
        PlaybackState::Completed => "done",
        PlaybackState::Failed => "failed",
    };

    let line = Line::from(vec![
        Span::styled(" driftwall ", Style::default().bold().fg(Color::Cyan)),
        Span::raw(app.feed_name()),
        Span::styled(
            format!("   {}/{}", swarm.items().len(), swarm.capacity()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("   overlay: {overlay}"),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_wall(f: &mut Frame, area: Rect, app: &App) {
    let now = app.now();
    for item in app.swarm().items() {
        draw_item(f, area, item, now);
    }
    draw_overlay(f, area, app);
}

fn draw_item(f: &mut Frame, wall: Rect, item: &FlyingItem, now: std::time::Duration) {
    if wall.height == 0 {
        return;
    }
    let label = format!("{} · {}", item.body, item.author);
    let len = label.chars().count() as i32;
    let col = item_column(item.progress(now), wall.width as i32, len);

    let y = wall.y + row_for(item.top_percent, wall.height);
    let style = item_style(item.font_size);

    // Clip against both wall edges; the item enters from off-screen right
    // and leaves off-screen left.
    let (x, text) = if col < 0 {
        let skip = (-col) as usize;
        if skip >= label.chars().count() {
            return;
        }
        (wall.x, label.chars().skip(skip).collect::<String>())
    } else {
        (wall.x + col as u16, label)
    };
    if x >= wall.right() {
        return;
    }
    let max_width = (wall.right() - x) as usize;
    let buf = f.buffer_mut();
    buf.set_stringn(x, y, text, max_width, style);
}

fn draw_overlay(f: &mut Frame, area: Rect, app: &App) {
    let playback = app.playback();

    let text: String = match playback.state() {
        PlaybackState::Playing | PlaybackState::Completed => match playback.current_frame() {
            Some(frame) => frame.to_string(),
            None => return,
        },
        PlaybackState::PendingGesture => "press space to play".to_string(),
        PlaybackState::Failed => {
            format!("overlay failed: {}", playback.error().unwrap_or("unknown"))
        }
        _ => return,
    };

    let cols = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let rows = text.lines().count() as u16;
    let width = cols.min(area.width);
    let height = rows.min(area.height);
    let rect = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    f.render_widget(Clear, rect);
    let p = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    f.render_widget(p, rect);
}

fn draw_keys(f: &mut Frame, area: Rect, app: &App) {
    let mut keys = String::from(" q: quit   r: reload feed");
    if app.has_asset() {
        keys.push_str("   b: toggle overlay");
    }
    if app.playback().state() == PlaybackState::PendingGesture {
        keys.push_str("   space: play");
    }
    if let Some(status) = app.status() {
        keys.push_str("   | ");
        keys.push_str(status);
    }
    f.render_widget(
        Paragraph::new(keys).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

/// Left column of an item's label. Traversal spans from just past the right
/// edge (`progress == 0`) to fully off the left edge (`progress == 1`).
fn item_column(progress: f64, wall_width: i32, label_width: i32) -> i32 {
    let travel = (wall_width + label_width) as f64;
    (wall_width as f64 - progress * travel).round() as i32
}

/// Wall row for a vertical offset in `[0, 80)` percent.
fn row_for(top_percent: f64, wall_height: u16) -> u16 {
    let row = (top_percent / 100.0 * wall_height as f64) as u16;
    row.min(wall_height - 1)
}

/// Terminal cells cannot scale type, so the rolled font size maps to
/// emphasis instead.
fn item_style(font_size: u32) -> Style {
    if font_size >= 34 {
        Style::default().bold()
    } else if font_size <= 20 {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Gray)
    }
}

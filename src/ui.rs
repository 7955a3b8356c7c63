//! Terminal transport surface.
//!
//! The controller reports through [`TuiView`]; [`draw`] renders the latest
//! snapshot with `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::config::{ControlsSettings, UiSettings};
use crate::library::clean_song_name;
use crate::metadata::MetadataDisplay;
use crate::player::{format_time, play_glyph, progress_ratio};

mod view;

pub use view::{TuiView, ViewSnapshot};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter", "play selected");
    map.insert("space/p", "play/pause");
    // h/l is filled in from config.
    map.insert("0-9", "jump to 0-90%");
    map.insert("b/v/n", "bass/vocal/balanced");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, including the configured seek step.
fn controls_text(seek_step: f64) -> String {
    let order = ["j/k", "enter", "space/p", "h/l", "0-9", "b/v/n", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "h/l" {
                Some(format!("[h/l] seek -/+{:.0}%", seek_step * 100.0))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{k}] {v}"))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

fn now_playing_text(snapshot: &ViewSnapshot) -> String {
    let mut lines = Vec::new();
    match snapshot.current_name() {
        Some(name) => lines.push(format!("Track: {}", clean_song_name(name))),
        None => lines.push("Track: -".to_string()),
    }
    if let Some(meta) = &snapshot.metadata {
        lines.push(format!("Video: {}", meta.headline()));
        if let MetadataDisplay::Found(info) = meta {
            if let Some(url) = &info.thumbnail_url {
                lines.push(format!("Thumbnail: {url}"));
            }
        }
    }
    lines.push(format!("Preset: {}", snapshot.preset));
    if let Some(err) = &snapshot.error {
        lines.push(format!("Error: {err}"));
    }
    lines.join("\n")
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the whole UI. `cursor` is the highlighted playlist row.
pub fn draw(
    frame: &mut Frame,
    snapshot: &ViewSnapshot,
    cursor: usize,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" eightd ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let now_playing = Paragraph::new(now_playing_text(snapshot))
        .block(padded(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, chunks[1]);

    // Only build items for the visible window, keeping the cursor centred.
    let total = snapshot.tracks.len();
    let list_height = chunks[2].height.saturating_sub(2) as usize;
    let cursor = cursor.min(total.saturating_sub(1));
    let (start, end) = if total <= list_height || list_height == 0 {
        (0, total)
    } else {
        let half = list_height / 2;
        let start = cursor.saturating_sub(half).min(total - list_height);
        (start, start + list_height)
    };
    let items: Vec<ListItem> = snapshot.tracks[start..end]
        .iter()
        .enumerate()
        .map(|(offset, name)| {
            let marker = if snapshot.current == Some(start + offset) {
                "♪ "
            } else {
                "  "
            };
            ListItem::new(format!("{marker}{name}"))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" playlist "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(cursor - start));
    }
    frame.render_stateful_widget(list, chunks[2], &mut state);

    let label = format!(
        "{}  {} / {}",
        play_glyph(snapshot.playing),
        format_time(snapshot.position),
        format_time(snapshot.duration.unwrap_or(0.0)),
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .ratio(progress_ratio(snapshot.position, snapshot.duration))
        .label(label);
    frame.render_widget(gauge, chunks[3]);

    let footer = Paragraph::new(controls_text(controls_settings.seek_step))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}

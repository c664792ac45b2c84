//! Turns [`App`] state into styled lines. No terminal access happens here.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::app::{App, StatusKind, View};
use crate::list::ListState;
use crate::viewport::{self, list_capacity};

pub fn render(app: &App) -> Vec<Line<'static>> {
    if let Some(status) = app.status.as_ref() {
        return render_status(status.kind, &status.text);
    }

    let list = app.active_list();
    let mut lines = header(app, list);
    lines.push(Line::from(""));
    lines.push(filter_line(app));
    lines.push(Line::from(""));
    lines.extend(list_lines(app.view, list, list_capacity(app.height)));
    lines.push(Line::from(""));
    lines.push(footer(app));
    lines
}

fn render_status(kind: StatusKind, text: &str) -> Vec<Line<'static>> {
    let style = match kind {
        StatusKind::Success => Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD),
        StatusKind::Error | StatusKind::Fatal => {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        }
    };
    let hint = match kind {
        StatusKind::Fatal => vec![
            Span::raw("Press "),
            Span::styled(" q ", key_style()),
            Span::raw(" or "),
            Span::styled(" Ctrl+C ", key_style()),
            Span::raw(" to exit."),
        ],
        StatusKind::Success | StatusKind::Error => vec![
            Span::raw("Press "),
            Span::styled(" Esc ", key_style()),
            Span::raw(" to return, "),
            Span::styled(" Ctrl+C ", key_style()),
            Span::raw(" to exit."),
        ],
    };
    vec![
        Line::from(Span::styled(text.to_string(), style)),
        Line::from(""),
        Line::from(hint),
    ]
}

fn header(app: &App, list: &ListState) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Cyan);
    let value = Style::default()
        .fg(Color::LightGreen)
        .add_modifier(Modifier::BOLD);
    let (profile, region, endpoint) = match app.identity() {
        Some(identity) => (
            identity.profile.clone(),
            identity.region.clone(),
            identity.endpoint_url.clone(),
        ),
        None => {
            let pending = "connecting…".to_string();
            (pending.clone(), pending.clone(), pending)
        }
    };

    let counts = format!("({}/{})", list.filtered().len(), list.all().len());
    let title = match (app.view, app.selected_container.as_deref()) {
        (View::Items, Some(container)) => format!("Objects in {container} {counts}"),
        _ => format!("Buckets {counts}"),
    };

    vec![
        Line::from(vec![
            Span::styled("Profile: ", label),
            Span::styled(profile, value),
        ]),
        Line::from(vec![
            Span::styled("Region: ", label),
            Span::styled(region, value),
        ]),
        Line::from(vec![
            Span::styled("Endpoint: ", label),
            Span::styled(endpoint, value),
        ]),
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        )),
    ]
}

fn filter_line(app: &App) -> Line<'static> {
    let prompt = Span::styled("> ", Style::default().fg(Color::LightYellow));
    if app.filter_text.is_empty() {
        Line::from(vec![
            prompt,
            Span::styled(app.placeholder(), Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(vec![
            prompt,
            Span::raw(app.filter_text.to_string()),
            Span::styled("█", Style::default().fg(Color::Gray)),
        ])
    }
}

fn list_lines(view: View, list: &ListState, capacity: usize) -> Vec<Line<'static>> {
    let noun = match view {
        View::Containers => "buckets",
        View::Items => "objects",
    };
    let filtered = list.filtered();
    if filtered.is_empty() {
        let text = if list.is_loading() {
            format!("Loading {noun}…")
        } else if list.all().is_empty() {
            format!("No {noun} found")
        } else {
            format!("No {noun} match the filter")
        };
        return vec![Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let indicator = Style::default().fg(Color::DarkGray);
    let window = viewport::follow(list.offset(), filtered.len(), list.cursor(), capacity);
    let mut lines = Vec::with_capacity(window.len() + 2);
    lines.push(if window.more_above() {
        Line::from(Span::styled("↑ (more)", indicator))
    } else {
        Line::from("")
    });
    for (idx, name) in filtered[window.start..window.end].iter().enumerate() {
        let is_selected = window.start + idx == list.cursor();
        let line = if is_selected {
            Line::from(vec![
                Span::styled(
                    "► ",
                    Style::default()
                        .fg(Color::LightYellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    name.clone(),
                    Style::default()
                        .fg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        } else {
            Line::from(vec![Span::raw("  "), Span::raw(name.clone())])
        };
        lines.push(line);
    }
    if window.more_below() {
        lines.push(Line::from(Span::styled("↓ (more)", indicator)));
    }
    lines
}

fn footer(app: &App) -> Line<'static> {
    let mut spans = vec![
        Span::styled(" ↑↓ ", key_style()),
        Span::raw(" move  "),
        Span::styled(" Enter ", key_style()),
    ];
    match app.view {
        View::Containers => {
            spans.push(Span::raw(" open  "));
            spans.push(Span::styled(" Esc ", key_style()));
            spans.push(Span::raw(" clear  "));
        }
        View::Items => {
            spans.push(Span::raw(" download  "));
            spans.push(Span::styled(" Esc ", key_style()));
            spans.push(Span::raw(" back  "));
        }
    }
    spans.push(Span::styled(" Ctrl+R ", key_style()));
    spans.push(Span::raw(" refresh  "));
    spans.push(Span::styled(" Ctrl+C ", key_style()));
    spans.push(Span::raw(" quit"));
    if let Some(key) = app.pending_download.as_deref() {
        spans.push(Span::styled(
            format!("  Downloading {key}…"),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

fn key_style() -> Style {
    Style::default()
        .bg(Color::LightCyan)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;
    use crate::protocol::Msg;
    use crate::protocol::tests::MemoryStore;
    use crate::store::{ClientHandle, StoreError};

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.update(Msg::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn app_with(containers: usize, height: u16) -> App {
        let mut app = App::new(PathBuf::from("."));
        let client: ClientHandle = Arc::new(MemoryStore::new());
        app.update(Msg::ClientReady(client));
        app.update(Msg::Containers(
            (0..containers).map(|i| format!("bucket-{i:02}")).collect(),
        ));
        app.update(Msg::Resize(height));
        app
    }

    #[test]
    fn header_shows_identity_and_placeholder() {
        let app = app_with(2, 30);
        let lines = text(&render(&app));
        assert_eq!(lines[0], "Profile: test");
        assert_eq!(lines[1], "Region: us-east-1");
        assert_eq!(lines[2], "Endpoint: http://localhost:4566");
        assert_eq!(lines[3], "Buckets (2/2)");
        assert_eq!(lines[5], "> Filter buckets...");
        assert!(lines.iter().any(|l| l == "► bucket-00"));
        assert!(lines.iter().any(|l| l == "  bucket-01"));
    }

    #[test]
    fn header_before_client_is_ready() {
        let app = App::new(PathBuf::from("."));
        let lines = text(&render(&app));
        assert_eq!(lines[0], "Profile: connecting…");
    }

    #[test]
    fn rendered_height_fits_the_screen() {
        let height = 20;
        let app = app_with(100, height);
        let lines = render(&app);
        assert!(lines.len() <= usize::from(height));
        let lines = text(&lines);
        assert!(lines.iter().any(|l| l == "↓ (more)"));
        assert!(!lines.iter().any(|l| l == "↑ (more)"));
    }

    #[test]
    fn scrolling_shows_both_indicators() {
        let mut app = app_with(100, 20);
        for _ in 0..30 {
            press(&mut app, KeyCode::Down);
        }
        let lines = text(&render(&app));
        assert!(lines.iter().any(|l| l == "↑ (more)"));
        assert!(lines.iter().any(|l| l == "↓ (more)"));
        assert!(lines.iter().any(|l| l == "► bucket-30"));
    }

    #[test]
    fn items_view_names_the_bucket() {
        let mut app = app_with(3, 30);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        let lines = text(&render(&app));
        assert_eq!(lines[3], "Objects in bucket-01 (0/0)");
        assert_eq!(lines[5], "> Filter objects...");
        assert_eq!(lines[7], "Loading objects…");
        assert!(lines.last().unwrap().contains("download"));
    }

    #[test]
    fn typed_filter_replaces_placeholder() {
        let mut app = app_with(3, 30);
        press(&mut app, KeyCode::Char('z'));
        let lines = text(&render(&app));
        assert_eq!(lines[5], "> z█");
        assert_eq!(lines[7], "No buckets match the filter");
    }

    #[test]
    fn status_replaces_the_list() {
        let mut app = app_with(3, 30);
        app.update(Msg::Failed(StoreError::ListContainers("AccessDenied".into())));
        let lines = text(&render(&app));
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("AccessDenied"));
        assert!(lines[2].contains("Esc"));
        assert!(!lines.iter().any(|l| l.contains("bucket-00")));
    }

    #[test]
    fn fatal_status_only_offers_exit() {
        let mut app = App::new(PathBuf::from("."));
        app.update(Msg::Failed(StoreError::Init("bad endpoint".into())));
        let lines = text(&render(&app));
        assert!(lines[2].contains(" q "));
        assert!(!lines[2].contains("Esc"));
    }
}

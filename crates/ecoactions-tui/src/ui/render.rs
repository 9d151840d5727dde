use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

use ecoactions_core::view::{ViewSnapshot, AUTH_STATUS, LOGIN_BUTTON, LOGOUT_BUTTON};
use ecoactions_core::{ModalId, Notification, Section};

use crate::app::{App, AppState, LoginFocus, RegisterFocus};

use super::styles;

const MODAL_WIDTH: u16 = 52;
const LOGIN_MODAL_HEIGHT: u16 = 11;
const REGISTER_MODAL_HEIGHT: u16 = 13;
const TOAST_MAX_WIDTH: u16 = 48;

pub fn render(frame: &mut Frame, app: &App) {
    let snapshot = app.snapshot();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Sections
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, &snapshot, chunks[0]);
    render_sections(frame, &snapshot, chunks[1]);
    render_main_content(frame, app, &snapshot, chunks[2]);
    render_status_bar(frame, &snapshot, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    match app.active_modal() {
        Some(ModalId::LOGIN) => render_login_overlay(frame, app),
        Some(ModalId::REGISTER) => render_register_overlay(frame, app),
        _ => {}
    }

    if let Some(ref notification) = snapshot.notification {
        render_notification(frame, notification);
    }
}

/// Screen area of a modal dialog, used for drawing and for click hit-testing
pub fn modal_area(modal: ModalId, area: Rect) -> Rect {
    let height = if modal == ModalId::REGISTER {
        REGISTER_MODAL_HEIGHT
    } else {
        LOGIN_MODAL_HEIGHT
    };
    centered_rect_fixed(MODAL_WIDTH, height, area)
}

fn render_title_bar(frame: &mut Frame, snapshot: &ViewSnapshot, area: Rect) {
    let title = "  PlantATree";

    let mut right: Vec<Span> = Vec::new();
    if snapshot.is_visible(AUTH_STATUS) {
        if let Some(text) = snapshot.text(AUTH_STATUS) {
            right.push(Span::styled(text.to_string(), styles::admin_badge_style()));
            right.push(Span::raw("  "));
        }
    }
    if snapshot.is_visible(LOGIN_BUTTON) {
        right.push(Span::styled("[l]ogin [r]egister", styles::muted_style()));
    }
    if snapshot.is_visible(LOGOUT_BUTTON) {
        right.push(Span::styled("l[o]gout", styles::muted_style()));
    }
    right.push(Span::styled("  [?] Help", styles::muted_style()));

    let right_len: usize = right.iter().map(|s| s.content.chars().count()).sum();
    let mut spans = vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + right_len + 2),
        )),
    ];
    spans.extend(right);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_sections(frame: &mut Frame, snapshot: &ViewSnapshot, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, section) in Section::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, section.title());
        if *section == snapshot.section {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, snapshot: &ViewSnapshot, area: Rect) {
    let lines = match snapshot.section {
        Section::Home => home_lines(app),
        Section::Profile => profile_lines(app),
        section => placeholder_lines(section),
    };

    let block = Block::default()
        .title(format!(" {} ", snapshot.section.title()))
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn home_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  Plant a tree, log it, inspire others.", styles::title_style())),
        Line::from(Span::styled(
            "  Share eco actions with your community and watch the map grow.",
            styles::list_item_style(),
        )),
        Line::from(""),
    ];

    match app.current_user() {
        Some(user) => lines.push(Line::from(vec![
            Span::styled("  Signed in as ", styles::muted_style()),
            Span::styled(user.username.clone(), styles::highlight_style()),
            Span::styled(". Press 6 for your profile.", styles::muted_style()),
        ])),
        None => lines.push(Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("l", styles::help_key_style()),
            Span::styled(" to sign in or ", styles::muted_style()),
            Span::styled("r", styles::help_key_style()),
            Span::styled(" to create an account.", styles::muted_style()),
        ])),
    }
    lines
}

fn placeholder_lines(section: Section) -> Vec<Line<'static>> {
    let description = match section {
        Section::Map => "Eco actions around you, pinned by location.",
        Section::Feed => "Recent eco actions shared by the community.",
        Section::Leaderboard => "Members ranked by eco points.",
        Section::AirQuality => "Air quality readings for nearby stations.",
        Section::Home | Section::Profile => "",
    };
    vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", description), styles::list_item_style())),
        Line::from(""),
        Line::from(Span::styled(
            "  This section is available in the web client.",
            styles::muted_style(),
        )),
    ]
}

fn profile_lines(app: &App) -> Vec<Line<'static>> {
    let Some(user) = app.current_user() else {
        return vec![Line::from(Span::styled("  Not signed in.", styles::muted_style()))];
    };

    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", label), styles::muted_style()),
            Span::styled(value, styles::list_item_style()),
        ])
    };

    // Avatar placeholder: the username's initial
    let avatar = user.initial().unwrap_or('?');
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  ( {} )  ", avatar), styles::title_style()),
            Span::styled(user.username.clone(), styles::highlight_style()),
        ]),
        Line::from(""),
        field("Username", user.username.clone()),
        field("Email", user.email.clone().unwrap_or_else(|| "-".to_string())),
        field("Role", user.role.clone().unwrap_or_else(|| "user".to_string())),
        field("Member #", user.id.to_string()),
    ];

    for (key, value) in &user.extra {
        let rendered = match value {
            Value::String(s) => s.clone(),
            Value::Null => continue,
            other => other.to_string(),
        };
        lines.push(field(&key.replace('_', " "), rendered));
    }
    lines
}

fn render_status_bar(frame: &mut Frame, snapshot: &ViewSnapshot, area: Rect) {
    let shortcuts = "[1-6] sections | [q]uit";
    let left_text = format!(" {} ", snapshot.section.title());
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 19, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(k, styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("  PlantATree", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        key("  1-6       ", "Switch section"),
        key("  ←/→       ", "Prev/next section"),
        key("  Esc       ", "Dismiss dialog or message"),
        Line::from(""),
        Line::from(Span::styled(" Account", styles::highlight_style())),
        key("  l         ", "Sign in"),
        key("  r         ", "Create an account"),
        key("  o         ", "Sign out"),
        key("  Ctrl+R/L  ", "Switch between sign in and register"),
        key("  q         ", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// One labelled input line of a dialog
fn input_line(label: &str, value: &str, masked: bool, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let shown: String = if masked {
        "*".repeat(value.chars().count().min(24))
    } else {
        // Keep the tail visible while typing long values
        let skip = value.chars().count().saturating_sub(24);
        value.chars().skip(skip).collect()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:>17}: [", label), styles::muted_style()),
        Span::styled(format!("{:<24}{}", shown, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    if focused {
        Line::from(vec![
            Span::raw("                 ["),
            Span::styled(format!(" ▶ {} ◀ ", label), styles::selected_style()),
            Span::raw("]"),
        ])
    } else {
        Line::from(vec![
            Span::raw("                 ["),
            Span::styled(format!("   {}   ", label), styles::list_item_style()),
            Span::raw("]"),
        ])
    }
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let area = modal_area(ModalId::LOGIN, frame.area());
    frame.render_widget(Clear, area);

    let form = &app.login_form;
    let lines = vec![
        Line::from(Span::styled("  Sign in", styles::title_style())),
        Line::from(""),
        input_line("Email", &form.email, false, form.focus == LoginFocus::Email),
        input_line("Password", &form.password, true, form.focus == LoginFocus::Password),
        Line::from(""),
        button_line("Login", form.focus == LoginFocus::Button),
        Line::from(""),
        Line::from(Span::styled(
            "  No account? Ctrl+R to register",
            styles::muted_style(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_register_overlay(frame: &mut Frame, app: &App) {
    let area = modal_area(ModalId::REGISTER, frame.area());
    frame.render_widget(Clear, area);

    let form = &app.register_form;
    let lines = vec![
        Line::from(Span::styled("  Create an account", styles::title_style())),
        Line::from(""),
        input_line("Username", &form.username, false, form.focus == RegisterFocus::Username),
        input_line("Email", &form.email, false, form.focus == RegisterFocus::Email),
        input_line("Password", &form.password, true, form.focus == RegisterFocus::Password),
        input_line(
            "Confirm password",
            &form.confirm_password,
            true,
            form.focus == RegisterFocus::Confirm,
        ),
        Line::from(""),
        button_line("Register", form.focus == RegisterFocus::Button),
        Line::from(""),
        Line::from(Span::styled(
            "  Have an account? Ctrl+L to sign in",
            styles::muted_style(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Toast in the top-right corner, above everything else
fn render_notification(frame: &mut Frame, notification: &Notification) {
    let full = frame.area();
    let text_width = notification.message.chars().count() as u16 + 4;
    let width = text_width.clamp(20, TOAST_MAX_WIDTH).min(full.width);
    let height = if text_width > width { 4 } else { 3 };
    let area = Rect::new(
        full.x + full.width.saturating_sub(width + 1),
        full.y + 1,
        width,
        height.min(full.height),
    );

    frame.render_widget(Clear, area);

    let style = styles::severity_style(notification.severity);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style);
    let paragraph = Paragraph::new(Span::styled(notification.message.clone(), style))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

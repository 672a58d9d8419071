use std::{
    io::{self, Write},
    sync::mpsc::Receiver,
};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, PrintStyledContent, Stylize},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use tracing::{error, info};

use crate::constants::{APP_NAME, UI_POLL_INTERVAL};
use crate::controller::Controller;
use crate::error::Result;
use crate::status::{IconState, TrayUpdate};
use crate::tray::menu::{MenuAction, MenuItem, build_menu};
use crate::tray::state::{Flow, TrayState};

/// Puts the terminal into raw mode on the alternate screen and restores it on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter(out: &mut impl Write) -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = execute!(out, EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyIntent {
    Action(MenuAction),
    Dismiss,
}

fn key_intent(key: &KeyEvent) -> Option<KeyIntent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyIntent::Action(MenuAction::Exit))
        }
        KeyCode::Esc => Some(KeyIntent::Action(MenuAction::Exit)),
        KeyCode::Char('d') => Some(KeyIntent::Dismiss),
        KeyCode::Char(c) => MenuAction::from_shortcut(c).map(KeyIntent::Action),
        _ => None,
    }
}

/// Runs the interactive tray until an approved exit arrives.
pub fn run_interactive(
    controller: &Controller,
    updates: Receiver<TrayUpdate>,
    mut state: TrayState,
    color: bool,
) -> Result<TrayState> {
    let mut out = io::stdout();
    let _guard = TerminalGuard::enter(&mut out)?;
    let menu = build_menu();
    render(&mut out, &state, &menu, color)?;

    loop {
        let mut dirty = false;

        for update in updates.try_iter() {
            dirty = true;
            if state.apply(update) == Flow::Exit {
                info!("Server is down; closing tray");
                return Ok(state);
            }
        }

        if event::poll(UI_POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => match key_intent(&key) {
                    Some(KeyIntent::Action(action)) => {
                        info!("Menu action: {}", action.as_ref());
                        state.pending = Some(action);
                        if let Err(err) = controller.dispatch(action) {
                            error!("{err}");
                            state.pending = None;
                        }
                        dirty = true;
                    }
                    Some(KeyIntent::Dismiss) => {
                        state.dismiss_notifications();
                        dirty = true;
                    }
                    None => {}
                },
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        if dirty {
            render(&mut out, &state, &menu, color)?;
        }
    }
}

fn icon_color(icon: IconState) -> Color {
    match icon {
        IconState::Gray => Color::Grey,
        IconState::Green => Color::Green,
        IconState::Red => Color::Red,
    }
}

/// Everything below the icon line, one entry per screen row.
fn body_lines(state: &TrayState, menu: &[MenuItem]) -> Vec<String> {
    let mut lines = Vec::new();

    match state.updated_at {
        Some(at) => lines.push(format!("  updated {}", at.format("%H:%M:%S"))),
        None => lines.push(String::new()),
    }
    lines.push(String::new());

    for item in menu {
        match item.action {
            Some(action) => lines.push(format!("  [{}] {}", action.shortcut(), item.label)),
            None => lines.push("  ------".into()),
        }
    }

    let mut notifications = state.notifications().peekable();
    if notifications.peek().is_some() {
        lines.push(String::new());
        for notification in notifications {
            for (i, text) in notification.message.lines().enumerate() {
                let marker = if i == 0 { "!" } else { " " };
                lines.push(format!("  {marker} {text}"));
            }
        }
        lines.push("  [d] Dismiss messages".into());
    }

    lines
}

fn render(
    out: &mut impl Write,
    state: &TrayState,
    menu: &[MenuItem],
    color: bool,
) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    if color {
        queue!(
            out,
            PrintStyledContent("●".with(icon_color(state.icon))),
            Print(format!(" {APP_NAME}: {}", state.headline()))
        )?;
    } else {
        queue!(
            out,
            Print(format!("[{}] {APP_NAME}: {}", state.icon.as_ref(), state.headline()))
        )?;
    }

    for (row, line) in body_lines(state, menu).into_iter().enumerate() {
        let row = u16::try_from(row + 1).unwrap_or(u16::MAX);
        if color && line.trim_start().starts_with('!') {
            queue!(out, MoveTo(0, row), PrintStyledContent(line.red()))?;
        } else {
            queue!(out, MoveTo(0, row), Print(line))?;
        }
    }

    out.flush()
}

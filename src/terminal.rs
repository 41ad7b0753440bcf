// SPDX-License-Identifier: GPL-3.0-only

//! Terminal-based filter viewer
//!
//! Renders processed frames to the terminal using Unicode half-block
//! characters for improved vertical resolution. The frame loop runs on a
//! worker thread; this thread only handles keys and drawing.

use crate::backends::{ChannelSink, FrameLoop, FrameReport, open_source};
use crate::config::Config;
use crate::constants::{display, timing};
use crate::errors::AppResult;
use crate::frame::Frame;
use crate::mode::ModeController;
use crate::params::{ParamId, ParameterStore};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::channel::mpsc;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Clear, Paragraph, Widget, Wrap},
};
use std::io::{self, stdout};
use std::sync::Arc;
use tracing::info;

/// Run the terminal viewer until the operator quits
pub fn run(config: &Config) -> AppResult<()> {
    let (modes, store) = config.build_state()?;
    let modes = Arc::new(modes);
    let store = Arc::new(store);

    let source = open_source(&config.source)?;
    let (sink, receiver) = ChannelSink::channel(display::CHANNEL_CAPACITY);
    let frame_loop = FrameLoop::new(source, sink, Arc::clone(&modes), Arc::clone(&store));
    let mut controller = frame_loop.spawn("terminal", config.frame_interval());

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &modes, &store, receiver);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    controller.stop();
    info!("Terminal viewer closed");
    result
}

/// Operator-side UI state
struct ViewState {
    /// Index into the active mode's parameter list
    focused: usize,
    show_help: bool,
    show_description: bool,
    message: Option<String>,
}

impl ViewState {
    fn new() -> Self {
        Self {
            focused: 0,
            show_help: false,
            show_description: false,
            message: None,
        }
    }

    fn focused_param(&self, modes: &ModeController) -> Option<ParamId> {
        let params = modes.active().parameters();
        if params.is_empty() {
            None
        } else {
            Some(params[self.focused % params.len()])
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    modes: &ModeController,
    store: &ParameterStore,
    mut receiver: mpsc::Receiver<FrameReport>,
) -> AppResult<()> {
    let mut frame_widget = FrameWidget::new();
    let mut state = ViewState::new();
    let title = modes.variant().title();

    loop {
        // Drain all available frames to show the latest
        while let Ok(report) = receiver.try_recv() {
            frame_widget.update(report);
        }

        terminal.draw(|f| {
            let area = f.area();

            // Reserve two bottom lines for status and hints
            let frame_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(2),
            };
            f.render_widget(&frame_widget, frame_area);

            if state.show_description {
                let mode = modes.active();
                let popup = Rect {
                    x: area.x + 2,
                    y: area.y + 1,
                    width: area.width.saturating_sub(4),
                    height: (area.height / 3).max(5).min(area.height.saturating_sub(2)),
                };
                f.render_widget(Clear, popup);
                f.render_widget(
                    Paragraph::new(mode.description())
                        .wrap(Wrap { trim: true })
                        .block(Block::bordered().title(mode.display_name())),
                    popup,
                );
            }

            let status = match &frame_widget.report {
                Some(report) => format!("{} - {}", title, report.status_line()),
                None => title.to_string(),
            };
            f.render_widget(
                StatusBar {
                    message: &status,
                    bg: Color::DarkGray,
                },
                Rect {
                    x: area.x,
                    y: area.height.saturating_sub(2),
                    width: area.width,
                    height: 1,
                },
            );

            let hint = if state.show_help {
                build_help_message()
            } else if let Some(message) = &state.message {
                message.clone()
            } else {
                build_hint_message(modes, store, &state)
            };
            f.render_widget(
                StatusBar {
                    message: &hint,
                    bg: Color::Black,
                },
                Rect {
                    x: area.x,
                    y: area.height.saturating_sub(1),
                    width: area.width,
                    height: 1,
                },
            );
        })?;

        if event::poll(timing::UI_POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            state.message = None;
            match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    if let Some(mode) = modes.select_index(index) {
                        state.focused = 0;
                        info!(%mode, "Mode selected");
                    }
                }
                KeyCode::Tab => {
                    state.focused = state.focused.wrapping_add(1);
                }
                KeyCode::BackTab => {
                    let count = modes.active().parameters().len().max(1);
                    state.focused = (state.focused % count + count - 1) % count;
                }
                KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right | KeyCode::Up => {
                    adjust_focused(modes, store, &mut state, 1);
                }
                KeyCode::Char('-') | KeyCode::Left | KeyCode::Down => {
                    adjust_focused(modes, store, &mut state, -1);
                }
                KeyCode::Char('p') => match store.cycle_policy() {
                    Ok(policy) => state.message = Some(format!("Threshold type: {policy}")),
                    Err(e) => state.message = Some(e.to_string()),
                },
                KeyCode::Char('r') => {
                    store.reset();
                    state.message = Some("Parameters reset to defaults".to_string());
                }
                KeyCode::Char('d') => state.show_description = !state.show_description,
                KeyCode::Char('h') => state.show_help = !state.show_help,
                _ => {}
            }
        }
    }

    Ok(())
}

fn adjust_focused(
    modes: &ModeController,
    store: &ParameterStore,
    state: &mut ViewState,
    steps: i32,
) {
    let Some(param) = state.focused_param(modes) else {
        return;
    };
    if let Err(e) = store.step(param, steps) {
        state.message = Some(e.to_string());
    }
}

fn build_hint_message(modes: &ModeController, store: &ParameterStore, state: &ViewState) -> String {
    let count = modes.variant().modes().len();
    let mut msg = format!("1-{count} mode");
    if let Some(param) = state.focused_param(modes) {
        let spec = param.spec();
        let value = store
            .get_param(param)
            .map(|v| v.to_string())
            .unwrap_or_default();
        msg.push_str(&format!(
            " | [{}] {} = {} ({}..{})",
            param.label(),
            param.name(),
            value,
            spec.min,
            spec.max
        ));
        msg.push_str(" | Tab next | +/- adjust");
    }
    msg.push_str(" | 'd' describe | 'h' help | 'q' quit");
    msg
}

fn build_help_message() -> String {
    String::from(
        "1-4: Mode | Tab/Shift+Tab: Parameter | +/-: Adjust | p: Threshold type | \
         r: Reset | d: Description | h: Toggle help | q/Ctrl+C: Quit",
    )
}

/// Widget that renders a frame using half-block characters
struct FrameWidget {
    report: Option<FrameReport>,
}

impl FrameWidget {
    fn new() -> Self {
        Self { report: None }
    }

    fn update(&mut self, report: FrameReport) {
        self.report = Some(report);
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(report) = &self.report else {
            // No frame yet - show placeholder
            let msg = "Waiting for frames...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };
        render_frame(&report.processed.frame, area, buf);
    }
}

/// Draw `frame` fitted into `area`, preserving aspect ratio
///
/// Each terminal cell shows two vertical pixels: the upper one as the `▀`
/// foreground, the lower one as the background.
fn render_frame(frame: &Frame, area: Rect, buf: &mut Buffer) {
    if frame.is_empty() || area.width == 0 || area.height == 0 {
        return;
    }

    let frame_aspect = frame.width() as f64 / frame.height() as f64;
    let term_width = area.width as f64;
    let term_height = (area.height * 2) as f64;

    let (display_width, display_height) = if term_width / term_height > frame_aspect {
        // Terminal is wider - fit to height
        let h = term_height;
        let w = h * frame_aspect;
        (w as u16, (h / 2.0) as u16)
    } else {
        // Terminal is taller - fit to width
        let w = term_width;
        let h = w / frame_aspect;
        (w as u16, (h / 2.0) as u16)
    };
    if display_width == 0 || display_height == 0 {
        return;
    }

    // Center the image
    let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
    let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

    let x_scale = frame.width() as f64 / display_width as f64;
    let y_scale = frame.height() as f64 / (display_height * 2) as f64;

    for ty in 0..display_height {
        for tx in 0..display_width {
            let term_x = x_offset + tx;
            let term_y = y_offset + ty;

            if term_x >= area.x + area.width || term_y >= area.y + area.height {
                continue;
            }

            let src_x = (tx as f64 * x_scale) as u32;
            let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
            let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

            let (r, g, b) = frame.rgb_at(src_x, src_y_top);
            let top = Color::Rgb(r, g, b);
            let (r, g, b) = frame.rgb_at(src_x, src_y_bottom);
            let bottom = Color::Rgb(r, g, b);

            if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                cell.set_char('▀');
                cell.set_fg(top);
                cell.set_bg(bottom);
            }
        }
    }
}

/// Single-line status bar widget
struct StatusBar<'a> {
    message: &'a str,
    bg: Color,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(self.bg);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(Color::White).bg(self.bg),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelFormat;
    use crate::mode::{Mode, Variant};

    #[test]
    fn test_render_frame_fills_cells() {
        let frame = Frame::filled(8, 8, PixelFormat::Gray8, 200);
        let area = Rect::new(0, 0, 8, 4);
        let mut buf = Buffer::empty(area);
        render_frame(&frame, area, &mut buf);
        let cell = &buf[(3, 2)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(200, 200, 200));
    }

    #[test]
    fn test_hint_shows_focused_parameter() {
        let modes = ModeController::new(Variant::Edges);
        let store = ParameterStore::new(Variant::Edges);
        modes.select_mode(Mode::DirectionalGradient).unwrap();
        let mut state = ViewState::new();
        state.focused = 1;
        let hint = build_hint_message(&modes, &store, &state);
        assert!(hint.contains("directionalScale = 1.00"), "{hint}");
    }

    #[test]
    fn test_adjust_without_parameters_is_noop() {
        let modes = ModeController::new(Variant::Filters);
        let store = ParameterStore::new(Variant::Filters);
        let mut state = ViewState::new();
        adjust_focused(&modes, &store, &mut state, 1);
        assert_eq!(store.snapshot(), crate::params::ParamSnapshot::default());
        assert!(state.message.is_none());
    }
}

//! Status pane below the composite preview.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use depthscope::{QueryMode, SelectionState};

/// Everything the HUD displays, captured from the session once per draw.
#[derive(Debug, Clone)]
pub struct HudModel {
    pub frame_index: u64,
    pub raw_width: u32,
    pub raw_height: u32,
    pub mode: QueryMode,
    pub cache_len: usize,
    pub cache_capacity: usize,
    pub selection: SelectionState,
    /// Preformatted description of the last query response.
    pub result_line: Option<String>,
    /// Preformatted metrics counters.
    pub metrics_line: String,
    /// Transient status, e.g. end-of-stream or a written snapshot path.
    pub status_line: Option<String>,
}

fn mode_name(mode: QueryMode) -> &'static str {
    match mode {
        QueryMode::Point => "point",
        QueryMode::RectangleAverage => "rectangle-average",
    }
}

fn selection_name(state: SelectionState) -> &'static str {
    match state {
        SelectionState::Empty => "empty",
        SelectionState::PointSelected => "corner placed",
        SelectionState::Committed => "committed",
    }
}

/// Widget rendering the HUD paragraph.
pub struct HudWidget<'a> {
    model: &'a HudModel,
}

impl<'a> HudWidget<'a> {
    pub fn new(model: &'a HudModel) -> Self {
        Self { model }
    }
}

impl Widget for HudWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let m = self.model;

        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("frame {}", m.frame_index),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(format!("  {}x{} raw", m.raw_width, m.raw_height)),
                Span::raw(format!("  cache {}/{}", m.cache_len, m.cache_capacity)),
            ]),
            Line::from(vec![
                Span::raw("mode "),
                Span::styled(mode_name(m.mode), Style::default().fg(Color::Yellow)),
                Span::raw("  selection "),
                Span::styled(
                    selection_name(m.selection),
                    Style::default().fg(match m.selection {
                        SelectionState::Committed => Color::Green,
                        SelectionState::PointSelected => Color::Yellow,
                        SelectionState::Empty => Color::DarkGray,
                    }),
                ),
            ]),
        ];

        if let Some(ref result) = m.result_line {
            lines.push(Line::from(Span::styled(
                result.clone(),
                Style::default().fg(Color::Green),
            )));
        }
        lines.push(Line::from(Span::styled(
            m.metrics_line.clone(),
            Style::default().fg(Color::DarkGray),
        )));
        if let Some(ref status) = m.status_line {
            lines.push(Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::Magenta),
            )));
        }
        lines.push(Line::from(Span::styled(
            "←/→ step   click query   m mode   s snapshot   q quit",
            Style::default().fg(Color::DarkGray),
        )));

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::TOP).title("depthscope"))
            .render(area, buf);
    }
}

use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::globe::{Continent, GlobeLayers};
use crate::interaction::Tooltip;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Legend pane width in cells
const LEGEND_WIDTH: u16 = 18;

/// Screen regions
pub struct Panes {
    pub globe: Rect,
    pub legend: Option<Rect>,
    pub status: Rect,
}

/// Split the terminal into globe pane, optional legend and status bar
pub fn split(area: Rect, show_legend: bool) -> Panes {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Globe + legend
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    if show_legend && rows[0].width > LEGEND_WIDTH * 2 {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(LEGEND_WIDTH)])
            .split(rows[0]);
        Panes {
            globe: cols[0],
            legend: Some(cols[1]),
            status: rows[1],
        }
    } else {
        Panes {
            globe: rows[0],
            legend: None,
            status: rows[1],
        }
    }
}

fn globe_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Globe ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Drawable area inside the globe pane border
pub fn globe_inner(pane: Rect) -> Rect {
    globe_block().inner(pane)
}

#[inline]
fn rgb(color: u32) -> Color {
    Color::Rgb((color >> 16) as u8, (color >> 8) as u8, color as u8)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let panes = split(frame.area(), app.display.show_legend);

    render_globe(frame, app, panes.globe);
    if let Some(legend) = panes.legend {
        render_legend(frame, legend);
    }
    render_status_bar(frame, app, panes.status);
}

fn render_globe(frame: &mut Frame, app: &App, area: Rect) {
    let block = globe_block();
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layers = app.scene.render(
        &app.controller.orientation(),
        &app.camera,
        inner.width as usize,
        inner.height as usize,
        &app.display,
    );

    frame.render_widget(
        GlobeWidget {
            layers,
            tooltip: app.controller.tooltip().cloned(),
        },
        inner,
    );
}

/// Braille globe layers with the hover tooltip on top
struct GlobeWidget {
    layers: GlobeLayers,
    tooltip: Option<Tooltip>,
}

impl GlobeWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                if let Some(ch) = canvas.cell(col as usize, row as usize) {
                    buf[(area.x + col, area.y + row)].set_char(ch).set_fg(color);
                }
            }
        }
    }

    fn render_tooltip(tooltip: &Tooltip, area: Rect, buf: &mut Buffer) {
        let lines: Vec<&str> = tooltip.text.lines().collect();
        let text_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
        let width = (text_width + 2).min(area.width);
        let height = (lines.len() as u16 + 2).min(area.height);
        if width < 3 || height < 3 {
            return;
        }

        // Pointer cell, offset down-right like a cursor label
        let col = (tooltip.x / 2.0).max(0.0) as u16 + 2;
        let row = (tooltip.y / 4.0).max(0.0) as u16 + 1;
        let x = area.x + col.min(area.width.saturating_sub(width));
        let y = area.y + row.min(area.height.saturating_sub(height));
        let rect = Rect::new(x, y, width, height);

        Clear.render(rect, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let text: Vec<Line> = lines
            .iter()
            .map(|l| Line::from(Span::styled(*l, Style::default().fg(Color::White))))
            .collect();
        Paragraph::new(text).block(block).render(rect, buf);
    }
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: graticule, fills, borders, markers
        Self::render_layer(&self.layers.graticule, Color::DarkGray, area, buf);
        for layer in &self.layers.fills {
            Self::render_layer(&layer.canvas, rgb(layer.color), area, buf);
        }
        Self::render_layer(&self.layers.borders, Color::Gray, area, buf);
        for layer in &self.layers.markers {
            Self::render_layer(&layer.canvas, rgb(layer.color), area, buf);
        }

        if let Some(tooltip) = &self.tooltip {
            Self::render_tooltip(tooltip, area, buf);
        }
    }
}

fn render_legend(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(" Legend ", Style::default().fg(Color::Cyan)));

    let items: Vec<Line> = Continent::LEGEND
        .iter()
        .map(|c| {
            Line::from(vec![
                Span::styled("██ ", Style::default().fg(rgb(c.rgb()))),
                Span::styled(c.label(), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(items).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let display = &app.display;
    let toggle = |on: bool, on_label: &'static str, off_label: &'static str| {
        Span::styled(
            if on { on_label } else { off_label },
            Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
        )
    };

    let status = Line::from(vec![
        Span::styled(" Heading: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{:+.1}°", app.heading_deg()), Style::default().fg(Color::Yellow)),
        Span::styled(" Tilt: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{:+.1}°", app.tilt_deg()), Style::default().fg(Color::Yellow)),
        Span::styled(" (", Style::default().fg(Color::DarkGray)),
        Span::styled(app.mode_label(), Style::default().fg(Color::Magenta)),
        Span::styled(") ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.data_label(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        toggle(display.show_fills, "[F]ill ", "[f]ill "),
        toggle(display.show_borders, "[B]order ", "[b]order "),
        toggle(display.show_markers, "[M]arkers ", "[m]arkers "),
        toggle(display.show_graticule, "[G]rid ", "[g]rid "),
        toggle(display.show_poles, "[P]oles ", "[p]oles "),
        Span::styled(
            "| drag:rotate wheel:tilt dbl-click:fly hl:rotate jk:tilt r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_with_legend() {
        let panes = split(Rect::new(0, 0, 100, 40), true);
        assert_eq!(panes.status, Rect::new(0, 39, 100, 1));
        assert_eq!(panes.globe, Rect::new(0, 0, 82, 39));
        assert_eq!(panes.legend, Some(Rect::new(82, 0, 18, 39)));
        assert_eq!(globe_inner(panes.globe), Rect::new(1, 1, 80, 37));
    }

    #[test]
    fn test_split_narrow_drops_legend() {
        let panes = split(Rect::new(0, 0, 30, 10), true);
        assert!(panes.legend.is_none());
        assert_eq!(panes.globe.width, 30);
    }

    #[test]
    fn test_rgb() {
        assert_eq!(rgb(0xffa500), Color::Rgb(0xff, 0xa5, 0x00));
    }

    #[test]
    fn test_tooltip_stays_inside_area() {
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        let tooltip = Tooltip {
            text: "Switzerland\n<46.80,8.20>".to_string(),
            x: 1000.0,
            y: 1000.0,
        };
        GlobeWidget::render_tooltip(&tooltip, area, &mut buf);
        // Box is clamped to the bottom-right corner
        assert_eq!(buf[(19, 5)].symbol(), "┘");
        assert_eq!(buf[(7, 3)].symbol(), "S");
    }
}

use super::state::{status_label, WheelView};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use slot_wheel::{ReelGeometry, Status};

/// Strip rows visible in a window of `rows` lines centred on `row`.
///
/// `row` is fractional while the reel moves; it is rounded to the nearest
/// item. The strip repeats, so indices wrap instead of clamping.
pub fn visible_rows(strip_len: usize, row: f64, rows: usize) -> Vec<usize> {
    if strip_len == 0 || rows == 0 {
        return Vec::new();
    }
    let centre = row.round() as isize;
    let half = (rows / 2) as isize;
    (-half..rows as isize - half)
        .map(|k| (centre + k).rem_euclid(strip_len as isize) as usize)
        .collect()
}

pub fn draw_reel(
    area: Rect,
    f: &mut Frame,
    index: usize,
    strip: &[String],
    geometry: &ReelGeometry,
    offset: f64,
    view: &WheelView,
) {
    let inner_rows = area.height.saturating_sub(2) as usize;
    // Odd row count keeps the payline in the exact middle.
    let rows = if inner_rows % 2 == 0 {
        inner_rows.saturating_sub(1)
    } else {
        inner_rows
    };
    let middle = rows / 2;

    let lines: Vec<Line> = visible_rows(strip.len(), geometry.row_at(offset), rows)
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            let item = strip[r].as_str();
            if i == middle {
                Line::from(Span::styled(
                    format!("▶ {item} ◀"),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(item, Style::default().fg(Color::Gray)))
            }
        })
        .collect();

    let color = match view.status {
        Status::Spinning | Status::Starting => Color::Green,
        Status::Stopping => Color::Magenta,
        Status::Stopped => Color::Cyan,
        Status::Init | Status::Ready => Color::White,
    };
    let title = Line::from(vec![
        Span::raw(format!(" {} ", index + 1)),
        Span::styled(status_label(view.status), Style::default().fg(color)),
        Span::raw(" "),
    ]);
    let footer = match view.last_duration {
        Some(d) if view.status.is_moving() => format!(" {} ms/item ", d.as_millis()),
        _ => String::new(),
    };

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_bottom(Line::from(footer).alignment(Alignment::Center)),
    );
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_centred_on_the_rounded_row() {
        assert_eq!(visible_rows(15, 7.0, 3), [6, 7, 8]);
        assert_eq!(visible_rows(15, 6.6, 5), [5, 6, 7, 8, 9]);
    }

    #[test]
    fn window_wraps_at_both_ends_of_the_strip() {
        assert_eq!(visible_rows(9, 0.2, 3), [8, 0, 1]);
        assert_eq!(visible_rows(9, 8.0, 3), [7, 8, 0]);
    }

    #[test]
    fn empty_inputs_give_no_rows() {
        assert!(visible_rows(0, 1.0, 3).is_empty());
        assert!(visible_rows(6, 1.0, 0).is_empty());
    }
}

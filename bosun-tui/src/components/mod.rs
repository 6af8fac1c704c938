use ratatui::layout::Rect;

pub mod banner;
pub mod dashboard;
pub mod dialog;
pub mod modal;

/// Centers a fixed-size rect within `r`, clamping to its bounds.
pub fn centered_fixed_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fixed_rect() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_fixed_rect(60, 10, area);
        assert_eq!(rect, Rect::new(20, 15, 60, 10));
    }

    #[test]
    fn test_centered_fixed_rect_clamps() {
        let area = Rect::new(0, 0, 20, 5);
        let rect = centered_fixed_rect(60, 10, area);
        assert_eq!(rect, Rect::new(0, 0, 20, 5));
    }
}

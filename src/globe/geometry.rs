use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a filled circle (marker dot)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel_signed(cx + dx, cy + dy);
            }
        }
    }
}

/// Scanline-fill a triangle given in pixel coordinates.
/// Pixel centres inside the triangle (or on its edge) are set.
pub fn fill_triangle(canvas: &mut BrailleCanvas, a: (f64, f64), b: (f64, f64), c: (f64, f64)) {
    let mut v = [a, b, c];
    v.sort_by(|p, q| p.1.total_cmp(&q.1));
    let [top, mid, bot] = v;

    let max_y = canvas.pixel_height() as f64;
    let y_start = top.1.ceil().max(0.0) as i32;
    let y_end = bot.1.floor().min(max_y - 1.0) as i32;
    if y_end < y_start {
        // Degenerate sliver thinner than a pixel row: keep it visible
        let y = top.1.round() as i32;
        let lo = a.0.min(b.0).min(c.0).round() as i32;
        let hi = a.0.max(b.0).max(c.0).round() as i32;
        canvas.fill_span(lo, hi, y);
        return;
    }

    for y in y_start..=y_end {
        let yf = y as f64;
        let long = edge_x(top, bot, yf);
        let short = if yf < mid.1 {
            edge_x(top, mid, yf)
        } else {
            edge_x(mid, bot, yf)
        };
        let (lo, hi) = if long < short { (long, short) } else { (short, long) };
        canvas.fill_span(lo.round() as i32, hi.round() as i32, y);
    }
}

#[inline(always)]
fn edge_x(p: (f64, f64), q: (f64, f64), y: f64) -> f64 {
    let dy = q.1 - p.1;
    if dy.abs() < 1e-12 {
        return p.0.min(q.0);
    }
    p.0 + (q.0 - p.0) * (y - p.1) / dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_line() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        assert_eq!(canvas.to_string(), "⠉⠉⠉⠉⠉");
    }

    #[test]
    fn test_vertical_line() {
        let mut canvas = BrailleCanvas::new(1, 2);
        draw_line(&mut canvas, 0, 0, 0, 7);
        assert_eq!(canvas.to_string(), "⡇\n⡇");
    }

    #[test]
    fn test_fill_triangle_covers_interior() {
        let mut canvas = BrailleCanvas::new(4, 2);
        fill_triangle(&mut canvas, (0.0, 0.0), (7.0, 0.0), (0.0, 7.0));
        // Corner cell fully inside
        assert_eq!(canvas.cell(0, 0), Some('⣿'));
        // Far corner outside
        assert_eq!(canvas.cell(3, 1), None);
    }

    #[test]
    fn test_fill_triangle_offscreen_is_noop() {
        let mut canvas = BrailleCanvas::new(2, 2);
        fill_triangle(&mut canvas, (-50.0, -50.0), (-40.0, -50.0), (-45.0, -30.0));
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_circle_radius_zero_is_single_dot() {
        let mut canvas = BrailleCanvas::new(1, 1);
        draw_circle(&mut canvas, 0, 0, 0);
        assert_eq!(canvas.to_string(), "⠁");
    }
}

use crate::{
    keyboard::{Key, KeyboardLayout},
    press::KeyboardState,
    types::{Frame, HandLandmarks, KeyColor},
};

pub const CONNECTIONS: &[(usize, usize)] = &[
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (0, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (0, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
    (5, 9),
    (9, 13),
    (13, 17),
];

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];
const WHITE_HIGHLIGHT: [u8; 4] = [80, 200, 120, 255];
const BLACK_HIGHLIGHT: [u8; 4] = [255, 0, 0, 255];
const HIGHLIGHT_BORDER: f32 = 4.0;
const SKELETON_LINE_THICKNESS: i32 = 3;
const LANDMARK_RADIUS: i32 = 4;
// Lines and dots are clipped to the frame grown by this many pixels.
const CLIP_MARGIN: f32 = 16.0;

/// A mutable RGBA view that clips every write to its bounds.
struct Canvas<'a> {
    buffer: &'a mut [u8],
    width: u32,
    height: u32,
}

impl Canvas<'_> {
    fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: [u8; 4]) {
        let (x0, x1) = (x0.min(x1).floor() as i32, x0.max(x1).ceil() as i32);
        let (y0, y1) = (y0.min(y1).floor() as i32, y0.max(y1).ceil() as i32);
        for y in y0..y1 {
            for x in x0..x1 {
                self.put_pixel(x, y, color);
            }
        }
    }

    fn hline(&mut self, x0: f32, x1: f32, y: f32, thickness: f32, color: [u8; 4]) {
        let half = thickness / 2.0;
        self.fill_rect(x0 - half, y - half, x1 + half, y + half, color);
    }

    fn vline(&mut self, x: f32, y0: f32, y1: f32, thickness: f32, color: [u8; 4]) {
        let half = thickness / 2.0;
        self.fill_rect(x - half, y0 - half, x + half, y1 + half, color);
    }

    /// Liang-Barsky clip of a segment against the frame plus [`CLIP_MARGIN`].
    fn clip_segment(&self, p0: (f32, f32), p1: (f32, f32)) -> Option<((f32, f32), (f32, f32))> {
        if ![p0.0, p0.1, p1.0, p1.1].iter().all(|v| v.is_finite()) {
            return None;
        }
        let (min_x, min_y) = (-CLIP_MARGIN, -CLIP_MARGIN);
        let max_x = self.width as f32 + CLIP_MARGIN;
        let max_y = self.height as f32 + CLIP_MARGIN;
        let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
        if !(dx.is_finite() && dy.is_finite()) {
            return None;
        }

        let (mut t0, mut t1) = (0.0f32, 1.0f32);
        for (p, q) in [
            (-dx, p0.0 - min_x),
            (dx, max_x - p0.0),
            (-dy, p0.1 - min_y),
            (dy, max_y - p0.1),
        ] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((
            (p0.0 + t0 * dx, p0.1 + t0 * dy),
            (p0.0 + t1 * dx, p0.1 + t1 * dy),
        ))
    }

    fn draw_line(&mut self, p0: (f32, f32), p1: (f32, f32), color: [u8; 4], thickness: i32) {
        let Some((p0, p1)) = self.clip_segment(p0, p1) else {
            return;
        };
        let (mut x0, mut y0) = (p0.0 as i32, p0.1 as i32);
        let (x1, y1) = (p1.0 as i32, p1.1 as i32);
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let radius = (thickness.max(1) - 1) / 2;

        loop {
            for ox in -radius..=radius {
                for oy in -radius..=radius {
                    if ox.abs() + oy.abs() <= radius {
                        self.put_pixel(x0 + ox, y0 + oy, color);
                    }
                }
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn draw_circle(&mut self, center: (f32, f32), radius: i32, color: [u8; 4]) {
        let reach = CLIP_MARGIN + radius as f32;
        let (x, y) = center;
        if !(-reach..=self.width as f32 + reach).contains(&x)
            || !(-reach..=self.height as f32 + reach).contains(&y)
        {
            return;
        }
        let (cx, cy) = (x as i32, y as i32);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.put_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 {
            return;
        }
        let (ux, uy) = (x as u32, y as u32);
        if ux >= self.width || uy >= self.height {
            return;
        }
        let idx = ((uy * self.width + ux) as usize) * 4;
        if idx + 3 < self.buffer.len() {
            self.buffer[idx..idx + 4].copy_from_slice(&color);
        }
    }
}

/// Draws the keyboard, highlighting every key that is currently pressed.
pub fn draw_keyboard(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    layout: &KeyboardLayout,
    state: &KeyboardState,
) {
    let mut canvas = Canvas {
        buffer,
        width,
        height,
    };

    for key in layout.white_keys() {
        let r = key.rect;
        canvas.fill_rect(r.x, r.y, r.right(), r.bottom(), WHITE);
        canvas.hline(r.x, r.right(), r.y, 1.0, BLACK);
        canvas.hline(r.x, r.right(), r.bottom(), 1.0, BLACK);
        canvas.vline(r.x, r.y, r.bottom(), 1.0, BLACK);
        canvas.vline(r.right(), r.y, r.bottom(), 1.0, BLACK);
    }
    for key in layout.black_keys() {
        let r = key.rect;
        canvas.fill_rect(r.x, r.y, r.right(), r.bottom(), BLACK);
    }

    let (black_width, black_height) = layout.black_key_size();
    for key in layout.white_keys() {
        if state.is_pressed(key.id) {
            highlight_white(&mut canvas, key, black_width, black_height);
        }
    }
    for key in layout.black_keys() {
        if state.is_pressed(key.id) {
            highlight_black(&mut canvas, key);
        }
    }
}

// Only the parts of a white key not covered by a black key are painted, so
// the highlight outlines the visible L or T shape of the key.
fn highlight_white(canvas: &mut Canvas<'_>, key: &Key, black_width: f32, black_height: f32) {
    debug_assert_eq!(key.color, KeyColor::White);
    let r = key.rect;
    let waist = r.y + black_height;

    let (top_start, left_border_start) = if key.black_left {
        (r.x + black_width / 2.0, waist)
    } else {
        (r.x, r.y)
    };
    let (top_end, right_border_start) = if key.black_right {
        (r.right() - black_width / 2.0, waist)
    } else {
        (r.right(), r.y)
    };

    canvas.fill_rect(r.x, waist, r.right(), r.bottom(), WHITE_HIGHLIGHT);
    canvas.fill_rect(top_start, r.y, top_end, waist, WHITE_HIGHLIGHT);

    canvas.hline(top_start, top_end, r.y, HIGHLIGHT_BORDER, BLACK);
    canvas.hline(r.x, r.right(), r.bottom(), HIGHLIGHT_BORDER, BLACK);
    canvas.vline(r.x, left_border_start, r.bottom(), HIGHLIGHT_BORDER, BLACK);
    canvas.vline(r.right(), right_border_start, r.bottom(), HIGHLIGHT_BORDER, BLACK);
}

fn highlight_black(canvas: &mut Canvas<'_>, key: &Key) {
    let r = key.rect;
    canvas.fill_rect(r.x, r.y, r.right(), r.bottom(), BLACK_HIGHLIGHT);
    canvas.hline(r.x, r.right(), r.y, HIGHLIGHT_BORDER, BLACK);
    canvas.hline(r.x, r.right(), r.bottom(), HIGHLIGHT_BORDER, BLACK);
    canvas.vline(r.x, r.y, r.bottom(), HIGHLIGHT_BORDER, BLACK);
    canvas.vline(r.right(), r.y, r.bottom(), HIGHLIGHT_BORDER, BLACK);
}

/// Draws the hand skeleton from normalized landmarks.
pub fn draw_hand(buffer: &mut [u8], width: u32, height: u32, landmarks: &HandLandmarks) {
    let points = landmarks.to_pixels(width, height);
    let mut canvas = Canvas {
        buffer,
        width,
        height,
    };

    let line_color = [255u8, 255u8, 255u8, 255u8];
    for &(a, b) in CONNECTIONS {
        canvas.draw_line(points[a], points[b], line_color, SKELETON_LINE_THICKNESS);
    }

    let point_color = [248u8, 113u8, 113u8, 255u8];
    for &point in &points {
        canvas.draw_circle(point, LANDMARK_RADIUS, point_color);
    }
}

/// Draws keyboard and hands over `frame` in place.
pub fn compose(
    frame: &mut Frame,
    layout: &KeyboardLayout,
    state: &KeyboardState,
    hands: &[&HandLandmarks],
) {
    draw_keyboard(&mut frame.rgba, frame.width, frame.height, layout, state);
    for landmarks in hands {
        draw_hand(&mut frame.rgba, frame.width, frame.height, landmarks);
    }
}

use crate::geom::point::Point;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as ImageRect;
use std::path::Path;

/// Everything needed to draw one net on top of its congestion grid.
#[derive(Clone, Debug, Default)]
pub struct NetDrawing {
    pub grid_width: usize,
    pub grid_height: usize,
    /// Rectilinear wire segments in grid coordinates.
    pub segments: Vec<(Point<i32>, Point<i32>)>,
    /// Pin positions, `true` for the driver.
    pub pins: Vec<(Point<i32>, bool)>,
    pub overflow_cells: Vec<Point<i32>>,
    pub caption: String,
}

pub fn draw_net(drawing: &NetDrawing, filename: &Path, width: u32, height: u32) -> image::ImageResult<()> {
    let mut img = RgbImage::from_pixel(width, height, Rgb([20, 20, 20]));

    let gw = drawing.grid_width.max(1) as f64;
    let gh = drawing.grid_height.max(1) as f64;
    let scale_x = width as f64 / gw;
    let scale_y = height as f64 / gh;

    // Cell centres; y grows upwards like the input coordinates.
    let map = |p: Point<i32>| {
        (
            (p.x as f64 + 0.5) * scale_x,
            height as f64 - (p.y as f64 + 0.5) * scale_y,
        )
    };

    let color_grid = Rgb([45, 45, 50]);
    let color_overflow = Rgb([150, 30, 30]);
    let color_wire = Rgb([0, 200, 255]);
    let color_sink = Rgb([255, 255, 255]);
    let color_driver = Rgb([255, 215, 0]);

    if scale_x >= 4.0 && scale_y >= 4.0 {
        for y in 0..drawing.grid_height {
            for x in 0..drawing.grid_width {
                let rect = ImageRect::at(
                    (x as f64 * scale_x) as i32,
                    (height as f64 - (y as f64 + 1.0) * scale_y) as i32,
                )
                .of_size(scale_x.max(1.0) as u32, scale_y.max(1.0) as u32);
                draw_hollow_rect_mut(&mut img, rect, color_grid);
            }
        }
    }

    for &cell in &drawing.overflow_cells {
        let rect = ImageRect::at(
            (cell.x as f64 * scale_x) as i32,
            (height as f64 - (cell.y as f64 + 1.0) * scale_y) as i32,
        )
        .of_size(scale_x.max(1.0) as u32, scale_y.max(1.0) as u32);
        draw_filled_rect_mut(&mut img, rect, color_overflow);
    }

    for &(a, b) in &drawing.segments {
        let (x1, y1) = map(a);
        let (x2, y2) = map(b);
        draw_line_segment_mut(
            &mut img,
            (x1 as f32, y1 as f32),
            (x2 as f32, y2 as f32),
            color_wire,
        );
    }

    let pin_size = (scale_x.min(scale_y) * 0.4).clamp(3.0, 12.0) as u32;
    for &(p, is_driver) in &drawing.pins {
        let (px, py) = map(p);
        let half = (pin_size / 2) as f64;
        let rect = ImageRect::at((px - half) as i32, (py - half) as i32).of_size(pin_size, pin_size);
        let color = if is_driver { color_driver } else { color_sink };
        draw_filled_rect_mut(&mut img, rect, color);
    }

    if !drawing.caption.is_empty() {
        log::debug!("{}: {}", filename.display(), drawing.caption);
    }
    img.save(filename)
}

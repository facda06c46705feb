//! Contour detection and annotation

use crate::config::VisionConfig;
use crate::error::VisionError;
use opencv::{
    core::{Mat, Point, Point2f, RotatedRect, Vector},
    imgproc,
    prelude::*,
};
use tracing::{debug, trace};

/// Result of annotating a frame.
pub struct AnnotatedFrame {
    /// Copy of the input frame with outlines drawn on it
    pub frame: Mat,
    /// Number of contours that passed every filter and were drawn
    pub shapes: usize,
}

/// Outer boundaries of the connected foreground regions in `mask`, every
/// boundary pixel retained, no hierarchy.
pub fn find_external_contours(mask: &Mat) -> Result<Vector<Vector<Point>>, VisionError> {
    let mut contours = Vector::<Vector<Point>>::new();
    imgproc::find_contours(
        mask,
        &mut contours,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_NONE,
        Point::default(),
    )?;
    Ok(contours)
}

/// Outline every near-quadrilateral region of `mask` on a copy of `frame`.
///
/// A contour is drawn when it has at least `min_contour_points` boundary
/// points and its polygon approximation (tolerance `approx_epsilon_factor`
/// times the perimeter) has at most `max_polygon_vertices` vertices. Each
/// drawn contour gets its axis-aligned bounding box and its minimum-area
/// rotated rectangle.
pub fn annotate_contours(
    mask: &Mat,
    frame: &Mat,
    config: &VisionConfig,
) -> Result<AnnotatedFrame, VisionError> {
    let mut canvas = frame.try_clone()?;
    let contours = find_external_contours(mask)?;
    let box_color = config.bounding_box_scalar();
    let rotated_color = config.rotated_box_scalar();

    let mut shapes = 0;
    for (index, contour) in contours.iter().enumerate() {
        if contour.len() < config.min_contour_points {
            trace!("Contour {} rejected: {} point(s)", index, contour.len());
            continue;
        }

        let perimeter = imgproc::arc_length(&contour, true)?;
        let mut approx = Vector::<Point>::new();
        imgproc::approx_poly_dp(
            &contour,
            &mut approx,
            config.approx_epsilon_factor * perimeter,
            true,
        )?;
        if approx.len() > config.max_polygon_vertices {
            trace!("Contour {} rejected: {} vertices", index, approx.len());
            continue;
        }

        let bounds = imgproc::bounding_rect(&contour)?;
        imgproc::rectangle(
            &mut canvas,
            bounds,
            box_color,
            config.outline_thickness,
            imgproc::LINE_8,
            0,
        )?;

        let rotated = imgproc::min_area_rect(&contour)?;
        let corners = rounded_corners(&rotated)?;
        imgproc::polylines(
            &mut canvas,
            &corners,
            true,
            rotated_color,
            config.outline_thickness,
            imgproc::LINE_8,
            0,
        )?;

        shapes += 1;
    }

    debug!("Annotated {} of {} contour(s)", shapes, contours.len());
    Ok(AnnotatedFrame { frame: canvas, shapes })
}

/// Corners of a rotated rectangle rounded to integer pixel coordinates.
fn rounded_corners(rect: &RotatedRect) -> Result<Vector<Point>, VisionError> {
    let mut points = [Point2f::default(); 4];
    rect.points(&mut points)?;
    let mut corners = Vector::<Point>::with_capacity(4);
    for p in points {
        corners.push(Point::new(p.x.round() as i32, p.y.round() as i32));
    }
    Ok(corners)
}

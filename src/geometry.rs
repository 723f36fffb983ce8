use eframe::egui;

/// Where a query point lands when projected onto a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentProjection {
    /// Nearest point on the segment itself, never on its extension.
    pub position: egui::Pos2,
    /// Euclidean distance from the query to `position`.
    pub distance: f32,
    /// Normalized position along the segment, in `[0, 1]`.
    pub t: f32,
}

pub fn segment_length(a: egui::Pos2, b: egui::Pos2) -> f32 {
    (b - a).length()
}

pub fn nearest_point_on_segment(
    a: egui::Pos2,
    b: egui::Pos2,
    query: egui::Pos2,
) -> SegmentProjection {
    let ab = b - a;
    let ab_len2 = ab.length_sq();
    if ab_len2 <= f32::EPSILON {
        tracing::trace!(?a, "zero-length segment treated as a point");
        return SegmentProjection {
            position: a,
            distance: (query - a).length(),
            t: 0.0,
        };
    }
    let t = ((query - a).dot(ab) / ab_len2).clamp(0.0, 1.0);
    let position = a + ab * t;
    SegmentProjection {
        position,
        distance: (query - position).length(),
        t,
    }
}

/// Box of half-size `extent` centred on `center`.
pub fn rect_around(center: egui::Pos2, extent: f32) -> egui::Rect {
    egui::Rect::from_center_size(center, egui::vec2(extent * 2.0, extent * 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn projects_onto_interior() {
        let p = nearest_point_on_segment(
            egui::pos2(50.0, 100.0),
            egui::pos2(150.0, 100.0),
            egui::pos2(100.0, 102.0),
        );
        assert!((p.position.x - 100.0).abs() < 1e-4);
        assert!((p.position.y - 100.0).abs() < 1e-4);
        assert!((p.distance - 2.0).abs() < 1e-4);
        assert!((p.t - 0.5).abs() < 1e-4);
    }

    #[test]
    fn clamps_past_the_ends() {
        let a = egui::pos2(0.0, 0.0);
        let b = egui::pos2(10.0, 0.0);
        let before = nearest_point_on_segment(a, b, egui::pos2(-5.0, 3.0));
        assert_eq!(before.t, 0.0);
        assert_eq!(before.position, a);
        let after = nearest_point_on_segment(a, b, egui::pos2(25.0, 0.0));
        assert_eq!(after.t, 1.0);
        assert_eq!(after.position, b);
        assert!((after.distance - 15.0).abs() < 1e-4);
    }

    #[test]
    fn degenerate_segment_is_a_point() {
        let a = egui::pos2(3.0, 4.0);
        let p = nearest_point_on_segment(a, a, egui::pos2(0.0, 0.0));
        assert_eq!(p.position, a);
        assert!((p.distance - 5.0).abs() < 1e-4);
        assert!(p.distance.is_finite());
    }

    #[test]
    fn segment_length_is_symmetric() {
        let a = egui::pos2(1.0, 1.0);
        let b = egui::pos2(4.0, 5.0);
        assert_eq!(segment_length(a, b), 5.0);
        assert_eq!(segment_length(b, a), 5.0);
        assert_eq!(segment_length(a, a), 0.0);
    }

    #[test]
    fn rect_around_is_centred() {
        let r = rect_around(egui::pos2(10.0, 20.0), 15.0);
        assert_eq!(r.min, egui::pos2(-5.0, 5.0));
        assert_eq!(r.max, egui::pos2(25.0, 35.0));
    }

    proptest! {
        #[test]
        fn parameter_stays_on_segment(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            qx in -500.0f32..500.0, qy in -500.0f32..500.0,
        ) {
            let p = nearest_point_on_segment(
                egui::pos2(ax, ay),
                egui::pos2(bx, by),
                egui::pos2(qx, qy),
            );
            prop_assert!((0.0..=1.0).contains(&p.t));
            prop_assert!(p.distance >= 0.0);
        }

        #[test]
        fn requery_at_nearest_point_is_zero_distance(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            qx in -500.0f32..500.0, qy in -500.0f32..500.0,
        ) {
            let a = egui::pos2(ax, ay);
            let b = egui::pos2(bx, by);
            let first = nearest_point_on_segment(a, b, egui::pos2(qx, qy));
            let second = nearest_point_on_segment(a, b, first.position);
            prop_assert!(second.distance < 1e-2);
        }
    }
}

use drawdims_core::extent::{compute_extent, compute_extent_3d, Extent, Extent3};
use drawdims_core::geom::{Point2D, Point3D};
use drawdims_core::model::{Primitive, PrimitiveError, PrimitiveKind};

fn p(x: f64, y: f64) -> Point2D {
    Point2D::new(x, y)
}

#[test]
fn empty_input_is_undefined() {
    let primitives: Vec<Primitive> = Vec::new();
    assert_eq!(None, compute_extent(&primitives));
}

#[test]
fn only_unsupported_kinds_is_undefined() {
    let primitives = vec![
        Primitive::unsupported("TEXT"),
        Primitive::unsupported("HATCH"),
        Primitive::polyline(Vec::new()).unwrap(),
        Primitive::spline(Vec::new()).unwrap(),
    ];
    assert_eq!(None, compute_extent(&primitives));
}

#[test]
fn single_line() {
    let primitives = vec![Primitive::line(p(0.0, 0.0), p(10.0, 5.0)).unwrap()];
    assert_eq!(
        Some(Extent {
            width: 10.0,
            height: 5.0
        }),
        compute_extent(&primitives)
    );
}

#[test]
fn single_circle() {
    let primitives = vec![Primitive::circle(p(0.0, 0.0), 3.0).unwrap()];
    assert_eq!(
        Some(Extent {
            width: 6.0,
            height: 6.0
        }),
        compute_extent(&primitives)
    );
}

#[test]
fn arc_uses_full_circle_bound() {
    // Quarter arc in the first quadrant still measures as the whole circle.
    let primitives = vec![Primitive::arc(p(1.0, 1.0), 2.0, 0.0, 90.0).unwrap()];
    assert_eq!(
        Some(Extent {
            width: 4.0,
            height: 4.0
        }),
        compute_extent(&primitives)
    );
}

#[test]
fn polyline_vertices() {
    let primitives =
        vec![Primitive::polyline(vec![p(1.0, 1.0), p(4.0, 1.0), p(4.0, 5.0)]).unwrap()];
    assert_eq!(
        Some(Extent {
            width: 3.0,
            height: 4.0
        }),
        compute_extent(&primitives)
    );
}

#[test]
fn spline_control_points() {
    let primitives = vec![Primitive::spline(vec![p(-2.0, 0.0), p(0.0, 8.0), p(2.0, 0.0)]).unwrap()];
    assert_eq!(
        Some(Extent {
            width: 4.0,
            height: 8.0
        }),
        compute_extent(&primitives)
    );
}

#[test]
fn mixed_drawing_unions_all_contributions() {
    let primitives = vec![
        Primitive::line(p(0.0, 0.0), p(10.0, 0.0)).unwrap(),
        Primitive::unsupported("MTEXT"),
        Primitive::circle(p(10.0, 10.0), 2.5).unwrap(),
        Primitive::polyline(vec![p(-1.0, 3.0)]).unwrap(),
    ];
    let extent = compute_extent(&primitives).unwrap();
    assert_eq!(13.5, extent.width);
    assert_eq!(12.5, extent.height);
}

#[test]
fn point_like_primitives_are_zero_not_undefined() {
    let zero_circle = vec![Primitive::circle(p(4.0, -3.0), 0.0).unwrap()];
    let dot_line = vec![Primitive::line(p(2.0, 2.0), p(2.0, 2.0)).unwrap()];
    let zero = Some(Extent {
        width: 0.0,
        height: 0.0,
    });
    assert_eq!(zero, compute_extent(&zero_circle));
    assert_eq!(zero, compute_extent(&dot_line));
}

#[test]
fn factories_reject_non_finite_values() {
    assert_eq!(
        Err(PrimitiveError::NonFinite {
            kind: PrimitiveKind::Line,
            field: "end"
        }),
        Primitive::line(p(0.0, 0.0), p(f64::NAN, 1.0))
    );
    assert!(Primitive::circle(p(0.0, 0.0), f64::INFINITY).is_err());
    assert!(Primitive::arc(p(0.0, 0.0), 1.0, 0.0, f64::NAN).is_err());
    assert!(Primitive::polyline(vec![p(0.0, 0.0), p(f64::NEG_INFINITY, 0.0)]).is_err());
    assert!(Primitive::spline(vec![p(f64::NAN, f64::NAN)]).is_err());
}

#[test]
fn factories_accept_negative_radius() {
    assert!(Primitive::circle(p(0.0, 0.0), -1.0).is_ok());
}

#[test]
fn extent_3d_spans_each_axis() {
    let points = vec![
        Point3D::new(0.0, 0.0, 0.0),
        Point3D::new(10.0, -2.0, 1.0),
        Point3D::new(3.0, 4.0, 7.5),
    ];
    assert_eq!(
        Some(Extent3 {
            width: 10.0,
            depth: 6.0,
            height: 7.5
        }),
        compute_extent_3d(points)
    );
    assert_eq!(None, compute_extent_3d(Vec::new()));
}

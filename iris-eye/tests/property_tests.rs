use iris_core::Expr;
use iris_eye::method::{resolve, MethodSet};
use iris_eye::processing::{annotate_contours, convert_color, find_external_contours, threshold_range, ChannelRange, ColorConversion};
use iris_eye::{BufferMethod, CaptureMethod, VisionConfig, VisionError};
use opencv::core::{Mat, Point, Rect, Scalar, Vector, CV_8UC1, CV_8UC3};
use opencv::imgproc;
use opencv::prelude::*;
use proptest::prelude::*;

fn assert_method_not_found<M: MethodSet + std::fmt::Debug>(token: &str) {
    match resolve::<M>(&[Expr::symbol(token)]) {
        Err(VisionError::MethodNotFound { kind, method }) => {
            assert_eq!(kind, M::RECEIVER);
            assert_eq!(method, token);
        }
        other => panic!("Expected MethodNotFound for {:?}, got {:?}", token, other),
    }
}

fn qualifying_contours(mask: &Mat, config: &VisionConfig) -> usize {
    let contours = find_external_contours(mask).unwrap();
    contours
        .iter()
        .filter(|contour| {
            if contour.len() < config.min_contour_points {
                return false;
            }
            let perimeter = imgproc::arc_length(contour, true).unwrap();
            let mut approx = Vector::<Point>::new();
            imgproc::approx_poly_dp(contour, &mut approx, config.approx_epsilon_factor * perimeter, true).unwrap();
            approx.len() <= config.max_polygon_vertices
        })
        .count()
}

proptest! {
    #[test]
    fn test_unknown_method_tokens(token in "[a-z][a-z0-9-]{0,12}") {
        prop_assume!(!["read", "set", "size"].contains(&token.as_str()));
        assert_method_not_found::<BufferMethod>(&token);
        assert_method_not_found::<CaptureMethod>(&token);
    }

    #[test]
    fn test_known_tokens_belong_to_one_receiver(upper in any::<bool>()) {
        let case = |s: &str| if upper { s.to_uppercase() } else { s.to_string() };
        assert_method_not_found::<BufferMethod>(&case("read"));
        assert_method_not_found::<BufferMethod>(&case("set"));
        assert_method_not_found::<CaptureMethod>(&case("size"));
    }

    #[test]
    fn test_threshold_mask_matches_input_dims(
        width in 1i32..48,
        height in 1i32..48,
        fill in prop::array::uniform3(0u8..=255),
        low in prop::array::uniform3(0u8..=255),
        high in prop::array::uniform3(0u8..=255),
    ) {
        let src = Mat::new_rows_cols_with_default(
            height,
            width,
            CV_8UC3,
            Scalar::new(fill[0] as f64, fill[1] as f64, fill[2] as f64, 0.0),
        ).unwrap();
        let range = ChannelRange::from_bounds([
            low[0] as f64, low[1] as f64, low[2] as f64,
            high[0] as f64, high[1] as f64, high[2] as f64,
        ]);
        let mask = threshold_range(&src, &range).unwrap();
        prop_assert_eq!(mask.typ(), CV_8UC1);
        prop_assert_eq!((mask.cols(), mask.rows()), (width, height));

        let expected = if range.contains([fill[0] as f64, fill[1] as f64, fill[2] as f64]) {
            width * height
        } else {
            0
        };
        prop_assert_eq!(opencv::core::count_non_zero(&mask).unwrap(), expected);
    }

    #[test]
    fn test_conversion_keeps_dims(width in 1i32..32, height in 1i32..32) {
        let src = Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(90.0)).unwrap();
        for conversion in ColorConversion::ALL {
            let out = convert_color(&src, *conversion).unwrap();
            prop_assert!(!out.empty());
            prop_assert_eq!((out.cols(), out.rows()), (width, height));
        }
    }

    #[test]
    fn test_annotated_shapes_bounded_by_qualifying_contours(
        rects in prop::collection::vec((0i32..180, 0i32..180, 5i32..120, 5i32..120), 0..5),
        circles in prop::collection::vec((20i32..180, 20i32..180, 5i32..40), 0..3),
    ) {
        let mut mask = Mat::new_rows_cols_with_default(200, 200, CV_8UC1, Scalar::all(0.0)).unwrap();
        for (x, y, w, h) in rects {
            imgproc::rectangle(&mut mask, Rect::new(x, y, w, h), Scalar::all(255.0), imgproc::FILLED, imgproc::LINE_8, 0).unwrap();
        }
        for (x, y, r) in circles {
            imgproc::circle(&mut mask, Point::new(x, y), r, Scalar::all(255.0), imgproc::FILLED, imgproc::LINE_8, 0).unwrap();
        }
        let frame = Mat::new_rows_cols_with_default(200, 200, CV_8UC3, Scalar::all(0.0)).unwrap();
        let config = VisionConfig::default();

        let annotated = annotate_contours(&mask, &frame, &config).unwrap();
        prop_assert!(annotated.shapes <= qualifying_contours(&mask, &config));
        prop_assert_eq!((annotated.frame.cols(), annotated.frame.rows()), (200, 200));
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the pipeline engine

use filtercam::pipeline::{binarize, smooth};
use filtercam::{
    Frame, Mode, ModeController, ParamSnapshot, ParameterStore, PipelineEngine, PipelineError,
    PixelFormat, ThresholdPolicy, Variant,
};
use proptest::prelude::*;

/// Gray-equivalent color frame (R = G = B) with deterministic texture
fn textured_frame(width: u32, height: u32) -> Frame {
    Frame::from_rgb_fn(width, height, |x, y| {
        let v = ((x * 37 + y * 91 + (x * y) % 17) % 256) as u8;
        [v, v, v]
    })
}

#[test]
fn test_pass_through_is_byte_identical() {
    let engine = PipelineEngine::new();
    let frame = textured_frame(24, 16);
    let params = ParamSnapshot::default();

    assert_eq!(engine.process(&frame, Mode::Color, &params).unwrap(), frame);
    assert_eq!(engine.process(&frame, Mode::Original, &params).unwrap(), frame);
}

#[test]
fn test_output_keeps_dimensions_for_every_mode() {
    let engine = PipelineEngine::new();
    let frame = textured_frame(19, 11);
    for mode in Mode::ALL {
        let out = engine.process(&frame, mode, &ParamSnapshot::default()).unwrap();
        assert_eq!((out.width(), out.height()), (19, 11), "{mode:?}");
    }
}

#[test]
fn test_single_channel_modes() {
    let engine = PipelineEngine::new();
    let frame = textured_frame(8, 8);
    let params = ParamSnapshot::default();
    for mode in [
        Mode::Grayscale,
        Mode::GradientEdges,
        Mode::DirectionalGradient,
        Mode::Binarize,
        Mode::SmoothThenBinarize,
    ] {
        let out = engine.process(&frame, mode, &params).unwrap();
        assert_eq!(out.format(), PixelFormat::Gray8, "{mode:?}");
    }
    let blurred = engine.process(&frame, Mode::Smooth, &params).unwrap();
    assert_eq!(blurred.format(), PixelFormat::Rgb24);
}

#[test]
fn test_gray_equivalent_frame_keeps_its_intensity() {
    let engine = PipelineEngine::new();
    let frame = textured_frame(10, 10);
    let gray = engine
        .process(&frame, Mode::Grayscale, &ParamSnapshot::default())
        .unwrap();
    for (px, g) in frame.data().chunks(3).zip(gray.data()) {
        assert_eq!(px[0], *g);
    }
}

#[test]
fn test_zero_area_frame_rejected() {
    let engine = PipelineEngine::new();
    let frame = Frame::filled(7, 0, PixelFormat::Rgb24, 0);
    assert_eq!(
        engine.process(&frame, Mode::Smooth, &ParamSnapshot::default()),
        Err(PipelineError::InvalidFrame {
            width: 7,
            height: 0
        })
    );
}

#[test]
fn test_binarize_only_produces_two_levels() {
    let engine = PipelineEngine::new();
    let frame = textured_frame(32, 32);
    let out = engine
        .process(&frame, Mode::Binarize, &ParamSnapshot::default())
        .unwrap();
    assert!(out.data().iter().all(|&v| v == 0 || v == 255));
    assert!(out.data().contains(&0) && out.data().contains(&255));
}

#[test]
fn test_composite_smooths_before_thresholding() {
    let engine = PipelineEngine::new();
    let frame = textured_frame(40, 30);
    let params = ParamSnapshot::default();

    let composite = engine
        .process(&frame, Mode::SmoothThenBinarize, &params)
        .unwrap();
    assert_eq!(composite, binarize(&smooth(&frame, &params), &params));
    assert!(composite.data().iter().all(|&v| v == 0 || v == 255));

    // The reverse order blurs hard edges into intermediate levels
    let reversed = smooth(&binarize(&frame, &params), &params);
    assert!(reversed.data().iter().any(|&v| v != 0 && v != 255));
    assert_ne!(composite, reversed);
}

#[test]
fn test_threshold_policies_on_known_values() {
    let frame = Frame::from_gray_fn(3, 1, |x, _| [10u8, 127, 200][x as usize]);
    let store = ParameterStore::new(Variant::Filters);

    let expected = [
        (ThresholdPolicy::Binary, [0, 0, 255]),
        (ThresholdPolicy::BinaryInv, [255, 255, 0]),
        (ThresholdPolicy::Truncate, [10, 127, 127]),
        (ThresholdPolicy::ToZero, [0, 0, 200]),
        (ThresholdPolicy::ToZeroInv, [10, 127, 0]),
    ];
    for (policy, values) in expected {
        store.set_policy(policy).unwrap();
        assert_eq!(binarize(&frame, &store.snapshot()).data(), &values, "{policy}");
    }
}

fn vertical_ramp() -> Frame {
    Frame::from_gray_fn(12, 12, |_, y| (10 * y) as u8)
}

/// Sobel magnitude over rows 1..11, where the ramp has no border influence
fn interior_rows(out: &Frame) -> Vec<u8> {
    (1..11)
        .flat_map(|y| (0..12).map(move |x| (x, y)))
        .map(|(x, y)| out.rgb_at(x, y).0)
        .collect()
}

#[test]
fn test_sobel_vertical_ramp_magnitude() {
    let engine = PipelineEngine::new();
    let params = ParamSnapshot::default();
    assert_eq!(params.directional_kernel_size(), 3);

    let out = engine
        .process(&vertical_ramp(), Mode::DirectionalGradient, &params)
        .unwrap();
    assert!(interior_rows(&out).iter().all(|&v| v == 80));
}

#[test]
fn test_sobel_scale_multiplies_magnitude() {
    let engine = PipelineEngine::new();
    let store = ParameterStore::new(Variant::Edges);
    store.set("directionalScale", 2.0).unwrap();

    let out = engine
        .process(&vertical_ramp(), Mode::DirectionalGradient, &store.snapshot())
        .unwrap();
    assert!(interior_rows(&out).iter().all(|&v| v == 160));
}

#[test]
fn test_even_kernel_input_is_corrected_before_processing() {
    let engine = PipelineEngine::new();
    let frame = textured_frame(20, 20);

    let edges = ParameterStore::new(Variant::Edges);
    edges.set("directionalKernelSize", 4.0).unwrap();
    let snapshot = edges.snapshot();
    assert_eq!(snapshot.directional_kernel_size(), 5);
    let sobel = engine
        .process(&frame, Mode::DirectionalGradient, &snapshot)
        .unwrap();
    assert_eq!((sobel.width(), sobel.height()), (20, 20));

    let filters = ParameterStore::new(Variant::Filters);
    filters.set("smoothKernelSize", 4.0).unwrap();
    let snapshot = filters.snapshot();
    assert_eq!(snapshot.smooth_kernel_size(), 5);
    assert_eq!(
        engine.process(&frame, Mode::Smooth, &snapshot).unwrap(),
        smooth(&frame, &ParamSnapshot::default())
    );
}

#[test]
fn test_smooth_spread_widens_an_impulse() {
    let frame = Frame::from_gray_fn(21, 21, |x, y| if x == 10 && y == 10 { 255 } else { 0 });
    let store = ParameterStore::new(Variant::Filters);
    store.set("smoothKernelSize", 9.0).unwrap();

    store.set("smoothSpread", 0.5).unwrap();
    let narrow = smooth(&frame, &store.snapshot());
    store.set("smoothSpread", 3.0).unwrap();
    let wide = smooth(&frame, &store.snapshot());

    let at = |f: &Frame, x: u32| f.rgb_at(x, 10).0;
    assert!(at(&wide, 10) < at(&narrow, 10));
    assert!(at(&wide, 13) > at(&narrow, 13));
    let lit = |f: &Frame| f.data().iter().filter(|&&v| v > 0).count();
    assert!(lit(&wide) > lit(&narrow));
}

#[test]
fn test_canny_finds_step_edge() {
    let engine = PipelineEngine::new();
    let frame = Frame::from_gray_fn(20, 20, |x, _| if x < 10 { 0 } else { 200 });
    let out = engine
        .process(&frame, Mode::GradientEdges, &ParamSnapshot::default())
        .unwrap();

    assert!(out.data().iter().all(|&v| v == 0 || v == 255));
    // Edge pixels sit on the step, flat regions stay dark
    for y in 2..18 {
        let row: Vec<u8> = (0..20).map(|x| out.rgb_at(x, y).0).collect();
        assert!(row[9] == 255 || row[10] == 255, "row {y}: {row:?}");
        assert_eq!(row[3], 0);
        assert_eq!(row[16], 0);
    }
}

#[test]
fn test_canny_uniform_frame_has_no_edges() {
    let engine = PipelineEngine::new();
    let frame = Frame::filled(16, 16, PixelFormat::Rgb24, 99);
    let out = engine
        .process(&frame, Mode::GradientEdges, &ParamSnapshot::default())
        .unwrap();
    assert!(out.data().iter().all(|&v| v == 0));
}

#[test]
fn test_smooth_flat_frame_is_unchanged() {
    let frame = Frame::filled(9, 9, PixelFormat::Rgb24, 77);
    let store = ParameterStore::new(Variant::Filters);
    store.set("smoothKernelSize", 31.0).unwrap();
    store.set("smoothSpread", 4.0).unwrap();
    assert_eq!(smooth(&frame, &store.snapshot()), frame);
}

#[test]
fn test_run_uses_live_mode_and_parameters() {
    let engine = PipelineEngine::new();
    let modes = ModeController::new(Variant::Edges);
    let store = ParameterStore::new(Variant::Edges);
    let frame = textured_frame(16, 16);

    modes.select_mode(Mode::GradientEdges).unwrap();
    store.set("gradientThresholdLow", 70.0).unwrap();

    let processed = engine.run(&frame, &modes, &store).unwrap();
    assert_eq!(processed.mode, Mode::GradientEdges);
    assert_eq!(
        processed.status_line(),
        "Mode: CANNY | Threshold1: 70 | Threshold2: 150"
    );
}

#[test]
fn test_status_line_for_filters() {
    let engine = PipelineEngine::new();
    let modes = ModeController::new(Variant::Filters);
    let store = ParameterStore::new(Variant::Filters);
    modes.select_mode(Mode::Binarize).unwrap();
    store.cycle_policy().unwrap();

    let processed = engine.run(&textured_frame(4, 4), &modes, &store).unwrap();
    assert_eq!(
        processed.status_line(),
        "Mode: BINARY | Threshold: 127 | Type: BINARY_INV"
    );
}

proptest! {
    #[test]
    fn prop_binary_threshold_is_idempotent(threshold in 0u8..255, seed in 0u32..1000) {
        let frame = Frame::from_gray_fn(16, 8, |x, y| ((x * 31 + y * 17 + seed) % 256) as u8);
        let store = ParameterStore::new(Variant::Filters);
        store.set("binarizeThreshold", threshold as f64).unwrap();
        let params = store.snapshot();
        let once = binarize(&frame, &params);
        let twice = binarize(&once, &params);
        prop_assert_eq!(once, twice);
    }
}

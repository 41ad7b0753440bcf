// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for variants and the mode controller

use filtercam::{Mode, ModeController, PipelineError, Variant};
use std::sync::Arc;
use std::thread;

#[test]
fn test_each_variant_has_four_modes() {
    for variant in Variant::ALL {
        assert_eq!(variant.modes().len(), 4);
        assert!(variant.modes().contains(&variant.default_mode()));
    }
}

#[test]
fn test_startup_mode() {
    assert_eq!(ModeController::new(Variant::Edges).active(), Mode::Color);
    assert_eq!(ModeController::new(Variant::Filters).active(), Mode::Original);
}

#[test]
fn test_any_mode_may_follow_any_other() {
    let controller = ModeController::new(Variant::Edges);
    for &from in Variant::Edges.modes() {
        for &to in Variant::Edges.modes() {
            controller.select_mode(from).unwrap();
            controller.select_mode(to).unwrap();
            assert_eq!(controller.active(), to);
        }
    }
}

#[test]
fn test_foreign_mode_rejected() {
    let controller = ModeController::new(Variant::Edges);
    controller.select_mode(Mode::GradientEdges).unwrap();

    let err = controller.select_mode(Mode::Smooth).unwrap_err();
    assert_eq!(
        err,
        PipelineError::ModeNotInVariant {
            mode: Mode::Smooth,
            variant: Variant::Edges
        }
    );
    assert_eq!(controller.active(), Mode::GradientEdges);
}

#[test]
fn test_select_by_button_position() {
    let controller = ModeController::new(Variant::Filters);
    assert_eq!(controller.select_index(3), Some(Mode::SmoothThenBinarize));
    assert_eq!(controller.select_index(4), None);
    assert_eq!(controller.active(), Mode::SmoothThenBinarize);
}

#[test]
fn test_mode_names_and_descriptions() {
    assert_eq!("canny".parse::<Mode>(), Ok(Mode::GradientEdges));
    assert_eq!("binary_blur".parse::<Mode>(), Ok(Mode::SmoothThenBinarize));
    assert_eq!("FILTERS".parse::<Variant>(), Ok(Variant::Filters));
    for mode in Mode::ALL {
        assert!(!mode.description().is_empty());
    }
}

#[test]
fn test_concurrent_selection_ends_on_a_valid_mode() {
    let controller = Arc::new(ModeController::new(Variant::Filters));
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let controller = Arc::clone(&controller);
            thread::spawn(move || {
                for i in 0..100 {
                    controller.select_index((i + t) % 4);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert!(Variant::Filters.modes().contains(&controller.active()));
}

//! Property-based tests for style computation and application.
//!
//! Directives depend only on the settings, stay within the clamped ranges,
//! and reverting always restores the page's own inline style.

use pageshade::services::style_applicator::{compute_style, DocumentRoot, InMemoryDocument, StyleApplicator};
use pageshade::types::settings::{BackgroundPattern, ColorScheme, ThemeSettings};
use pageshade::types::style::{StyleProperty, ThemeState, MARKER_ATTRIBUTE};
use proptest::prelude::*;

fn arb_settings() -> impl Strategy<Value = ThemeSettings> {
    (
        any::<bool>(),
        -1000i64..1000,
        prop_oneof![Just(ColorScheme::Default), Just(ColorScheme::Dark), Just(ColorScheme::Light)],
        -100i64..100,
        prop_oneof![
            Just(BackgroundPattern::None),
            Just(BackgroundPattern::Dots),
            Just(BackgroundPattern::Stripes),
            Just(BackgroundPattern::Grid),
        ],
    )
        .prop_map(
            |(enabled, darkness_level, color_scheme, font_size, background_pattern)| ThemeSettings {
                enabled,
                darkness_level,
                color_scheme,
                font_size,
                background_pattern,
            },
        )
}

fn arb_page() -> impl Strategy<Value = InMemoryDocument> {
    prop::collection::vec(
        (
            prop_oneof![
                Just(StyleProperty::Filter),
                Just(StyleProperty::ColorScheme),
                Just(StyleProperty::FontSize),
                Just(StyleProperty::BackgroundImage),
            ],
            "[a-z0-9()%]{0,12}",
        ),
        0..4,
    )
    .prop_map(|style| {
        let refs: Vec<(StyleProperty, &str)> = style.iter().map(|(p, v)| (*p, v.as_str())).collect();
        InMemoryDocument::with_inline_style(&refs)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn filter_tracks_clamped_darkness(darkness in 0i64..=100) {
        let style = compute_style(&ThemeSettings { darkness_level: darkness, ..Default::default() });
        if darkness == 0 {
            prop_assert_eq!(style.filter, "");
        } else {
            prop_assert_eq!(style.filter, format!("brightness({}%)", 100 - darkness));
        }
    }

    #[test]
    fn out_of_range_values_are_clamped(settings in arb_settings()) {
        let style = compute_style(&settings);
        let clamped = ThemeSettings {
            darkness_level: settings.darkness_level.clamp(0, 100),
            font_size: settings.font_size.clamp(10, 30),
            ..settings.clone()
        };
        prop_assert_eq!(&style, &compute_style(&clamped));

        if !style.font_size.is_empty() {
            let px: i64 = style.font_size.trim_end_matches("px").parse().unwrap();
            prop_assert!((10..=30).contains(&px) && px != 16);
        }
    }

    #[test]
    fn apply_is_idempotent(settings in arb_settings(), page in arb_page()) {
        let directives = compute_style(&settings);
        let mut once = StyleApplicator::new(page.clone());
        once.apply(&directives);
        let mut twice = StyleApplicator::new(page);
        twice.apply(&directives);
        twice.apply(&directives);
        prop_assert_eq!(once.root(), twice.root());
        prop_assert_eq!(once.state(), ThemeState::Active);
    }

    #[test]
    fn revert_restores_page(sequence in prop::collection::vec(arb_settings(), 1..6), page in arb_page()) {
        let mut applicator = StyleApplicator::new(page.clone());
        for settings in &sequence {
            applicator.apply(&compute_style(settings));
        }
        applicator.revert();
        prop_assert_eq!(applicator.root(), &page);
        prop_assert!(applicator.root().attribute(MARKER_ATTRIBUTE).is_none());
        prop_assert_eq!(applicator.state(), ThemeState::Inactive);
    }
}

use pageshade::services::popup::PopupForm;
use pageshade::services::style_applicator::{
    background_pattern_css, compute_preview, compute_style, DocumentRoot, InMemoryDocument,
    StyleApplicator,
};
use pageshade::types::settings::{BackgroundPattern, ColorScheme, ThemeSettings};
use pageshade::types::style::{StyleProperty, ThemeState, MARKER_ATTRIBUTE};
use rstest::rstest;

fn settings(darkness_level: i64, font_size: i64) -> ThemeSettings {
    ThemeSettings {
        darkness_level,
        font_size,
        ..Default::default()
    }
}

#[rstest]
#[case(0, "")]
#[case(1, "brightness(99%)")]
#[case(50, "brightness(50%)")]
#[case(80, "brightness(20%)")]
#[case(100, "brightness(0%)")]
#[case(-20, "")]
#[case(250, "brightness(0%)")]
fn test_filter_from_darkness(#[case] darkness: i64, #[case] expected: &str) {
    assert_eq!(compute_style(&settings(darkness, 16)).filter, expected);
}

#[rstest]
#[case(16, "")]
#[case(10, "10px")]
#[case(20, "20px")]
#[case(30, "30px")]
#[case(4, "10px")]
#[case(48, "30px")]
fn test_font_size_override(#[case] font_size: i64, #[case] expected: &str) {
    assert_eq!(compute_style(&settings(50, font_size)).font_size, expected);
}

#[rstest]
#[case(ColorScheme::Default, "dark")]
#[case(ColorScheme::Dark, "dark")]
#[case(ColorScheme::Light, "light")]
#[case(ColorScheme::Other("light dark".to_string()), "light dark")]
fn test_color_scheme_mapping(#[case] scheme: ColorScheme, #[case] expected: &str) {
    let style = compute_style(&ThemeSettings {
        color_scheme: scheme,
        ..Default::default()
    });
    assert_eq!(style.color_scheme, expected);
}

#[rstest]
#[case(BackgroundPattern::Dots, "radial-gradient(")]
#[case(BackgroundPattern::Stripes, "repeating-linear-gradient(")]
#[case(BackgroundPattern::Grid, "linear-gradient(")]
fn test_pattern_gradients(#[case] pattern: BackgroundPattern, #[case] prefix: &str) {
    let css = background_pattern_css(&pattern).unwrap();
    assert!(css.starts_with(prefix), "{} should start with {}", css, prefix);
}

#[rstest]
#[case(BackgroundPattern::None)]
#[case(BackgroundPattern::Other("default".to_string()))]
#[case(BackgroundPattern::Other("url(bg.png)".to_string()))]
fn test_unknown_patterns_have_no_background(#[case] pattern: BackgroundPattern) {
    let style = compute_style(&ThemeSettings {
        background_pattern: pattern,
        ..Default::default()
    });
    assert_eq!(style.background_image, "");
}

#[test]
fn test_grid_has_two_layers() {
    let css = background_pattern_css(&BackgroundPattern::Grid).unwrap();
    assert_eq!(css.matches("linear-gradient(").count(), 2);
    assert!(css.contains("90deg"));
}

#[test]
fn test_apply_writes_all_properties_and_marker() {
    let mut applicator = StyleApplicator::new(InMemoryDocument::new());
    applicator.apply(&compute_style(&ThemeSettings {
        darkness_level: 80,
        color_scheme: ColorScheme::Dark,
        font_size: 20,
        background_pattern: BackgroundPattern::Dots,
        ..Default::default()
    }));

    let root = applicator.root();
    assert_eq!(root.style_property(StyleProperty::Filter), "brightness(20%)");
    assert_eq!(root.style_property(StyleProperty::ColorScheme), "dark");
    assert_eq!(root.style_property(StyleProperty::FontSize), "20px");
    assert_eq!(
        root.style_property(StyleProperty::BackgroundImage),
        background_pattern_css(&BackgroundPattern::Dots).unwrap()
    );
    assert_eq!(root.attribute(MARKER_ATTRIBUTE).as_deref(), Some("true"));
    assert_eq!(applicator.state(), ThemeState::Active);
    assert!(applicator.is_active());
}

#[test]
fn test_revert_restores_snapshot_after_repeated_applies() {
    let page = InMemoryDocument::with_inline_style(&[
        (StyleProperty::FontSize, "18px"),
        (StyleProperty::Filter, "contrast(110%)"),
    ]);
    let mut applicator = StyleApplicator::new(page.clone());

    applicator.apply(&compute_style(&settings(30, 24)));
    applicator.apply(&compute_style(&settings(90, 12)));
    assert_eq!(applicator.root().style_property(StyleProperty::FontSize), "12px");

    applicator.revert();
    assert_eq!(applicator.root(), &page);
    assert_eq!(applicator.state(), ThemeState::Inactive);
    assert_eq!(applicator.original().font_size, "18px");
}

#[test]
fn test_default_font_size_clears_page_value() {
    let page = InMemoryDocument::with_inline_style(&[(StyleProperty::FontSize, "18px")]);
    let mut applicator = StyleApplicator::new(page);
    applicator.apply(&compute_style(&ThemeSettings::default()));
    assert_eq!(applicator.root().style_property(StyleProperty::FontSize), "");
}

#[test]
fn test_css_text_lists_set_properties() {
    let mut applicator = StyleApplicator::new(InMemoryDocument::new());
    applicator.apply(&compute_style(&settings(40, 16)));
    assert_eq!(
        applicator.root().css_text(),
        "filter: brightness(60%); color-scheme: dark;"
    );
}

#[test]
fn test_preview_disabled() {
    let form = PopupForm {
        enabled: false,
        ..Default::default()
    };
    let preview = compute_preview(&form);
    assert_eq!(preview.label, "Theme Disabled");
    assert_eq!(preview.directives.filter, "");
}

#[test]
fn test_preview_shows_every_property() {
    let form = PopupForm {
        darkness_level: 0.0,
        font_size: 16.0,
        ..Default::default()
    };
    let preview = compute_preview(&form);
    assert_eq!(preview.label, "Preview");
    assert_eq!(preview.directives.filter, "brightness(100%)");
    assert_eq!(preview.directives.font_size, "16px");
    assert_eq!(preview.directives.color_scheme, "default");
    assert_eq!(preview.directives.background_image, "none");
}

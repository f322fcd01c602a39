//! Style compiler threshold, clamping, and parameter derivation tests.

use retort::style::{compile, ToneSliders, NEUTRAL};

fn neutral_sliders() -> ToneSliders {
    ToneSliders::default()
}

#[test]
fn defaults_are_neutral() {
    let sliders = neutral_sliders();
    assert_eq!(sliders.heat, NEUTRAL);
    assert_eq!(sliders.length, NEUTRAL);
}

#[test]
fn nine_directives_in_fixed_order_even_when_neutral() {
    let sheet = compile(&neutral_sliders());
    assert_eq!(sheet.directives.len(), 9);
    // Neutral clauses are still emitted; nothing is dropped.
    assert!(sheet.directives.iter().all(|d| !d.is_empty()));
    // Spot-check the fixed ordering: politics first, optimism last.
    assert!(sheet.directives[0].contains("politics"));
    assert!(sheet.directives[8].contains("outlook"));
}

#[test]
fn out_of_range_values_clamp_before_threshold_evaluation() {
    let low = ToneSliders {
        humor: -500.0,
        ..neutral_sliders()
    };
    let high = ToneSliders {
        humor: 9000.0,
        ..neutral_sliders()
    };

    // -500 clamps to 0 (< 40 → low clause); 9000 clamps to 100 (> 60 → high).
    assert_eq!(compile(&low).directives[6], "Play it straight: no jokes.");
    assert!(compile(&high).directives[6].contains("funny"));
}

#[test]
fn non_finite_values_clamp_to_zero() {
    let sliders = ToneSliders {
        roast: f64::NAN,
        ..neutral_sliders()
    };
    let sheet = compile(&sliders);
    assert!(sheet.directives[7].contains("No teasing"));
}

#[test]
fn temperature_precedence_length_humor_roast_then_heat() {
    let hot = ToneSliders {
        heat: 80.0,
        ..neutral_sliders()
    };
    assert_eq!(compile(&hot).params.temperature, 0.9);

    // Humor above 60 wins over heat.
    let funny_and_hot = ToneSliders {
        heat: 80.0,
        humor: 65.0,
        ..neutral_sliders()
    };
    assert_eq!(compile(&funny_and_hot).params.temperature, 0.95);

    let long = ToneSliders {
        length: 75.0,
        ..neutral_sliders()
    };
    assert_eq!(compile(&long).params.temperature, 0.95);

    assert_eq!(compile(&neutral_sliders()).params.temperature, 0.7);
}

#[test]
fn length_drives_units_and_token_budget() {
    let short = ToneSliders {
        length: 10.0,
        ..neutral_sliders()
    };
    let params = compile(&short).params;
    assert_eq!(params.target_units, 1);
    assert_eq!(params.max_tokens, 720);

    let long = ToneSliders {
        length: 95.0,
        ..neutral_sliders()
    };
    let params = compile(&long).params;
    assert_eq!(params.target_units, 6);
    assert_eq!(params.max_tokens, 890);
}

#[test]
fn compilation_is_idempotent() {
    let sliders = ToneSliders {
        politics: 12.0,
        heat: 88.0,
        humor: 61.0,
        length: 44.0,
        ..neutral_sliders()
    };
    assert_eq!(compile(&sliders), compile(&sliders));
}

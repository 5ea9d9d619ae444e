//! End-to-end tests for the command channel: classification result ->
//! command -> theme -> population policy.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use flowfield::command::{GestureCommand, VisionResponse};
use flowfield::field::{ParticleField, PopulationTiers};
use flowfield::input::Pointer;
use flowfield::theme::{ParticleShape, Theme};
use flowfield::vision::{parse_gesture_response, GestureClassifier, ScriptedClassifier};

fn test_field(theme: Theme) -> ParticleField {
    ParticleField::with_rng(
        SmallRng::seed_from_u64(99),
        1280.0,
        720.0,
        theme,
        PopulationTiers::default(),
    )
}

/// Apply a classification result the way the app layer does.
fn apply(field: &mut ParticleField, response: &VisionResponse) {
    if let Some(theme) = response.command.theme() {
        field.set_theme(theme);
    }
}

#[test]
fn classified_fist_switches_default_to_fire() {
    let classifier = ScriptedClassifier::new([VisionResponse::new(
        GestureCommand::SwitchFire,
        0.9,
        "fist detected",
    )]);
    let mut field = test_field(Theme::Default);

    let response = classifier.classify(&[0xFF, 0xD8]);
    assert_eq!(response.command, GestureCommand::SwitchFire);
    apply(&mut field, &response);

    assert_eq!(field.theme(), Theme::Fire);
    let fire = Theme::Fire.style();
    for p in field.particles() {
        assert_eq!(p.shape, ParticleShape::Square);
        assert!(fire.size.contains(&p.base_size));
        // Red/orange band: red channel dominates
        assert!(p.color.x > p.color.z);
    }
}

#[test]
fn failed_classification_leaves_theme_unchanged() {
    // An exhausted script degrades exactly like a failed transport call
    let classifier = ScriptedClassifier::new([]);
    let mut field = test_field(Theme::Galaxy);

    let response = classifier.classify(&[]);
    assert_eq!(response.command, GestureCommand::None);
    assert_eq!(response.confidence, 0.0);
    assert_eq!(response.reasoning, "Error analyzing image");

    apply(&mut field, &response);
    assert_eq!(field.theme(), Theme::Galaxy);
    for p in field.particles() {
        assert_eq!(p.shape, ParticleShape::Star);
    }
}

#[test]
fn wire_payload_drives_theme_change() {
    let body = serde_json::json!({
        "candidates": [{
            "content": {
                "parts": [{
                    "text": "{\"command\":\"SWITCH_LOVE\",\"confidence\":0.75,\"reasoning\":\"heart shape with hands\"}"
                }]
            }
        }]
    });

    let response = parse_gesture_response(&body).expect("well-formed payload");
    let mut field = test_field(Theme::Default);
    apply(&mut field, &response);

    assert_eq!(field.theme(), Theme::Love);
    assert!(field
        .particles()
        .iter()
        .all(|p| p.shape == ParticleShape::Heart));
}

#[test]
fn reset_command_returns_to_default() {
    let mut field = test_field(Theme::Fire);
    apply(
        &mut field,
        &VisionResponse::new(GestureCommand::Reset, 1.0, "thumbs up"),
    );
    assert_eq!(field.theme(), Theme::Default);
    assert!(field
        .particles()
        .iter()
        .all(|p| p.shape == ParticleShape::Circle));
}

#[test]
fn held_press_on_population_stays_finite() {
    let mut field = test_field(Theme::Default);
    // Press directly on top of one particle's position and hold
    let target = field.particles()[0].position;
    let pointer = Pointer {
        position: target,
        pressed: true,
    };

    for _ in 0..60 {
        field.step(&pointer);
        for p in field.particles() {
            assert!(p.position.is_finite());
            assert!(p.velocity.is_finite());
        }
    }
}

#[test]
fn connections_follow_the_pointer() {
    let field = test_field(Theme::Default);
    let pointer = Pointer {
        position: Vec2::new(640.0, 360.0),
        pressed: false,
    };
    for c in field.connections(&pointer) {
        assert_eq!(c.to, pointer.position);
        assert!(c.from.distance(pointer.position) < 150.0);
    }
}

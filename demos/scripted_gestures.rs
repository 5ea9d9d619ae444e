//! Theme switching through the gesture-command path, no camera or network
//! required: a scripted classifier replays one canned response per `C`
//! press, cycling fire -> galaxy -> nature -> love -> default.

use std::sync::Arc;

use flowfield::prelude::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let script = ScriptedClassifier::new([
        VisionResponse::new(GestureCommand::SwitchFire, 0.9, "fist detected"),
        VisionResponse::new(GestureCommand::SwitchGalaxy, 0.8, "peace sign"),
        VisionResponse::new(GestureCommand::SwitchNature, 0.85, "open palm"),
        VisionResponse::new(GestureCommand::SwitchLove, 0.7, "heart hands"),
        VisionResponse::new(GestureCommand::Reset, 0.95, "thumbs up"),
    ]);

    let mut config = Config::default();
    config.vision.enabled = false;
    config.window.title = "flowfield - scripted gestures (press C)".to_string();

    if let Err(e) = App::new(config).with_classifier(Arc::new(script)).run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#![forbid(unsafe_code)]

//! End-to-end scenarios driven through the facade, the way a host bridge
//! would: JSON configuration, commands, clock ticks, and notification drains.

use std::time::Duration;

use ainput::prelude::*;
use ainput::{TaskState, WrapMode};

/// Host measurer with a fixed line height and characters-per-line.
#[derive(Debug, Default)]
struct FixedGrid {
    constraint_calls: usize,
    last_wrap: Option<WrapMode>,
}

impl TextMeasurer for FixedGrid {
    fn measure(&mut self, text: &str, font: &FontSpec, container_width: f32) -> f32 {
        let per_line = (container_width / font.size).floor().max(1.0) as usize;
        let chars = text.chars().count().max(1);
        chars.div_ceil(per_line) as f32 * font.size
    }

    fn assert_constraints(&mut self, _container_width: f32, wrap: WrapMode) {
        self.constraint_calls += 1;
        self.last_wrap = Some(wrap);
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn dictation_into_draft_reveals_words_then_settles() {
    let mut input = ValueController::new(InputConfig::default());
    input.set_container_width(300.0);
    input.set_value("draft: ");
    input.focus();
    input.set_selection(7);
    input.set_dictation_active(true);
    input.take_notifications();

    input.set_value("draft: one two");
    assert_eq!(input.value(), "draft: one two");
    assert_eq!(input.cursor(), 14);
    assert_eq!(
        input.take_notifications(),
        vec![Notification::TextChanged {
            text: "draft: one two".into()
        }]
    );

    let tasks = input.reveal_tasks();
    assert_eq!(tasks.len(), 2);
    assert_eq!(
        (tasks[0].word(), tasks[1].word()),
        ("one", "two")
    );
    assert!(tasks[0].delay() < tasks[1].delay());
    assert!(tasks.iter().all(|t| t.state() == TaskState::Pending));

    input.advance(ms(1));
    assert_eq!(input.reveal_tasks()[0].state(), TaskState::Revealing);
    assert_eq!(input.reveal_tasks()[1].state(), TaskState::Pending);

    input.advance(ms(1_000));
    assert!(input.reveal_tasks().is_empty());
    assert!(input.hidden_ranges().is_empty());
    assert_eq!(input.pending_jobs(), 0);
}

#[test]
fn max_length_rejects_overflowing_keystroke() {
    let config = InputConfig::from_json_str(r#"{"maxLength": 5}"#).unwrap();
    let mut input = ValueController::new(config);
    input.set_value("hello");
    input.take_notifications();

    assert!(!input.submit_user_edit("hello!", TextRange::caret(5), "!"));
    assert_eq!(input.value(), "hello");
    assert!(input.take_notifications().is_empty());
}

#[test]
fn json_config_drives_single_line_submit() {
    let config = InputConfig::from_json_str(
        r#"{"multiline": false, "returnKeyType": "send", "keyboardType": "not-a-keyboard"}"#,
    )
    .unwrap();
    let mut input = ValueController::new(config);
    input.set_value("ship it");
    input.take_notifications();

    assert_eq!(
        input.try_submit_user_edit("ship it\n", TextRange::caret(7), "\n"),
        Err(EditRejection::SubmitInstead)
    );
    assert_eq!(
        input.take_notifications(),
        vec![Notification::Submit {
            text: "ship it".into()
        }]
    );
}

#[test]
fn custom_measurer_receives_constraints_and_grows() {
    let config = InputConfig {
        min_height: 10.0,
        max_height: Some(64.0),
        ..InputConfig::default()
    };
    let mut input = ValueController::with_measurer(config, FixedGrid::default());
    input.set_container_width(160.0);
    input.take_notifications();
    assert_eq!(input.measurer().last_wrap, Some(WrapMode::WordChar));

    // 16pt in 160pt: ten characters per line.
    input.set_value("x".repeat(25));
    let sizes: Vec<Size> = input
        .take_notifications()
        .into_iter()
        .filter_map(|n| match n {
            Notification::ContentSizeChanged(size) => Some(size),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![Size::new(160.0, 48.0)]);
    assert!(!input.scroll_enabled());

    input.set_value("x".repeat(60));
    assert_eq!(input.content_height(), Some(64.0));
    assert!(input.scroll_enabled());

    let before = input.measurer().constraint_calls;
    input.focus();
    input.advance(ms(300));
    assert_eq!(input.measurer().constraint_calls, before + 3);
}

#[test]
fn dynamic_font_size_follows_default_rules() {
    let mut input = ValueController::new(InputConfig {
        dynamic_sizing: true,
        ..InputConfig::default()
    });
    for (len, size) in [(0, 32.0), (20, 32.0), (21, 24.0), (100, 18.0), (500, 14.0)] {
        input.set_value("a".repeat(len));
        assert_eq!(input.font_size(), size, "length {len}");
    }
}

#[test]
fn error_taxonomy_is_reachable_through_prelude() {
    let err: Error = EditRejection::NotEditable.into();
    let result: Result<()> = Err(err);
    assert!(result.is_err_and(|e| e.is_recoverable()));
}

#[test]
fn dropping_mid_animation_is_clean() {
    let mut input = ValueController::new(InputConfig::default());
    input.set_dictation_active(true);
    input.set_value("several new words here");
    assert_eq!(input.reveal_tasks().len(), 4);
    input.advance(ms(90));
    drop(input);
}

#[test]
fn config_round_trips_through_json() {
    let config = InputConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(InputConfig::from_json_str(&json).unwrap(), config);
}

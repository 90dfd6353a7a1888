#![forbid(unsafe_code)]

//! Controller mutations emit `ainput.edit` spans carrying the cursor and
//! dictation state.

use std::sync::{Arc, Mutex};

use ainput_core::TextRange;
use ainput_widgets::{InputConfig, ValueController};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Debug, Default)]
struct EditTraceState {
    span_count: usize,
    operations: Vec<String>,
    cursor_positions: Vec<usize>,
    dictation_flags: Vec<bool>,
}

struct EditTraceCapture {
    state: Arc<Mutex<EditTraceState>>,
}

impl<S> Layer<S> for EditTraceCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::Id,
        _ctx: Context<'_, S>,
    ) {
        if attrs.metadata().name() != "ainput.edit" {
            return;
        }

        #[derive(Default)]
        struct EditVisitor {
            operation: Option<String>,
            cursor_position: Option<usize>,
            dictation_active: Option<bool>,
        }

        impl tracing::field::Visit for EditVisitor {
            fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
                if field.name() == "cursor_position" {
                    self.cursor_position = usize::try_from(value).ok();
                }
            }

            fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
                if field.name() == "cursor_position" {
                    self.cursor_position = usize::try_from(value).ok();
                }
            }

            fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
                if field.name() == "dictation_active" {
                    self.dictation_active = Some(value);
                }
            }

            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "operation" {
                    self.operation = Some(value.to_owned());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "operation" {
                    self.operation = Some(format!("{value:?}").trim_matches('"').to_owned());
                }
            }
        }

        let mut visitor = EditVisitor::default();
        attrs.record(&mut visitor);

        let mut state = self.state.lock().expect("trace state lock");
        state.span_count += 1;
        if let Some(op) = visitor.operation {
            state.operations.push(op);
        }
        if let Some(cursor) = visitor.cursor_position {
            state.cursor_positions.push(cursor);
        }
        if let Some(flag) = visitor.dictation_active {
            state.dictation_flags.push(flag);
        }
    }
}

#[test]
fn edit_spans_track_operations_and_cursor() {
    let state = Arc::new(Mutex::new(EditTraceState::default()));
    let subscriber = tracing_subscriber::registry().with(EditTraceCapture {
        state: Arc::clone(&state),
    });
    let _guard = tracing::subscriber::set_default(subscriber);
    tracing::callsite::rebuild_interest_cache();

    let mut input = ValueController::new(InputConfig::default());
    assert!(input.submit_user_edit("ab", TextRange::caret(0), "ab"));
    input.set_selection(1);
    input.set_dictation_active(true);
    input.set_value("ab cd");

    tracing::callsite::rebuild_interest_cache();
    let snapshot = state.lock().expect("trace state lock");
    assert_eq!(
        snapshot.operations,
        vec![
            "user_edit",
            "set_selection",
            "set_dictation_active",
            "dictation_merge"
        ]
    );
    assert_eq!(snapshot.span_count, 4);
    assert_eq!(snapshot.cursor_positions, vec![2, 1, 1, 5]);
    assert_eq!(snapshot.dictation_flags, vec![false, false, true, true]);
}

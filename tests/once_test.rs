mod common;

use common::{settle, Recorder, Widget};
use evmixin::{Context, Emitter, EmitterError, EventRegistry, QueueScheduler, Value};

#[tokio::test]
async fn test_once_fires_at_most_once() {
    let widget = Widget::new("w");
    let recorder = Recorder::new();
    widget.once("ready", recorder.listener(), None).unwrap();

    widget.emit("ready", vec![]).unwrap();
    settle().await;
    widget.emit("ready", vec![]).unwrap();
    settle().await;

    assert_eq!(recorder.count(), 1);
    assert_eq!(widget.listener_count("ready"), 0);
}

#[tokio::test]
async fn test_once_with_back_to_back_emits_fires_once() {
    let widget = Widget::new("w");
    let recorder = Recorder::new();
    widget.once("ready", recorder.listener(), None).unwrap();

    widget
        .emit("ready", vec![Value::from(1i64)])
        .unwrap()
        .emit("ready", vec![Value::from(2i64)])
        .unwrap();
    settle().await;

    assert_eq!(recorder.count(), 1);
}

#[tokio::test]
async fn test_on_overrides_once() {
    let widget = Widget::new("w");
    let recorder = Recorder::new();
    let f = recorder.listener();

    widget
        .once("ready", &f, None)
        .unwrap()
        .on("ready", &f, None)
        .unwrap();
    for _ in 0..3 {
        widget.emit("ready", vec![]).unwrap();
        settle().await;
    }

    assert_eq!(recorder.count(), 3);
}

#[tokio::test]
async fn test_once_does_not_override_on() {
    let widget = Widget::new("w");
    let recorder = Recorder::new();
    let f = recorder.listener();

    widget
        .on("ready", &f, None)
        .unwrap()
        .once("ready", &f, None)
        .unwrap();
    assert_eq!(widget.listener_count("ready"), 1);
    for _ in 0..3 {
        widget.emit("ready", vec![]).unwrap();
        settle().await;
    }

    assert_eq!(recorder.count(), 3);
}

#[tokio::test]
async fn test_once_twice_is_idempotent() {
    let widget = Widget::new("w");
    let recorder = Recorder::new();
    let f = recorder.listener();

    widget
        .once("ready", &f, None)
        .unwrap()
        .once("ready", &f, None)
        .unwrap();
    assert_eq!(widget.listener_count("ready"), 1);
}

#[tokio::test]
async fn test_once_per_context() {
    let widget = Widget::new("w");
    let recorder = Recorder::new();
    let f = recorder.listener();

    widget
        .once("ready", &f, Some(Context::new("a")))
        .unwrap()
        .once("ready", &f, Some(Context::new("b")))
        .unwrap()
        .emit("ready", vec![])
        .unwrap()
        .emit("ready", vec![])
        .unwrap();
    settle().await;

    assert_eq!(
        recorder.contexts(),
        vec![Some("a".to_string()), Some("b".to_string())]
    );
}

#[tokio::test]
async fn test_once_removed_before_its_turn_is_skipped() {
    let widget = Widget::new("w");
    let recorder = Recorder::new();
    let f = recorder.listener();
    widget.once("ready", &f, None).unwrap();

    widget.emit("ready", vec![]).unwrap().off_listener("ready", &f);
    settle().await;

    assert_eq!(recorder.count(), 0);
}

#[tokio::test]
async fn test_once_validation() {
    let widget = Widget::new("w");
    let recorder = Recorder::new();
    let f = recorder.listener();

    let err = widget.once("open close", &f, None).err();
    assert_eq!(
        err,
        Some(EmitterError::MultipleEventNames {
            names: "open close".to_string(),
            count: 2,
        })
    );
    assert!(matches!(
        widget.once(vec!["open"], &f, None),
        Err(EmitterError::InvalidEventName { .. })
    ));
    assert!(matches!(
        widget.once(Value::Integer(1), &f, None),
        Err(EmitterError::InvalidEventName { .. })
    ));
    assert!(matches!(
        widget.once("", &f, None),
        Err(EmitterError::InvalidEventName { .. })
    ));
    assert!(matches!(
        widget.once("open", Value::Null, None),
        Err(EmitterError::InvalidListener { .. })
    ));
    assert!(widget.event_registry().event_names().is_empty());
}

#[test]
fn test_once_on_queue_scheduler() {
    let queue = QueueScheduler::new();
    let registry = EventRegistry::with_scheduler(queue.clone());
    let recorder = Recorder::new();
    let f = recorder.listener();

    registry.once("ready", &f, None).unwrap();
    registry.emit("ready", vec![]).unwrap();
    registry.emit("ready", vec![]).unwrap();
    assert_eq!(recorder.count(), 0);
    assert_eq!(queue.len(), 2);

    assert_eq!(queue.run_pending(), 2);
    assert_eq!(recorder.count(), 1);

    // Re-registering after it fired arms it again.
    registry.once("ready", &f, None).unwrap();
    registry.emit("ready", vec![]).unwrap();
    queue.run_pending();
    assert_eq!(recorder.count(), 2);
}

#[test]
fn test_once_listener_can_reregister_itself() {
    let queue = QueueScheduler::new();
    let widget = std::sync::Arc::new(Widget::with_registry(
        "w",
        EventRegistry::with_scheduler(queue.clone()),
    ));
    let recorder = Recorder::new();
    let inner = recorder.listener();
    let weak = std::sync::Arc::downgrade(&widget);
    let rearm = evmixin::Listener::new(move |inv| {
        inner.call(inv);
        if let Some(widget) = weak.upgrade() {
            widget.on("next", &inner, None).unwrap();
        }
    });

    widget.once("ready", &rearm, None).unwrap();
    widget.emit("ready", vec![]).unwrap();
    queue.run_pending();

    assert_eq!(recorder.count(), 1);
    assert_eq!(widget.listener_count("ready"), 0);
    assert_eq!(widget.listener_count("next"), 1);
}

#[test]
fn test_once_promoted_by_on_before_its_turn_still_fires() {
    let queue = QueueScheduler::new();
    let registry = EventRegistry::with_scheduler(queue.clone());
    let recorder = Recorder::new();
    let f = recorder.listener();

    registry.once("ready", &f, None).unwrap();
    registry.emit("ready", vec![]).unwrap();
    registry.on("ready", &f, None).unwrap();
    queue.run_pending();

    // The emission happened while f was bound, and the promotion keeps it bound.
    assert_eq!(recorder.count(), 1);
    assert_eq!(registry.listener_count("ready"), 1);

    registry.emit("ready", vec![]).unwrap();
    queue.run_pending();
    assert_eq!(recorder.count(), 2);
}

#[tokio::test]
async fn test_once_promoted_by_on_on_tokio() {
    let widget = Widget::new("w");
    let recorder = Recorder::new();
    let f = recorder.listener();

    widget
        .once("ready", &f, None)
        .unwrap()
        .emit("ready", vec![])
        .unwrap()
        .on("ready", &f, None)
        .unwrap();
    settle().await;

    assert_eq!(recorder.count(), 1);
    assert_eq!(widget.listener_count("ready"), 1);
}

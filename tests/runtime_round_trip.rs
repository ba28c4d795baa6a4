//! End-to-end: touches go in on the gesture thread, commits come out on the
//! application thread, and the applied value is echoed back as the next
//! gesture's baseline.

use std::sync::Arc;

use parking_lot::Mutex;
use slotframe::gesture::{Point, Size};
use slotframe::{
    ElementId, ElementKind, EngineConfig, GestureRuntime, Scene, SlotCropAdjustment, Transform,
    TransformPatch,
};

const EPSILON: f32 = 0.0001;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn canvas() -> Size {
    Size::new(1000.0, 1000.0)
}

fn drag(runtime: &GestureRuntime, id: ElementId, from: Point, to: Point) {
    runtime.touch_down(id, 1, from).unwrap();
    runtime
        .touch_move(id, 1, Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0))
        .unwrap();
    runtime.touch_move(id, 1, to).unwrap();
    runtime.touch_up(id, 1, to).unwrap();
}

#[test]
fn pan_commits_to_scene_and_invokes_current_handler() {
    let (runtime, mut app) = GestureRuntime::start(EngineConfig::new(), canvas()).unwrap();
    let mut scene = Scene::new();
    let id = scene.add_overlay(ElementKind::Logo, Transform::default());
    runtime
        .register_overlay(id, ElementKind::Logo, Size::new(100.0, 100.0), Transform::default())
        .unwrap();

    let commits = Arc::new(Mutex::new(Vec::new()));
    let sink = commits.clone();
    app.on_transform_change
        .set(move |(id, t): (ElementId, Transform)| sink.lock().push((id, t)));

    drag(&runtime, id, Point::new(500.0, 500.0), Point::new(700.0, 400.0));
    runtime.flush().unwrap();
    assert_eq!(app.pump(&mut scene), 1);

    let stored = scene.transform(id).unwrap();
    assert!(approx_eq(stored.x, 0.7));
    assert!(approx_eq(stored.y, 0.4));
    assert_eq!(*commits.lock(), vec![(id, stored)]);

    // The echo reached the gesture thread.
    runtime.flush().unwrap();
    assert_eq!(runtime.live().transform(id), Some(stored));
    runtime.shutdown();
}

#[test]
fn second_gesture_starts_from_external_setter_value() {
    let (runtime, mut app) = GestureRuntime::start(EngineConfig::new(), canvas()).unwrap();
    let mut scene = Scene::new();
    let id = scene.add_overlay(ElementKind::Text, Transform::default());
    runtime
        .register_overlay(id, ElementKind::Text, Size::new(200.0, 50.0), Transform::default())
        .unwrap();

    // A panel moves the element; it travels the same bridge as gestures.
    runtime
        .bridge()
        .set_transform(id, TransformPatch::position(0.2, 0.3));
    app.pump(&mut scene);
    runtime.flush().unwrap();
    assert_eq!(
        runtime.live().transform(id),
        Some(Transform::new(0.2, 0.3, 1.0, 0.0))
    );

    drag(&runtime, id, Point::new(200.0, 300.0), Point::new(300.0, 300.0));
    runtime.flush().unwrap();
    app.pump(&mut scene);

    let stored = scene.transform(id).unwrap();
    assert!(approx_eq(stored.x, 0.3));
    assert!(approx_eq(stored.y, 0.3));
}

#[test]
fn cancelled_gesture_commits_nothing() {
    let (runtime, mut app) = GestureRuntime::start(EngineConfig::new(), canvas()).unwrap();
    let mut scene = Scene::new();
    let id = scene.add_overlay(ElementKind::Date, Transform::default());
    runtime
        .register_overlay(id, ElementKind::Date, Size::new(120.0, 40.0), Transform::default())
        .unwrap();

    runtime.touch_down(id, 1, Point::new(500.0, 500.0)).unwrap();
    runtime.touch_move(id, 1, Point::new(800.0, 500.0)).unwrap();
    runtime.flush().unwrap();
    assert!(runtime.live().transform(id).unwrap().x > 0.5);

    runtime.touch_cancel(id).unwrap();
    runtime.flush().unwrap();
    assert_eq!(app.pump(&mut scene), 0);
    assert_eq!(scene.transform(id), Some(Transform::default()));
    assert_eq!(runtime.live().transform(id), Some(Transform::default()));
}

#[test]
fn commit_for_deleted_element_is_dropped() {
    let (runtime, mut app) = GestureRuntime::start(EngineConfig::new(), canvas()).unwrap();
    let mut scene = Scene::new();
    let id = scene.add_overlay(ElementKind::Logo, Transform::default());
    runtime
        .register_overlay(id, ElementKind::Logo, Size::new(100.0, 100.0), Transform::default())
        .unwrap();

    drag(&runtime, id, Point::new(500.0, 500.0), Point::new(600.0, 500.0));
    runtime.flush().unwrap();

    // The element is deleted on the application side before the commit lands.
    assert!(scene.remove(id));
    let called = Arc::new(Mutex::new(false));
    let flag = called.clone();
    app.on_transform_change.set(move |_| *flag.lock() = true);

    assert_eq!(app.pump(&mut scene), 1);
    assert!(!*called.lock());
    assert!(scene.is_empty());
}

#[test]
fn slot_crop_round_trip() {
    let (runtime, mut app) = GestureRuntime::start(EngineConfig::new(), canvas()).unwrap();
    let mut scene = Scene::new();
    let initial = SlotCropAdjustment::new(2.0, 0.0, 0.0);
    let id = scene.add_slot(initial);
    runtime
        .register_slot(id, Size::new(400.0, 400.0), Size::new(800.0, 400.0), initial)
        .unwrap();

    let adjustments = Arc::new(Mutex::new(Vec::new()));
    let sink = adjustments.clone();
    app.on_adjustment_change
        .set(move |(_, a): (ElementId, SlotCropAdjustment)| sink.lock().push(a));

    // Half excess at scale 2 is 600 px horizontally.
    drag(&runtime, id, Point::new(200.0, 200.0), Point::new(320.0, 200.0));
    runtime.flush().unwrap();
    app.pump(&mut scene);

    let stored = scene.adjustment(id).unwrap();
    assert!(approx_eq(stored.translate_x, 0.2));
    assert_eq!(*adjustments.lock(), vec![stored]);
}

#[test]
fn tap_selects_through_bridge() {
    let (runtime, mut app) = GestureRuntime::start(EngineConfig::new(), canvas()).unwrap();
    let mut scene = Scene::new();
    let id = scene.add_overlay(ElementKind::Logo, Transform::default());
    runtime
        .register_overlay(id, ElementKind::Logo, Size::new(100.0, 100.0), Transform::default())
        .unwrap();

    let selected = Arc::new(Mutex::new(None));
    let sink = selected.clone();
    app.on_select.set(move |id: ElementId| *sink.lock() = Some(id));

    runtime.touch_down(id, 1, Point::new(500.0, 500.0)).unwrap();
    runtime.touch_up(id, 1, Point::new(501.0, 500.0)).unwrap();
    runtime.flush().unwrap();
    app.pump(&mut scene);

    assert_eq!(*selected.lock(), Some(id));
    assert_eq!(scene.selected(), Some(id));
    assert_eq!(scene.transform(id), Some(Transform::default()));
}

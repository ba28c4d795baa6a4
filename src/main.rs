//! Scripted demonstration: drives a gesture session through the real-time
//! thread and logs what the application thread receives.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = demo::run() {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// The engine is a library on the web; there is no demo binary there.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use slotframe::gesture::{Point, Size};
    use slotframe::{
        ElementId, ElementKind, EngineConfig, GestureRuntime, RuntimeError, Scene, SliderOutput,
        SlotCropAdjustment, Transform,
    };

    const CANVAS: Size = Size {
        width: 1080.0,
        height: 1920.0,
    };

    pub fn run() -> Result<(), RuntimeError> {
        let config = EngineConfig::load_from_default_path().unwrap_or_default();
        env_logger::Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let mut scene = Scene::with_bounds(config.scale_bounds);
        let logo = scene.add_overlay(ElementKind::Logo, Transform::new(0.5, 0.2, 1.0, 0.0));
        let slot = scene.add_slot(SlotCropAdjustment::new(1.5, 0.0, 0.0));

        let (runtime, mut app) = GestureRuntime::start(config.clone(), CANVAS)?;
        runtime.register_overlay(
            logo,
            ElementKind::Logo,
            Size::new(200.0, 120.0),
            Transform::new(0.5, 0.2, 1.0, 0.0),
        )?;
        runtime.register_slot(
            slot,
            Size::new(900.0, 900.0),
            Size::new(4032.0, 3024.0),
            SlotCropAdjustment::new(1.5, 0.0, 0.0),
        )?;

        app.on_transform_change.set(|(id, t): (ElementId, Transform)| {
            log::info!(
                "render {} at ({:.3}, {:.3}) x{:.2} {:.1}deg",
                id,
                t.x,
                t.y,
                t.scale,
                t.rotation
            )
        });
        app.on_adjustment_change.set(|(id, a): (ElementId, SlotCropAdjustment)| {
            log::info!(
                "recrop {} x{:.2} ({:.3}, {:.3})",
                id,
                a.scale,
                a.translate_x,
                a.translate_y
            )
        });
        app.on_select.set(|id: ElementId| log::info!("selected {}", id));

        // Tap the logo.
        let at = Point::new(540.0, 384.0);
        runtime.touch_down(logo, 1, at)?;
        runtime.touch_up(logo, 1, at)?;

        // Drag it down and to the right.
        runtime.touch_down(logo, 1, at)?;
        for step in 1..=10 {
            let t = step as f32 / 10.0;
            let position = Point::new(540.0 + 160.0 * t, 384.0 + 300.0 * t);
            runtime.touch_move(logo, 1, position)?;
        }
        runtime.touch_up(logo, 1, Point::new(700.0, 684.0))?;

        // Spread two fingers and turn them a little under 90 degrees.
        let center = Point::new(700.0, 684.0);
        let fingers = |t: f32| {
            let (sin, cos) = (87.0_f32.to_radians() * t).sin_cos();
            let radius = 60.0 + 60.0 * t;
            (
                Point::new(center.x - radius * cos, center.y - radius * sin),
                Point::new(center.x + radius * cos, center.y + radius * sin),
            )
        };
        let (first, second) = fingers(0.0);
        runtime.touch_down(logo, 1, first)?;
        runtime.touch_down(logo, 2, second)?;
        for step in 1..=12 {
            let (first, second) = fingers(step as f32 / 12.0);
            runtime.touch_move(logo, 1, first)?;
            runtime.touch_move(logo, 2, second)?;
        }
        let (first, second) = fingers(1.0);
        runtime.touch_up(logo, 1, first)?;
        runtime.touch_up(logo, 2, second)?;

        // Pan the photo inside its slot.
        runtime.touch_down(slot, 1, Point::new(450.0, 450.0))?;
        runtime.touch_move(slot, 1, Point::new(520.0, 430.0))?;
        runtime.touch_up(slot, 1, Point::new(520.0, 430.0))?;

        runtime.flush()?;
        let processed = app.pump(&mut scene);
        log::info!("applied {} bridge messages", processed);

        if let Some(live) = runtime.live().transform(logo) {
            log::debug!("live logo transform {:?}", live);
        }

        // Size slider for the logo: tap near the top of the track.
        let current = scene.transform(logo).map(|t| t.scale).unwrap_or(1.0);
        let mut slider = config
            .scale_slider(ElementKind::Logo, 320.0, current)
            .bind(logo, runtime.bridge());
        slider.press(40.0);
        let mut output = slider.release(40.0);
        while let Some(SliderOutput::Preview(scale)) = output {
            log::trace!("slider preview {:.2}", scale);
            output = slider.advance(std::time::Duration::from_millis(16));
        }
        app.pump(&mut scene);
        runtime.flush()?;

        for id in scene.ids() {
            match scene.get(id) {
                Some(element) => {
                    println!("{} {}: {:?}", element.kind.name(), id, element.value)
                }
                None => continue,
            }
        }
        println!("selected: {:?}", scene.selected());

        runtime.shutdown();
        Ok(())
    }
}

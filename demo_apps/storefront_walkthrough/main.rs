//! Storefront Walkthrough
//!
//! Simulates one visit to a storefront page without a window or GPU:
//!
//! 1. the page mounts with a hero model and three product models;
//! 2. models finish loading out of order while the preloader holds the page;
//! 3. the hero intro plays once readiness settles;
//! 4. the visitor scrolls down through the product sections.
//!
//! Run with `RUST_LOG=debug` to follow every transition.

use std::time::Duration;

use glam::Vec3;
use vitrine::animation::{AnimationTarget, AnimatorConfig, TransformRange};
use vitrine::{AssetId, AssetManifest, Region, SceneNode, Stage, StageConfig};

const FRAME: Duration = Duration::from_micros(16_667);
const SECTION_HEIGHT: f32 = 900.0;
const PRODUCTS: [&str; 3] = ["armchair", "floor-lamp", "side-table"];

/// Placeholder for a decoded glTF scene.
struct LoadedModel {
    name: String,
}

fn product_animator(index: usize) -> AnimatorConfig {
    let side = if index % 2 == 0 { 1.0 } else { -1.0 };
    AnimatorConfig {
        transform: TransformRange {
            start: AnimationTarget {
                position: Vec3::new(side * 3.0, -1.0, 0.0),
                rotation: Vec3::new(0.0, -0.6 * side, 0.0),
                scale: Vec3::splat(0.8),
            },
            end: AnimationTarget {
                position: Vec3::new(0.0, 0.5, 0.0),
                rotation: Vec3::new(0.0, 0.6 * side, 0.0),
                scale: Vec3::ONE,
            },
        },
        ..AnimatorConfig::default()
    }
}

fn run_for(stage: &Stage, seconds: f32) {
    let frames = (seconds / FRAME.as_secs_f32()).ceil() as usize;
    for _ in 0..frames {
        stage.advance(FRAME);
    }
}

fn report(stage: &Stage, scenes: &[SceneNode]) {
    let preloader = stage.preloader();
    log::info!(
        "t={:.2}s preloader={:?} {}/{} locked={} opacity={:.2}",
        stage.clock().elapsed(),
        preloader.phase(),
        preloader.progress().loaded,
        preloader.progress().total,
        stage.is_scroll_locked(),
        preloader.indicator_opacity(),
    );
    for scene in scenes {
        let transform = scene.transform();
        let transform = transform.read();
        log::info!(
            "  {:<18} progress={:.2} in_view={:<5} mode={:?} pos=({:.2}, {:.2}, {:.2}) frames={}",
            scene.asset().as_str(),
            scene.scroll_progress().progress,
            scene.scroll_progress().in_view,
            scene.render_mode(),
            transform.position.x,
            transform.position.y,
            transform.position.z,
            scene.frames_rendered(),
        );
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StageConfig::default();
    let stage = Stage::mount(config, AssetManifest::for_catalog(PRODUCTS))?;

    let mut scenes = vec![stage.mount_scene(stage.describe_hero(Region::new(0.0, SECTION_HEIGHT)))?];
    for (index, product) in PRODUCTS.iter().enumerate() {
        let region = Region::new((index + 1) as f32 * SECTION_HEIGHT, SECTION_HEIGHT);
        let descriptor = stage
            .describe_scene(AssetId::for_product(product), region)
            .with_animator(product_animator(index));
        scenes.push(stage.mount_scene(descriptor)?);
    }

    // Placeholder geometry first, then the real models in a scrambled order.
    for scene in &scenes {
        scene.on_resource::<LoadedModel>(None);
    }
    for index in [2, 0, 3, 1] {
        run_for(&stage, 0.3);
        let model = LoadedModel {
            name: scenes[index].asset().to_string(),
        };
        log::info!("Model `{}` decoded", model.name);
        scenes[index].on_resource(Some(&model));
        // A re-decode hands over a new resource; it must not report again.
        scenes[index].on_resource(Some(&model));
        report(&stage, &scenes);
    }

    // Scroll attempts during the intro are swallowed.
    if !stage.scroll_to(400.0) {
        log::info!("Scroll ignored while the page is locked");
    }

    run_for(&stage, 2.5);
    report(&stage, &scenes);

    for step in 1..=12 {
        let y = step as f32 * SECTION_HEIGHT / 4.0;
        stage.scroll_to(y);
        run_for(&stage, 0.5);
        if step % 4 == 0 {
            report(&stage, &scenes);
        }
    }

    let hero = &scenes[0];
    log::info!(
        "Hero entrance {:?}, overlay {:?}, camera {:?}",
        hero.entrance_phase(),
        hero.overlay(),
        hero.camera_position()
    );

    // Leaving the page.
    drop(scenes);
    log::info!(
        "Unmounted; {} frame callbacks left on the clock",
        stage.clock().callback_count()
    );
    Ok(())
}

//! Wall handle under a paused tokio clock

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use wall_asset::MemoryImageLoader;
use wall_layout::prelude::*;
use wall_physics::PhysicsConfig;
use wall_render::RenderError;
use wall_runtime::{Wall, WallConfig, WallError};

const PERIOD: Duration = Duration::from_millis(800);

fn test_config(gravity: bool) -> WallConfig {
    let mut config = WallConfig {
        layout: LayoutConfig::default().with_size(400.0, 200.0),
        refresh_hz: 30,
        ..WallConfig::default()
    };
    if !gravity {
        config.physics = PhysicsConfig::default().with_gravity(0.0, 0.0);
    }
    config
}

fn wall_with(config: WallConfig, loader: MemoryImageLoader, seed: u64) -> Wall {
    let scene = Scene::with_seed(config.layout.clone(), config.physics.clone(), seed).unwrap();
    Wall::with_scene(scene, config, Arc::new(loader))
}

fn wall(seed: u64) -> Wall {
    wall_with(test_config(true), MemoryImageLoader::new(), seed)
}

fn items(count: usize) -> Vec<Item> {
    (0..count).map(|i| Item::new(format!("icon-{}", i), 24.0, 24.0)).collect()
}

fn registered(wall: &Wall) -> usize {
    wall.with_scene_mut(|scene| scene.registry().len())
}

fn png(image: &RgbaImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

#[tokio::test(start_paused = true)]
async fn seven_items_land_one_per_period() {
    let wall = wall(11);
    wall.reconcile(&items(7)).unwrap();

    let plan = wall.rearrange(PERIOD).unwrap();
    assert_eq!(plan.batch_sizes, vec![1; 7]);
    assert_eq!(registered(&wall), 1);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(registered(&wall), 1);

    for expected in 2..=7 {
        tokio::time::sleep(PERIOD).await;
        assert_eq!(registered(&wall), expected, "after {} periods", expected - 1);
    }

    tokio::time::sleep(PERIOD * 3).await;
    assert_eq!(registered(&wall), 7);
    assert_eq!(wall.with_scene_mut(|scene| scene.active_schedule()), None);
    wall.dispose();
}

#[tokio::test(start_paused = true)]
async fn second_rearrange_supersedes_pending_batches() {
    let wall = wall(12);
    wall.reconcile(&items(20)).unwrap();

    let first = wall.rearrange(PERIOD).unwrap();
    assert!(first.schedule.is_some());
    tokio::time::sleep(Duration::from_millis(100)).await;

    let second = wall.rearrange(PERIOD).unwrap();
    assert_eq!(second.total(), 20);
    assert_ne!(second.schedule, first.schedule);

    tokio::time::sleep(PERIOD * 12).await;
    assert_eq!(registered(&wall), 20);
    assert_eq!(wall.with_scene_mut(|scene| scene.world().dynamic_body_count()), 20);
    assert_eq!(wall.with_scene_mut(|scene| scene.active_schedule()), None);
}

#[tokio::test(start_paused = true)]
async fn reconcile_cancels_draining_rearrange() {
    let wall = wall(13);
    let desired = items(20);
    wall.reconcile(&desired).unwrap();
    wall.rearrange(PERIOD).unwrap();

    wall.reconcile(&desired).unwrap();
    assert_eq!(registered(&wall), 20);

    tokio::time::sleep(PERIOD * 12).await;
    assert_eq!(registered(&wall), 20);
    assert_eq!(wall.with_scene_mut(|scene| scene.world().dynamic_body_count()), 20);
}

#[tokio::test(start_paused = true)]
async fn dispose_stops_tasks_and_is_idempotent() {
    let wall = wall(14);
    wall.reconcile(&items(20)).unwrap();
    wall.rearrange(PERIOD).unwrap();

    wall.dispose();
    wall.dispose();
    assert!(wall.is_disposed());

    wall.pointer(PointerEvent::new(PointerKind::Down(PointerButton::Primary), [10.0, 10.0]));
    tokio::time::sleep(PERIOD * 12).await;

    wall.with_scene_mut(|scene| {
        assert!(scene.is_disposed());
        assert_eq!(scene.world().body_count(), 0);
        assert!(scene.registry().is_empty());
    });
    assert!(matches!(wall.reconcile(&items(1)), Err(WallError::Layout(_))));
}

#[tokio::test(start_paused = true)]
async fn flat_color_screenshot_is_the_canvas_encode() {
    let wall = wall(15);
    wall.set_background("#203040");
    wall.reconcile(&items(3)).unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    let expected = wall.with_scene_mut(|scene| {
        scene.render();
        scene.encode_canvas().unwrap()
    });
    let shot = wall.capture_screenshot().await.unwrap();
    assert_eq!(shot, expected);

    let decoded = image::load_from_memory(&shot).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (400, 200));
}

#[tokio::test(start_paused = true)]
async fn image_background_is_composited_under_icons() {
    let background = png(&RgbaImage::from_pixel(4, 2, Rgba([200, 0, 0, 255])));
    let wall = wall_with(test_config(true), MemoryImageLoader::new().with("frames/red.png", background), 16);
    wall.set_background("frames/red.png");

    let shot = wall.capture_screenshot().await.unwrap();
    let decoded = image::load_from_memory(&shot).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (400, 200));
    assert_eq!(*decoded.get_pixel(0, 199), Rgba([200, 0, 0, 255]));
}

#[tokio::test(start_paused = true)]
async fn unreachable_background_fails_the_capture() {
    let wall = wall(17);
    wall.set_background("https://example.invalid/frame.png");

    match wall.capture_screenshot().await {
        Err(WallError::Render(RenderError::ScreenshotCompositeFailure { reference, .. })) => {
            assert_eq!(reference, "https://example.invalid/frame.png");
        }
        other => panic!("expected composite failure, got {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test(start_paused = true)]
async fn pointer_events_open_menu_and_rotate() {
    let wall = wall_with(test_config(false), MemoryImageLoader::new(), 18);
    wall.reconcile(&items(1)).unwrap();
    let (body, at) = wall.with_scene_mut(|scene| {
        let body = scene.body_of("icon-0").unwrap();
        (body, scene.world().body_position(body).unwrap())
    });

    wall.pointer(PointerEvent::new(PointerKind::Down(PointerButton::Secondary), at).with_screen([640.0, 320.0]));
    tokio::time::sleep(Duration::from_millis(20)).await;

    let menu = wall.menu().unwrap();
    assert_eq!(menu.body, body);
    assert_eq!(menu.screen, [640.0, 320.0]);

    assert!(wall.menu_action(MenuAction::Rotate));
    assert_eq!(
        wall.with_scene_mut(|scene| scene.rotation_state(body)),
        Some(wall_layout::RotationState::Locked)
    );
    assert_eq!(wall.toggle_rotation(body), Some(wall_layout::RotationState::Free));
}

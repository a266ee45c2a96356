use macroquad::prelude::*;
use macroquad_tmx::render::{camera_view, visible_tile_range, TextureCache};
use macroquad_tmx::{build_visible_tile_commands, TmxLoader};

fn window_conf() -> Conf {
    Conf {
        window_title: "Basic Map".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        log::error!("{err:#}");
    }
}

async fn run() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/map.tmx".to_owned());

    let map = TmxLoader::new().load_map(&path)?;
    let textures = TextureCache::load(&map).await?;
    let projection = map.projection();
    let map_size = projection.map_size();

    let mut target = map_size * 0.5;
    let speed = 400.0;

    loop {
        let dt = get_frame_time();
        if is_key_down(KeyCode::Left) {
            target.x -= speed * dt;
        }
        if is_key_down(KeyCode::Right) {
            target.x += speed * dt;
        }
        if is_key_down(KeyCode::Up) {
            target.y -= speed * dt;
        }
        if is_key_down(KeyCode::Down) {
            target.y += speed * dt;
        }

        clear_background(map.background_color);
        let camera = Camera2D::from_display_rect(Rect::new(
            target.x - screen_width() * 0.5,
            target.y + screen_height() * 0.5,
            screen_width(),
            -screen_height(),
        ));
        set_camera(&camera);

        let (min, max) = camera_view(&camera);
        let region = visible_tile_range(&projection, min, max);
        let commands = build_visible_tile_commands(&map, &projection, region);
        textures.draw(&commands);

        set_default_camera();
        draw_text(
            &format!("FPS: {}  sprites: {}", get_fps(), commands.len()),
            20.0,
            30.0,
            30.0,
            RED,
        );

        next_frame().await;
    }
}

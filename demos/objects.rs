use macroquad::prelude::*;
use macroquad_tmx::render::{camera_view, visible_tile_range, TextureCache};
use macroquad_tmx::{build_visible_tile_commands, ObjectShape, Projection, TiledMap, TmxLoader};

fn window_conf() -> Conf {
    Conf {
        window_title: "Objects Example".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

fn draw_objects(map: &TiledMap, projection: &Projection) {
    for (id, layer) in map.layers.iter_depth_first() {
        let Some(group) = layer.as_objects() else {
            continue;
        };
        if !map.layers.is_visible(id) {
            continue;
        }
        let offset = map.layers.render_offset(id);
        let colour = group.color;
        let to_screen = |x: f32, y: f32| projection.pixel_to_screen(x, y) + offset;

        for obj in group.sorted_for_draw() {
            if !obj.visible {
                continue;
            }
            let origin = to_screen(obj.x, obj.y);
            match &obj.shape {
                ObjectShape::Rectangle => {
                    draw_rectangle_lines(origin.x, origin.y, obj.width, obj.height, 2.0, colour);
                }
                ObjectShape::Ellipse => draw_ellipse_lines(
                    origin.x + obj.width * 0.5,
                    origin.y + obj.height * 0.5,
                    obj.width * 0.5,
                    obj.height * 0.5,
                    0.0,
                    2.0,
                    colour,
                ),
                ObjectShape::Point => draw_circle(origin.x, origin.y, 3.0, colour),
                ObjectShape::Polygon(points) | ObjectShape::Polyline(points) => {
                    let closed = matches!(obj.shape, ObjectShape::Polygon(_));
                    let screen: Vec<Vec2> = points
                        .iter()
                        .map(|p| to_screen(obj.x + p.x, obj.y + p.y))
                        .collect();
                    for pair in screen.windows(2) {
                        draw_line(pair[0].x, pair[0].y, pair[1].x, pair[1].y, 2.0, colour);
                    }
                    if let (true, Some(first), Some(last)) =
                        (closed, screen.first(), screen.last())
                    {
                        draw_line(last.x, last.y, first.x, first.y, 2.0, colour);
                    }
                }
                ObjectShape::Text(text) => {
                    let size = text.pixel_size as f32;
                    draw_text(&text.text, origin.x, origin.y + size, size, text.color);
                }
                // tile and image objects are drawn bottom-left anchored
                ObjectShape::Tile(_) | ObjectShape::Image(_) => draw_rectangle_lines(
                    origin.x,
                    origin.y - obj.height,
                    obj.width,
                    obj.height,
                    1.0,
                    colour,
                ),
            }
        }
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

    let groups = map
        .layers
        .iter_depth_first()
        .filter_map(|(_, l)| l.as_objects())
        .collect::<Vec<_>>();
    log::info!(
        "object_layers={} objects={}",
        groups.len(),
        groups.iter().map(|g| g.len()).sum::<usize>()
    );

    let centre = projection.map_size() * 0.5;
    loop {
        clear_background(map.background_color);
        let camera = Camera2D::from_display_rect(Rect::new(
            centre.x - screen_width() * 0.5,
            centre.y + screen_height() * 0.5,
            screen_width(),
            -screen_height(),
        ));
        set_camera(&camera);

        let (min, max) = camera_view(&camera);
        let region = visible_tile_range(&projection, min, max);
        textures.draw(&build_visible_tile_commands(&map, &projection, region));
        draw_objects(&map, &projection);

        set_default_camera();
        draw_text("objects example", 20.0, 30.0, 32.0, WHITE);
        next_frame().await;
    }
}

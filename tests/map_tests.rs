// tests/map_tests.rs

use macroquad::math::vec2;
use macroquad_tmx::{
    build_tile_commands, load_map_str, render::visible_tile_range, Orientation, Point,
    Projection, StaggerAxis, StaggerIndex,
};

fn map_xml(header: &str, w: u32, h: u32, layers: &str) -> String {
    format!(
        r#"<map {header} width="{w}" height="{h}">
             <tileset firstgid="1" name="t" tilewidth="64" tileheight="64">
               <image source="t.png" width="256" height="64"/>
             </tileset>
             {layers}
           </map>"#
    )
}

#[test]
fn staggered_map_from_tmx_round_trips() {
    let xml = map_xml(
        r#"orientation="staggered" staggeraxis="y" staggerindex="odd"
           tilewidth="64" tileheight="32""#,
        10,
        10,
        "",
    );
    let map = load_map_str(&xml).expect("map");
    assert_eq!(map.orientation, Orientation::Staggered);
    assert_eq!(map.stagger_axis, StaggerAxis::Y);
    assert_eq!(map.stagger_index, StaggerIndex::Odd);

    let p = map.projection();
    assert_eq!(p.tile_to_screen(0.0, 1.0), vec2(32.0, 16.0));
    assert_eq!(p.screen_to_tile(5.0, 5.0), Point::new(-1, -1));
    assert_eq!(p.tile_center(0, 1), vec2(64.0, 32.0));
    assert_eq!(p.screen_to_tile(64.0, 32.0), Point::new(0, 1));

    match p {
        Projection::Staggered(s) => {
            assert_eq!(s.top_left(0, 0), Point::new(-1, -1));
            assert_eq!(s.top_left(1, 1), Point::new(1, 0));
        }
        other => panic!("unexpected projection {other:?}"),
    }
}

#[test]
fn hexagonal_map_centres_resolve() {
    for (axis, index) in [("x", "even"), ("x", "odd"), ("y", "even"), ("y", "odd")] {
        let header = format!(
            r#"orientation="hexagonal" staggeraxis="{axis}" staggerindex="{index}"
               hexsidelength="12" tilewidth="28" tileheight="24""#
        );
        let map = load_map_str(&map_xml(&header, 6, 5, "")).expect("map");
        let p = map.projection();
        for y in 0..5 {
            for x in 0..6 {
                let c = p.tile_center(x, y);
                assert_eq!(p.screen_to_tile(c.x, c.y), Point::new(x, y), "{axis}/{index}");
            }
        }
    }
}

#[test]
fn nested_group_offsets_compose() {
    let layers = r#"
        <group name="top" offsetx="2" offsety="3" parallaxx="0.5">
          <group name="mid" offsetx="5">
            <layer name="leaf" offsety="7" parallaxx="0.5">
              <data encoding="csv">1,0,0,0</data>
            </layer>
          </group>
        </group>"#;
    let mut map = load_map_str(&map_xml(
        r#"orientation="orthogonal" tilewidth="64" tileheight="64""#,
        2,
        2,
        layers,
    ))
    .expect("map");

    let leaf = map.layers.by_name("leaf").expect("leaf");
    let mid = map.layers.by_name("mid").expect("mid");
    assert_eq!(map.layers.render_offset(leaf), vec2(7.0, 10.0));
    assert_eq!(map.layers.render_parallax(leaf), vec2(0.25, 1.0));

    map.layers.set_offset(mid, vec2(0.0, 0.0));
    assert_eq!(map.layers.render_offset(leaf), vec2(2.0, 10.0));

    let projection = map.projection();
    let cmds = build_tile_commands(&map, &projection);
    assert_eq!(cmds.len(), 1);
    assert_eq!(cmds[0].dest, vec2(2.0, 10.0));
}

#[test]
fn isometric_commands_follow_z_order() {
    let map = load_map_str(&map_xml(
        r#"orientation="isometric" tilewidth="64" tileheight="32""#,
        3,
        3,
        r#"<layer name="l"><data encoding="csv">1,2,3,4,1,2,3,4,1</data></layer>"#,
    ))
    .expect("map");
    let projection = map.projection();
    let z = projection.z_order();
    let cmds = build_tile_commands(&map, &projection);

    assert_eq!(cmds.len(), 9);
    assert!(cmds.windows(2).all(|w| w[0].z < w[1].z));
    // back corner first, front corner last
    assert_eq!(z.at(0, 0), Some(0));
    assert_eq!(z.at(2, 2), Some(8));
}

#[test]
fn culling_region_limits_commands() {
    let map = load_map_str(&map_xml(
        r#"orientation="orthogonal" tilewidth="64" tileheight="64""#,
        8,
        8,
        &format!(
            r#"<layer name="l"><data encoding="csv">{}</data></layer>"#,
            vec!["1"; 64].join(",")
        ),
    ))
    .expect("map");
    let projection = map.projection();
    let region = visible_tile_range(&projection, vec2(0.0, 0.0), vec2(63.0, 63.0));
    assert_eq!((region.width, region.height), (2, 2));

    let visible = macroquad_tmx::build_visible_tile_commands(&map, &projection, region);
    assert_eq!(visible.len(), 4);
}

use crate::color::multiply;
use crate::image::ImageLayer;
use crate::object::ObjectGroup;
use crate::properties::Properties;
use crate::tile_layer::TileLayer;
use macroquad::color::{Color, WHITE};
use macroquad::math::{vec2, Vec2};
use std::sync::OnceLock;

/// Index of a layer inside its map's [`LayerTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub usize);

/// Children of a `<group>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupLayer {
    pub(crate) children: Vec<LayerId>,
}

impl GroupLayer {
    /// Child layers in document order; rearranged only through [`LayerTree::set_parent`].
    pub fn children(&self) -> &[LayerId] {
        &self.children
    }
}

/// What a layer holds.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum LayerKind {
    Tiles(TileLayer),
    Objects(ObjectGroup),
    Image(ImageLayer),
    Group(GroupLayer),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RenderCache {
    offset: Vec2,
    parallax: Vec2,
}

/// One visual plane of a map.
///
/// Offset, parallax and parent are private: they feed the memoized render values and
/// can only change through [`LayerTree`], which invalidates the memo. The kind is
/// fixed once the layer exists so group membership stays consistent.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct Layer {
    /// Unique id from the document (0 when absent).
    pub id: u32,
    pub name: String,
    pub class: String,
    /// Tile-space bounds.
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub opacity: f32,
    pub visible: bool,
    pub locked: bool,
    /// Multiplied with everything this layer draws.
    pub tint_color: Option<Color>,
    pub properties: Properties,
    kind: LayerKind,
    /// Set whenever the layer needs to be rebuilt by a renderer.
    pub need_update: bool,
    offset: Vec2,
    parallax: Vec2,
    parent: Option<LayerId>,
    cache: OnceLock<RenderCache>,
}

impl Layer {
    /// A visible, opaque layer with no offset.
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: 0,
            name: name.into(),
            class: String::new(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            opacity: 1.0,
            visible: true,
            locked: false,
            tint_color: None,
            properties: Properties::new(),
            kind,
            need_update: true,
            offset: Vec2::ZERO,
            parallax: vec2(1.0, 1.0),
            parent: None,
            cache: OnceLock::new(),
        }
    }

    /// Builder used by loaders before the layer joins a tree.
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Builder used by loaders before the layer joins a tree.
    pub fn with_parallax(mut self, parallax: Vec2) -> Self {
        self.parallax = parallax;
        self
    }

    /// Own pixel offset.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Own parallax factor.
    pub fn parallax(&self) -> Vec2 {
        self.parallax
    }

    #[allow(missing_docs)]
    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }

    /// What the layer holds.
    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    #[allow(missing_docs)]
    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match &self.kind {
            LayerKind::Tiles(t) => Some(t),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_tiles_mut(&mut self) -> Option<&mut TileLayer> {
        match &mut self.kind {
            LayerKind::Tiles(t) => Some(t),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_objects(&self) -> Option<&ObjectGroup> {
        match &self.kind {
            LayerKind::Objects(o) => Some(o),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_objects_mut(&mut self) -> Option<&mut ObjectGroup> {
        match &mut self.kind {
            LayerKind::Objects(o) => Some(o),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_image(&self) -> Option<&ImageLayer> {
        match &self.kind {
            LayerKind::Image(i) => Some(i),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_image_mut(&mut self) -> Option<&mut ImageLayer> {
        match &mut self.kind {
            LayerKind::Image(i) => Some(i),
            _ => None,
        }
    }

    #[allow(missing_docs)]
    pub fn as_group(&self) -> Option<&GroupLayer> {
        match &self.kind {
            LayerKind::Group(g) => Some(g),
            _ => None,
        }
    }
}

/// Arena owning every layer of a map; parents are indices, never owners.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerTree {
    layers: Vec<Layer>,
    roots: Vec<LayerId>,
}

impl LayerTree {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer under `parent` (or at the top level) and returns its id.
    ///
    /// A parent that is not a group is ignored and the layer lands at the top level.
    pub fn push(&mut self, parent: Option<LayerId>, mut layer: Layer) -> LayerId {
        let id = LayerId(self.layers.len());
        let parent = parent.filter(|p| self.get(*p).is_some_and(|l| l.as_group().is_some()));
        layer.parent = parent;
        layer.cache = OnceLock::new();
        self.layers.push(layer);
        match parent {
            Some(p) => {
                if let LayerKind::Group(g) = &mut self.layers[p.0].kind {
                    g.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }

    #[allow(missing_docs)]
    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    /// Mutable access; offset, parallax, parent and kind stay behind the tree.
    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id.0)
    }

    /// First layer with the given name, in depth-first order.
    pub fn by_name(&self, name: &str) -> Option<LayerId> {
        self.iter_depth_first()
            .find(|(_, l)| l.name == name)
            .map(|(id, _)| id)
    }

    /// Top-level layers in document order.
    pub fn roots(&self) -> &[LayerId] {
        &self.roots
    }

    /// Children of a group; empty for other layers.
    pub fn children(&self, id: LayerId) -> &[LayerId] {
        self.get(id)
            .and_then(Layer::as_group)
            .map(|g| g.children.as_slice())
            .unwrap_or(&[])
    }

    /// Every layer, all nesting levels.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Pre-order walk: a group comes before its children, siblings in document order.
    pub fn iter_depth_first(&self) -> impl Iterator<Item = (LayerId, &Layer)> + '_ {
        let mut stack: Vec<LayerId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.children(id).iter().rev().copied());
            Some((id, &self.layers[id.0]))
        })
    }

    /// Parent chain from the direct parent upwards.
    pub fn ancestors(&self, id: LayerId) -> impl Iterator<Item = LayerId> + '_ {
        let mut cur = self.get(id).and_then(|l| l.parent);
        std::iter::from_fn(move || {
            let id = cur?;
            cur = self.layers[id.0].parent;
            Some(id)
        })
    }

    /// Changes the pixel offset and invalidates the layer and everything below it.
    pub fn set_offset(&mut self, id: LayerId, offset: Vec2) {
        if let Some(layer) = self.layers.get_mut(id.0) {
            layer.offset = offset;
            self.invalidate(id);
        }
    }

    /// Changes the parallax factor and invalidates the layer and everything below it.
    pub fn set_parallax(&mut self, id: LayerId, parallax: Vec2) {
        if let Some(layer) = self.layers.get_mut(id.0) {
            layer.parallax = parallax;
            self.invalidate(id);
        }
    }

    /// Moves a layer under another group (or to the top level).
    ///
    /// Returns `false` if `parent` is not a group, is the layer itself, or lies below it.
    pub fn set_parent(&mut self, id: LayerId, parent: Option<LayerId>) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        if let Some(p) = parent {
            let is_group = self.get(p).is_some_and(|l| l.as_group().is_some());
            if !is_group || p == id || self.ancestors(p).any(|a| a == id) {
                return false;
            }
        }

        match self.layers[id.0].parent {
            Some(old) => {
                if let LayerKind::Group(g) = &mut self.layers[old.0].kind {
                    g.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|c| *c != id),
        }
        match parent {
            Some(p) => {
                if let LayerKind::Group(g) = &mut self.layers[p.0].kind {
                    g.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        self.layers[id.0].parent = parent;
        self.invalidate(id);
        true
    }

    fn invalidate(&mut self, id: LayerId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let layer = &mut self.layers[cur.0];
            layer.cache = OnceLock::new();
            layer.need_update = true;
            stack.extend(self.children(cur).iter().copied());
        }
    }

    fn render_cache(&self, id: LayerId) -> RenderCache {
        let layer = &self.layers[id.0];
        if let Some(cached) = layer.cache.get() {
            return *cached;
        }
        let computed = match layer.parent {
            Some(p) => {
                let parent = self.render_cache(p);
                RenderCache {
                    offset: layer.offset + parent.offset,
                    parallax: layer.parallax * parent.parallax,
                }
            }
            None => RenderCache {
                offset: layer.offset,
                parallax: layer.parallax,
            },
        };
        *layer.cache.get_or_init(|| computed)
    }

    /// Own offset plus every ancestor's, memoized until the next invalidation.
    pub fn render_offset(&self, id: LayerId) -> Vec2 {
        if self.get(id).is_none() {
            return Vec2::ZERO;
        }
        self.render_cache(id).offset
    }

    /// Own parallax times every ancestor's, memoized until the next invalidation.
    pub fn render_parallax(&self, id: LayerId) -> Vec2 {
        if self.get(id).is_none() {
            return vec2(1.0, 1.0);
        }
        self.render_cache(id).parallax
    }

    /// Hidden if the layer or any ancestor is hidden.
    pub fn is_visible(&self, id: LayerId) -> bool {
        match self.get(id) {
            Some(l) => l.visible && self.ancestors(id).all(|a| self.layers[a.0].visible),
            None => false,
        }
    }

    /// Own tint multiplied by every ancestor's; unset tints count as white.
    pub fn tint_color(&self, id: LayerId) -> Color {
        let Some(layer) = self.get(id) else {
            return WHITE;
        };
        let own = layer.tint_color.unwrap_or(WHITE);
        self.ancestors(id).fold(own, |acc, a| {
            multiply(acc, self.layers[a.0].tint_color.unwrap_or(WHITE))
        })
    }

    /// Opacity multiplied down the parent chain.
    pub fn render_opacity(&self, id: LayerId) -> f32 {
        match self.get(id) {
            Some(l) => self
                .ancestors(id)
                .fold(l.opacity, |acc, a| acc * self.layers[a.0].opacity),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, offset: Vec2) -> Layer {
        Layer::new(name, LayerKind::Group(GroupLayer::default())).with_offset(offset)
    }

    fn nested() -> (LayerTree, LayerId, LayerId, LayerId) {
        let mut tree = LayerTree::new();
        let top = tree.push(None, group("top", vec2(2.0, 3.0)));
        let mid = tree.push(Some(top), group("mid", vec2(5.0, 0.0)));
        let leaf = tree.push(
            Some(mid),
            Layer::new("leaf", LayerKind::Tiles(TileLayer::new(1, 1))).with_offset(vec2(0.0, 7.0)),
        );
        (tree, top, mid, leaf)
    }

    #[test]
    fn render_offset_composes_three_levels() {
        let (tree, _, _, leaf) = nested();
        assert_eq!(tree.render_offset(leaf), vec2(7.0, 10.0));
    }

    #[test]
    fn ancestor_change_after_read_is_seen_by_children() {
        let (mut tree, top, _, leaf) = nested();
        assert_eq!(tree.render_offset(leaf), vec2(7.0, 10.0));

        tree.set_offset(top, vec2(10.0, 10.0));
        assert_eq!(tree.render_offset(leaf), vec2(15.0, 17.0));
    }

    #[test]
    fn parallax_multiplies_down_the_chain() {
        let (mut tree, top, mid, leaf) = nested();
        tree.set_parallax(top, vec2(0.5, 1.0));
        tree.set_parallax(mid, vec2(0.5, 2.0));
        assert_eq!(tree.render_parallax(leaf), vec2(0.25, 2.0));
        assert_eq!(tree.render_parallax(top), vec2(0.5, 1.0));
    }

    #[test]
    fn hidden_ancestor_hides_descendants() {
        let (mut tree, top, mid, leaf) = nested();
        assert!(tree.is_visible(leaf));
        tree.get_mut(mid).expect("mid").visible = false;
        assert!(!tree.is_visible(leaf));
        assert!(tree.is_visible(top));
    }

    #[test]
    fn depth_first_walk_visits_groups_before_children() {
        let (mut tree, _, _, _) = nested();
        tree.push(None, Layer::new("after", LayerKind::Objects(ObjectGroup::new())));
        let names: Vec<&str> = tree.iter_depth_first().map(|(_, l)| l.name.as_str()).collect();
        assert_eq!(names, vec!["top", "mid", "leaf", "after"]);
        assert_eq!(tree.by_name("leaf"), Some(LayerId(2)));
        assert_eq!(tree.by_name("nope"), None);
    }

    #[test]
    fn reparenting_invalidates_and_rejects_cycles() {
        let (mut tree, top, mid, leaf) = nested();
        assert_eq!(tree.render_offset(leaf), vec2(7.0, 10.0));
        assert!(!tree.set_parent(top, Some(mid)));
        assert!(tree.set_parent(leaf, Some(top)));
        assert_eq!(tree.render_offset(leaf), vec2(2.0, 10.0));
        assert_eq!(tree.children(top), &[mid, leaf]);
        assert!(tree.set_parent(leaf, None));
        assert_eq!(tree.render_offset(leaf), vec2(0.0, 7.0));
        assert_eq!(tree.roots(), &[top, leaf]);
    }

    #[test]
    fn tint_composes_with_white_default() {
        let (mut tree, top, _, leaf) = nested();
        assert_eq!(tree.tint_color(leaf), WHITE);
        tree.get_mut(top).expect("top").tint_color = Some(Color::new(0.5, 1.0, 1.0, 1.0));
        assert_eq!(tree.tint_color(leaf), Color::new(0.5, 1.0, 1.0, 1.0));
    }

    #[test]
    fn group_children_are_read_only_views() {
        let (tree, top, mid, _) = nested();
        let group = tree.get(top).and_then(Layer::as_group).expect("group");
        assert_eq!(group.children(), &[mid]);
        assert!(matches!(tree.get(top).map(Layer::kind), Some(LayerKind::Group(_))));
    }

    #[test]
    fn tree_is_shared_between_threads() {
        fn assert_sync<T: Sync + Send>() {}
        assert_sync::<LayerTree>();

        let (tree, _, _, leaf) = nested();
        let tree = std::sync::Arc::new(tree);
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let tree = std::sync::Arc::clone(&tree);
                std::thread::spawn(move || tree.render_offset(leaf))
            })
            .collect();
        for r in readers {
            assert_eq!(r.join().expect("reader"), vec2(7.0, 10.0));
        }
    }
}

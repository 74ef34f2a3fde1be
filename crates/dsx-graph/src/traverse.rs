//! Depth-first traversal with material, texture and transform inheritance.
//!
//! The walk keeps a flag per node marking whether it is on the current path.
//! A child already on the path would close a cycle and is skipped; a DAG
//! child reached through several parents is visited once per parent.

use dsx_core::{chain_matrix, Material, Override, Texture};
use dsx_shapes::{Shape, Tiling};
use glam::Mat4;

use crate::graph::{MaterialKey, Node, NodeKey, SceneGraph, TextureKey};

/// The texture bound to a draw, with the tiling in effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureBinding<'a> {
    pub id: &'a str,
    pub texture: &'a Texture,
    pub tiling: Tiling,
}

/// One leaf ready to draw, with everything it inherited resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall<'a> {
    pub key: NodeKey,
    pub node: &'a str,
    pub shape: &'a Shape,
    pub transform: Mat4,
    pub material_id: Option<&'a str>,
    pub material: Option<&'a Material>,
    pub texture: Option<TextureBinding<'a>>,
}

/// Receives draw calls in traversal order.
pub trait DrawSink {
    fn draw(&mut self, call: &DrawCall<'_>);
}

impl<F> DrawSink for F
where
    F: FnMut(&DrawCall<'_>),
{
    fn draw(&mut self, call: &DrawCall<'_>) {
        self(call)
    }
}

/// Owned copy of a draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub node: String,
    pub shape: Shape,
    pub transform: Mat4,
    pub material: Option<String>,
    pub texture: Option<String>,
    pub tiling: Option<Tiling>,
}

impl From<&DrawCall<'_>> for DrawRecord {
    fn from(call: &DrawCall<'_>) -> Self {
        Self {
            node: call.node.to_string(),
            shape: call.shape.clone(),
            transform: call.transform,
            material: call.material_id.map(str::to_string),
            texture: call.texture.map(|binding| binding.id.to_string()),
            tiling: call.texture.map(|binding| binding.tiling),
        }
    }
}

/// Counters from one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes entered, counting a shared node once per parent.
    pub visits: usize,
    pub draws: usize,
    /// Child links skipped because the child was already on the path.
    pub cycles_skipped: usize,
    /// Subtrees cut at the depth limit.
    pub depth_cuts: usize,
    /// Child keys with no node behind them.
    pub missing: usize,
}

/// What a node passes down to its children.
#[derive(Debug, Clone, Copy)]
struct Inherited {
    matrix: Mat4,
    material: Option<MaterialKey>,
    texture: Option<(TextureKey, Tiling)>,
}

impl SceneGraph {
    /// Walk the graph from the root, handing every leaf to `sink`.
    ///
    /// The root starts from the identity transform with no material and no
    /// texture, so an `inherit` at the root resolves to nothing.
    pub fn traverse(&self, sink: &mut impl DrawSink) -> TraversalStats {
        let mut walk = Walk {
            graph: self,
            sink,
            on_path: vec![false; self.nodes.len()],
            stats: TraversalStats::default(),
        };
        let start = Inherited {
            matrix: Mat4::IDENTITY,
            material: None,
            texture: None,
        };
        walk.visit(self.root, start, 0);

        let stats = walk.stats;
        if stats.cycles_skipped > 0 || stats.depth_cuts > 0 {
            log::warn!(
                "traversal skipped {} cyclic links and cut {} subtrees at depth {}",
                stats.cycles_skipped,
                stats.depth_cuts,
                self.max_depth
            );
        }
        stats
    }

    /// Collect every draw of one traversal.
    pub fn draw_calls(&self) -> Vec<DrawRecord> {
        let mut records = Vec::new();
        self.traverse(&mut |call: &DrawCall<'_>| records.push(DrawRecord::from(call)));
        records
    }

    /// The material slot a node uses under the current material cycle.
    fn material_slot(&self, node: &Node) -> Override<MaterialKey> {
        if node.materials.is_empty() {
            return Override::Inherit;
        }
        node.materials[self.material_cycle % node.materials.len()]
    }

    fn texture_binding(&self, texture: Option<(TextureKey, Tiling)>) -> Option<TextureBinding<'_>> {
        let (key, tiling) = texture?;
        let (id, texture) = self.textures.get_index(key)?;
        Some(TextureBinding { id, texture, tiling })
    }
}

struct Walk<'g, 's, S: DrawSink> {
    graph: &'g SceneGraph,
    sink: &'s mut S,
    on_path: Vec<bool>,
    stats: TraversalStats,
}

impl<S: DrawSink> Walk<'_, '_, S> {
    fn visit(&mut self, key: NodeKey, parent: Inherited, depth: usize) {
        let graph = self.graph;
        let Some(node) = graph.node(key) else {
            log::warn!("node {key} does not exist");
            self.stats.missing += 1;
            return;
        };
        if depth >= graph.max_depth {
            log::warn!("'{}' is deeper than {} levels; subtree skipped", node.id, graph.max_depth);
            self.stats.depth_cuts += 1;
            return;
        }
        self.stats.visits += 1;

        let matrix = parent.matrix * node.transform * chain_matrix(&node.animations);
        let material = graph.material_slot(node).resolve(parent.material);
        let texture = match node.texture.texture.resolve(parent.texture.map(|(key, _)| key)) {
            None => None,
            Some(texture_key) if node.texture.texture.is_inherit() => {
                parent.texture.map(|(_, tiling)| (texture_key, tiling))
            }
            Some(texture_key) => {
                let declared = graph.textures.get_index(texture_key).map(|(_, t)| t);
                let tiling = Tiling::new(
                    node.texture.length_s.or(declared.map(|t| t.length_s)).unwrap_or(1.0),
                    node.texture.length_t.or(declared.map(|t| t.length_t)).unwrap_or(1.0),
                );
                Some((texture_key, tiling))
            }
        };

        let inherited = Inherited {
            matrix,
            material,
            texture,
        };
        self.on_path[key.0] = true;
        for &child in &node.children {
            if self.on_path.get(child.0).copied().unwrap_or(false) {
                let child_id = graph.node(child).map_or("?", |n| n.id.as_str());
                log::warn!("'{}' -> '{}' closes a cycle; link skipped", node.id, child_id);
                self.stats.cycles_skipped += 1;
                continue;
            }
            self.visit(child, inherited, depth + 1);
        }
        self.on_path[key.0] = false;

        if let Some(shape) = &node.shape {
            let material_entry = material.and_then(|index| graph.materials.get_index(index));
            self.sink.draw(&DrawCall {
                key,
                node: &node.id,
                shape,
                transform: matrix,
                material_id: material_entry.map(|(id, _)| id),
                material: material_entry.map(|(_, material)| material),
                texture: graph.texture_binding(texture),
            });
            self.stats.draws += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsx_core::{Diagnostics, DuplicatePolicy, Rgba, SymbolTable};
    use glam::Vec3;

    struct Fixture {
        nodes: SymbolTable<Node>,
        materials: SymbolTable<Material>,
        textures: SymbolTable<Texture>,
        diagnostics: Diagnostics,
    }

    impl Fixture {
        fn new() -> Self {
            let mut fixture = Self {
                nodes: SymbolTable::new("node"),
                materials: SymbolTable::new("material"),
                textures: SymbolTable::new("texture"),
                diagnostics: Diagnostics::new(),
            };
            for (id, red) in [("red", 1.0), ("dark", 0.1)] {
                let material = Material {
                    diffuse: Rgba::new(red, 0.0, 0.0, 1.0),
                    ..Material::default()
                };
                fixture
                    .materials
                    .declare(id, material, DuplicatePolicy::Replace, &mut fixture.diagnostics, None);
            }
            let texture = Texture {
                file: "wood.png".into(),
                length_s: 2.0,
                length_t: 4.0,
            };
            fixture
                .textures
                .declare("wood", texture, DuplicatePolicy::Replace, &mut fixture.diagnostics, None);
            fixture
        }

        fn add(&mut self, node: Node) -> NodeKey {
            let id = node.id.clone();
            self.nodes
                .declare(&id, node, DuplicatePolicy::Replace, &mut self.diagnostics, None);
            NodeKey(self.nodes.index_of(&id).unwrap())
        }

        fn graph(self, root: NodeKey) -> SceneGraph {
            SceneGraph {
                nodes: self.nodes,
                root,
                materials: self.materials,
                textures: self.textures,
                material_cycle: 0,
                max_depth: 64,
            }
        }
    }

    fn quad() -> Shape {
        Shape::Rectangle {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
        }
    }

    fn component(id: &str, children: Vec<NodeKey>) -> Node {
        let mut node = Node::placeholder(id, None);
        node.children = children;
        node
    }

    #[test]
    fn test_transforms_compose_parent_first() {
        let mut fixture = Fixture::new();
        let leaf = fixture.add(Node::leaf("quad", quad(), None));
        let mut inner = component("inner", vec![leaf]);
        inner.transform = Mat4::from_scale(Vec3::splat(2.0));
        let inner = fixture.add(inner);
        let mut root = component("root", vec![inner]);
        root.transform = Mat4::from_translation(Vec3::X);
        let root = fixture.add(root);

        let draws = fixture.graph(root).draw_calls();
        assert_eq!(draws.len(), 1);
        let moved = draws[0].transform.transform_point3(Vec3::ONE);
        assert!(moved.abs_diff_eq(Vec3::new(3.0, 2.0, 2.0), 1e-6));
    }

    #[test]
    fn test_material_inheritance() {
        let mut fixture = Fixture::new();
        let leaf = fixture.add(Node::leaf("quad", quad(), None));
        let mut keep = component("keep", vec![leaf]);
        keep.materials.push(Override::Inherit);
        let keep = fixture.add(keep);
        let mut clear = component("clear", vec![leaf]);
        clear.materials.push(Override::None);
        let clear = fixture.add(clear);
        let mut root = component("root", vec![keep, clear]);
        root.materials.push(Override::Value(0));
        let root = fixture.add(root);

        let draws = fixture.graph(root).draw_calls();
        let materials: Vec<_> = draws.iter().map(|d| d.material.as_deref()).collect();
        assert_eq!(materials, [Some("red"), None]);
    }

    #[test]
    fn test_root_inherit_has_no_material() {
        let mut fixture = Fixture::new();
        let leaf = fixture.add(Node::leaf("quad", quad(), None));
        let mut root = component("root", vec![leaf]);
        root.materials.push(Override::Inherit);
        let root = fixture.add(root);

        let draws = fixture.graph(root).draw_calls();
        assert_eq!(draws[0].material, None);
        assert_eq!(draws[0].texture, None);
    }

    #[test]
    fn test_material_cycle_selects_slot() {
        let mut fixture = Fixture::new();
        let leaf = fixture.add(Node::leaf("quad", quad(), None));
        let mut root = component("root", vec![leaf]);
        root.materials.extend([Override::Value(0), Override::Value(1)]);
        let root = fixture.add(root);

        let mut graph = fixture.graph(root);
        assert_eq!(graph.draw_calls()[0].material.as_deref(), Some("red"));
        graph.cycle_materials();
        assert_eq!(graph.draw_calls()[0].material.as_deref(), Some("dark"));
        graph.cycle_materials();
        assert_eq!(graph.draw_calls()[0].material.as_deref(), Some("red"));
    }

    #[test]
    fn test_texture_tiling() {
        let mut fixture = Fixture::new();
        let leaf = fixture.add(Node::leaf("quad", quad(), None));
        let mut plain = component("plain", vec![leaf]);
        plain.texture.texture = Override::Value(0);
        let plain = fixture.add(plain);
        let mut tiled = component("tiled", vec![leaf]);
        tiled.texture.texture = Override::Value(0);
        tiled.texture.length_s = Some(8.0);
        let tiled = fixture.add(tiled);
        let mut bare = component("bare", vec![leaf]);
        bare.texture.texture = Override::None;
        let bare = fixture.add(bare);
        let mut root = component("root", vec![plain, tiled, bare]);
        root.texture.texture = Override::Value(0);
        root.texture.length_t = Some(5.0);
        let root = fixture.add(root);

        let draws = fixture.graph(root).draw_calls();
        assert_eq!(draws[0].tiling, Some(Tiling::new(2.0, 4.0)));
        assert_eq!(draws[1].tiling, Some(Tiling::new(8.0, 4.0)));
        assert_eq!(draws[2].texture, None);
    }

    #[test]
    fn test_inherited_texture_keeps_parent_tiling() {
        let mut fixture = Fixture::new();
        let leaf = fixture.add(Node::leaf("quad", quad(), None));
        let inner = fixture.add(component("inner", vec![leaf]));
        let mut root = component("root", vec![inner]);
        root.texture.texture = Override::Value(0);
        root.texture.length_s = Some(3.0);
        let root = fixture.add(root);

        let draws = fixture.graph(root).draw_calls();
        assert_eq!(draws[0].texture.as_deref(), Some("wood"));
        assert_eq!(draws[0].tiling, Some(Tiling::new(3.0, 4.0)));
    }

    #[test]
    fn test_self_cycle_terminates() {
        let mut fixture = Fixture::new();
        let leaf = fixture.add(Node::leaf("quad", quad(), None));
        let root = fixture.add(component("root", vec![leaf, NodeKey(1)]));
        assert_eq!(root, NodeKey(1));

        let graph = fixture.graph(root);
        let mut draws = 0;
        let stats = graph.traverse(&mut |_: &DrawCall<'_>| draws += 1);
        assert_eq!(draws, 1);
        assert_eq!(stats.cycles_skipped, 1);
    }

    #[test]
    fn test_mutual_cycle_terminates() {
        let mut fixture = Fixture::new();
        let leaf = fixture.add(Node::leaf("quad", quad(), None));
        // a -> b -> a, both drawing the leaf.
        let a = fixture.add(component("a", vec![leaf, NodeKey(2)]));
        let b = fixture.add(component("b", vec![leaf, a]));
        assert_eq!(b, NodeKey(2));

        let stats = fixture.graph(a).traverse(&mut |_: &DrawCall<'_>| {});
        assert_eq!(stats.draws, 2);
        assert_eq!(stats.cycles_skipped, 1);
    }

    #[test]
    fn test_shared_child_visited_per_parent() {
        let mut fixture = Fixture::new();
        let leaf = fixture.add(Node::leaf("quad", quad(), None));
        let mut left = component("left", vec![leaf]);
        left.transform = Mat4::from_translation(-Vec3::X);
        let left = fixture.add(left);
        let mut right = component("right", vec![leaf]);
        right.transform = Mat4::from_translation(Vec3::X);
        let right = fixture.add(right);
        let root = fixture.add(component("root", vec![left, right]));

        let graph = fixture.graph(root);
        let mut keys = Vec::new();
        let stats = graph.traverse(&mut |call: &DrawCall<'_>| keys.push((call.key, call.transform.w_axis.x)));
        assert_eq!(keys, [(leaf, -1.0), (leaf, 1.0)]);
        assert_eq!(stats.visits, 5);
        assert_eq!(stats.cycles_skipped, 0);
    }

    #[test]
    fn test_depth_limit() {
        let mut fixture = Fixture::new();
        let leaf = fixture.add(Node::leaf("quad", quad(), None));
        let mut below = leaf;
        for level in 0..10 {
            below = fixture.add(component(&format!("level{level}"), vec![below]));
        }
        let mut graph = fixture.graph(below);
        assert_eq!(graph.traverse(&mut |_: &DrawCall<'_>| {}).draws, 1);

        graph.max_depth = 5;
        let stats = graph.traverse(&mut |_: &DrawCall<'_>| {});
        assert_eq!(stats.draws, 0);
        assert_eq!(stats.depth_cuts, 1);
    }

    #[test]
    fn test_missing_child_is_counted() {
        let mut fixture = Fixture::new();
        let root = fixture.add(component("root", vec![NodeKey(42)]));
        let stats = fixture.graph(root).traverse(&mut |_: &DrawCall<'_>| {});
        assert_eq!(stats.missing, 1);
        assert_eq!(stats.visits, 1);
    }
}

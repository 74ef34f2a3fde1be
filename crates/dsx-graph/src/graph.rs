//! The node arena.

use std::fmt;

use dsx_core::{advance_chain, AnimationState, Material, Override, SymbolTable, Texture};
use dsx_shapes::Shape;
use glam::Mat4;
use smallvec::SmallVec;

/// Index of a node in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub usize);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index into the material table.
pub type MaterialKey = usize;
/// Index into the texture table.
pub type TextureKey = usize;

/// A node's texture slot with optional tiling overrides.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextureSpec {
    pub texture: Override<TextureKey>,
    pub length_s: Option<f32>,
    pub length_t: Option<f32>,
}

/// A component or a primitive leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    /// Leaf shape; `None` for components.
    pub shape: Option<Shape>,
    pub transform: Mat4,
    /// Cycled by the scene-wide material counter. Empty means inherit.
    pub materials: SmallVec<[Override<MaterialKey>; 2]>,
    pub texture: TextureSpec,
    /// Played in sequence; each node owns its own playback state.
    pub animations: Vec<AnimationState>,
    pub children: Vec<NodeKey>,
    pub line: Option<usize>,
}

impl Node {
    /// A primitive leaf. Leaves inherit everything from their parent.
    pub fn leaf(id: impl Into<String>, shape: Shape, line: Option<usize>) -> Self {
        Self {
            shape: Some(shape),
            ..Self::placeholder(id, line)
        }
    }

    /// An unresolved component: no children, identity transform, inherits everything.
    pub fn placeholder(id: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            id: id.into(),
            shape: None,
            transform: Mat4::IDENTITY,
            materials: SmallVec::new(),
            texture: TextureSpec::default(),
            animations: Vec::new(),
            children: Vec::new(),
            line,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.shape.is_some()
    }

    /// Neither children nor a shape: renders nothing.
    pub fn is_empty(&self) -> bool {
        self.shape.is_none() && self.children.is_empty()
    }
}

/// A resolved scene graph.
///
/// Child links are keys into the arena, so a node referenced by several
/// parents is stored once. Nothing prevents a cycle; traversal bounds it.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub(crate) nodes: SymbolTable<Node>,
    pub(crate) root: NodeKey,
    pub(crate) materials: SymbolTable<Material>,
    pub(crate) textures: SymbolTable<Texture>,
    pub(crate) material_cycle: usize,
    pub(crate) max_depth: usize,
}

impl SceneGraph {
    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get_index(key.0).map(|(_, node)| node)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_index_mut(key.0).map(|(_, node)| node)
    }

    pub fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.nodes.index_of(id).map(NodeKey)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter().enumerate().map(|(i, (_, node))| (NodeKey(i), node))
    }

    pub fn materials(&self) -> &SymbolTable<Material> {
        &self.materials
    }

    pub fn textures(&self) -> &SymbolTable<Texture> {
        &self.textures
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Current value of the material counter.
    pub fn material_cycle(&self) -> usize {
        self.material_cycle
    }

    /// Advance every node to its next material.
    pub fn cycle_materials(&mut self) {
        self.material_cycle = self.material_cycle.wrapping_add(1);
    }

    /// Advance all animation clocks by `delta_ms`.
    pub fn update(&mut self, delta_ms: f32) {
        for (_, node) in self.nodes.iter_mut() {
            if !node.animations.is_empty() {
                advance_chain(&mut node.animations, delta_ms);
            }
        }
    }

    /// Rewind every animation to its start.
    pub fn reset_animations(&mut self) {
        for (_, node) in self.nodes.iter_mut() {
            node.animations.iter_mut().for_each(AnimationState::reset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsx_core::Animation;
    use glam::Vec3;

    fn graph_with(nodes: Vec<Node>) -> SceneGraph {
        let mut table = SymbolTable::new("node");
        let mut diagnostics = dsx_core::Diagnostics::new();
        for node in nodes {
            let id = node.id.clone();
            table.declare(&id, node, Default::default(), &mut diagnostics, None);
        }
        SceneGraph {
            nodes: table,
            root: NodeKey(0),
            materials: SymbolTable::new("material"),
            textures: SymbolTable::new("texture"),
            material_cycle: 0,
            max_depth: 64,
        }
    }

    #[test]
    fn test_lookup_by_id_and_key() {
        let shape = Shape::Sphere { radius: 1.0, slices: 8, stacks: 4 };
        let graph = graph_with(vec![Node::placeholder("root", None), Node::leaf("ball", shape, Some(3))]);

        let key = graph.key_of("ball").unwrap();
        assert_eq!(key, NodeKey(1));
        assert!(graph.node(key).unwrap().is_leaf());
        assert!(graph.get("root").unwrap().is_empty());
        assert!(graph.node(NodeKey(9)).is_none());
        assert_eq!(graph.nodes().count(), 2);
    }

    #[test]
    fn test_update_advances_each_node() {
        let animation = Animation::linear(1000.0, vec![Vec3::ZERO, Vec3::X]).unwrap();
        let mut a = Node::placeholder("a", None);
        a.animations.push(AnimationState::new(animation.clone()));
        let mut b = Node::placeholder("b", None);
        b.animations.push(AnimationState::new(animation));

        let mut graph = graph_with(vec![a, b]);
        graph.update(250.0);
        graph.node_mut(NodeKey(1)).unwrap().animations[0].advance(500.0);

        assert_eq!(graph.get("a").unwrap().animations[0].elapsed_ms, 250.0);
        assert_eq!(graph.get("b").unwrap().animations[0].elapsed_ms, 750.0);

        graph.reset_animations();
        assert_eq!(graph.get("b").unwrap().animations[0].elapsed_ms, 0.0);
    }

    #[test]
    fn test_material_cycle_wraps() {
        let mut graph = graph_with(vec![Node::placeholder("root", None)]);
        graph.material_cycle = usize::MAX;
        graph.cycle_materials();
        assert_eq!(graph.material_cycle(), 0);
    }
}

//! Two-pass graph construction.
//!
//! Pass one declares every primitive as a leaf and every component as an
//! empty placeholder, so children may be referenced before they are written.
//! Pass two resolves each component's references against the symbol tables
//! and the node arena. A component that fails to resolve stays an empty
//! placeholder and the failure is recorded as an element error.

use dsx_core::{
    AnimationState, DiagnosticKind, Diagnostics, DuplicatePolicy, ElementError, LoadError, LoadOptions, Override,
    SymbolTable,
};
use dsx_parser::{ChildRef, ComponentBody, ComponentDecl, ParsedDocument, TextureRef, TransformStep};
use dsx_shapes::Shape;
use glam::Mat4;
use smallvec::SmallVec;

use crate::graph::{MaterialKey, Node, NodeKey, SceneGraph, TextureSpec};

/// A component's resolved fields, applied to its placeholder only once
/// every reference has resolved.
struct Resolved {
    transform: Mat4,
    materials: SmallVec<[Override<MaterialKey>; 2]>,
    texture: TextureSpec,
    animations: Vec<AnimationState>,
    children: Vec<PendingChild>,
}

enum PendingChild {
    Existing(NodeKey),
    Inline { shape: Shape, line: usize },
}

/// Build the scene graph from a parsed document.
///
/// Fails only if the scene root is not a declared node.
pub fn build_graph(
    doc: &ParsedDocument,
    options: &LoadOptions,
    diagnostics: &mut Diagnostics,
) -> Result<SceneGraph, LoadError> {
    let mut builder = GraphBuilder {
        doc,
        options,
        diagnostics,
        nodes: SymbolTable::new("node"),
    };

    let owners = builder.declare_nodes();
    builder.resolve_components(&owners);

    let root = builder
        .nodes
        .index_of(&doc.scene.root)
        .map(NodeKey)
        .ok_or_else(|| LoadError::MissingRoot {
            id: doc.scene.root.clone(),
        })?;

    log::debug!("graph built with {} nodes, root '{}'", builder.nodes.len(), doc.scene.root);

    Ok(SceneGraph {
        nodes: builder.nodes,
        root,
        materials: doc.materials.clone(),
        textures: doc.textures.clone(),
        material_cycle: 0,
        max_depth: options.max_depth,
    })
}

struct GraphBuilder<'a> {
    doc: &'a ParsedDocument,
    options: &'a LoadOptions,
    diagnostics: &'a mut Diagnostics,
    nodes: SymbolTable<Node>,
}

impl GraphBuilder<'_> {
    /// Pass one. Returns, per component declaration, the key it owns, or
    /// `None` if it was rejected or superseded by a later duplicate.
    fn declare_nodes(&mut self) -> Vec<Option<NodeKey>> {
        let doc = self.doc;
        let policy = self.options.duplicate_ids;
        // Which component declaration currently owns each node slot.
        let mut slot_owner: Vec<Option<usize>> = Vec::new();

        for primitive in &doc.primitives {
            let node = Node::leaf(primitive.id.clone(), primitive.shape.clone(), Some(primitive.line));
            if let Some(key) = self.declare(&primitive.id, node, policy, primitive.line) {
                set_owner(&mut slot_owner, key, None);
            }
        }

        for (index, component) in doc.components.iter().enumerate() {
            let node = Node::placeholder(component.id.clone(), Some(component.line));
            if let Some(key) = self.declare(&component.id, node, policy, component.line) {
                set_owner(&mut slot_owner, key, Some(index));
            }
        }

        let mut owners = vec![None; doc.components.len()];
        for (slot, owner) in slot_owner.iter().enumerate() {
            if let Some(index) = owner {
                owners[*index] = Some(NodeKey(slot));
            }
        }
        owners
    }

    fn declare(&mut self, id: &str, node: Node, policy: DuplicatePolicy, line: usize) -> Option<NodeKey> {
        let key = self.nodes.declare(id, node, policy, self.diagnostics, Some(line))?;
        self.nodes.index_of(&key).map(NodeKey)
    }

    /// Pass two.
    fn resolve_components(&mut self, owners: &[Option<NodeKey>]) {
        let doc = self.doc;
        let mut failed = 0;
        let mut attempted = 0;

        for (component, owner) in doc.components.iter().zip(owners) {
            let Some(key) = *owner else {
                continue;
            };
            attempted += 1;
            let location = format!("components > component '{}'", component.id);

            match self.resolve(component, &location) {
                Ok(resolved) => {
                    self.apply(key, component, resolved);
                    if self.nodes.get_index(key.0).is_some_and(|(_, node)| node.is_empty()) {
                        self.diagnostics.report(
                            DiagnosticKind::EmptyComponent,
                            location,
                            Some(component.line),
                            "component has no children and renders nothing",
                        );
                    }
                }
                Err(err) => {
                    failed += 1;
                    self.diagnostics.element(
                        location,
                        Some(component.line),
                        format!("{}; component left empty", err.message),
                    );
                }
            }
        }

        if failed > 0 {
            self.diagnostics.report(
                DiagnosticKind::Skipped,
                "components",
                None,
                format!("{failed} of {attempted} components could not be resolved"),
            );
        }
    }

    fn resolve(&mut self, component: &ComponentDecl, location: &str) -> Result<Resolved, ElementError> {
        let body: &ComponentBody = component.body.as_ref().map_err(Clone::clone)?;

        let transform = self.resolve_transform(&body.transform)?;

        let materials = body
            .materials
            .iter()
            .map(|reference| {
                Override::from_token(&reference.id, |id| {
                    self.doc
                        .materials
                        .index_of(id)
                        .ok_or_else(|| ElementError::unknown_reference("material", id))
                })
            })
            .collect::<Result<SmallVec<_>, _>>()?;

        let texture = match &body.texture {
            Some(texture) => self.resolve_texture(texture, location)?,
            None => TextureSpec::default(),
        };

        let animations = body
            .animations
            .iter()
            .map(|reference| {
                self.doc
                    .animations
                    .get(&reference.id)
                    .cloned()
                    .map(AnimationState::new)
                    .ok_or_else(|| ElementError::unknown_reference("animation", &reference.id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let children = body
            .children
            .iter()
            .map(|child| match child {
                ChildRef::Component(reference) | ChildRef::Primitive(reference) => self
                    .nodes
                    .index_of(&reference.id)
                    .map(|index| PendingChild::Existing(NodeKey(index)))
                    .ok_or_else(|| ElementError::unknown_reference("child node", &reference.id)),
                ChildRef::Shape { shape, line } => Ok(PendingChild::Inline {
                    shape: shape.clone(),
                    line: *line,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Resolved {
            transform,
            materials,
            texture,
            animations,
            children,
        })
    }

    /// Inline ops and named transformations, composed in document order.
    fn resolve_transform(&self, steps: &[TransformStep]) -> Result<Mat4, ElementError> {
        steps.iter().try_fold(Mat4::IDENTITY, |matrix, step| match step {
            TransformStep::Op(op) => Ok(matrix * op.matrix()),
            TransformStep::Named(reference) => self
                .doc
                .transformations
                .get(&reference.id)
                .map(|named| matrix * named.matrix)
                .ok_or_else(|| ElementError::unknown_reference("transformation", &reference.id)),
        })
    }

    fn resolve_texture(&mut self, texture: &TextureRef, location: &str) -> Result<TextureSpec, ElementError> {
        let slot = Override::from_token(&texture.id, |id| {
            self.doc
                .textures
                .index_of(id)
                .ok_or_else(|| ElementError::unknown_reference("texture", id))
        })?;

        let has_lengths = texture.length_s.is_some() || texture.length_t.is_some();
        if has_lengths && !matches!(slot, Override::Value(_)) {
            self.diagnostics.field(
                location.to_string(),
                Some(texture.line),
                format!("length_s/length_t have no effect on texture '{}'; ignored", texture.id),
            );
            return Ok(TextureSpec {
                texture: slot,
                ..TextureSpec::default()
            });
        }

        Ok(TextureSpec {
            texture: slot,
            length_s: texture.length_s,
            length_t: texture.length_t,
        })
    }

    fn apply(&mut self, key: NodeKey, component: &ComponentDecl, resolved: Resolved) {
        let mut children = Vec::with_capacity(resolved.children.len());
        let mut inline_count = 0;

        for child in resolved.children {
            match child {
                PendingChild::Existing(child_key) => children.push(child_key),
                PendingChild::Inline { shape, line } => {
                    inline_count += 1;
                    let id = format!("{}/{}", component.id, inline_count);
                    let node = Node::leaf(id.clone(), shape, Some(line));
                    if let Some(child_key) = self.declare(&id, node, DuplicatePolicy::Rename, line) {
                        children.push(child_key);
                    }
                }
            }
        }

        if let Some((_, node)) = self.nodes.get_index_mut(key.0) {
            node.transform = resolved.transform;
            node.materials = resolved.materials;
            node.texture = resolved.texture;
            node.animations = resolved.animations;
            node.children = children;
        }
    }
}

fn set_owner(owners: &mut Vec<Option<usize>>, key: NodeKey, owner: Option<usize>) {
    if owners.len() <= key.0 {
        owners.resize(key.0 + 1, None);
    }
    owners[key.0] = owner;
}

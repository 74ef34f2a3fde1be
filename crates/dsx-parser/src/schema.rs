//! The fixed document schema: section names and their canonical order.

use dsx_core::{DiagnosticKind, Diagnostics};

/// Tag of the document root.
pub const ROOT_TAG: &str = "dsx";

/// A top-level section of a DSX document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Scene,
    Views,
    Illumination,
    Lights,
    Textures,
    Materials,
    Transformations,
    Animations,
    Primitives,
    Components,
}

impl Section {
    /// Every section, in canonical order.
    pub const ALL: [Section; 10] = [
        Section::Scene,
        Section::Views,
        Section::Illumination,
        Section::Lights,
        Section::Textures,
        Section::Materials,
        Section::Transformations,
        Section::Animations,
        Section::Primitives,
        Section::Components,
    ];

    pub fn from_tag(tag: &str) -> Option<Section> {
        match tag {
            "scene" => Some(Section::Scene),
            "views" => Some(Section::Views),
            "illumination" | "ambient" => Some(Section::Illumination),
            "lights" => Some(Section::Lights),
            "textures" => Some(Section::Textures),
            "materials" => Some(Section::Materials),
            "transformations" => Some(Section::Transformations),
            "animations" => Some(Section::Animations),
            "primitives" => Some(Section::Primitives),
            "components" => Some(Section::Components),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Section::Scene => "scene",
            Section::Views => "views",
            Section::Illumination => "illumination",
            Section::Lights => "lights",
            Section::Textures => "textures",
            Section::Materials => "materials",
            Section::Transformations => "transformations",
            Section::Animations => "animations",
            Section::Primitives => "primitives",
            Section::Components => "components",
        }
    }

    /// Position in the canonical order.
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Only `animations` may be left out.
    pub fn is_required(self) -> bool {
        self != Section::Animations
    }
}

/// A child block of `<component>`, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentPart {
    Transformation,
    Animations,
    Materials,
    Texture,
    Children,
}

impl ComponentPart {
    pub fn from_tag(tag: &str) -> Option<ComponentPart> {
        match tag {
            "transformation" => Some(ComponentPart::Transformation),
            "animations" | "animation" => Some(ComponentPart::Animations),
            "materials" => Some(ComponentPart::Materials),
            "texture" => Some(ComponentPart::Texture),
            "children" => Some(ComponentPart::Children),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ComponentPart::Transformation => "transformation",
            ComponentPart::Animations => "animations",
            ComponentPart::Materials => "materials",
            ComponentPart::Texture => "texture",
            ComponentPart::Children => "children",
        }
    }
}

/// Tracks the furthest canonical slot seen so far and notes anything that
/// appears after a later slot.
#[derive(Debug)]
pub struct OrderTracker<T> {
    furthest: Option<T>,
}

impl<T: Copy + Ord> OrderTracker<T> {
    pub fn new() -> Self {
        Self { furthest: None }
    }

    /// Record `item`; returns the later item it was found after, if out of order.
    pub fn observe(&mut self, item: T) -> Option<T> {
        match self.furthest {
            Some(furthest) if item < furthest => Some(furthest),
            _ => {
                self.furthest = Some(item);
                None
            }
        }
    }
}

/// Emit an ordering note for `tag` found after `after`.
pub fn note_out_of_order(
    diagnostics: &mut Diagnostics,
    location: impl Into<String>,
    line: usize,
    tag: &str,
    after: &str,
) {
    diagnostics.report(
        DiagnosticKind::Ordering,
        location,
        Some(line),
        format!("<{tag}> should appear before <{after}>"),
    );
}

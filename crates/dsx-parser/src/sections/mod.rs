//! One parser per top-level section.
//!
//! Every parser follows the same recovery rules: an element without an id,
//! or with a value that cannot be repaired, is skipped with an error and
//! counted; defaults are substituted with a warning; unknown tags are skipped
//! with a warning. Each section ends with a summary when anything was skipped.

mod animations;
mod components;
mod illumination;
mod lights;
mod materials;
mod primitives;
mod scene;
mod textures;
mod transformations;
mod views;

pub use animations::parse_animations;
pub use components::{parse_components, ChildRef, ComponentBody, ComponentDecl, Reference, TextureRef, TransformStep};
pub use illumination::parse_illumination;
pub use lights::parse_lights;
pub use materials::parse_materials;
pub use primitives::{is_shape_tag, parse_primitives, parse_shape, PrimitiveDecl};
pub use scene::parse_scene;
pub use textures::parse_textures;
pub use transformations::{is_op_tag, parse_op, parse_transformations};
pub use views::{parse_views, resolve_default_view};

use dsx_core::{DiagnosticKind, Diagnostics, DuplicatePolicy, ElementError, SymbolTable};

use crate::attributes::get_string;
use crate::xml::Element;

/// An id-carrying child of a section.
pub(crate) struct Entry<'a> {
    pub element: &'a Element,
    pub id: &'a str,
    pub location: String,
}

/// Visit every child of `section` tagged with one of `tags`.
///
/// `handle` returns whether the entry was kept; the skip summary counts the rest.
pub(crate) fn each_entry(
    section: &Element,
    tags: &[&str],
    diagnostics: &mut Diagnostics,
    mut handle: impl FnMut(Entry<'_>, &mut Diagnostics) -> bool,
) {
    let mut total = 0;
    let mut skipped = 0;

    for child in &section.children {
        if !tags.contains(&child.name.as_str()) {
            unknown_tag(diagnostics, &section.name, child);
            continue;
        }
        total += 1;

        let id = get_string(child, "id").map(str::trim).filter(|id| !id.is_empty());
        let Some(id) = id else {
            diagnostics.element(
                format!("{} > {}", section.name, child.name),
                Some(child.line),
                "missing required attribute 'id'; element skipped",
            );
            skipped += 1;
            continue;
        };

        let entry = Entry {
            element: child,
            id,
            location: format!("{} > {} '{}'", section.name, child.name, id),
        };
        if !handle(entry, diagnostics) {
            skipped += 1;
        }
    }

    if skipped > 0 {
        diagnostics.report(
            DiagnosticKind::Skipped,
            section.name.clone(),
            Some(section.line),
            format!("{skipped} of {total} elements skipped"),
        );
    }
}

/// Declare a parsed entry, or record why it could not be parsed.
pub(crate) fn declare<T>(
    table: &mut SymbolTable<T>,
    entry: &Entry<'_>,
    parsed: Result<T, ElementError>,
    policy: DuplicatePolicy,
    diagnostics: &mut Diagnostics,
) -> bool {
    match parsed {
        Ok(value) => table
            .declare(entry.id, value, policy, diagnostics, Some(entry.element.line))
            .is_some(),
        Err(err) => {
            diagnostics.element(entry.location.clone(), Some(entry.element.line), err.message);
            false
        }
    }
}

/// Warn about a child tag that has no meaning in its parent.
pub(crate) fn unknown_tag(diagnostics: &mut Diagnostics, location: &str, child: &Element) {
    diagnostics.report(
        DiagnosticKind::UnknownTag,
        location.to_string(),
        Some(child.line),
        format!("unknown tag <{}> skipped", child.name),
    );
}

/// Warn about every child of `element` not named in `allowed`.
pub(crate) fn check_children(element: &Element, allowed: &[&str], location: &str, diagnostics: &mut Diagnostics) {
    for child in &element.children {
        if !allowed.contains(&child.name.as_str()) {
            unknown_tag(diagnostics, location, child);
        }
    }
}

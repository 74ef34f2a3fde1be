//! DSX document parser.
//!
//! Reads the XML text, checks the section layout against the schema and runs
//! one parser per section. The result holds every symbol table plus the raw
//! primitive and component declarations; resolving components into a graph is
//! left to `dsx-graph`.

pub mod attributes;
pub mod schema;
pub mod sections;
pub mod xml;

use dsx_core::{
    Animation, DiagnosticKind, Diagnostics, Illumination, Light, LoadError, LoadOptions, Material, SceneInfo,
    SymbolTable, Texture, Transformation, View,
};

pub use sections::{ChildRef, ComponentBody, ComponentDecl, PrimitiveDecl, Reference, TextureRef, TransformStep};
pub use xml::Element;

use schema::{note_out_of_order, OrderTracker, Section, ROOT_TAG};

/// Everything read from one document, before graph construction.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub scene: SceneInfo,
    pub views: SymbolTable<View>,
    pub default_view: Option<String>,
    pub illumination: Illumination,
    pub lights: SymbolTable<Light>,
    pub textures: SymbolTable<Texture>,
    pub materials: SymbolTable<Material>,
    pub transformations: SymbolTable<Transformation>,
    pub animations: SymbolTable<Animation>,
    pub primitives: Vec<PrimitiveDecl>,
    pub components: Vec<ComponentDecl>,
    pub diagnostics: Diagnostics,
}

/// Parse a DSX document.
///
/// Fails on malformed XML, a root other than `<dsx>`, a missing required
/// section or a missing scene root id. Everything else is recorded in the
/// returned diagnostics.
pub fn parse_document(source: &str, options: &LoadOptions) -> Result<ParsedDocument, LoadError> {
    let root = xml::parse(source)?;
    if root.name != ROOT_TAG {
        return Err(LoadError::UnexpectedRoot { found: root.name });
    }

    let mut diagnostics = Diagnostics::new();
    let found = collect_sections(&root, options, &mut diagnostics);

    for section in Section::ALL {
        if section.is_required() && !found.iter().any(|(s, _)| *s == section) {
            return Err(LoadError::MissingSection {
                section: section.tag(),
            });
        }
    }
    log::debug!("document has {} sections", found.len());

    let mut scene = None;
    let mut requested_view = None;
    let mut views_line = None;
    let mut illumination = Illumination::default();
    let mut views = SymbolTable::new("view");
    let mut lights = SymbolTable::new("light");
    let mut textures = SymbolTable::new("texture");
    let mut materials = SymbolTable::new("material");
    let mut transformations = SymbolTable::new("transformation");
    let mut animations = SymbolTable::new("animation");
    let mut primitives = Vec::new();
    let mut components = Vec::new();

    for (section, element) in found {
        match section {
            Section::Scene => scene = Some(sections::parse_scene(element, &mut diagnostics)?),
            Section::Views => {
                views_line = Some(element.line);
                if let Some(id) = sections::parse_views(element, &mut views, options, &mut diagnostics) {
                    requested_view = Some(id);
                }
            }
            Section::Illumination => illumination = sections::parse_illumination(element, &mut diagnostics),
            Section::Lights => sections::parse_lights(element, &mut lights, options, &mut diagnostics),
            Section::Textures => sections::parse_textures(element, &mut textures, options, &mut diagnostics),
            Section::Materials => sections::parse_materials(element, &mut materials, options, &mut diagnostics),
            Section::Transformations => {
                sections::parse_transformations(element, &mut transformations, options, &mut diagnostics)
            }
            Section::Animations => sections::parse_animations(element, &mut animations, options, &mut diagnostics),
            Section::Primitives => primitives.extend(sections::parse_primitives(element, &mut diagnostics)),
            Section::Components => {
                components.extend(sections::parse_components(element, options, &mut diagnostics))
            }
        }
    }

    let scene = scene.ok_or(LoadError::MissingSection { section: "scene" })?;
    let default_view = sections::resolve_default_view(requested_view.as_deref(), &views, views_line, &mut diagnostics);

    log::debug!(
        "parsed {} views, {} lights, {} textures, {} materials, {} transformations, {} animations, {} primitives, {} components",
        views.len(),
        lights.len(),
        textures.len(),
        materials.len(),
        transformations.len(),
        animations.len(),
        primitives.len(),
        components.len()
    );

    Ok(ParsedDocument {
        scene,
        views,
        default_view,
        illumination,
        lights,
        textures,
        materials,
        transformations,
        animations,
        primitives,
        components,
        diagnostics,
    })
}

/// Sort the root's children into known sections, in document order.
fn collect_sections<'a>(
    root: &'a Element,
    options: &LoadOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<(Section, &'a Element)> {
    let mut found: Vec<(Section, &Element)> = Vec::new();
    let mut order = OrderTracker::new();

    for child in &root.children {
        let Some(section) = Section::from_tag(&child.name) else {
            sections::unknown_tag(diagnostics, ROOT_TAG, child);
            continue;
        };
        if let Some(after) = order.observe(section) {
            if options.ordering_warnings {
                note_out_of_order(diagnostics, ROOT_TAG, child.line, section.tag(), after.tag());
            }
        }
        if found.iter().any(|(s, _)| *s == section) {
            diagnostics.report(
                DiagnosticKind::DuplicateId,
                ROOT_TAG,
                Some(child.line),
                format!("section <{}> appears more than once; entries are merged", child.name),
            );
        }
        found.push((section, child));
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
<dsx>
    <scene root="root" axis_length="2"/>
    <views default="cam">
        <perspective id="cam" near="0.1" far="100" angle="45">
            <from x="10" y="10" z="10"/>
            <to x="0" y="0" z="0"/>
        </perspective>
    </views>
    <illumination doublesided="0" local="1">
        <ambient r="0.1" g="0.1" b="0.1" a="1"/>
        <background r="0" g="0" b="0" a="1"/>
    </illumination>
    <lights>
        <omni id="sun" enabled="1">
            <location x="0" y="10" z="0" w="1"/>
            <ambient r="0" g="0" b="0" a="1"/>
            <diffuse r="1" g="1" b="1" a="1"/>
            <specular r="1" g="1" b="1" a="1"/>
        </omni>
    </lights>
    <textures/>
    <materials/>
    <transformations/>
    <primitives>
        <primitive id="quad"><rectangle x1="0" y1="0" x2="1" y2="1"/></primitive>
    </primitives>
    <components>
        <component id="root">
            <children><primitiveref id="quad"/></children>
        </component>
    </components>
</dsx>"#;

    #[test]
    fn test_minimal_document() {
        let doc = parse_document(MINIMAL, &LoadOptions::default()).unwrap();
        assert_eq!(doc.scene.root, "root");
        assert_eq!(doc.default_view.as_deref(), Some("cam"));
        assert_eq!(doc.lights.len(), 1);
        assert_eq!(doc.primitives.len(), 1);
        assert_eq!(doc.components.len(), 1);
        assert!(doc.animations.is_empty());
        assert!(doc.diagnostics.is_empty(), "{:?}", doc.diagnostics);
    }

    #[test]
    fn test_missing_section_is_fatal() {
        let source = MINIMAL.replace("<textures/>", "");
        let err = parse_document(&source, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingSection { section: "textures" }));
    }

    #[test]
    fn test_wrong_root() {
        let err = parse_document("<scene/>", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnexpectedRoot { ref found } if found == "scene"));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_document("<dsx><scene></dsx>", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Xml(_)));
    }

    #[test]
    fn test_sections_in_any_order() {
        let source = MINIMAL.replace("<textures/>", "").replace("<components>", "<textures/>\n<components>");
        let doc = parse_document(&source, &LoadOptions::default()).unwrap();
        assert_eq!(doc.diagnostics.count(DiagnosticKind::Ordering), 1);
        assert!(doc.diagnostics.is_clean());
    }

    #[test]
    fn test_duplicate_sections_merge() {
        let source = MINIMAL.replace(
            "<materials/>",
            r#"<materials/><materials><material id="m" shininess="5">
                <emission r="0" g="0" b="0" a="1"/><ambient r="0" g="0" b="0" a="1"/>
                <diffuse r="0" g="0" b="0" a="1"/><specular r="0" g="0" b="0" a="1"/>
            </material></materials>"#,
        );
        let doc = parse_document(&source, &LoadOptions::default()).unwrap();
        assert_eq!(doc.materials.len(), 1);
        assert_eq!(doc.diagnostics.count(DiagnosticKind::DuplicateId), 1);
    }

    #[test]
    fn test_ambient_alias() {
        let source = MINIMAL.replace("<illumination", "<ambient").replace("</illumination>", "</ambient>");
        let doc = parse_document(&source, &LoadOptions::default()).unwrap();
        assert!(doc.illumination.local);
        assert!(doc.diagnostics.is_empty());
    }
}

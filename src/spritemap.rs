//! Spritemap assembly.
//!
//! Turns an ordered list of [`Source`]s into one `<svg>` document holding a
//! `<symbol>`, `<use>` and/or `<view>` per sprite. Sprites are stacked
//! vertically: every sprite is preceded by one gutter, so with heights
//! `10, 20` and gutter `5` the `<use>` elements land at `y=5` and `y=20`.
//!
//! Bad sprites (empty, unparsable, no root element, no sizing) are skipped
//! with a [`Warning`] and take no space in the layout. Sprites that generate
//! no elements at all still take their space.
//!
//! The assembled [`Spritemap`] keeps each placed sprite together with its
//! generated `<symbol>` so stylesheet generation can work from memory. The
//! symbols also carry the `data-spritemap-*` bookkeeping attributes, so the
//! serialized document can be re-parsed into the same information
//! (see [`crate::styles::symbols_from_svg`]).

use crate::config::{GenerateConfig, SpritemapConfig};
use crate::naming::{SpriteNaming, parse_sprite_name};
use crate::svg::attributes::{
    SPRITE_LOCATION_ATTRIBUTE, SPRITE_NAME_ATTRIBUTE, TargetKind, attributes_for,
    namespace_declarations, transferable_attributes,
};
use crate::svg::geometry::{self, Geometry, format_number};
use crate::svg::{Element, Node, ParseError, SVG_NAMESPACE, XLINK_NAMESPACE, parse_document};
use crate::types::{Source, SpriteItem, Warning, WarningKind};
use crate::variables::{VARIABLES_NAMESPACE, add_variables_namespace, has_variables};
use std::collections::{BTreeMap, HashSet};

/// Resolved assembly options.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub naming: SpriteNaming,
    pub gutter: f64,
    pub generate: GenerateConfig,
    /// Set `width`/`height` on the root.
    pub sizes: bool,
    /// Custom root attributes, applied after everything else.
    pub attributes: BTreeMap<String, String>,
}

impl AssembleOptions {
    pub fn from_config(config: &SpritemapConfig, naming: SpriteNaming) -> Self {
        Self {
            naming,
            gutter: config.sprite.gutter,
            generate: config.sprite.generate.clone(),
            sizes: config.output.svg.sizes,
            attributes: config.output.svg.attributes.clone(),
        }
    }
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self::from_config(&SpritemapConfig::default(), SpriteNaming::default())
    }
}

/// One sprite that made it into the spritemap.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedSprite {
    pub item: SpriteItem,
    pub geometry: Geometry,
    /// Vertical offset in the stacked layout, leading gutter included.
    pub y: f64,
    /// The generated `<symbol>`, when symbol generation is on.
    pub symbol: Option<Element>,
}

/// The assembled document plus per-sprite provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Spritemap {
    pub root: Element,
    pub sprites: Vec<PlacedSprite>,
    /// Whether any placed sprite uses `var:` attributes.
    pub has_variables: bool,
}

impl Spritemap {
    /// Serialize the document, bookkeeping attributes and `var:` syntax included.
    pub fn to_svg_string(&self) -> String {
        self.root.to_xml_string()
    }

    /// The placed sprites that have a `<symbol>`, in source order.
    pub fn symbols(&self) -> impl Iterator<Item = (&PlacedSprite, &Element)> {
        self.sprites
            .iter()
            .filter_map(|sprite| sprite.symbol.as_ref().map(|symbol| (sprite, symbol)))
    }
}

/// Running totals used to place the next sprite.
#[derive(Debug, Default)]
struct Layout {
    heights: f64,
    gutters: f64,
    max_width: f64,
}

impl Layout {
    fn next_y(&self, gutter: f64) -> f64 {
        self.heights + self.gutters + gutter
    }

    fn record(&mut self, geometry: &Geometry, gutter: f64) {
        self.heights += geometry.height;
        self.gutters += gutter;
        self.max_width = self.max_width.max(geometry.width);
    }
}

/// Assemble `sources` into a spritemap.
///
/// Returns `None` (and no warnings) when there are no sources at all.
pub fn assemble(
    sources: &[Source],
    options: &AssembleOptions,
) -> (Option<Spritemap>, Vec<Warning>) {
    let mut warnings = Vec::new();
    if sources.is_empty() {
        return (None, warnings);
    }

    let generate = &options.generate;
    let gutter = options.gutter;
    let mut layout = Layout::default();
    let mut children: Vec<Element> = Vec::new();
    let mut promoted: Vec<(String, String)> = Vec::new();
    let mut sprites: Vec<PlacedSprite> = Vec::new();
    let mut seen_identifiers: HashSet<String> = HashSet::new();
    let mut any_variables = false;

    for source in sources {
        let Some((item, root)) = prepare_sprite(source, &options.naming, &mut warnings) else {
            continue;
        };
        let geometry = match geometry::resolve(&root) {
            Ok(geometry) => geometry,
            Err(e) => {
                warnings.push(Warning::new(
                    WarningKind::InsufficientSizing,
                    format!("Sprite '{}' skipped: {e}", item.location),
                ));
                continue;
            }
        };

        if !seen_identifiers.insert(item.identifier.clone()) {
            warnings.push(Warning::new(
                WarningKind::DuplicateIdentifier,
                format!(
                    "Sprite '{}' produces identifier '{}' which is already in use",
                    item.location, item.identifier
                ),
            ));
        }
        any_variables |= has_variables(&[&item.content]);

        for (name, value) in namespace_declarations(&root) {
            match promoted.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => promoted.push((name.to_string(), value.to_string())),
            }
        }

        let transferable = transferable_attributes(&root);
        let y = layout.next_y(gutter);
        tracing::debug!(identifier = %item.identifier, y, "placing sprite");

        let mut symbol = None;
        if generate.symbol.is_enabled() {
            let element = build_symbol(&item, &geometry, &transferable, &root, options);
            children.push(element.clone());
            symbol = Some(element);
        }
        if generate.use_ {
            children.push(build_use(&item, &geometry, &transferable, y, options));
        }
        if generate.view.is_enabled() {
            children.push(build_view(&item, &geometry, &transferable, y, options));
        }

        layout.record(&geometry, gutter);
        sprites.push(PlacedSprite {
            item,
            geometry,
            y,
            symbol,
        });
    }

    let mut root = Element::new("svg");
    root.set_attribute("xmlns", SVG_NAMESPACE);
    if generate.use_ {
        root.set_attribute("xmlns:xlink", XLINK_NAMESPACE);
    }
    for (name, value) in promoted {
        root.set_attribute(name, value);
    }
    if any_variables {
        root.set_attribute("xmlns:var", VARIABLES_NAMESPACE);
    }
    if options.sizes {
        root.set_attribute("width", format_number(layout.max_width));
        root.set_attribute("height", format_number(layout.heights + layout.gutters));
    }
    for (name, value) in &options.attributes {
        root.set_attribute(name.as_str(), value.as_str());
    }
    root.children = children.into_iter().map(Node::Element).collect();

    let spritemap = Spritemap {
        root,
        sprites,
        has_variables: any_variables,
    };
    (Some(spritemap), warnings)
}

/// Name a source and parse it. Warns and returns `None` for sprites that
/// cannot be used.
fn prepare_sprite(
    source: &Source,
    naming: &SpriteNaming,
    warnings: &mut Vec<Warning>,
) -> Option<(SpriteItem, Element)> {
    let location = &source.location;
    if source.content.trim().is_empty() {
        warnings.push(Warning::new(
            WarningKind::EmptySource,
            format!("Sprite '{location}' has no content"),
        ));
        return None;
    }

    let sprite_name = parse_sprite_name(location);
    let identifier = naming.identifier(location, &sprite_name.title);
    let content = if has_variables(&[&source.content]) {
        add_variables_namespace(&source.content).into_owned()
    } else {
        source.content.clone()
    };

    let root = match parse_document(&content) {
        Ok(root) => root,
        Err(ParseError::NoRootElement) => {
            warnings.push(Warning::new(
                WarningKind::MissingRootElement,
                format!("Sprite '{location}' has no root element"),
            ));
            return None;
        }
        Err(ParseError::Malformed(reason)) => {
            warnings.push(Warning::new(
                WarningKind::UnparsableSource,
                format!("Sprite '{location}' could not be parsed: {reason}"),
            ));
            return None;
        }
    };

    let item = SpriteItem {
        location: location.clone(),
        identifier,
        name: sprite_name.name,
        title: sprite_name.title,
        content,
    };
    Some((item, root))
}

fn build_symbol(
    item: &SpriteItem,
    geometry: &Geometry,
    transferable: &[(String, String)],
    root: &Element,
    options: &AssembleOptions,
) -> Element {
    let mut symbol = Element::new("symbol");
    symbol.attributes = attributes_for(TargetKind::Symbol, transferable);
    symbol.set_attribute(SPRITE_NAME_ATTRIBUTE, item.name.as_str());
    symbol.set_attribute(SPRITE_LOCATION_ATTRIBUTE, item.location.as_str());
    symbol.set_attribute(
        "id",
        format!("{}{}", item.identifier, options.generate.symbol.postfix()),
    );
    symbol.set_attribute("viewBox", geometry.view_box_string());
    if options.generate.dimensions {
        symbol.set_attribute("width", format_number(geometry.width));
        symbol.set_attribute("height", format_number(geometry.height));
    }
    if options.generate.title && !root.has_child_element("title") {
        let mut title = Element::new("title");
        title.children.push(Node::Text(item.title.clone()));
        symbol.push_element(title);
    }
    symbol.children.extend(root.children.iter().cloned());
    symbol
}

fn build_use(
    item: &SpriteItem,
    geometry: &Geometry,
    transferable: &[(String, String)],
    y: f64,
    options: &AssembleOptions,
) -> Element {
    let mut element = Element::new("use");
    element.attributes = attributes_for(TargetKind::Use, transferable);
    element.set_attribute("x", "0");
    element.set_attribute("y", format_number(y));
    element.set_attribute("width", format_number(geometry.width));
    element.set_attribute("height", format_number(geometry.height));
    element.set_attribute(
        "xlink:href",
        format!("#{}{}", item.identifier, options.generate.symbol.postfix()),
    );
    element
}

fn build_view(
    item: &SpriteItem,
    geometry: &Geometry,
    transferable: &[(String, String)],
    y: f64,
    options: &AssembleOptions,
) -> Element {
    let half_gutter = options.gutter / 2.0;
    let mut element = Element::new("view");
    element.attributes = attributes_for(TargetKind::View, transferable);
    element.set_attribute(
        "id",
        format!("{}{}", item.identifier, options.generate.view.postfix()),
    );
    element.set_attribute(
        "viewBox",
        format!(
            "0 {} {} {}",
            format_number((y - half_gutter).max(0.0)),
            format_number(geometry.width + half_gutter),
            format_number(geometry.height + half_gutter)
        ),
    );
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Toggle;
    use crate::naming::{Idify, Prefix};
    use crate::test_helpers::{children_named, find_by_id, sized_svg, view_box_svg};

    fn options() -> AssembleOptions {
        AssembleOptions::default()
    }

    #[test]
    fn zero_sources_produce_nothing() {
        let (spritemap, warnings) = assemble(&[], &options());
        assert!(spritemap.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn symbol_carries_id_view_box_and_bookkeeping() {
        let sources = [Source::new("icons/star.svg", view_box_svg(24.0, 16.0, ""))];
        let (spritemap, warnings) = assemble(&sources, &options());
        assert!(warnings.is_empty());
        let spritemap = spritemap.unwrap();
        let symbols = children_named(&spritemap.root, "symbol");
        assert_eq!(symbols.len(), 1);
        let symbol = symbols[0];
        assert_eq!(symbol.attribute("id"), Some("sprite-star"));
        assert_eq!(symbol.attribute("viewBox"), Some("0 0 24 16"));
        assert_eq!(symbol.attribute(SPRITE_NAME_ATTRIBUTE), Some("star"));
        assert_eq!(symbol.attribute(SPRITE_LOCATION_ATTRIBUTE), Some("icons/star.svg"));
        assert!(symbol.attribute("width").is_none());
    }

    #[test]
    fn title_added_only_when_missing() {
        let sources = [
            Source::new("a.svg", view_box_svg(1.0, 1.0, "<path d=\"M0 0\"/>")),
            Source::new("b.svg", view_box_svg(1.0, 1.0, "<title>Authored</title>")),
        ];
        let (spritemap, _) = assemble(&sources, &options());
        let spritemap = spritemap.unwrap();
        let symbols = children_named(&spritemap.root, "symbol");

        let first_title = symbols[0].child_elements().next().unwrap();
        assert_eq!(first_title.name, "title");
        assert_eq!(first_title.text_content(), "a");

        let titles: Vec<_> = symbols[1]
            .child_elements()
            .filter(|e| e.name == "title")
            .collect();
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].text_content(), "Authored");
    }

    #[test]
    fn use_offsets_include_leading_gutter() {
        let mut opts = options();
        opts.gutter = 5.0;
        opts.generate.use_ = true;
        let sources = [
            Source::new("a.svg", sized_svg(10.0, 10.0)),
            Source::new("b.svg", sized_svg(10.0, 20.0)),
        ];
        let (spritemap, _) = assemble(&sources, &opts);
        let spritemap = spritemap.unwrap();
        let uses = children_named(&spritemap.root, "use");
        assert_eq!(uses[0].attribute("y"), Some("5"));
        assert_eq!(uses[1].attribute("y"), Some("20"));
        assert_eq!(uses[0].attribute("xlink:href"), Some("#sprite-a"));
        assert_eq!(spritemap.root.attribute("xmlns:xlink"), Some(XLINK_NAMESPACE));
    }

    #[test]
    fn view_box_pads_by_half_gutter() {
        let mut opts = options();
        opts.gutter = 4.0;
        opts.generate.view = Toggle::Postfix("-view".into());
        let sources = [
            Source::new("a.svg", sized_svg(10.0, 10.0)),
            Source::new("b.svg", sized_svg(8.0, 6.0)),
        ];
        let (spritemap, _) = assemble(&sources, &opts);
        let spritemap = spritemap.unwrap();
        let first = find_by_id(&spritemap.root, "sprite-a-view");
        assert_eq!(first.name, "view");
        // y=4: 4-2=2
        assert_eq!(first.attribute("viewBox"), Some("0 2 12 12"));
        // y=4+10+4=18
        let second = find_by_id(&spritemap.root, "sprite-b-view");
        assert_eq!(second.attribute("viewBox"), Some("0 16 10 8"));
    }

    #[test]
    fn view_y_clamped_at_zero() {
        let mut opts = options();
        opts.generate.view = Toggle::Flag(true);
        opts.generate.symbol = Toggle::Postfix("-symbol".into());
        let (spritemap, _) = assemble(&[Source::new("a.svg", sized_svg(3.0, 3.0))], &opts);
        let root = spritemap.unwrap().root;
        let views = children_named(&root, "view");
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].attribute("viewBox"), Some("0 0 3 3"));
        assert_eq!(views[0].attribute("id"), Some("sprite-a"));
        assert_eq!(find_by_id(&root, "sprite-a-symbol").name, "symbol");
    }

    #[test]
    fn unsized_sprite_is_dropped_with_one_warning() {
        let mut opts = options();
        opts.generate.use_ = true;
        opts.sizes = true;
        let sources = [
            Source::new("bad.svg", "<svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
            Source::new("good.svg", sized_svg(10.0, 10.0)),
        ];
        let (spritemap, warnings) = assemble(&sources, &opts);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::InsufficientSizing);
        let spritemap = spritemap.unwrap();
        assert_eq!(spritemap.sprites.len(), 1);
        assert_eq!(children_named(&spritemap.root, "use")[0].attribute("y"), Some("0"));
        assert_eq!(spritemap.root.attribute("height"), Some("10"));
    }

    #[test]
    fn per_sprite_failures_are_warnings() {
        let sources = [
            Source::new("empty.svg", "   \n"),
            Source::new("broken.svg", "<svg><g></svg>"),
            Source::new("nothing.svg", "<?xml version=\"1.0\"?>"),
        ];
        let (spritemap, warnings) = assemble(&sources, &options());
        let kinds: Vec<_> = warnings.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WarningKind::EmptySource,
                WarningKind::UnparsableSource,
                WarningKind::MissingRootElement
            ]
        );
        let spritemap = spritemap.unwrap();
        assert!(spritemap.sprites.is_empty());
        assert_eq!(spritemap.root.children.len(), 0);
    }

    #[test]
    fn custom_data_attribute_on_symbol_not_view() {
        let mut opts = options();
        opts.generate.symbol = Toggle::Postfix("-symbol".into());
        opts.generate.view = Toggle::Flag(true);
        let sources = [Source::new(
            "a.svg",
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1" data-custom="x"/>"#,
        )];
        let (spritemap, _) = assemble(&sources, &opts);
        let root = spritemap.unwrap().root;
        assert_eq!(children_named(&root, "symbol")[0].attribute("data-custom"), Some("x"));
        assert_eq!(children_named(&root, "view")[0].attribute("data-custom"), None);
    }

    #[test]
    fn root_sizes_and_custom_attributes() {
        let mut opts = options();
        opts.gutter = 2.0;
        opts.sizes = true;
        opts.attributes.insert("class".into(), "hidden".into());
        opts.attributes.insert("width".into(), "100".into());
        let sources = [
            Source::new("a.svg", sized_svg(10.0, 10.0)),
            Source::new("b.svg", sized_svg(30.0, 5.0)),
        ];
        let (spritemap, _) = assemble(&sources, &opts);
        let root = spritemap.unwrap().root;
        // Custom attributes win over generated sizing.
        assert_eq!(root.attribute("width"), Some("100"));
        assert_eq!(root.attribute("height"), Some("19"));
        assert_eq!(root.attribute("class"), Some("hidden"));
        assert!(root.attribute("xmlns:xlink").is_none());
    }

    #[test]
    fn no_generated_elements_still_advance_layout() {
        let mut opts = options();
        opts.generate.symbol = Toggle::Flag(false);
        opts.sizes = true;
        let sources = [
            Source::new("a.svg", sized_svg(10.0, 10.0)),
            Source::new("b.svg", sized_svg(10.0, 10.0)),
        ];
        let (spritemap, _) = assemble(&sources, &opts);
        let spritemap = spritemap.unwrap();
        assert!(spritemap.root.children.is_empty());
        assert_eq!(spritemap.sprites[1].y, 10.0);
        assert_eq!(spritemap.root.attribute("height"), Some("20"));
    }

    #[test]
    fn variables_namespace_injected_and_declared_on_root() {
        let sources = [Source::new(
            "a.svg",
            r#"<svg viewBox="0 0 1 1"><path var:color.fill="red" d="M0 0"/></svg>"#,
        )];
        let (spritemap, warnings) = assemble(&sources, &options());
        assert!(warnings.is_empty());
        let spritemap = spritemap.unwrap();
        assert!(spritemap.has_variables);
        assert_eq!(spritemap.root.attribute("xmlns:var"), Some(VARIABLES_NAMESPACE));
        assert!(spritemap.to_svg_string().contains(r#"var:color.fill="red""#));
    }

    #[test]
    fn namespace_declarations_promoted_to_root() {
        let sources = [Source::new(
            "a.svg",
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:sketch="urn:sketch" viewBox="0 0 1 1"><g sketch:type="x"/></svg>"#,
        )];
        let (spritemap, _) = assemble(&sources, &options());
        let root = spritemap.unwrap().root;
        assert_eq!(root.attribute("xmlns:sketch"), Some("urn:sketch"));
        let symbol = children_named(&root, "symbol")[0];
        assert!(symbol.attribute("xmlns:sketch").is_none());
    }

    #[test]
    fn source_children_are_copied_into_symbol() {
        let sources = [Source::new(
            "a.svg",
            view_box_svg(1.0, 1.0, r#"<path d="M0 0"/><circle r="1"/>"#),
        )];
        let mut opts = options();
        opts.generate.title = false;
        let (spritemap, _) = assemble(&sources, &opts);
        let spritemap = spritemap.unwrap();
        let (_, symbol) = spritemap.symbols().next().unwrap();
        let names: Vec<_> = symbol.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["path", "circle"]);
    }

    #[test]
    fn duplicate_identifiers_warned() {
        let sources = [
            Source::new("a/star.svg", sized_svg(1.0, 1.0)),
            Source::new("b/star.svg", sized_svg(1.0, 1.0)),
        ];
        let (_, warnings) = assemble(&sources, &options());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::DuplicateIdentifier);
    }

    #[test]
    fn naming_strategies_apply() {
        let mut opts = options();
        opts.naming = SpriteNaming::new(Prefix::Fixed("i-".into()), Idify::Sanitize);
        let (spritemap, _) = assemble(&[Source::new("x/arrow left.svg", sized_svg(1.0, 1.0))], &opts);
        let spritemap = spritemap.unwrap();
        assert_eq!(spritemap.sprites[0].item.identifier, "i-arrow-left");
        assert_eq!(spritemap.sprites[0].item.name, "arrow left");
    }

    #[test]
    fn dimensions_copied_when_enabled() {
        let mut opts = options();
        opts.generate.dimensions = true;
        let (spritemap, _) = assemble(&[Source::new("a.svg", view_box_svg(12.0, 8.0, ""))], &opts);
        let root = spritemap.unwrap().root;
        let symbol = children_named(&root, "symbol")[0];
        assert_eq!(symbol.attribute("width"), Some("12"));
        assert_eq!(symbol.attribute("height"), Some("8"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let sources = [
            Source::new("a.svg", sized_svg(1.0, 2.0)),
            Source::new("b.svg", view_box_svg(3.0, 4.0, "<path d=\"M0 0\"/>")),
        ];
        let first = assemble(&sources, &options()).0.unwrap().to_svg_string();
        let second = assemble(&sources, &options()).0.unwrap().to_svg_string();
        assert_eq!(first, second);
    }
}

//! Saving and restoring a window tree as XML.
//!
//! ```text
//! ROOT_NODE X Y WIDTH HEIGHT
//!   SPLIT_NODE ORIENTATION DIVIDER_LOCATION
//!     COMPONENT_NODE TOP_INFO
//!       COMPONENT_INFO OWNER NAME TITLE GROUP ACTIVE
//!   WINDOW_NODE X Y WIDTH HEIGHT
//! ```
//!
//! Transient placeholders are never written. Restored placeholders are inert
//! until providers claim them.

use horizon_dock_core::logging::targets;

use super::{NodeId, NodeKind, Orientation, WindowId, WindowTree};
use crate::error::{DockingError, Result};
use crate::geometry::{Rect, Size};
use crate::placeholder::Placeholder;
use crate::xml::XmlElement;

pub(crate) const ROOT_NODE: &str = "ROOT_NODE";
const SPLIT_NODE: &str = "SPLIT_NODE";
const COMPONENT_NODE: &str = "COMPONENT_NODE";
const COMPONENT_INFO: &str = "COMPONENT_INFO";
const WINDOW_NODE: &str = "WINDOW_NODE";

// ============================================================================
// Writing
// ============================================================================

/// The `ROOT_NODE` element for `tree`.
pub(crate) fn write_tree(tree: &WindowTree) -> XmlElement {
    let mut root = XmlElement::new(ROOT_NODE);
    write_bounds(&mut root, tree.window_bounds(WindowId::Main).unwrap_or_default());
    if let Some(element) = tree.window_child(WindowId::Main).and_then(|n| write_node(tree, n)) {
        root.add_child(element);
    }
    for window in tree.detached_windows() {
        let id = WindowId::Detached(window);
        let Some(element) = tree.window_child(id).and_then(|n| write_node(tree, n)) else {
            continue;
        };
        let mut node = XmlElement::new(WINDOW_NODE);
        write_bounds(&mut node, tree.window_bounds(id).unwrap_or_default());
        node.add_child(element);
        root.add_child(node);
    }
    root
}

fn write_bounds(element: &mut XmlElement, bounds: Rect) {
    element.set_attribute("X", bounds.x);
    element.set_attribute("Y", bounds.y);
    element.set_attribute("WIDTH", bounds.width);
    element.set_attribute("HEIGHT", bounds.height);
}

fn write_node(tree: &WindowTree, node: NodeId) -> Option<XmlElement> {
    match &tree.nodes.get(node)?.kind {
        NodeKind::Split(split) => {
            let first = write_node(tree, split.first);
            let second = write_node(tree, split.second);
            match (first, second) {
                (Some(first), Some(second)) => {
                    let mut element = XmlElement::new(SPLIT_NODE)
                        .with_attribute("ORIENTATION", split.orientation.as_str())
                        .with_attribute("DIVIDER_LOCATION", split.divider);
                    element.add_child(first);
                    element.add_child(second);
                    Some(element)
                }
                (one, other) => one.or(other),
            }
        }
        NodeKind::Component(component) => {
            let top_id = component.placeholders.get(component.top).copied();
            let mut element = XmlElement::new(COMPONENT_NODE);
            let mut top = 0;
            for &id in &component.placeholders {
                let Some(p) = tree.placeholders.get(id).filter(|p| !p.is_transient()) else {
                    continue;
                };
                if Some(id) == top_id {
                    top = element.children().len();
                }
                element.add_child(
                    XmlElement::new(COMPONENT_INFO)
                        .with_attribute("OWNER", p.owner())
                        .with_attribute("NAME", p.name())
                        .with_attribute("TITLE", p.title())
                        .with_attribute("GROUP", p.group())
                        .with_attribute("ACTIVE", p.is_showing()),
                );
            }
            if element.children().is_empty() {
                return None;
            }
            element.set_attribute("TOP_INFO", top);
            Some(element)
        }
        _ => None,
    }
}

// ============================================================================
// Reading
// ============================================================================

/// Build a tree from a `ROOT_NODE` element.
///
/// Missing bounds fall back to `default_bounds`.
pub(crate) fn read_tree(
    element: &XmlElement,
    title: &str,
    default_bounds: Rect,
    detached_size: Size,
) -> Result<WindowTree> {
    if element.name() != ROOT_NODE {
        return Err(DockingError::invalid_layout(format!(
            "expected <{ROOT_NODE}>, found <{}>",
            element.name()
        )));
    }
    let bounds = read_bounds(element, default_bounds)?;
    let mut tree = WindowTree::new(title, bounds, detached_size);

    let mut main_seen = false;
    for child in element.children() {
        if child.name() == WINDOW_NODE {
            let window = tree.insert_window(read_bounds(
                child,
                Rect::from_origin_size(bounds.origin(), detached_size),
            )?);
            let subtree = match child.children().first() {
                Some(first) => read_node(&mut tree, first)?,
                None => None,
            };
            tree.set_window_child(WindowId::Detached(window), subtree);
        } else if !main_seen {
            main_seen = true;
            let subtree = read_node(&mut tree, child)?;
            tree.set_window_child(WindowId::Main, subtree);
        } else {
            return Err(DockingError::invalid_layout(format!(
                "<{ROOT_NODE}> holds more than one layout, found extra <{}>",
                child.name()
            )));
        }
    }

    // Windows whose saved content was empty.
    tree.update();
    tree.validate()?;
    tracing::debug!(
        target: targets::PERSIST,
        placeholders = tree.placeholder_count(),
        windows = tree.detached_windows().len(),
        "window tree restored"
    );
    Ok(tree)
}

fn read_bounds(element: &XmlElement, default: Rect) -> Result<Rect> {
    Ok(Rect::new(
        element.parse_attribute_or("X", default.x)?,
        element.parse_attribute_or("Y", default.y)?,
        element.parse_attribute_or("WIDTH", default.width)?,
        element.parse_attribute_or("HEIGHT", default.height)?,
    ))
}

fn read_node(tree: &mut WindowTree, element: &XmlElement) -> Result<Option<NodeId>> {
    match element.name() {
        SPLIT_NODE => {
            let orientation_text: String = element.parse_attribute("ORIENTATION")?;
            let orientation = Orientation::parse(&orientation_text).ok_or_else(|| {
                DockingError::invalid_layout(format!("unknown split orientation '{orientation_text}'"))
            })?;
            let divider: f32 = element.parse_attribute_or("DIVIDER_LOCATION", 0.5)?;
            let [first, second] = element.children() else {
                return Err(DockingError::invalid_layout(format!(
                    "<{SPLIT_NODE}> must have two children, found {}",
                    element.children().len()
                )));
            };
            let first = read_node(tree, first)?;
            let second = read_node(tree, second)?;
            Ok(match (first, second) {
                (Some(first), Some(second)) => Some(tree.insert_split(orientation, divider, first, second)),
                (one, other) => one.or(other),
            })
        }
        COMPONENT_NODE => {
            let top: usize = element.parse_attribute_or("TOP_INFO", 0)?;
            let mut placeholders = Vec::new();
            for info in element.children_by_name(COMPONENT_INFO) {
                let owner: String = element_text(info, "OWNER")?;
                let name: String = element_text(info, "NAME")?;
                let title = info.attribute("TITLE").unwrap_or(&name).to_string();
                let group = info.attribute("GROUP").unwrap_or_default().to_string();
                let showing: bool = info.parse_attribute_or("ACTIVE", false)?;
                placeholders.push(
                    tree.insert_placeholder(Placeholder::inert(owner, name, title, group, showing)),
                );
            }
            if placeholders.is_empty() {
                return Ok(None);
            }
            Ok(Some(tree.insert_component(placeholders, top)))
        }
        other => Err(DockingError::invalid_layout(format!("unexpected layout element <{other}>"))),
    }
}

fn element_text(element: &XmlElement, name: &str) -> Result<String> {
    element
        .attribute(name)
        .map(str::to_string)
        .ok_or_else(|| DockingError::invalid_layout(format!("<{}> is missing attribute {name}", element.name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::provider::WindowPosition;
    use crate::tree::ShapeNode;

    const MAIN: Rect = Rect::new(10, 20, 800, 600);
    const DETACHED: Size = Size::new(300, 200);

    fn slot(tree: &mut WindowTree, name: &str, showing: bool) -> crate::placeholder::PlaceholderId {
        tree.insert_placeholder(Placeholder::inert("Owner", name, format!("{name} Title"), "", showing))
    }

    #[test]
    fn test_round_trip_shape() {
        let mut tree = WindowTree::new("Tool", MAIN, DETACHED);
        let a = slot(&mut tree, "A", true);
        let b = slot(&mut tree, "B", false);
        let c = slot(&mut tree, "C", true);
        let d = slot(&mut tree, "D", true);
        tree.add(a, WindowPosition::Right);
        tree.add(b, WindowPosition::Stack);
        tree.add(c, WindowPosition::Bottom);
        tree.add_at_point(d, Point::new(400, 300));

        let element = write_tree(&tree);
        let text = element.to_xml_string_pretty();
        let restored = read_tree(&XmlElement::parse(&text).unwrap(), "Tool", Rect::default(), DETACHED).unwrap();

        assert_eq!(restored.shape(), tree.shape());
        assert_eq!(restored.window_bounds(WindowId::Main), Some(MAIN));
        let window = restored.detached_windows()[0];
        assert_eq!(
            restored.window_bounds(WindowId::Detached(window)),
            Some(Rect::new(400, 300, 300, 200))
        );

        let hidden = restored
            .placeholders()
            .find(|(_, p)| p.name() == "B")
            .map(|(_, p)| p.clone())
            .unwrap();
        assert!(!hidden.is_showing());
        assert!(hidden.is_inert());
        assert_eq!(hidden.title(), "B Title");
    }

    #[test]
    fn test_split_attributes() {
        let mut tree = WindowTree::new("Tool", MAIN, DETACHED);
        let a = slot(&mut tree, "A", true);
        let b = slot(&mut tree, "B", true);
        tree.add(a, WindowPosition::Right);
        tree.add(b, WindowPosition::Top);

        let root = write_tree(&tree);
        let split = root.child("SPLIT_NODE").unwrap();
        assert_eq!(split.attribute("ORIENTATION"), Some("VERTICAL"));
        assert_eq!(split.parse_attribute::<f32>("DIVIDER_LOCATION").unwrap(), 0.5);
        let first = split.children()[0].child("COMPONENT_INFO").unwrap();
        assert_eq!(first.attribute("NAME"), Some("B"));
        assert_eq!(first.attribute("ACTIVE"), Some("true"));
    }

    #[test]
    fn test_top_info_counts_saved_tabs() {
        let mut tree = WindowTree::new("Tool", MAIN, DETACHED);
        let a = slot(&mut tree, "A", true);
        let b = slot(&mut tree, "B", true);
        tree.add(a, WindowPosition::Right);
        tree.add(b, WindowPosition::Stack);

        let restored = read_tree(&write_tree(&tree), "Tool", MAIN, DETACHED).unwrap();
        let node = restored
            .placeholders()
            .find(|(_, p)| p.name() == "B")
            .and_then(|(_, p)| p.node())
            .unwrap();
        let top = restored.top_placeholder(node).and_then(|p| restored.placeholder(p));
        assert_eq!(top.map(|p| p.name()), Some("B"));
    }

    #[test]
    fn test_missing_child_collapses() {
        let text = r#"
            <ROOT_NODE X="0" Y="0" WIDTH="100" HEIGHT="100">
              <SPLIT_NODE ORIENTATION="HORIZONTAL" DIVIDER_LOCATION="0.3">
                <COMPONENT_NODE TOP_INFO="0" />
                <COMPONENT_NODE TOP_INFO="0">
                  <COMPONENT_INFO OWNER="O" NAME="Only" TITLE="Only" GROUP="" ACTIVE="true" />
                </COMPONENT_NODE>
              </SPLIT_NODE>
              <WINDOW_NODE X="1" Y="1" WIDTH="10" HEIGHT="10" />
            </ROOT_NODE>"#;
        let tree = read_tree(&XmlElement::parse(text).unwrap(), "Tool", MAIN, DETACHED).unwrap();
        assert_eq!(tree.shape().main, Some(ShapeNode::tabs([("O", "Only")])));
        assert!(tree.detached_windows().is_empty());
    }

    #[test]
    fn test_malformed_layouts() {
        let bad_orientation = XmlElement::parse(
            r#"<ROOT_NODE><SPLIT_NODE ORIENTATION="DIAGONAL"><COMPONENT_NODE/><COMPONENT_NODE/></SPLIT_NODE></ROOT_NODE>"#,
        )
        .unwrap();
        assert!(matches!(
            read_tree(&bad_orientation, "Tool", MAIN, DETACHED),
            Err(DockingError::InvalidLayout(_))
        ));

        let one_child = XmlElement::parse(
            r#"<ROOT_NODE><SPLIT_NODE ORIENTATION="VERTICAL"><COMPONENT_NODE/></SPLIT_NODE></ROOT_NODE>"#,
        )
        .unwrap();
        assert!(read_tree(&one_child, "Tool", MAIN, DETACHED).is_err());

        let wrong_root = XmlElement::new("TOOL");
        assert!(read_tree(&wrong_root, "Tool", MAIN, DETACHED).is_err());
    }
}

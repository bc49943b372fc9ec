//! Attribute extraction sources.
//!
//! Real STEP attribute extraction - interpreting an AP203/AP214 product
//! structure, property sets, custom attributes - is a far bigger problem
//! than the conversion itself and lives behind [`AttributeSource`]. The
//! converter only needs the contract: entity name to attribute tree, empty
//! map when nothing is extractable, never a partial structure.
//!
//! [`SampleExtractor`] is the demonstration source: a fixed product
//! structure shaped like typical extracted STEP data.

use std::path::Path;

use log::debug;

use crate::node::{AttrMap, Node};
use crate::util::Result;

/// Source of extracted attribute trees, keyed by entity name.
pub trait AttributeSource {
    /// Extract attributes from the given input locator.
    ///
    /// Returns an empty map when nothing is extractable. Must never return
    /// a malformed partial structure.
    fn extract(&self, locator: &Path) -> Result<AttrMap>;
}

/// Demonstration source returning a fixed sample product structure.
#[derive(Clone, Copy, Debug, Default)]
pub struct SampleExtractor;

impl AttributeSource for SampleExtractor {
    fn extract(&self, locator: &Path) -> Result<AttrMap> {
        debug!("sample extraction for {}", locator.display());

        let mut entities = AttrMap::new();

        entities.set(
            "Product_Assembly_001",
            Node::map([
                ("name", Node::Text("Main Assembly".into())),
                (
                    "description",
                    Node::Text("Top-level product assembly for device XYZ.".into()),
                ),
                ("part_number", Node::Text("ASM-XYZ-001".into())),
                ("material", Node::Text("Aluminum Alloy".into())),
                ("weight_kg", Node::Float(2.5)),
                (
                    "sub_components",
                    Node::seq(["Component_A", "Component_B"]),
                ),
                (
                    "custom_properties",
                    Node::map([
                        ("manufacturing_date", Node::Text("2024-06-18".into())),
                        ("designer", Node::Text("Jane Doe".into())),
                        ("revision", Node::Text("B".into())),
                    ]),
                ),
            ]),
        );

        entities.set(
            "Component_A",
            Node::map([
                ("name", Node::Text("Housing".into())),
                ("part_number", Node::Text("COMP-A-001".into())),
                ("material", Node::Text("ABS Plastic".into())),
                (
                    "dimensions_mm",
                    Node::map([
                        ("length", Node::Int(100)),
                        ("width", Node::Int(50)),
                        ("height", Node::Int(20)),
                    ]),
                ),
                ("finish", Node::Text("Matte Black".into())),
            ]),
        );

        entities.set(
            "Component_B",
            Node::map([
                ("name", Node::Text("Bracket".into())),
                ("part_number", Node::Text("COMP-B-002".into())),
                ("material", Node::Text("Stainless Steel".into())),
                ("tolerance_class", Node::Text("Fine".into())),
                (
                    "nested_data_example",
                    Node::map([
                        ("key1", Node::Text("value1".into())),
                        ("key2", Node::Float(123.45)),
                        ("list_of_items", Node::seq(["item1", "item2"])),
                    ]),
                ),
            ]),
        );

        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_extractor_shape() {
        let entities = SampleExtractor.extract(Path::new("example_part.step")).unwrap();
        assert_eq!(entities.len(), 3);
        assert!(entities.contains("Product_Assembly_001"));

        let assembly = match entities.get("Product_Assembly_001") {
            Some(Node::Map(map)) => map,
            other => panic!("expected map, got {other:?}"),
        };
        assert_eq!(assembly.get("weight_kg"), Some(&Node::Float(2.5)));
    }
}

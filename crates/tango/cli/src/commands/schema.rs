//! Schema commands: validate, tree and move

use crate::error::{CliError, CliResult};
use tango_engine::{Engine, EngineConfig};
use tango_types::{ElementId, Material, Schema};

/// One-line summary of a valid schema
pub fn validate(schema: &Schema) -> CliResult<String> {
    let order = schema.preorder()?;
    let root = order
        .first()
        .ok_or_else(|| CliError::InvalidInput("schema has no elements".into()))?;
    Ok(format!(
        "Schema is valid: {} elements, root '{}'",
        order.len(),
        root
    ))
}

/// Indented outline of the layout, one `id (Type)` line per element
pub fn tree(schema: &Schema) -> CliResult<String> {
    schema.validate()?;
    let mut out = String::new();
    if let Some(root) = &schema.layout.root {
        write_node(schema, root, 0, &mut out);
    }
    Ok(out)
}

fn write_node(schema: &Schema, id: &ElementId, depth: usize, out: &mut String) {
    let element_type = schema
        .elements
        .get(id)
        .map(|def| def.element_type.as_str())
        .unwrap_or("?");
    out.push_str(&format!("{}{} ({})\n", "  ".repeat(depth), id, element_type));
    for child in schema.layout.children(id) {
        write_node(schema, child, depth + 1, out);
    }
}

/// Move `id` under `parent` at `index` and return the edited schema
///
/// The move runs through a full engine with the built-in plugins attached,
/// so drop rules come from `materials` and the configuration.
pub fn move_element(
    schema: Schema,
    materials: Vec<Material>,
    config: EngineConfig,
    id: &ElementId,
    parent: &ElementId,
    index: usize,
) -> CliResult<Schema> {
    let mut builder = Engine::builder()
        .config(config)
        .materials(materials)
        .schema(schema);
    for factory in tango_plugins::defaults() {
        builder = builder.plugin(factory);
    }
    let mut engine = builder.build()?;

    let used = engine.move_element(id, parent, index)?;
    tracing::info!(element_id = %id, parent = %parent, index = used, "Element moved");
    Ok(engine.to_schema())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tango_engine::{EngineError, InvalidDropTargetError};
    use tango_types::Element;

    fn sample() -> Schema {
        let mut schema = Schema::with_root(Element::new("page", "Page"));
        schema
            .add_child("page", Element::new("form", "Form"))
            .add_child("page", Element::new("submit", "Button"));
        schema.add_child("form", Element::new("email", "Input"));
        schema
    }

    #[test]
    fn test_validate_summary() {
        assert_eq!(
            validate(&sample()).unwrap(),
            "Schema is valid: 4 elements, root 'page'"
        );
    }

    #[test]
    fn test_validate_rejects_cycles() {
        let mut schema = sample();
        schema
            .layout
            .structure
            .insert("email".into(), vec!["form".into()]);
        assert!(matches!(validate(&schema), Err(CliError::Schema(_))));
    }

    #[test]
    fn test_tree_outline() {
        let expected = "page (Page)\n  form (Form)\n    email (Input)\n  submit (Button)\n";
        assert_eq!(tree(&sample()).unwrap(), expected);
    }

    #[test]
    fn test_move_into_container() {
        let edited = move_element(
            sample(),
            vec![Material::container("Form")],
            EngineConfig::default(),
            &"submit".into(),
            &"form".into(),
            1,
        )
        .unwrap();
        assert_eq!(
            edited.layout.children(&"form".into()),
            &[ElementId::new("email"), ElementId::new("submit")]
        );
        assert_eq!(edited.layout.children(&"page".into()), &[ElementId::new("form")]);
    }

    #[test]
    fn test_move_without_material_is_rejected() {
        let err = move_element(
            sample(),
            Vec::new(),
            EngineConfig::default(),
            &"submit".into(),
            &"form".into(),
            0,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Engine(EngineError::InvalidDropTarget(
                InvalidDropTargetError::Rejected { .. }
            ))
        ));
    }
}

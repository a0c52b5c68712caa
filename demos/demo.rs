//! Schema viewer core demo - builds a tree, expands a $ref, collapses it
//!
//! Run with: cargo run --example demo

use schema_tree::{
    build_tree, collapse_ref, expand_ref, ReferenceCollection, SchemaParser, TreeNode,
};

const PERSON_SCHEMA: &str = r##"
$id: "https://example.com/schemas/person.json#"
type: object
title: Person
properties:
  name:
    type: string
    minLength: 1
  nicknames:
    type: array
    items:
      type: string
  address:
    $ref: "address.json#"
  partner:
    $ref: "#"
required:
  - name
"##;

const ADDRESS_SCHEMA: &str = r#"
$id: "https://example.com/schemas/address.json#"
type: object
title: Address
properties:
  street:
    type: string
  zip:
    type: string
required:
  - street
"#;

fn main() {
    tracing_subscriber::fmt::init();

    let person = SchemaParser::parse(PERSON_SCHEMA).expect("person schema");
    let address = SchemaParser::parse(ADDRESS_SCHEMA).expect("address schema");

    let refs: ReferenceCollection = vec![person.clone(), address].into_iter().collect();

    let tree = build_tree(&person);
    println!("--- initial tree ---");
    render(&tree.root);

    // expand the `address` ref (third property, index 2)
    let tree = expand_ref(&tree, &[2], &refs).expect("expand address");
    println!("\n--- address expanded ---");
    render(&tree.root);

    // the self-referential `partner` ref expands one level at a time
    let tree = expand_ref(&tree, &[3], &refs).expect("expand partner");
    println!("\n--- partner expanded (one level) ---");
    render(&tree.root);

    let tree = collapse_ref(&tree, &[3]).expect("collapse partner");
    println!("\n--- partner collapsed again ---");
    render(&tree.root);
}

/// Two-column text dump: structural symbols left, keyword details right.
fn render(node: &TreeNode) {
    let (schema, children) = match node {
        TreeNode::Ref(ref_node) if ref_node.is_expanded => {
            let inner = ref_node.expanded.as_ref().expect("expanded subtree");
            render(inner);
            return;
        }
        TreeNode::Ref(ref_node) => (&ref_node.placeholder, &[][..]),
        TreeNode::Schema(schema) => (schema, node.children()),
    };

    let indent = "  ".repeat(schema.depth());
    let mut left = format!("{indent}{}", schema.kind);
    if let Some(name) = &schema.name {
        left = format!("{indent}{name}: {}", schema.kind);
    }
    if schema.required {
        left.push('*');
    }
    if schema.contains {
        left.push('+');
    }

    let mut right = Vec::new();
    for (keyword, value) in &schema.raw {
        if keyword == "required" {
            continue;
        }
        right.push(format!("{keyword}: {value}"));
    }

    println!("{left:<40} | {}", right.join(", "));

    for child in children {
        render(child);
    }
}

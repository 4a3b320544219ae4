// Example: flatten a record tree, grouping children by kind at every level.
use liveview::{GroupDescriptor, Model, Node, SourceList, VirtualCollection, VirtualCollectionOptions};

fn main() -> Result<(), liveview::Error> {
    let src = SourceList::new([
        Model::new(1)
            .with("name", "src")
            .with("kind", "dir")
            .with_children([
                Model::new(11).with("name", "lib.rs").with("kind", "file"),
                Model::new(12)
                    .with("name", "tests")
                    .with("kind", "dir")
                    .with_children([Model::new(121).with("name", "smoke.rs").with("kind", "file")]),
            ]),
        Model::new(2).with("name", "Cargo.toml").with("kind", "file"),
    ]);

    let options = VirtualCollectionOptions::new()
        .with_group(GroupDescriptor::by_attribute("kind"))
        .with_comparator("name");
    let vc = VirtualCollection::new(&src, options)?;

    for entry in &vc {
        let indent = "  ".repeat(entry.depth);
        match &entry.node {
            Node::Group(g) => println!("{indent}<{}>", g.label()),
            Node::Leaf(r) => println!(
                "{indent}{}",
                r.get("name").map(ToString::to_string).unwrap_or_default()
            ),
        }
    }
    Ok(())
}

// Example: group tasks by assignee, sort by title, and follow source mutations.
use liveview::{
    Change, GroupDescriptor, Model, Node, SourceList, VirtualCollection, VirtualCollectionOptions,
};

fn print(vc: &VirtualCollection<Model>) {
    for entry in vc {
        let indent = "  ".repeat(entry.depth);
        match &entry.node {
            Node::Group(g) => println!("{indent}[{}]", g.label()),
            Node::Leaf(r) => println!(
                "{indent}{}",
                r.get("title").map(ToString::to_string).unwrap_or_default()
            ),
        }
    }
}

fn main() -> Result<(), liveview::Error> {
    let mut tasks = SourceList::new([
        Model::new(1).with("title", "Write docs").with("assignee", "bob"),
        Model::new(2).with("title", "Fix login").with("assignee", "alice"),
        Model::new(3).with("title", "Cut release").with("assignee", "bob"),
        Model::new(4).with("title", "Audit deps").with("assignee", "alice"),
    ]);

    let options = VirtualCollectionOptions::new()
        .with_group(GroupDescriptor::by_attribute("assignee"))
        .with_comparator("title");
    let mut vc = VirtualCollection::new(&tasks, options)?;
    vc.subscribe(|change| match change {
        Change::Add { item, index } => println!("  + {:?} at {index}", item.id()),
        Change::Remove { item, index } => println!("  - {:?} at {index}", item.id()),
        Change::Reset => println!("  reset"),
    });
    print(&vc);

    println!("add a task for alice:");
    let event = tasks.push(Model::new(5).with("title", "Bump MSRV").with("assignee", "alice"));
    vc.apply(&tasks, &event)?;

    println!("reassign 'Cut release' to alice:");
    if let Some(event) = tasks.update(&3, ["assignee"], |m| {
        m.set("assignee", "alice");
    }) {
        vc.apply(&tasks, &event)?;
    }
    print(&vc);
    Ok(())
}

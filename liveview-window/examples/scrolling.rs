// Example: a controller keeping a 5-row window over a sorted projection while the user scrolls
// and the source changes underneath.
use liveview::{Change, Model, SourceList, VirtualCollectionOptions};
use liveview_window::{Controller, WindowOptions};

fn describe(changes: &[Change<liveview::Entry<Model>>]) -> String {
    changes
        .iter()
        .map(|c| match c {
            Change::Add { item, index } => format!("+{:?}@{index}", item.id()),
            Change::Remove { item, index } => format!("-{:?}@{index}", item.id()),
            Change::Reset => String::from("reset"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<(), liveview::Error> {
    let mut src = SourceList::new((0..100u64).map(|id| Model::new(id).with("score", (id * 37) % 101)));
    let options = VirtualCollectionOptions::new().with_comparator("score");
    let mut c = Controller::new(&src, options, WindowOptions::new(5))?;

    for delta in [1isize, 2, -1, 20] {
        let changes = c.scroll_by(delta);
        println!("scroll {delta:+}: {} -> {:?}", describe(&changes), c.state());
    }

    let event = src.push(Model::new(1000).with("score", 0));
    let changes = c.apply(&src, &event)?;
    println!("insert before window: {}", describe(&changes));

    let changes = c.update_window_size(8);
    println!("grow window: {} (at end: {})", describe(&changes), c.is_at_end());
    Ok(())
}

use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use alloc::{format, vec};
use core::sync::atomic::{AtomicUsize, Ordering};

use liveview::{
    Change, Entry, EntryId, GroupDescriptor, GroupNode, Model, Record, SourceList, Value,
    VirtualCollectionOptions,
};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start) as u64) as usize
    }
}

fn items(n: u32) -> Vec<u32> {
    (0..n).collect()
}

fn expected_slice<T: Clone>(backing: &[T], position: usize, size: usize) -> Vec<T> {
    let start = position.min(backing.len());
    let end = position.saturating_add(size).min(backing.len());
    backing[start..end.max(start)].to_vec()
}

fn replay<T: Clone>(replica: &mut Vec<T>, changes: &[Change<T>], current: &[T]) {
    for change in changes {
        match change {
            Change::Add { item, index } => replica.insert(*index, item.clone()),
            Change::Remove { index, .. } => {
                replica.remove(*index);
            }
            Change::Reset => *replica = current.to_vec(),
        }
    }
}

#[test]
fn growing_a_fresh_window_resets() {
    let backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::default());
    assert!(w.is_empty());

    assert_eq!(w.update_window_size(&backing, 3), vec![Change::Reset]);
    assert_eq!(w.models(), [0, 1, 2]);
    assert_eq!(w.state(), WindowState { position: 0, size: 3 });
}

#[test]
fn disjoint_move_resets() {
    let backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(3));

    assert_eq!(w.update_position(&backing, 3), vec![Change::Reset]);
    assert_eq!(w.models(), [3, 4, 5]);
    assert_eq!(w.effective_range(), WindowRange { start: 3, end: 6 });
}

#[test]
fn overlapping_move_emits_one_remove_and_one_add() {
    let backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(3));

    assert_eq!(
        w.update_position(&backing, 1),
        vec![
            Change::Remove { item: 0, index: 0 },
            Change::Add { item: 3, index: 2 },
        ]
    );
    assert_eq!(w.models(), [1, 2, 3]);
}

#[test]
fn backward_move_removes_tail_before_adding_front() {
    let backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(3).with_position(5));

    assert_eq!(
        w.update_position(&backing, 3),
        vec![
            Change::Remove { item: 7, index: 2 },
            Change::Remove { item: 6, index: 1 },
            Change::Add { item: 3, index: 0 },
            Change::Add { item: 4, index: 1 },
        ]
    );
    assert_eq!(w.models(), [3, 4, 5]);
    assert!(w.update_position(&backing, 3).is_empty());
}

#[test]
fn oversized_window_is_trimmed_to_backing() {
    let backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::default());
    assert_eq!(w.update_window_size(&backing, 11), vec![Change::Reset]);
    assert_eq!(w.models(), backing.as_slice());
    assert_eq!(w.position(), 0);
    assert!(w.is_at_end(&backing));

    // Growing an existing window past the end adds only what exists.
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(3));
    let changes = w.update_window_size(&backing, 11);
    assert_eq!(changes.len(), 7);
    assert!(
        changes
            .iter()
            .enumerate()
            .all(|(k, c)| c.index() == Some(3 + k) && !c.is_reset())
    );
    assert_eq!(w.models(), backing.as_slice());
    assert_eq!(w.position(), 0);
}

#[test]
fn resizing_at_the_same_position_changes_only_the_tail() {
    let backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(5).with_position(2));

    assert_eq!(
        w.update_window_size(&backing, 3),
        vec![
            Change::Remove { item: 6, index: 4 },
            Change::Remove { item: 5, index: 3 },
        ]
    );
    assert_eq!(w.models(), [2, 3, 4]);

    assert_eq!(
        w.update_window_size(&backing, 4),
        vec![Change::Add { item: 5, index: 3 }]
    );
    assert_eq!(w.models(), [2, 3, 4, 5]);
}

#[test]
fn growing_near_the_end_trims_without_moving() {
    let backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(3).with_position(7));
    assert_eq!(w.models(), [7, 8, 9]);

    assert!(w.update_window_size(&backing, 5).is_empty());
    assert_eq!(w.state(), WindowState { position: 7, size: 5 });
    assert_eq!(w.models(), [7, 8, 9]);

    assert_eq!(w.update_position(&backing, 2), vec![Change::Reset]);
    assert_eq!(w.models(), [2, 3, 4, 5, 6]);
}

#[test]
fn window_near_the_end_is_trimmed_and_restored() {
    let backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(3));

    assert_eq!(w.update_position(&backing, 8), vec![Change::Reset]);
    assert_eq!(w.position(), 8);
    assert_eq!(w.models(), [8, 9]);
    assert!(w.is_at_end(&backing));

    assert_eq!(w.update_position(&backing, 3), vec![Change::Reset]);
    assert_eq!(w.models(), [3, 4, 5]);

    // Trimming through overlapping moves stays incremental.
    w.update_position(&backing, 6);
    assert_eq!(
        w.update_position(&backing, 8),
        vec![
            Change::Remove { item: 6, index: 0 },
            Change::Remove { item: 7, index: 0 },
            Change::Add { item: 9, index: 1 },
        ]
    );
    assert_eq!(w.models(), [8, 9]);
    assert_eq!(
        w.update_position(&backing, 7),
        vec![Change::Add { item: 7, index: 0 }]
    );
    assert_eq!(w.models(), [7, 8, 9]);
}

#[test]
fn position_is_clamped_to_the_last_entry() {
    let backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(3).with_position(50));
    assert_eq!(w.position(), 9);
    assert_eq!(w.models(), [9]);
    assert_eq!(w.max_position(&backing), 7);

    w.update_position(&backing, 0);
    w.update_position(&backing, usize::MAX);
    assert_eq!(w.position(), 9);
    assert!(w.at(1).is_err());
    assert_eq!(*w.at(0).unwrap(), 9);

    let empty: Vec<u32> = Vec::new();
    let mut w = SlidingWindow::new(&empty, WindowOptions::new(3).with_position(4));
    assert_eq!(w.position(), 0);
    assert!(w.update_position(&empty, 2).is_empty());
}

#[test]
fn shrinking_backing_trims_and_moving_back_restores() {
    let mut backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(5).with_position(5));
    let mut replica = w.models().to_vec();

    let mut changes = Vec::new();
    for index in (7..10).rev() {
        let item = backing.remove(index);
        changes.push(Change::Remove { item, index });
    }
    let out = w.sync(&backing, &changes);
    replay(&mut replica, &out, w.models());
    assert_eq!(w.models(), [5, 6]);
    assert_eq!(replica, w.models());
    assert_eq!(w.state(), WindowState { position: 5, size: 5 });

    w.update_position(&backing, 2);
    assert_eq!(w.models(), [2, 3, 4, 5, 6]);
}

#[test]
fn sync_shifts_entries_across_the_window_start() {
    let mut backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(3).with_position(4));

    backing.insert(1, 100);
    let out = w.sync(&backing, &[Change::Add { item: 100, index: 1 }]);
    assert_eq!(
        out,
        vec![
            Change::Remove { item: 6, index: 2 },
            Change::Add { item: 3, index: 0 },
        ]
    );
    assert_eq!(w.models(), [3, 4, 5]);

    let item = backing.remove(0);
    let out = w.sync(&backing, &[Change::Remove { item, index: 0 }]);
    assert_eq!(
        out,
        vec![
            Change::Remove { item: 3, index: 0 },
            Change::Add { item: 6, index: 2 },
        ]
    );
    assert_eq!(w.models(), [4, 5, 6]);

    // Changes past the window are invisible.
    backing.push(42);
    assert!(w.sync(&backing, &[Change::Add { item: 42, index: 10 }]).is_empty());
}

#[test]
fn window_slice_matches_backing_after_random_moves() {
    let mut rng = Lcg::new(11);
    for len in [0u32, 1, 5, 30] {
        let backing = items(len);
        let mut w = SlidingWindow::new(&backing, WindowOptions::default());
        let mut replica = w.models().to_vec();
        for _ in 0..200 {
            let changes = if rng.gen_range_usize(0, 3) == 0 {
                w.update_window_size(&backing, rng.gen_range_usize(0, 12))
            } else {
                w.update_position(&backing, rng.gen_range_usize(0, 40))
            };
            replay(&mut replica, &changes, w.models());

            let (p, size) = (w.position(), w.size());
            assert!(p <= backing.len().saturating_sub(1));
            assert_eq!(w.models(), expected_slice(&backing, p, size).as_slice());
            assert_eq!(w.len(), size.min(backing.len() - p));
            assert_eq!(replica, w.models());

            let removes_after_add = changes.windows(2).any(|pair| {
                matches!(pair[0], Change::Add { .. }) && matches!(pair[1], Change::Remove { .. })
            });
            assert!(!removes_after_add);
        }
    }
}

#[test]
fn window_follows_random_backing_changes() {
    let mut rng = Lcg::new(23);
    let mut next = 1000u32;
    let mut backing = items(20);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(6).with_position(4));
    let mut replica = w.models().to_vec();

    for step in 0..500 {
        let mut changes = Vec::new();
        match rng.gen_range_usize(0, 10) {
            0 => changes.push(Change::Reset),
            1 => {
                let p = rng.gen_range_usize(0, backing.len() + 3);
                let out = w.update_position(&backing, p);
                replay(&mut replica, &out, w.models());
            }
            _ => {
                for _ in 0..rng.gen_range_usize(1, 4) {
                    if backing.len() > 2 && rng.gen_range_usize(0, 2) == 0 {
                        let index = rng.gen_range_usize(0, backing.len());
                        let item = backing.remove(index);
                        changes.push(Change::Remove { item, index });
                    } else {
                        let index = rng.gen_range_usize(0, backing.len() + 1);
                        next += 1;
                        backing.insert(index, next);
                        changes.push(Change::Add { item: next, index });
                    }
                }
            }
        }
        let out = w.sync(&backing, &changes);
        replay(&mut replica, &out, w.models());

        assert_eq!(
            w.models(),
            expected_slice(&backing, w.position(), w.size()).as_slice(),
            "step {step}"
        );
        assert_eq!(replica, w.models(), "step {step}");
    }
}

#[test]
fn listeners_see_window_changes() {
    let backing = items(10);
    let mut w = SlidingWindow::new(&backing, WindowOptions::new(3));
    let seen = Arc::new(AtomicUsize::new(0));
    let id = {
        let seen = Arc::clone(&seen);
        w.subscribe(move |_| {
            seen.fetch_add(1, Ordering::Relaxed);
        })
    };
    w.update_position(&backing, 1);
    assert_eq!(seen.load(Ordering::Relaxed), 2);
    assert!(w.unsubscribe(id));
    w.update_position(&backing, 8);
    assert_eq!(seen.load(Ordering::Relaxed), 2);
}

fn entry_ids(entries: &[Entry<Model>]) -> Vec<EntryId<u64>> {
    entries.iter().map(Entry::id).collect()
}

type Contents<'a> = Vec<(Option<&'a Model>, Option<&'a GroupNode<u64>>)>;

fn contents(entries: &[Entry<Model>]) -> Contents<'_> {
    entries
        .iter()
        .map(|e| (e.record().map(|r| &**r), e.group_node().map(|g| &**g)))
        .collect()
}

fn assert_window_matches(c: &Controller<Model>) {
    let range = c.window().effective_range();
    let all = c.collection().entries();
    let end = range.end.min(all.len());
    let expected = &all[range.start.min(end)..end];
    assert_eq!(entry_ids(c.visible()), entry_ids(expected));
    assert_eq!(contents(c.visible()), contents(expected));
    assert_eq!(
        c.visible().len(),
        c.state().size.min(all.len().saturating_sub(range.start))
    );
}

#[test]
fn controller_keeps_window_over_grouped_projection() {
    let mut rng = Lcg::new(5);
    let people = ["ann", "bob", "cid"];
    let mut next_id = 0u64;
    let mut src = SourceList::new((0..20).map(|_| {
        next_id += 1;
        Model::new(next_id)
            .with("owner", people[rng.gen_range_usize(0, 3)])
            .with("rank", rng.gen_range_usize(0, 50))
    }));
    let options = VirtualCollectionOptions::new()
        .with_group(GroupDescriptor::by_attribute("owner"))
        .with_comparator("rank");
    let mut c = Controller::new(&src, options, WindowOptions::new(5).with_position(3)).unwrap();
    let mut replica = c.visible().to_vec();
    assert_window_matches(&c);

    for step in 0..300 {
        let out = match rng.gen_range_usize(0, 5) {
            0 => {
                next_id += 1;
                let event = src.push(
                    Model::new(next_id)
                        .with("owner", people[rng.gen_range_usize(0, 3)])
                        .with("rank", rng.gen_range_usize(0, 50)),
                );
                c.apply(&src, &event).unwrap()
            }
            1 if src.len() > 3 => {
                let event = src.remove_at(rng.gen_range_usize(0, src.len())).unwrap();
                c.apply(&src, &event).unwrap()
            }
            2 => {
                let id = src.at(rng.gen_range_usize(0, src.len())).unwrap().id();
                let rank = rng.gen_range_usize(0, 50);
                let event = src
                    .update(&id, ["rank"], |m| {
                        m.set("rank", rank);
                    })
                    .unwrap();
                c.apply(&src, &event).unwrap()
            }
            3 => c.scroll_by(rng.gen_range_usize(0, 9) as isize - 4),
            _ => c.update_window_size(rng.gen_range_usize(1, 9)),
        };
        replay(&mut replica, &out, c.visible());
        assert_eq!(entry_ids(&replica), entry_ids(c.visible()), "step {step}");
        assert_window_matches(&c);
    }
}

#[test]
fn controller_scrolls_to_records() {
    let src = SourceList::new((1..=10).map(|id| Model::new(id).with("n", format!("item {id}"))));
    let mut c = Controller::new(
        &src,
        VirtualCollectionOptions::new(),
        WindowOptions::new(4),
    )
    .unwrap();
    assert_eq!(c.visible().len(), 4);

    let out = c.scroll_to_record(&3).unwrap();
    assert_eq!(out.len(), 4);
    assert_eq!(c.visible()[0].record().unwrap().id(), 3);

    assert!(c.scroll_to_record(&99).is_none());

    c.scroll_to_index(100);
    assert!(c.is_at_end());
    assert_eq!(c.state().position, 9);
    assert_eq!(c.visible().len(), 1);
    assert_eq!(
        c.visible()[0].record().unwrap().get("n"),
        Some(&Value::from("item 10"))
    );

    c.scroll_by(-100);
    assert_eq!(c.state().position, 0);
}

#[test]
fn controller_filter_resets_the_window() {
    let src = SourceList::new((1..=10).map(|id| Model::new(id).with("even", id % 2 == 0)));
    let mut c = Controller::new(
        &src,
        VirtualCollectionOptions::new(),
        WindowOptions::new(3).with_position(6),
    )
    .unwrap();

    let evens: liveview::Filter<Model> =
        Arc::new(|m: &Model| m.get("even") == Some(&Value::from(true)));
    let out = c.filter(&src, Some(evens)).unwrap();
    assert_eq!(out, vec![Change::Reset]);
    // Position is kept even though fewer entries remain after it.
    assert_eq!(c.state().position, 6);
    assert!(c.visible().is_empty());

    c.update_position(0);
    assert_eq!(
        c.visible()
            .iter()
            .filter_map(|e| e.record().map(|r| r.id()))
            .collect::<Vec<_>>(),
        [2, 4, 6]
    );
}

#[test]
fn in_place_updates_reach_visible_entries() {
    let mut src = SourceList::new((1..=6).map(|id| Model::new(id).with("title", format!("t{id}"))));
    let mut c = Controller::new(
        &src,
        VirtualCollectionOptions::new(),
        WindowOptions::new(3),
    )
    .unwrap();

    let event = src
        .update(&2, ["title"], |m| {
            m.set("title", "renamed");
        })
        .unwrap();
    assert!(c.apply(&src, &event).unwrap().is_empty());
    assert_eq!(
        c.visible()[1].record().unwrap().get("title"),
        Some(&Value::from("renamed"))
    );
    assert_window_matches(&c);
}

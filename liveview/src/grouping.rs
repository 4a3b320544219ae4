//! The grouping engine: builds and incrementally maintains the grouped, sorted, filtered tree
//! behind a [`crate::VirtualCollection`].

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::key::IdMap;
use crate::{
    Comparator, ConfigError, Entry, EntryId, Extractor, Filter, GroupId, GroupNode, Member, Record,
    Value, ValueKind, VirtualCollectionOptions,
};

/// One resolved grouping level.
pub(crate) struct Level<R> {
    key: Extractor<R>,
    order: Option<Comparator<R>>,
    display: Option<Extractor<R>>,
    affected: Option<Vec<String>>,
}

impl<R> Level<R> {
    fn affected_by(&self, changed: &[String]) -> bool {
        if changed.is_empty() {
            return true;
        }
        match &self.affected {
            Some(names) => changed.iter().any(|c| names.contains(c)),
            None => true,
        }
    }
}

/// Source positions of top-level records, used to break ordering ties like a stable sort does.
pub(crate) type SourceOrder<Id> = IdMap<Id, usize>;

pub(crate) fn source_order<R: Record>(records: &[Arc<R>]) -> SourceOrder<R::Id> {
    let mut order = SourceOrder::new();
    for (i, record) in records.iter().enumerate() {
        order.insert(record.id(), i);
    }
    order
}

fn position_in<R: Record>(order: &SourceOrder<R::Id>, record: &R) -> usize {
    order.get(&record.id()).copied().unwrap_or(usize::MAX)
}

/// A grouped subtree: either the groups of one level or the leaves of the innermost group.
pub(crate) enum Branch<R: Record> {
    Leaves(Vec<Leaf<R>>),
    Groups(Vec<Group<R>>),
}

pub(crate) struct Group<R: Record> {
    node: Arc<GroupNode<R::Id>>,
    /// First-seen member; group order and display derive from it.
    first: Arc<R>,
    branch: Branch<R>,
}

pub(crate) struct Leaf<R: Record> {
    record: Arc<R>,
    children: Option<Branch<R>>,
}

impl<R: Record> Leaf<R> {
    fn len(&self) -> usize {
        1 + self.children.as_ref().map_or(0, Branch::len)
    }

    fn flatten(&self, depth: usize, out: &mut Vec<Entry<R>>) {
        out.push(Entry::leaf(Arc::clone(&self.record), depth));
        if let Some(children) = &self.children {
            children.flatten(depth + 1, out);
        }
    }
}

/// Location of a top-level leaf: group indexes from the outermost level, then the leaf index.
pub(crate) struct Slot {
    groups: Vec<usize>,
    leaf: usize,
}

impl<R: Record> Branch<R> {
    /// Number of projection entries this branch flattens to.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Leaves(leaves) => leaves.iter().map(Leaf::len).sum(),
            Self::Groups(groups) => groups.iter().map(|g| 1 + g.branch.len()).sum(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Self::Leaves(leaves) => leaves.is_empty(),
            Self::Groups(groups) => groups.is_empty(),
        }
    }

    /// Pre-order traversal into depth-tagged entries.
    pub(crate) fn flatten(&self, depth: usize, out: &mut Vec<Entry<R>>) {
        match self {
            Self::Leaves(leaves) => {
                for leaf in leaves {
                    leaf.flatten(depth, out);
                }
            }
            Self::Groups(groups) => {
                for group in groups {
                    out.push(Entry::group(Arc::clone(&group.node), depth));
                    group.branch.flatten(depth + 1, out);
                }
            }
        }
    }

    /// Records the innermost group of every leaf, at every tree level.
    pub(crate) fn collect_parents(
        &self,
        parent: Option<&GroupId<R::Id>>,
        out: &mut IdMap<R::Id, GroupId<R::Id>>,
    ) {
        match self {
            Self::Leaves(leaves) => {
                for leaf in leaves {
                    if let Some(parent) = parent {
                        out.insert(leaf.record.id(), parent.clone());
                    }
                    if let Some(children) = &leaf.children {
                        children.collect_parents(None, out);
                    }
                }
            }
            Self::Groups(groups) => {
                for group in groups {
                    group.branch.collect_parents(Some(group.node.id()), out);
                }
            }
        }
    }

    /// Direct members of a group anywhere in the tree.
    pub(crate) fn members(&self, id: &GroupId<R::Id>) -> Option<Vec<Member<R::Id>>> {
        let scope = match id.scope() {
            Some(scope) => self.find_leaf(scope)?.children.as_ref()?,
            None => self,
        };
        let mut branch = scope;
        let mut found = None;
        for key in id.path() {
            let Self::Groups(groups) = branch else {
                return None;
            };
            let group = groups.iter().find(|g| g.node.key() == key)?;
            branch = &group.branch;
            found = Some(group);
        }
        let group = found?;
        Some(match &group.branch {
            Self::Leaves(leaves) => leaves
                .iter()
                .map(|l| EntryId::Record(l.record.id()))
                .collect(),
            Self::Groups(groups) => groups
                .iter()
                .map(|g| EntryId::Group(g.node.id().clone()))
                .collect(),
        })
    }

    fn find_leaf(&self, id: &R::Id) -> Option<&Leaf<R>> {
        match self {
            Self::Leaves(leaves) => {
                for leaf in leaves {
                    if leaf.record.id() == *id {
                        return Some(leaf);
                    }
                    if let Some(found) = leaf.children.as_ref().and_then(|c| c.find_leaf(id)) {
                        return Some(found);
                    }
                }
                None
            }
            Self::Groups(groups) => groups.iter().find_map(|g| g.branch.find_leaf(id)),
        }
    }

    /// Finds a leaf of this tree level (not of nested children).
    fn locate(&self, id: &R::Id) -> Option<Slot> {
        fn walk<R: Record>(branch: &Branch<R>, id: &R::Id, path: &mut Vec<usize>) -> Option<usize> {
            match branch {
                Branch::Leaves(leaves) => leaves.iter().position(|l| l.record.id() == *id),
                Branch::Groups(groups) => {
                    for (i, group) in groups.iter().enumerate() {
                        path.push(i);
                        if let Some(found) = walk(&group.branch, id, path) {
                            return Some(found);
                        }
                        path.pop();
                    }
                    None
                }
            }
        }
        let mut groups = Vec::new();
        let leaf = walk(self, id, &mut groups)?;
        Some(Slot { groups, leaf })
    }

    /// Group indexes for an existing key path, or `None` if any group along it is missing.
    fn find_path(&self, keys: &[Value]) -> Option<Vec<usize>> {
        let mut branch = self;
        let mut path = Vec::with_capacity(keys.len());
        for key in keys {
            let Self::Groups(groups) = branch else {
                return None;
            };
            let i = groups.iter().position(|g| g.node.key() == key)?;
            path.push(i);
            branch = &groups[i].branch;
        }
        matches!(branch, Self::Leaves(_)).then_some(path)
    }

    fn chain(&self, path: &[usize]) -> Vec<&Group<R>> {
        let mut out = Vec::with_capacity(path.len());
        let mut branch = self;
        for &i in path {
            let Self::Groups(groups) = branch else {
                break;
            };
            let Some(group) = groups.get(i) else {
                break;
            };
            out.push(group);
            branch = &group.branch;
        }
        out
    }

    fn leaves(&self, path: &[usize]) -> Option<&Vec<Leaf<R>>> {
        let mut branch = self;
        for &i in path {
            let Self::Groups(groups) = branch else {
                return None;
            };
            branch = &groups.get(i)?.branch;
        }
        match branch {
            Self::Leaves(leaves) => Some(leaves),
            Self::Groups(_) => None,
        }
    }

    fn leaves_mut(&mut self, path: &[usize]) -> Option<&mut Vec<Leaf<R>>> {
        let mut branch = self;
        for &i in path {
            let Self::Groups(groups) = branch else {
                return None;
            };
            branch = &mut groups.get_mut(i)?.branch;
        }
        match branch {
            Self::Leaves(leaves) => Some(leaves),
            Self::Groups(_) => None,
        }
    }

    fn group_mut(&mut self, path: &[usize]) -> Option<&mut Group<R>> {
        let (&last, parents) = path.split_last()?;
        let mut branch = self;
        for &i in parents {
            let Self::Groups(groups) = branch else {
                return None;
            };
            branch = &mut groups.get_mut(i)?.branch;
        }
        match branch {
            Self::Groups(groups) => groups.get_mut(last),
            Self::Leaves(_) => None,
        }
    }

    /// Flattened index of the leaf slot `leaf` inside the group at `path`.
    fn offset(&self, path: &[usize], leaf: usize) -> usize {
        let mut offset = 0;
        let mut branch = self;
        for &i in path {
            let Self::Groups(groups) = branch else {
                break;
            };
            offset += groups
                .iter()
                .take(i)
                .map(|g| 1 + g.branch.len())
                .sum::<usize>();
            let Some(group) = groups.get(i) else {
                break;
            };
            offset += 1;
            branch = &group.branch;
        }
        if let Self::Leaves(leaves) = branch {
            offset += leaves.iter().take(leaf).map(Leaf::len).sum::<usize>();
        }
        offset
    }
}

/// What an incremental update did to the tree, so the collection can mirror it.
pub(crate) enum Outcome<R: Record> {
    /// Nothing visible changed.
    Unchanged,
    /// No incremental path applies; the tree is untouched and must be rebuilt.
    Rebuild,
    /// `entries` were inserted at `position`.
    Inserted {
        position: usize,
        entries: Vec<Entry<R>>,
    },
    /// `len` entries were removed at `position`.
    Removed { position: usize, len: usize },
    /// `len` entries were removed at `from`, then `entries` inserted at `to`.
    Moved {
        from: usize,
        len: usize,
        to: usize,
        entries: Vec<Entry<R>>,
    },
    /// The entries starting at `position` were replaced in place by `entries` (same identities).
    Updated {
        position: usize,
        entries: Vec<Entry<R>>,
    },
    /// Group membership changed; the tree is updated and must be re-flattened.
    Regrouped,
}

/// Grouping levels, leaf order and filter, resolved from [`VirtualCollectionOptions`].
pub(crate) struct Engine<R> {
    levels: Vec<Level<R>>,
    leaf_order: Option<Comparator<R>>,
    filter: Option<Filter<R>>,
}

impl<R: Record + 'static> Engine<R> {
    pub(crate) fn new(options: &VirtualCollectionOptions<R>) -> Result<Self, ConfigError> {
        let mut levels = Vec::with_capacity(options.grouping.len());
        for (level, descriptor) in options.grouping.iter().enumerate() {
            let key = descriptor
                .iterator
                .to_extractor()
                .ok_or(ConfigError::OrdererNotAllowed {
                    level,
                    role: "iterator",
                })?;
            let display = match &descriptor.model_factory {
                Some(spec) => Some(spec.to_extractor().ok_or(ConfigError::OrdererNotAllowed {
                    level,
                    role: "model factory",
                })?),
                None => None,
            };
            levels.push(Level {
                key,
                order: descriptor.comparator.as_ref().map(|c| c.to_comparator()),
                display,
                affected: descriptor.resolved_affected_attributes(),
            });
        }
        Ok(Self {
            levels,
            leaf_order: options.comparator.as_ref().map(|c| c.to_comparator()),
            filter: options.filter.clone(),
        })
    }
}

impl<R: Record> Engine<R> {
    fn accepts(&self, record: &R) -> bool {
        self.filter.as_ref().is_none_or(|f| f(record))
    }

    fn keys_of(&self, record: &R) -> Vec<Value> {
        self.levels.iter().map(|l| (l.key)(record)).collect()
    }

    fn display(&self, level: usize, first: &R, key: &Value) -> Value {
        match self.levels.get(level).and_then(|l| l.display.as_ref()) {
            Some(f) => f(first),
            None => key.clone(),
        }
    }

    /// Whether `a` sorts strictly before `b` among leaves of one group.
    fn leaf_precedes(&self, a: &R, b: &R, order: &SourceOrder<R::Id>) -> bool {
        let by_comparator = self.leaf_order.as_ref().map_or(Ordering::Equal, |f| f(a, b));
        by_comparator.then_with(|| position_in(order, a).cmp(&position_in(order, b)))
            == Ordering::Less
    }

    /// Index at which `record` belongs among `leaves`, ignoring the leaf at `skip`.
    fn insertion_point(
        &self,
        leaves: &[Leaf<R>],
        record: &R,
        skip: Option<usize>,
        order: &SourceOrder<R::Id>,
    ) -> usize {
        leaves
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != skip)
            .filter(|(_, l)| self.leaf_precedes(&l.record, record, order))
            .count()
    }

    /// Builds the full tree for `records` (one tree level, recursing into children).
    pub(crate) fn build(&self, records: &[Arc<R>]) -> Result<Branch<R>, ConfigError> {
        let mut ancestors = Vec::new();
        self.build_scope(records, None, &mut ancestors)
    }

    fn build_scope(
        &self,
        records: &[Arc<R>],
        scope: Option<&R::Id>,
        ancestors: &mut Vec<R::Id>,
    ) -> Result<Branch<R>, ConfigError> {
        let mut leaves = Vec::with_capacity(records.len());
        for record in records {
            if !self.accepts(record) {
                continue;
            }
            leaves.push(self.build_leaf(record, ancestors)?);
        }
        self.group_leaves(leaves, scope, None, 0)
    }

    fn build_leaf(
        &self,
        record: &Arc<R>,
        ancestors: &mut Vec<R::Id>,
    ) -> Result<Leaf<R>, ConfigError> {
        let id = record.id();
        if ancestors.contains(&id) {
            vwarn!(id = ?id, "record appears as its own descendant");
            return Err(ConfigError::CyclicRecord {
                id: format!("{id:?}"),
            });
        }
        let children = if record.children().is_empty() {
            None
        } else {
            ancestors.push(id.clone());
            let built = self.build_scope(record.children(), Some(&id), ancestors);
            ancestors.pop();
            Some(built?).filter(|b| !b.is_empty())
        };
        Ok(Leaf {
            record: Arc::clone(record),
            children,
        })
    }

    fn group_leaves(
        &self,
        mut leaves: Vec<Leaf<R>>,
        scope: Option<&R::Id>,
        parent: Option<&GroupId<R::Id>>,
        level: usize,
    ) -> Result<Branch<R>, ConfigError> {
        let Some(spec) = self.levels.get(level) else {
            if let Some(order) = &self.leaf_order {
                leaves.sort_by(|a, b| order(&a.record, &b.record));
            }
            return Ok(Branch::Leaves(leaves));
        };

        let mut slots = IdMap::<Value, usize>::new();
        let mut buckets: Vec<(Value, Vec<Leaf<R>>)> = Vec::new();
        let mut kind: Option<ValueKind> = None;
        for leaf in leaves {
            let key = (spec.key)(&leaf.record);
            check_kind(&mut kind, &key, level)?;
            match slots.get(&key) {
                Some(&i) => buckets[i].1.push(leaf),
                None => {
                    slots.insert(key.clone(), buckets.len());
                    let mut members = Vec::new();
                    members.push(leaf);
                    buckets.push((key, members));
                }
            }
        }

        let mut groups = Vec::with_capacity(buckets.len());
        for (key, members) in buckets {
            let Some(first) = members.first().map(|l| Arc::clone(&l.record)) else {
                continue;
            };
            let display = self.display(level, &first, &key);
            let id = match parent {
                Some(parent) => parent.child(key),
                None => {
                    let mut path = Vec::with_capacity(self.levels.len());
                    path.push(key);
                    GroupId::new(scope.cloned(), path)
                }
            };
            let branch = self.group_leaves(members, scope, Some(&id), level + 1)?;
            groups.push(Group {
                node: Arc::new(GroupNode::new(id, display)),
                first,
                branch,
            });
        }
        if let Some(order) = &spec.order {
            groups.sort_by(|a, b| order(&a.first, &b.first));
        }
        Ok(Branch::Groups(groups))
    }

    /// Whether the group at `index` among `siblings` stays in place if its first-seen member is
    /// replaced by `candidate` (same id, new attributes).
    fn group_stays_ordered(
        &self,
        level: usize,
        siblings: &[Group<R>],
        index: usize,
        candidate: &R,
        order: &SourceOrder<R::Id>,
    ) -> bool {
        let Some(cmp) = self.levels.get(level).and_then(|l| l.order.as_ref()) else {
            return true;
        };
        let rank = |a: &R, b: &R| {
            cmp(a, b).then_with(|| position_in(order, a).cmp(&position_in(order, b)))
        };
        let before = index.checked_sub(1).and_then(|i| siblings.get(i));
        let after = siblings.get(index + 1);
        before.is_none_or(|g| rank(g.first.as_ref(), candidate) != Ordering::Greater)
            && after.is_none_or(|g| rank(candidate, g.first.as_ref()) != Ordering::Greater)
    }

    /// Adds a top-level record.
    ///
    /// Incremental only when every group on the record's key path already exists and the record
    /// does not become the first-seen member of any of them.
    pub(crate) fn insert(
        &self,
        root: &mut Branch<R>,
        record: &Arc<R>,
        order: &SourceOrder<R::Id>,
    ) -> Result<Outcome<R>, ConfigError> {
        if !self.accepts(record) {
            return Ok(Outcome::Unchanged);
        }
        let leaf = self.build_leaf(record, &mut Vec::new())?;
        let Some(path) = root.find_path(&self.keys_of(record)) else {
            vtrace!("insert: new group required");
            return Ok(Outcome::Rebuild);
        };
        let new_pos = position_in(order, record.as_ref());
        if root
            .chain(&path)
            .iter()
            .any(|g| new_pos < position_in(order, g.first.as_ref()))
        {
            vtrace!("insert: record becomes first-seen member of its group");
            return Ok(Outcome::Rebuild);
        }
        let Some(leaves) = root.leaves(&path) else {
            return Ok(Outcome::Rebuild);
        };
        let at = self.insertion_point(leaves, record, None, order);
        let position = root.offset(&path, at);
        let mut entries = Vec::with_capacity(leaf.len());
        leaf.flatten(path.len(), &mut entries);

        let Some(leaves) = root.leaves_mut(&path) else {
            return Ok(Outcome::Rebuild);
        };
        leaves.insert(at, leaf);
        vtrace!(position, len = entries.len(), "insert: incremental");
        Ok(Outcome::Inserted { position, entries })
    }

    /// Removes a top-level record.
    ///
    /// Rebuilds when the record is the last member of its group, or the first-seen member of any
    /// enclosing group.
    pub(crate) fn remove(&self, root: &mut Branch<R>, id: &R::Id) -> Outcome<R> {
        let Some(slot) = root.locate(id) else {
            return Outcome::Unchanged;
        };
        let Some(leaves) = root.leaves(&slot.groups) else {
            return Outcome::Rebuild;
        };
        if !slot.groups.is_empty() && leaves.len() == 1 {
            vtrace!("remove: group becomes empty");
            return Outcome::Rebuild;
        }
        if root.chain(&slot.groups).iter().any(|g| g.first.id() == *id) {
            vtrace!("remove: first-seen member of its group");
            return Outcome::Rebuild;
        }
        let position = root.offset(&slot.groups, slot.leaf);
        let Some(leaves) = root.leaves_mut(&slot.groups) else {
            return Outcome::Rebuild;
        };
        let removed = leaves.remove(slot.leaf);
        vtrace!(position, len = removed.len(), "remove: incremental");
        Outcome::Removed {
            position,
            len: removed.len(),
        }
    }

    /// Reacts to a replaced record whose `changed` attributes may affect grouping or order.
    pub(crate) fn change(
        &self,
        root: &mut Branch<R>,
        record: &Arc<R>,
        changed: &[String],
        order: &SourceOrder<R::Id>,
    ) -> Result<Outcome<R>, ConfigError> {
        let id = record.id();
        if !order.contains_key(&id) {
            vtrace!("change: nested record");
            return Ok(Outcome::Rebuild);
        }
        let accepted = self.accepts(record);
        let Some(slot) = root.locate(&id) else {
            return Ok(if accepted {
                Outcome::Rebuild
            } else {
                Outcome::Unchanged
            });
        };
        if !accepted {
            return Ok(Outcome::Rebuild);
        }
        let leaf = self.build_leaf(record, &mut Vec::new())?;

        let regroup = self.levels.iter().any(|l| l.affected_by(changed));
        if regroup {
            let keys = self.keys_of(record);
            let current: Vec<Value> = root
                .chain(&slot.groups)
                .iter()
                .map(|g| g.node.key().clone())
                .collect();
            if keys != current {
                return Ok(self.regroup(root, slot, leaf, &keys, order));
            }
        }
        Ok(self.resort(root, slot, leaf, order))
    }

    /// Moves a leaf between existing groups. Creating or destroying a group rebuilds instead.
    fn regroup(
        &self,
        root: &mut Branch<R>,
        slot: Slot,
        leaf: Leaf<R>,
        keys: &[Value],
        order: &SourceOrder<R::Id>,
    ) -> Outcome<R> {
        let id = leaf.record.id();
        let Some(target) = root.find_path(keys) else {
            vtrace!("regroup: new group required");
            return Outcome::Rebuild;
        };
        if root.chain(&slot.groups).iter().any(|g| g.first.id() == id) {
            vtrace!("regroup: first-seen member leaves its group");
            return Outcome::Rebuild;
        }
        let pos = position_in(order, leaf.record.as_ref());
        if root
            .chain(&target)
            .iter()
            .any(|g| pos < position_in(order, g.first.as_ref()))
        {
            vtrace!("regroup: record becomes first-seen member of its new group");
            return Outcome::Rebuild;
        }

        // Every group on the old path keeps its first-seen member, so none becomes empty and
        // the indexes in `target` stay valid after the detach.
        let Some(source) = root.leaves_mut(&slot.groups) else {
            return Outcome::Rebuild;
        };
        source.remove(slot.leaf);
        let Some(destination) = root.leaves(&target) else {
            return Outcome::Rebuild;
        };
        let at = self.insertion_point(destination, &leaf.record, None, order);
        if let Some(destination) = root.leaves_mut(&target) {
            destination.insert(at, leaf);
        }
        vtrace!("regroup: incremental");
        Outcome::Regrouped
    }

    /// Re-positions a leaf within its unchanged group.
    fn resort(
        &self,
        root: &mut Branch<R>,
        slot: Slot,
        leaf: Leaf<R>,
        order: &SourceOrder<R::Id>,
    ) -> Outcome<R> {
        let id = leaf.record.id();

        // The first-seen member drives group display and order.
        let chain = root.chain(&slot.groups);
        for (level, group) in chain.iter().enumerate() {
            if group.first.id() != id {
                continue;
            }
            if self.display(level, &leaf.record, group.node.key()) != *group.node.display() {
                return Outcome::Rebuild;
            }
            let siblings = match level {
                0 => &*root,
                _ => &chain[level - 1].branch,
            };
            let Branch::Groups(siblings) = siblings else {
                return Outcome::Rebuild;
            };
            if !self.group_stays_ordered(level, siblings, slot.groups[level], &leaf.record, order)
            {
                return Outcome::Rebuild;
            }
        }
        for depth in 1..=slot.groups.len() {
            if let Some(group) = root.group_mut(&slot.groups[..depth]) {
                if group.first.id() == id {
                    group.first = Arc::clone(&leaf.record);
                }
            }
        }

        let Some(leaves) = root.leaves(&slot.groups) else {
            return Outcome::Rebuild;
        };
        let Some(old) = leaves.get(slot.leaf) else {
            return Outcome::Rebuild;
        };
        let at = self.insertion_point(leaves, &leaf.record, Some(slot.leaf), order);
        let from = root.offset(&slot.groups, slot.leaf);
        let len = old.len();
        let same_shape = at == slot.leaf && {
            let mut before = Vec::with_capacity(len);
            let mut after = Vec::with_capacity(leaf.len());
            old.flatten(0, &mut before);
            leaf.flatten(0, &mut after);
            before == after
        };

        let depth = slot.groups.len();
        let Some(leaves) = root.leaves_mut(&slot.groups) else {
            return Outcome::Rebuild;
        };
        let mut entries = Vec::with_capacity(leaf.len());
        leaf.flatten(depth, &mut entries);
        if same_shape {
            leaves[slot.leaf] = leaf;
            return Outcome::Updated {
                position: from,
                entries,
            };
        }
        leaves.remove(slot.leaf);
        leaves.insert(at, leaf);
        let to = root.offset(&slot.groups, at);
        vtrace!(from, to, "change: leaf moved");
        Outcome::Moved {
            from,
            len,
            to,
            entries,
        }
    }
}

fn check_kind(kind: &mut Option<ValueKind>, key: &Value, level: usize) -> Result<(), ConfigError> {
    if key.is_null() {
        return Ok(());
    }
    match *kind {
        None => {
            *kind = Some(key.kind());
            Ok(())
        }
        Some(expected) if expected != key.kind() => {
            vwarn!(level, %expected, found = %key.kind(), "grouping keys of mixed kinds");
            Err(ConfigError::MixedKeyTypes {
                level,
                expected,
                found: key.kind(),
            })
        }
        Some(_) => Ok(()),
    }
}

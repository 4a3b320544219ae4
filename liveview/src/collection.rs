use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::grouping::{Branch, Engine, Outcome, source_order};
use crate::key::IdMap;
use crate::{
    Change, Collection, Entry, EntryId, Filter, GroupDescriptor, GroupId, GroupNode, KeySpec,
    Listener, Listeners, Member, Node, Record, Result, Source, SourceEvent, SubscriptionId,
    VirtualCollectionOptions,
};

/// A live, ordered projection of a source collection.
///
/// The projection is the pre-order flattening of a (possibly grouped, sorted and filtered) tree:
/// group nodes precede their members, records precede their children. It never mutates the source
/// and keeps itself consistent with it as [`SourceEvent`]s are forwarded through
/// [`VirtualCollection::apply`].
///
/// Every mutating operation returns the emitted [`Change`]s and also delivers them, in order, to
/// subscribed listeners. Applying the returned changes to the previous sequence yields the current
/// one.
///
/// All operations that rebuild the projection are atomic: when a rebuild fails with a
/// configuration error the previous projection and configuration are kept.
pub struct VirtualCollection<R: Record> {
    options: VirtualCollectionOptions<R>,
    engine: Engine<R>,
    tree: Branch<R>,
    entries: Vec<Entry<R>>,

    record_index: IdMap<R::Id, usize>,
    group_index: IdMap<GroupId<R::Id>, usize>,
    parents: IdMap<R::Id, GroupId<R::Id>>,

    listeners: Listeners<Entry<R>>,
}

impl<R: Record + 'static> VirtualCollection<R> {
    /// Builds the projection of `source` under `options`.
    pub fn new<S>(source: &S, options: VirtualCollectionOptions<R>) -> Result<Self>
    where
        S: Source<Record = R> + ?Sized,
    {
        let engine = Engine::new(&options)?;
        let tree = engine.build(source.records())?;
        vdebug!(
            records = source.records().len(),
            levels = options.grouping.len(),
            sorted = options.comparator.is_some(),
            filtered = options.filter.is_some(),
            "VirtualCollection::new"
        );
        let mut vc = Self {
            options,
            engine,
            tree,
            entries: Vec::new(),
            record_index: IdMap::new(),
            group_index: IdMap::new(),
            parents: IdMap::new(),
            listeners: Listeners::new(),
        };
        vc.reflatten();
        Ok(vc)
    }

    /// Replaces the filter (`None` keeps every record) and rebuilds.
    pub fn filter<S>(
        &mut self,
        source: &S,
        filter: Option<Filter<R>>,
    ) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let mut options = self.options.clone();
        options.filter = filter;
        self.reconfigure(source, options)
    }

    /// Replaces the leaf comparator (`None` keeps source order) and rebuilds.
    pub fn set_comparator<S>(
        &mut self,
        source: &S,
        comparator: Option<KeySpec<R>>,
    ) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let mut options = self.options.clone();
        options.comparator = comparator;
        self.reconfigure(source, options)
    }

    /// Replaces the grouping levels (empty = ungrouped) and rebuilds.
    pub fn set_grouping<S>(
        &mut self,
        source: &S,
        grouping: Vec<GroupDescriptor<R>>,
    ) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let mut options = self.options.clone();
        options.grouping = grouping;
        self.reconfigure(source, options)
    }

    fn reconfigure<S>(
        &mut self,
        source: &S,
        options: VirtualCollectionOptions<R>,
    ) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let engine = Engine::new(&options)?;
        let tree = engine.build(source.records())?;
        self.options = options;
        self.engine = engine;
        self.tree = tree;
        vdebug!(len = self.tree.len(), "reconfigure");
        Ok(self.reset())
    }
}

impl<R: Record> VirtualCollection<R> {
    pub fn options(&self) -> &VirtualCollectionOptions<R> {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `index`.
    pub fn at(&self, index: usize) -> Result<&Entry<R>> {
        self.try_item(index)
    }

    pub fn entries(&self) -> &[Entry<R>] {
        &self.entries
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Entry<R>> {
        self.entries.iter()
    }

    /// The projected record with this id, or `None` if it is not part of the projection.
    ///
    /// Group nodes are resolved by [`VirtualCollection::group`]; [`VirtualCollection::lookup`]
    /// resolves either kind of entry from one [`EntryId`].
    pub fn get(&self, id: &R::Id) -> Option<&Arc<R>> {
        let index = *self.record_index.get(id)?;
        self.entries.get(index)?.record()
    }

    /// Projection index of a record.
    pub fn index_of(&self, id: &R::Id) -> Option<usize> {
        self.record_index.get(id).copied()
    }

    pub fn group(&self, id: &GroupId<R::Id>) -> Option<&Arc<GroupNode<R::Id>>> {
        let index = *self.group_index.get(id)?;
        self.entries.get(index)?.group_node()
    }

    /// Projection index of a group node.
    pub fn group_index(&self, id: &GroupId<R::Id>) -> Option<usize> {
        self.group_index.get(id).copied()
    }

    /// Identity lookup across leaves and group nodes. Unknown ids resolve to `None`.
    pub fn lookup(&self, id: &EntryId<R::Id>) -> Option<&Entry<R>> {
        let index = match id {
            EntryId::Record(id) => self.record_index.get(id),
            EntryId::Group(id) => self.group_index.get(id),
        };
        self.entries.get(*index?)
    }

    /// Direct members of a group, in projection order.
    pub fn members(&self, id: &GroupId<R::Id>) -> Option<Vec<Member<R::Id>>> {
        self.tree.members(id)
    }

    /// The innermost group containing a record.
    pub fn group_of(&self, id: &R::Id) -> Option<&GroupId<R::Id>> {
        self.parents.get(id)
    }

    pub fn subscribe(
        &mut self,
        listener: impl Fn(&Change<Entry<R>>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let listener: Listener<Entry<R>> = Arc::new(listener);
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Rebuilds the projection from the current source contents and emits a single `Reset`.
    pub fn rebuild<S>(&mut self, source: &S) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let tree = self.engine.build(source.records())?;
        self.tree = tree;
        vdebug!(len = self.tree.len(), "rebuild");
        Ok(self.reset())
    }

    /// Brings the projection up to date with a source mutation that has already been applied to
    /// `source`.
    ///
    /// Structural changes to a flat projection map to the minimal `Add`/`Remove` sequence. Changes
    /// that create or destroy a group, change group order or regroup a record emit one `Reset`.
    pub fn apply<S>(
        &mut self,
        source: &S,
        event: &SourceEvent<R>,
    ) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        vtrace!(event = ?event, "apply");
        let outcome = match event {
            SourceEvent::Sort | SourceEvent::Reset => Outcome::Rebuild,
            SourceEvent::Insert { record, .. } => {
                let order = source_order(source.records());
                self.engine.insert(&mut self.tree, record, &order)?
            }
            SourceEvent::Remove { record, .. } => self.engine.remove(&mut self.tree, &record.id()),
            SourceEvent::Change { record, changed } => {
                let order = source_order(source.records());
                self.engine.change(&mut self.tree, record, changed, &order)?
            }
        };
        self.settle(source, outcome)
    }

    fn settle<S>(&mut self, source: &S, outcome: Outcome<R>) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let changes = match outcome {
            Outcome::Unchanged => Vec::new(),
            Outcome::Rebuild => return self.rebuild(source),
            Outcome::Regrouped => {
                vdebug!(len = self.entries.len(), "regroup");
                return Ok(self.reset());
            }
            Outcome::Updated { position, entries } => {
                for (slot, entry) in self.entries.iter_mut().skip(position).zip(entries) {
                    *slot = entry;
                }
                Vec::new()
            }
            Outcome::Inserted { position, entries } => {
                let mut changes = Vec::with_capacity(entries.len());
                self.splice_in(position, entries, &mut changes);
                changes
            }
            Outcome::Removed { position, len } => {
                let mut changes = Vec::with_capacity(len);
                self.splice_out(position, len, &mut changes);
                changes
            }
            Outcome::Moved {
                from,
                len,
                to,
                entries,
            } => {
                let mut changes = Vec::with_capacity(len + entries.len());
                self.splice_out(from, len, &mut changes);
                self.splice_in(to, entries, &mut changes);
                changes
            }
        };
        self.reindex();
        self.debug_check();
        self.listeners.emit_all(&changes);
        Ok(changes)
    }

    fn splice_in(
        &mut self,
        position: usize,
        entries: Vec<Entry<R>>,
        changes: &mut Vec<Change<Entry<R>>>,
    ) {
        let position = position.min(self.entries.len());
        for (k, entry) in entries.iter().enumerate() {
            changes.push(Change::Add {
                item: entry.clone(),
                index: position + k,
            });
        }
        self.entries.splice(position..position, entries);
    }

    fn splice_out(&mut self, position: usize, len: usize, changes: &mut Vec<Change<Entry<R>>>) {
        let start = position.min(self.entries.len());
        let end = (start + len).min(self.entries.len());
        for item in self.entries.drain(start..end) {
            changes.push(Change::Remove { item, index: start });
        }
    }

    /// Re-flattens the whole tree and emits a single `Reset`.
    fn reset(&mut self) -> Vec<Change<Entry<R>>> {
        self.reflatten();
        let changes = alloc::vec![Change::Reset];
        self.listeners.emit_all(&changes);
        changes
    }

    fn reflatten(&mut self) {
        self.entries.clear();
        self.tree.flatten(0, &mut self.entries);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.record_index.clear();
        self.group_index.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            match &entry.node {
                Node::Leaf(record) => {
                    self.record_index.insert(record.id(), i);
                }
                Node::Group(group) => {
                    self.group_index.insert(group.id().clone(), i);
                }
            }
        }
        self.parents.clear();
        self.tree.collect_parents(None, &mut self.parents);
    }

    #[cfg(debug_assertions)]
    fn debug_check(&self) {
        let mut expected = Vec::with_capacity(self.entries.len());
        self.tree.flatten(0, &mut expected);
        debug_assert!(
            expected == self.entries,
            "incremental update diverged from the tree"
        );
    }

    #[cfg(not(debug_assertions))]
    fn debug_check(&self) {}
}

impl<R: Record> Collection for VirtualCollection<R> {
    type Item = Entry<R>;

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn item(&self, index: usize) -> Option<&Entry<R>> {
        self.entries.get(index)
    }
}

impl<'a, R: Record> IntoIterator for &'a VirtualCollection<R> {
    type Item = &'a Entry<R>;
    type IntoIter = core::slice::Iter<'a, Entry<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<R: Record> fmt::Debug for VirtualCollection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualCollection")
            .field("options", &self.options)
            .field("entries", &self.entries)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}


use alloc::vec::Vec;

use liveview::{
    Change, Entry, Filter, GroupDescriptor, KeySpec, Record, Result, Source, SourceEvent,
    VirtualCollection, VirtualCollectionOptions,
};

use crate::{SlidingWindow, WindowOptions, WindowState};

/// A framework-neutral controller that owns a [`VirtualCollection`] and a [`SlidingWindow`]
/// over it.
///
/// Adapters forward source mutations to [`Controller::apply`] and viewport events to
/// [`Controller::update_position`] / [`Controller::update_window_size`]. Both layers are fully
/// updated, and their listeners notified, before each call returns. The returned changes are the
/// window's; subscribe on the collection to observe the full projection as well.
pub struct Controller<R: Record> {
    collection: VirtualCollection<R>,
    window: SlidingWindow<Entry<R>>,
}

impl<R: Record + 'static> Controller<R> {
    pub fn new<S>(
        source: &S,
        options: VirtualCollectionOptions<R>,
        window: WindowOptions,
    ) -> Result<Self>
    where
        S: Source<Record = R> + ?Sized,
    {
        let collection = VirtualCollection::new(source, options)?;
        Ok(Self::from_collection(collection, window))
    }

    /// Replaces the filter of the underlying collection.
    pub fn filter<S>(
        &mut self,
        source: &S,
        filter: Option<Filter<R>>,
    ) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let changes = self.collection.filter(source, filter)?;
        Ok(self.window.sync(&self.collection, &changes))
    }

    pub fn set_comparator<S>(
        &mut self,
        source: &S,
        comparator: Option<KeySpec<R>>,
    ) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let changes = self.collection.set_comparator(source, comparator)?;
        Ok(self.window.sync(&self.collection, &changes))
    }

    pub fn set_grouping<S>(
        &mut self,
        source: &S,
        grouping: Vec<GroupDescriptor<R>>,
    ) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let changes = self.collection.set_grouping(source, grouping)?;
        Ok(self.window.sync(&self.collection, &changes))
    }
}

impl<R: Record> Controller<R> {
    pub fn from_collection(collection: VirtualCollection<R>, window: WindowOptions) -> Self {
        let window = SlidingWindow::new(&collection, window);
        Self { collection, window }
    }

    pub fn collection(&self) -> &VirtualCollection<R> {
        &self.collection
    }

    pub fn window(&self) -> &SlidingWindow<Entry<R>> {
        &self.window
    }

    /// Gives access to the window for subscribing; moves go through the controller.
    pub fn window_mut(&mut self) -> &mut SlidingWindow<Entry<R>> {
        &mut self.window
    }

    pub fn into_parts(self) -> (VirtualCollection<R>, SlidingWindow<Entry<R>>) {
        (self.collection, self.window)
    }

    /// Entries currently inside the window.
    pub fn visible(&self) -> &[Entry<R>] {
        self.window.models()
    }

    pub fn state(&self) -> WindowState {
        self.window.state()
    }

    pub fn is_at_end(&self) -> bool {
        self.window.is_at_end(&self.collection)
    }

    /// Forwards a source mutation through the collection and then the window.
    ///
    /// Visible entries always carry the collection's current records, including records changed
    /// in place without a notification. On error neither layer changes.
    pub fn apply<S>(
        &mut self,
        source: &S,
        event: &SourceEvent<R>,
    ) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let changes = match self.collection.apply(source, event) {
            Ok(changes) => changes,
            Err(err) => {
                vwarn!(error = %err, "apply rejected");
                return Err(err);
            }
        };
        let out = self.window.sync(&self.collection, &changes);
        // Entries updated in place keep their ids and emit nothing.
        self.window.refresh(&self.collection);
        Ok(out)
    }

    pub fn rebuild<S>(&mut self, source: &S) -> Result<Vec<Change<Entry<R>>>>
    where
        S: Source<Record = R> + ?Sized,
    {
        let changes = self.collection.rebuild(source)?;
        Ok(self.window.sync(&self.collection, &changes))
    }

    pub fn update_position(&mut self, position: usize) -> Vec<Change<Entry<R>>> {
        self.window.update_position(&self.collection, position)
    }

    pub fn update_window_size(&mut self, window_size: usize) -> Vec<Change<Entry<R>>> {
        self.window.update_window_size(&self.collection, window_size)
    }

    /// Moves the window by `delta` entries, clamped at both ends.
    pub fn scroll_by(&mut self, delta: isize) -> Vec<Change<Entry<R>>> {
        let position = self.window.position().saturating_add_signed(delta);
        self.update_position(position)
    }

    /// Moves the window so the entry at projection `index` is its first entry. Past the end the
    /// window stops at the last entry.
    pub fn scroll_to_index(&mut self, index: usize) -> Vec<Change<Entry<R>>> {
        self.update_position(index)
    }

    /// Moves the window so `id`'s record is its first entry. Returns `None` when the record is not
    /// part of the projection.
    pub fn scroll_to_record(&mut self, id: &R::Id) -> Option<Vec<Change<Entry<R>>>> {
        let index = self.collection.index_of(id)?;
        Some(self.update_position(index))
    }
}

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use liveview::{Change, Collection, Listener, Listeners, Result, SubscriptionId};

/// Construction options for a [`SlidingWindow`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WindowOptions {
    /// First backing index shown by the window.
    pub position: usize,
    /// Requested window length.
    pub window_size: usize,
}

impl WindowOptions {
    pub fn new(window_size: usize) -> Self {
        Self {
            position: 0,
            window_size,
        }
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }
}

/// A snapshot of a window's requested position and size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowState {
    pub position: usize,
    pub size: usize,
}

/// A half-open range of backing indexes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowRange {
    pub start: usize,
    pub end: usize,
}

impl WindowRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    fn overlaps(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.start.max(other.start) < self.end.min(other.end)
    }
}

/// A bounded, repositionable slice of an ordered backing collection.
///
/// The window never holds a reference to its backing: every operation that depends on backing
/// contents takes it as an argument. After any operation `models` equals the backing slice over
/// `effective_range`, whose length is `min(size, backing_len - position)`.
///
/// Like the projections it windows, it reports every change to its own contents as a [`Change`]
/// sequence and delivers it to subscribed listeners.
pub struct SlidingWindow<T> {
    position: usize,
    size: usize,
    models: Vec<T>,
    listeners: Listeners<T>,
}

impl<T: Clone> SlidingWindow<T> {
    /// Creates a window over `backing`. The initial slice is not reported as a change.
    ///
    /// `options.position` is clamped like [`SlidingWindow::update_position`] does.
    pub fn new<B>(backing: &B, options: WindowOptions) -> Self
    where
        B: Collection<Item = T> + ?Sized,
    {
        let size = options.window_size;
        let position = options.position.min(backing.len().saturating_sub(1));
        let mut w = Self {
            position,
            size,
            models: Vec::new(),
            listeners: Listeners::new(),
        };
        w.models = w.slice(backing);
        vdebug!(position, size, len = w.models.len(), "SlidingWindow::new");
        w
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn state(&self) -> WindowState {
        WindowState {
            position: self.position,
            size: self.size,
        }
    }

    /// The backing range currently shown.
    pub fn effective_range(&self) -> WindowRange {
        WindowRange {
            start: self.position,
            end: self.position + self.models.len(),
        }
    }

    /// Largest position that still shows a full window. Positions past it show a trimmed tail.
    pub fn max_position<B>(&self, backing: &B) -> usize
    where
        B: Collection<Item = T> + ?Sized,
    {
        backing.len().saturating_sub(self.size)
    }

    /// Whether the window shows the last backing entry (or the backing is empty).
    pub fn is_at_end<B>(&self, backing: &B) -> bool
    where
        B: Collection<Item = T> + ?Sized,
    {
        self.position + self.models.len() >= backing.len()
    }

    pub fn models(&self) -> &[T] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// The entry at window `index`.
    pub fn at(&self, index: usize) -> Result<&T> {
        self.try_item(index)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.models.iter()
    }

    pub fn subscribe(
        &mut self,
        listener: impl Fn(&Change<T>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let listener: Listener<T> = Arc::new(listener);
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Changes the requested window length.
    ///
    /// The position is kept. Growing or shrinking reports the tail delta; a window that outgrows
    /// the backing is trimmed to the entries that exist.
    pub fn update_window_size<B>(&mut self, backing: &B, window_size: usize) -> Vec<Change<T>>
    where
        B: Collection<Item = T> + ?Sized,
    {
        vtrace!(from = self.size, to = window_size, "update_window_size");
        self.size = window_size;
        if self.target(backing.len(), self.position) == self.effective_range() {
            return Vec::new();
        }
        let changes = self.move_to(backing, self.position);
        self.finish(changes)
    }

    /// Moves the window to `position`, clamped to the last backing index.
    ///
    /// Near the end the window is trimmed to the remaining entries rather than pulled back.
    /// Overlapping moves report entries leaving the window (removals first) and entries entering
    /// it; moves of at least a full window reset.
    pub fn update_position<B>(&mut self, backing: &B, position: usize) -> Vec<Change<T>>
    where
        B: Collection<Item = T> + ?Sized,
    {
        let position = position.min(backing.len().saturating_sub(1));
        let target = self.target(backing.len(), position);
        if position == self.position && target == self.effective_range() {
            return Vec::new();
        }
        let changes = self.move_to(backing, position);
        self.finish(changes)
    }

    /// Brings the window up to date with changes already applied to `backing`.
    ///
    /// Position and size are kept; the window re-slices around them.
    pub fn sync<B>(&mut self, backing: &B, changes: &[Change<T>]) -> Vec<Change<T>>
    where
        B: Collection<Item = T> + ?Sized,
    {
        if changes.is_empty() {
            return Vec::new();
        }
        if changes.iter().any(Change::is_reset) {
            let changes = self.reset(backing);
            return self.finish(changes);
        }
        let single = changes.len() == 1;
        if !single
            && changes
                .iter()
                .any(|c| c.index().is_some_and(|i| i < self.position))
        {
            vtrace!(changes = changes.len(), "sync: batch before window start");
            let changes = self.reset(backing);
            return self.finish(changes);
        }

        let mut out = Vec::new();
        for change in changes {
            match change {
                Change::Add { item, index } => self.mirror_add(backing, item, *index, &mut out),
                Change::Remove { index, .. } => self.mirror_remove(*index, &mut out),
                Change::Reset => {}
            }
        }
        let target = self.target(backing.len(), self.position);
        self.fit(backing, target.end, &mut out);
        self.finish(out)
    }

    /// Re-reads the shown entries from `backing` without reporting a change.
    ///
    /// For in-place updates that keep every entry's identity and position but replace its
    /// contents, which the backing does not report as a [`Change`].
    pub fn refresh<B>(&mut self, backing: &B)
    where
        B: Collection<Item = T> + ?Sized,
    {
        let models = self.slice(backing);
        debug_assert_eq!(models.len(), self.models.len());
        self.models = models;
    }

    fn mirror_add<B>(&mut self, backing: &B, item: &T, index: usize, out: &mut Vec<Change<T>>)
    where
        B: Collection<Item = T> + ?Sized,
    {
        if self.size == 0 {
            return;
        }
        let entering = if index < self.position {
            // The entry before the window start shifts in.
            match backing.item(self.position) {
                Some(item) => (0, item.clone()),
                None => return,
            }
        } else {
            let at = index - self.position;
            if at > self.models.len() || at >= self.size {
                return;
            }
            (at, item.clone())
        };
        if self.models.len() >= self.size {
            self.pop(out);
        }
        let (at, item) = entering;
        self.models.insert(at, item.clone());
        out.push(Change::Add { item, index: at });
    }

    fn mirror_remove(&mut self, index: usize, out: &mut Vec<Change<T>>) {
        let at = if index < self.position {
            0
        } else {
            index - self.position
        };
        if at < self.models.len() {
            let item = self.models.remove(at);
            out.push(Change::Remove { item, index: at });
        }
    }

    fn pop(&mut self, out: &mut Vec<Change<T>>) {
        if let Some(item) = self.models.pop() {
            out.push(Change::Remove {
                item,
                index: self.models.len(),
            });
        }
    }

    /// Trims or fills the tail so the window ends at backing index `end`.
    fn fit<B>(&mut self, backing: &B, end: usize, out: &mut Vec<Change<T>>)
    where
        B: Collection<Item = T> + ?Sized,
    {
        let len = end.saturating_sub(self.position);
        while self.models.len() > len {
            self.pop(out);
        }
        while self.models.len() < len {
            let Some(item) = backing.item(self.position + self.models.len()) else {
                break;
            };
            out.push(Change::Add {
                item: item.clone(),
                index: self.models.len(),
            });
            self.models.push(item.clone());
        }
    }

    fn target(&self, backing_len: usize, position: usize) -> WindowRange {
        WindowRange {
            start: position,
            end: position.saturating_add(self.size).min(backing_len).max(position),
        }
    }

    /// Moves to `position` with the minimal delta, or a reset when old and new ranges share no
    /// entry.
    fn move_to<B>(&mut self, backing: &B, position: usize) -> Vec<Change<T>>
    where
        B: Collection<Item = T> + ?Sized,
    {
        let old = self.effective_range();
        let new = self.target(backing.len(), position);
        if !old.overlaps(&new) {
            vtrace!(from = old.start, to = new.start, "window reset");
            self.position = position;
            return self.reset(backing);
        }
        vtrace!(from = old.start, to = new.start, "window delta");

        let mut out = Vec::new();
        for _ in old.start..new.start {
            let item = self.models.remove(0);
            out.push(Change::Remove { item, index: 0 });
        }
        self.position = new.start.max(old.start);
        let kept_end = old.end.min(new.end);
        self.fit(backing, kept_end, &mut out);

        // Entries entering in front.
        for (k, i) in (new.start..old.start).enumerate() {
            let Some(item) = backing.item(i) else {
                break;
            };
            self.models.insert(k, item.clone());
            out.push(Change::Add {
                item: item.clone(),
                index: k,
            });
        }
        self.position = new.start;
        self.fit(backing, new.end, &mut out);
        debug_assert_eq!(self.effective_range(), new);
        out
    }

    fn slice<B>(&self, backing: &B) -> Vec<T>
    where
        B: Collection<Item = T> + ?Sized,
    {
        let range = self.target(backing.len(), self.position);
        (range.start..range.end)
            .filter_map(|i| backing.item(i).cloned())
            .collect()
    }

    fn reset<B>(&mut self, backing: &B) -> Vec<Change<T>>
    where
        B: Collection<Item = T> + ?Sized,
    {
        self.models = self.slice(backing);
        alloc::vec![Change::Reset]
    }

    fn finish(&self, changes: Vec<Change<T>>) -> Vec<Change<T>> {
        self.listeners.emit_all(&changes);
        changes
    }
}

impl<T: Clone> Collection for SlidingWindow<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.models.len()
    }

    fn item(&self, index: usize) -> Option<&T> {
        self.models.get(index)
    }
}

impl<T: Clone> Clone for SlidingWindow<T> {
    fn clone(&self) -> Self {
        Self {
            position: self.position,
            size: self.size,
            models: self.models.clone(),
            listeners: self.listeners.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SlidingWindow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlidingWindow")
            .field("position", &self.position)
            .field("size", &self.size)
            .field("models", &self.models)
            .field("listeners", &self.listeners)
            .finish()
    }
}

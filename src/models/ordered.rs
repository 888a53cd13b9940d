//! Ordered element cache shared by attribute paths and content schema key paths
//!
//! The storage substrate only knows unordered associations, so an ordered path
//! is kept as three synchronized views:
//!
//! - the **serialized form**: a JSON array of element ids, the only durable
//!   record of the order
//! - the **ordered view**: the elements in path order (duplicates allowed)
//! - the **utilised view**: the distinct elements, i.e. the stored association
//!
//! The two in-memory views are materialized lazily from the serialized form on
//! first read and held in a compute-once cell, so shared readers behind an `Arc`
//! observe exactly one materialization. Every mutator re-derives the serialized
//! form from the ordered view.

use once_cell::sync::OnceCell;
use std::borrow::Cow;
use tracing::{debug, warn};
use uuid::Uuid;

/// An element that can take part in an ordered path
pub trait PathElement: Clone + PartialEq {
    /// Delimiter placed between path segments in the canonical path string
    const SEGMENT_DELIMITER: char;

    /// The id written into the serialized form
    fn storage_id(&self) -> Uuid;

    /// The segment this element contributes to the canonical path string
    fn path_segment(&self) -> Cow<'_, str>;
}

/// Whether the in-memory views have been materialized yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Only the serialized form (if any) and the stored association are present
    Unloaded,
    /// Ordered and utilised views are available
    Loaded,
}

#[derive(Debug, Clone, PartialEq)]
struct PathViews<T> {
    ordered: Vec<T>,
    utilised: Vec<T>,
}

impl<T: PathElement> PathViews<T> {
    fn empty() -> Self {
        Self {
            ordered: Vec::new(),
            utilised: Vec::new(),
        }
    }

    fn from_ordered(ordered: Vec<T>) -> Self {
        let mut utilised: Vec<T> = Vec::with_capacity(ordered.len());
        for element in &ordered {
            if !utilised.contains(element) {
                utilised.push(element.clone());
            }
        }
        Self { ordered, utilised }
    }

    fn add_utilised(&mut self, element: &T) {
        if !self.utilised.contains(element) {
            self.utilised.push(element.clone());
        }
    }

    fn encode(&self) -> String {
        let ids: Vec<serde_json::Value> = self
            .ordered
            .iter()
            .map(|element| serde_json::Value::String(element.storage_id().to_string()))
            .collect();
        serde_json::Value::Array(ids).to_string()
    }
}

/// Ordered sequence of elements with a cached set view and a serialized form
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use data_mapping_sdk::models::{Attribute, OrderedElements};
/// use uuid::Uuid;
///
/// let a = Arc::new(Attribute::new("http://example.org/a", None));
/// let b = Arc::new(Attribute::new("http://example.org/b", None));
///
/// let mut path = OrderedElements::new(Uuid::new_v4());
/// path.push(a.clone());
/// path.push(b.clone());
/// path.push(a.clone());
///
/// assert_eq!(path.ordered().len(), 3);
/// assert_eq!(path.utilised().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct OrderedElements<T> {
    owner: Uuid,
    serialized: Option<String>,
    stored: Vec<T>,
    views: OnceCell<PathViews<T>>,
}

impl<T: PathElement> OrderedElements<T> {
    /// Create an empty, not yet loaded sequence for the entity `owner`
    pub fn new(owner: Uuid) -> Self {
        Self {
            owner,
            serialized: None,
            stored: Vec::new(),
            views: OnceCell::new(),
        }
    }

    /// Create a sequence holding `elements` in order
    pub fn from_elements(owner: Uuid, elements: Vec<T>) -> Self {
        let mut sequence = Self::new(owner);
        sequence.set(elements);
        sequence
    }

    /// Rebuild a sequence from its durable parts
    ///
    /// `serialized` is the stored JSON id array (`None` if it was never written),
    /// `stored` the elements of the unordered association. Nothing is decoded until
    /// the first read.
    pub fn from_stored(owner: Uuid, serialized: Option<String>, stored: Vec<T>) -> Self {
        Self {
            owner,
            serialized,
            stored,
            views: OnceCell::new(),
        }
    }

    pub fn state(&self) -> CacheState {
        if self.views.get().is_some() {
            CacheState::Loaded
        } else {
            CacheState::Unloaded
        }
    }

    /// The durable serialized form
    ///
    /// `None` means the sequence was never written; `Some("[]")` means it was
    /// written empty.
    pub fn serialized(&self) -> Option<&str> {
        self.serialized.as_deref()
    }

    /// The serialized form re-derived from the ordered view
    ///
    /// Ids that no stored element matched, or a form that could not be parsed, do
    /// not survive. `None` only for a sequence that was never written.
    pub fn encoded(&self) -> Option<String> {
        self.serialized.as_ref().map(|_| self.views().encode())
    }

    /// Decode the serialized form into the in-memory views if not done yet
    pub fn materialize(&self) {
        self.views();
    }

    pub fn ordered(&self) -> &[T] {
        &self.views().ordered
    }

    /// Distinct elements of the sequence, in first-occurrence order
    pub fn utilised(&self) -> &[T] {
        &self.views().utilised
    }

    pub fn len(&self) -> usize {
        self.views().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views().ordered.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.views().ordered.get(index)
    }

    /// Look up a utilised element by its storage id
    pub fn find(&self, id: Uuid) -> Option<&T> {
        self.views()
            .utilised
            .iter()
            .find(|element| element.storage_id() == id)
    }

    /// Render the ordered view as one delimiter-joined string
    pub fn to_path_string(&self) -> String {
        let mut path = String::new();
        for (index, element) in self.views().ordered.iter().enumerate() {
            if index > 0 {
                path.push(T::SEGMENT_DELIMITER);
            }
            path.push_str(&element.path_segment());
        }
        path
    }

    /// Replace the whole sequence
    ///
    /// Returns `false` and leaves every view untouched when `elements` is
    /// element-wise equal to the current order.
    pub fn set(&mut self, elements: Vec<T>) -> bool {
        self.mutate(|views| {
            if views.ordered == elements {
                return (false, false);
            }

            *views = PathViews::from_ordered(elements);
            (true, true)
        })
    }

    /// Append an element to the end of the sequence
    pub fn push(&mut self, element: T) {
        self.mutate(|views| {
            views.add_utilised(&element);
            views.ordered.push(element);
            (true, ())
        })
    }

    /// Insert `element` at `index` unless that position already holds an equal element
    ///
    /// An index equal to the length appends. Returns whether the sequence changed.
    pub fn insert_at(&mut self, element: T, index: usize) -> bool {
        let owner = self.owner;
        self.mutate(|views| {
            let len = views.ordered.len();
            if index > len {
                warn!(
                    %owner,
                    index, len, "insert position out of range, ignoring element"
                );
                return (false, false);
            }

            if views.ordered.get(index) == Some(&element) {
                return (false, false);
            }

            views.add_utilised(&element);
            views.ordered.insert(index, element);
            (true, true)
        })
    }

    /// Remove the element at `index`
    ///
    /// The element stays in the utilised view while another occurrence remains in
    /// the ordered view.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        let owner = self.owner;
        self.mutate(|views| {
            if index >= views.ordered.len() {
                warn!(
                    %owner,
                    index,
                    len = views.ordered.len(),
                    "remove position out of range"
                );
                return (false, None);
            }

            let removed = views.ordered.remove(index);
            if !views.ordered.contains(&removed) {
                views.utilised.retain(|element| element != &removed);
            }
            (true, Some(removed))
        })
    }

    /// Remove all elements, leaving a loaded empty sequence
    pub fn clear(&mut self) -> bool {
        self.set(Vec::new())
    }

    fn views(&self) -> &PathViews<T> {
        self.views.get_or_init(|| self.decode())
    }

    fn mutate<R>(&mut self, apply: impl FnOnce(&mut PathViews<T>) -> (bool, R)) -> R {
        let mut views = match self.views.take() {
            Some(views) => views,
            None => self.decode(),
        };

        let (changed, result) = apply(&mut views);
        if changed || self.serialized.is_some() {
            let encoded = views.encode();
            if self.serialized.as_deref() != Some(encoded.as_str()) {
                self.serialized = Some(encoded);
            }
        }

        // The association is now carried by the utilised view
        self.stored.clear();
        self.views = OnceCell::with_value(views);
        result
    }

    fn decode(&self) -> PathViews<T> {
        let Some(serialized) = self.serialized.as_deref() else {
            debug!(owner = %self.owner, "ordered elements JSON is null");
            return PathViews::empty();
        };

        let ids: Vec<String> = match serde_json::from_str(serialized) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(
                    owner = %self.owner,
                    "couldn't parse ordered elements JSON, treating as empty: {}", e
                );
                return PathViews::empty();
            }
        };

        let mut ordered = Vec::with_capacity(ids.len());
        for id in ids {
            let resolved = Uuid::parse_str(&id)
                .ok()
                .and_then(|uuid| self.stored.iter().find(|e| e.storage_id() == uuid));

            match resolved {
                Some(element) => ordered.push(element.clone()),
                None => debug!(owner = %self.owner, element = %id, "no stored element for id, skipping"),
            }
        }

        PathViews::from_ordered(ordered)
    }
}

impl<T: PathElement> PartialEq for OrderedElements<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ordered() == other.ordered()
    }
}

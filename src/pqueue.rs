//! A min-heap priority queue.
//!
//! Entries are ordered by priority and then by insertion order, so equal
//! priorities come out first-in, first-out. Tree construction relies on
//! this to build the same tree on both sides of the codec.

/// An entry in the priority queue.
#[derive(Debug, Clone)]
struct HeapEntry<T> {
    priority: u64,
    seq: u64,
    data: T,
}

impl<T> HeapEntry<T> {
    fn key(&self) -> (u64, u64) {
        (self.priority, self.seq)
    }
}

/// A min-heap priority queue that pops the lowest-priority element first.
///
/// Uses 0-indexed storage with parent = (i-1)/2, children = 2i+1, 2i+2.
#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    nodes: Vec<HeapEntry<T>>,
    next_seq: u64,
}

impl<T> MinHeap<T> {
    /// Create a new, empty min-heap.
    pub fn new() -> Self {
        MinHeap {
            nodes: Vec::new(),
            next_seq: 0,
        }
    }

    /// Create an empty min-heap with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        MinHeap {
            nodes: Vec::with_capacity(capacity),
            next_seq: 0,
        }
    }

    /// Returns the number of elements in the heap.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Push an element onto the heap with the given priority.
    pub fn push(&mut self, priority: u64, data: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.nodes.push(HeapEntry {
            priority,
            seq,
            data,
        });
        self.sift_up(self.nodes.len() - 1);
    }

    /// Pop the minimum-priority element from the heap.
    ///
    /// Returns `None` if the heap is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.nodes.is_empty() {
            return None;
        }
        // Swap root with last, remove last, sift down root
        let last = self.nodes.len() - 1;
        self.nodes.swap(0, last);
        let result = self.nodes.pop()?;
        if !self.nodes.is_empty() {
            self.sift_down(0);
        }
        Some(result.data)
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.nodes[index].key() < self.nodes[parent].key() {
                self.nodes.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.nodes.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;

            if left < len && self.nodes[left].key() < self.nodes[smallest].key() {
                smallest = left;
            }
            if right < len && self.nodes[right].key() < self.nodes[smallest].key() {
                smallest = right;
            }

            if smallest == index {
                break;
            }

            self.nodes.swap(index, smallest);
            index = smallest;
        }
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

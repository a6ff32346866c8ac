use parking_lot::Mutex;

use crate::dbms::types::FrameId;

use super::buffer_pool_replacer::{check_frame_range, BufferPoolReplacerError, IBufferPoolReplacer};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct LruNode {
    prev: Option<FrameId>,
    next: Option<FrameId>,
    linked: bool,
}

/// Doubly linked list over frame IDs. Node `i` belongs to frame `i`, so
/// finding a frame's position never needs a lookup.
struct LruList {
    nodes: Vec<LruNode>,
    /// Least recently released
    head: Option<FrameId>,
    /// Most recently released
    tail: Option<FrameId>,
    len: usize,
}

impl LruList {
    fn push_back(&mut self, frame_id: FrameId) {
        self.nodes[frame_id] = LruNode {
            prev: self.tail,
            next: None,
            linked: true,
        };
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(frame_id),
            None => self.head = Some(frame_id),
        }
        self.tail = Some(frame_id);
        self.len += 1;
    }

    fn unlink(&mut self, frame_id: FrameId) -> bool {
        let node = self.nodes[frame_id];
        if !node.linked {
            return false;
        }
        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }
        self.nodes[frame_id] = LruNode::default();
        self.len -= 1;
        true
    }
}

/// Evicts the frame that was released (unpinned) longest ago.
///
/// Ordering is by recency of release, not of access: re-inserting a tracked
/// frame moves it to the most recent end.
pub struct LruReplacer {
    capacity: usize,
    list: Mutex<LruList>,
}

impl LruReplacer {
    /// Creates a new [`LruReplacer`] able to track frames `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        LruReplacer {
            capacity,
            list: Mutex::new(LruList {
                nodes: vec![LruNode::default(); capacity],
                head: None,
                tail: None,
                len: 0,
            }),
        }
    }
}

impl IBufferPoolReplacer for LruReplacer {
    fn insert(&self, frame_id: FrameId) -> Result<(), BufferPoolReplacerError> {
        check_frame_range(frame_id, self.capacity)?;

        let mut list = self.list.lock();
        list.unlink(frame_id);
        list.push_back(frame_id);
        Ok(())
    }

    fn victim(&self) -> Result<Option<FrameId>, BufferPoolReplacerError> {
        let mut list = self.list.lock();
        let victim = list.head;
        if let Some(frame_id) = victim {
            list.unlink(frame_id);
        }
        Ok(victim)
    }

    fn erase(&self, frame_id: FrameId) -> Result<bool, BufferPoolReplacerError> {
        check_frame_range(frame_id, self.capacity)?;

        Ok(self.list.lock().unlink(frame_id))
    }

    fn size(&self) -> Result<usize, BufferPoolReplacerError> {
        Ok(self.list.lock().len)
    }
}

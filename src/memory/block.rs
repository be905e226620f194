use crate::core::types::FileIdx;

/// Block length marking the end of the current file.
pub const END_OF_FILE: i64 = 0;
/// Block length marking lane shutdown.
pub const SHUTDOWN: i64 = -1;

/// Recyclable fixed-capacity buffer carrying one chunk of a file.
///
/// `length > 0` is the number of valid bytes, `0` marks end of file and `-1`
/// is the lane shutdown sentinel. Blocks are allocated once when a lane's
/// queue is built and only ever move between the queue's pools.
#[derive(Debug)]
pub struct DataBlock {
    buffer: Box<[u8]>,
    pub length: i64,
    pub file_idx: FileIdx,
}

impl DataBlock {
    pub fn new(capacity: usize) -> Self {
        DataBlock {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            length: END_OF_FILE,
            file_idx: FileIdx(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Valid bytes of the block; empty for markers.
    pub fn data(&self) -> &[u8] {
        if self.length > 0 {
            &self.buffer[..self.length as usize]
        } else {
            &[]
        }
    }

    pub fn buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    pub fn has_data(&self) -> bool {
        self.length > 0
    }

    pub fn is_end_of_file(&self) -> bool {
        self.length == END_OF_FILE
    }

    pub fn is_shutdown(&self) -> bool {
        self.length == SHUTDOWN
    }

    pub fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.buffer.len());
        self.length = len as i64;
    }

    pub fn mark_end_of_file(&mut self, file_idx: FileIdx) {
        self.length = END_OF_FILE;
        self.file_idx = file_idx;
    }

    pub fn mark_shutdown(&mut self) {
        self.length = SHUTDOWN;
    }
}

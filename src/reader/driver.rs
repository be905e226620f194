use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::memory::block::DataBlock;

/// How a driver carves a file into blocks
#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub block_size: usize,
    pub block_addon: usize,
    pub delimiters: [bool; 256],
}

impl ReadOptions {
    pub fn new(block_size: usize, block_addon: usize, delimiters: &[u8]) -> Self {
        let mut table = [false; 256];
        for &d in delimiters {
            table[d as usize] = true;
        }
        ReadOptions { block_size, block_addon, delimiters: table }
    }

    pub fn from_config(config: &Config) -> Self {
        ReadOptions::new(config.block_size, config.block_addon, config.delimiters.as_bytes())
    }
}

/// Pulls a file through fixed-capacity blocks.
///
/// Each call to [`read_next_block`](Self::read_next_block) reads up to
/// `block_size` bytes. When that fills the block mid-token, the block grows
/// by at most `block_addon` bytes until a delimiter has been consumed, so
/// tokens longer than the addon are the only ones split across blocks.
pub struct FileReaderDriver<R = File> {
    path: PathBuf,
    source: BufReader<R>,
    options: ReadOptions,
    bytes_read: u64,
}

impl FileReaderDriver<File> {
    pub fn open<P: AsRef<Path>>(path: P, options: ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            let err = Error::from(e);
            Error::new(err.kind, format!("could not open file {}: {}", path.display(), err.context))
        })?;
        if file.metadata()?.is_dir() {
            return Err(Error::invalid_argument(format!("{} is a directory", path.display())));
        }
        Ok(FileReaderDriver::from_reader(path, file, options))
    }
}

impl<R: Read> FileReaderDriver<R> {
    /// Wrap any byte source; `path` is only used for reporting.
    pub fn from_reader<P: AsRef<Path>>(path: P, source: R, options: ReadOptions) -> Self {
        FileReaderDriver {
            path: path.as_ref().to_path_buf(),
            source: BufReader::new(source),
            options,
            bytes_read: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fill `block` with the next chunk. A length of 0 means end of file.
    pub fn read_next_block(&mut self, block: &mut DataBlock) -> Result<()> {
        let capacity = block.capacity();
        let base = self.options.block_size.min(capacity);
        let addon = self.options.block_addon.min(capacity - base);
        let buf = block.buffer_mut();

        let mut filled = 0;
        while filled < base {
            match self.source.read(&mut buf[filled..base]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled == base && filled > 0 && addon > 0
            && !self.options.delimiters[buf[filled - 1] as usize]
        {
            filled += self.extend_to_delimiter(&mut buf[base..base + addon])?;
        }

        block.set_len(filled);
        self.bytes_read += filled as u64;
        Ok(())
    }

    /// Copy bytes into `out` up to and including the next delimiter.
    fn extend_to_delimiter(&mut self, out: &mut [u8]) -> Result<usize> {
        let mut written = 0;

        while written < out.len() {
            let available = match self.source.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                break;
            }

            let window = &available[..available.len().min(out.len() - written)];
            let (take, done) = match window.iter().position(|&b| self.options.delimiters[b as usize]) {
                Some(pos) => (pos + 1, true),
                None => (window.len(), false),
            };

            out[written..written + take].copy_from_slice(&window[..take]);
            written += take;
            self.source.consume(take);

            if done {
                break;
            }
        }

        Ok(written)
    }

    /// Release the underlying source, returning the total bytes read.
    pub fn close(self) -> u64 {
        self.bytes_read
    }
}

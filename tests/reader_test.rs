use std::fs;
use std::io::Cursor;
use std::thread;
use tempfile::TempDir;
use xsearch::core::error::ErrorKind;
use xsearch::core::types::FileIdx;
use xsearch::index::file_index::FileIndex;
use xsearch::memory::block::DataBlock;
use xsearch::memory::dual_queue::DualQueue;
use xsearch::parallel::reader_worker::{ReadOutcome, pump, stream_file};
use xsearch::reader::corpus::collect_files;
use xsearch::reader::driver::{FileReaderDriver, ReadOptions};

fn blocks_of(content: &str, block_size: usize, block_addon: usize) -> Vec<String> {
    let options = ReadOptions::new(block_size, block_addon, b" \t\n");
    let mut reader = FileReaderDriver::from_reader("mem", Cursor::new(content.as_bytes().to_vec()), options);
    let mut block = DataBlock::new(block_size + block_addon);
    let mut chunks = Vec::new();

    loop {
        reader.read_next_block(&mut block).unwrap();
        chunks.push(String::from_utf8(block.data().to_vec()).unwrap());
        if block.is_end_of_file() {
            break;
        }
    }
    assert_eq!(reader.close(), content.len() as u64);
    chunks
}

#[test]
fn fixed_blocks_without_addon() {
    let chunks = blocks_of("AAAAAAA BBBBBBB CCC\n", 8, 0);
    assert_eq!(chunks, vec!["AAAAAAA ", "BBBBBBB ", "CCC\n", ""]);
}

#[test]
fn addon_extends_blocks_to_the_next_delimiter() {
    let chunks = blocks_of("alpha beta gamma", 4, 16);
    assert_eq!(chunks, vec!["alpha ", "beta ", "gamma", ""]);
}

#[test]
fn token_longer_than_addon_is_split() {
    let chunks = blocks_of("abcdefghij klm", 4, 2);
    assert_eq!(chunks, vec!["abcdef", "ghij ", "klm", ""]);
}

#[test]
fn block_ending_on_a_delimiter_is_not_extended() {
    let chunks = blocks_of("abc def", 4, 16);
    assert_eq!(chunks, vec!["abc ", "def", ""]);
}

#[test]
fn open_reports_missing_files_and_directories() {
    let dir = TempDir::new().unwrap();
    let options = ReadOptions::new(8, 0, b" ");

    let err = FileReaderDriver::open(dir.path().join("nope.txt"), options.clone()).err().unwrap();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.context.contains("could not open file"));

    let err = FileReaderDriver::open(dir.path(), options).err().unwrap();
    assert_eq!(err.kind, ErrorKind::InvalidArgument);
}

#[test]
fn pump_tags_blocks_and_ends_with_end_of_file() {
    let queue = DualQueue::new(2, 8);
    let options = ReadOptions::new(8, 0, b" ");
    let mut reader = FileReaderDriver::from_reader("mem", Cursor::new(b"0123456789".to_vec()), options);

    let seen = thread::scope(|s| {
        let consumer = s.spawn(|| {
            let mut seen = Vec::new();
            loop {
                let block = queue.pop_full().unwrap();
                let done = block.is_end_of_file();
                seen.push((block.data().to_vec(), block.file_idx));
                queue.push_empty(block);
                if done {
                    break seen;
                }
            }
        });

        let stats = pump(&queue, &mut reader, FileIdx(3)).unwrap();
        assert_eq!(stats.bytes, 10);
        assert_eq!(stats.blocks, 3);
        consumer.join().unwrap()
    });

    assert_eq!(
        seen,
        vec![
            (b"01234567".to_vec(), FileIdx(3)),
            (b"89".to_vec(), FileIdx(3)),
            (Vec::new(), FileIdx(3)),
        ]
    );
    assert_eq!(queue.empty_len(), 2);
}

#[test]
fn unopenable_file_is_skipped_and_not_registered() {
    let dir = TempDir::new().unwrap();
    let queue = DualQueue::new(2, 8);
    let files = FileIndex::new();
    let options = ReadOptions::new(8, 0, b" ");

    let outcome = stream_file(&queue, &files, &dir.path().join("gone"), &options).unwrap();
    match outcome {
        ReadOutcome::Skipped { error } => assert_eq!(error.kind, ErrorKind::NotFound),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(files.is_empty());
    assert_eq!(queue.full_len(), 0);
    assert_eq!(queue.empty_len(), 2);
}

#[test]
fn closed_lane_stops_the_reader_before_registering() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.txt");
    fs::write(&path, "data\n").unwrap();

    let queue = DualQueue::new(2, 8);
    let files = FileIndex::new();
    queue.close();

    let err = stream_file(&queue, &files, &path, &ReadOptions::new(8, 0, b" ")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    assert!(files.is_empty());
}

#[test]
fn collect_files_walks_directories_in_order() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("b.txt"), "b").unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("nested").join("c.txt"), "c").unwrap();
    fs::write(dir.path().join(".hidden"), "h").unwrap();
    let loose = dir.path().join("not-there.txt");

    let files = collect_files(&[dir.path().to_path_buf(), loose.clone()]);
    assert_eq!(
        files,
        vec![
            dir.path().join(".hidden"),
            dir.path().join("a.txt"),
            dir.path().join("b.txt"),
            dir.path().join("nested").join("c.txt"),
            loose,
        ]
    );
}

use xsearch::analysis::tokenizer::{BlockTokenizer, DelimiterTokenizer, TokenScratch};
use xsearch::core::types::FileIdx;
use xsearch::memory::block::DataBlock;

fn tokens(tokenizer: &dyn BlockTokenizer, data: &[u8]) -> Vec<String> {
    let mut scratch = TokenScratch::default();
    let count = tokenizer.tokenize(data, &mut scratch);
    let out: Vec<String> = scratch
        .tokens(data)
        .map(|t| String::from_utf8_lossy(t).into_owned())
        .collect();
    assert_eq!(count, out.len());
    out
}

#[test]
fn splits_on_default_whitespace() {
    let tokenizer = DelimiterTokenizer::default();
    assert_eq!(tokens(&tokenizer, b"the quick\tbrown\nfox"), vec!["the", "quick", "brown", "fox"]);
}

#[test]
fn runs_of_delimiters_yield_no_empty_tokens() {
    let tokenizer = DelimiterTokenizer::default();
    assert_eq!(tokens(&tokenizer, b"  a \t\n\n b  "), vec!["a", "b"]);
    assert!(tokens(&tokenizer, b" \t\n ").is_empty());
    assert!(tokens(&tokenizer, b"").is_empty());
}

#[test]
fn custom_delimiters_replace_whitespace() {
    let tokenizer = DelimiterTokenizer::new(b",;");
    assert_eq!(tokens(&tokenizer, b"a,b;;c d"), vec!["a", "b", "c d"]);
    assert!(tokenizer.is_delimiter(b','));
    assert!(!tokenizer.is_delimiter(b' '));
}

#[test]
fn bytes_are_not_interpreted_as_text() {
    let tokenizer = DelimiterTokenizer::default();
    let data = [0xffu8, 0xfe, b' ', 0xc3, 0xa9];
    let mut scratch = TokenScratch::default();
    tokenizer.tokenize(&data, &mut scratch);

    let raw: Vec<&[u8]> = scratch.tokens(&data).collect();
    assert_eq!(raw, vec![&[0xffu8, 0xfe][..], &[0xc3u8, 0xa9][..]]);
}

#[test]
fn scratch_is_reset_between_blocks() {
    let tokenizer = DelimiterTokenizer::default();
    let mut scratch = TokenScratch::for_block_size(16);

    assert_eq!(tokenizer.tokenize(b"one two three", &mut scratch), 3);
    assert_eq!(tokenizer.tokenize(b"four", &mut scratch), 1);
    assert_eq!(scratch.len(), 1);
}

#[test]
fn marker_blocks_have_no_tokens() {
    let tokenizer = DelimiterTokenizer::default();
    let mut scratch = TokenScratch::default();

    let mut block = DataBlock::new(16);
    block.buffer_mut()[..5].copy_from_slice(b"stale");
    block.mark_end_of_file(FileIdx(0));
    assert_eq!(tokenizer.tokenize_block(&block, &mut scratch), 0);

    block.mark_shutdown();
    assert_eq!(tokenizer.tokenize_block(&block, &mut scratch), 0);

    block.set_len(5);
    assert_eq!(tokenizer.tokenize_block(&block, &mut scratch), 1);
}

#[test]
fn boxed_clone_behaves_the_same() {
    let tokenizer = DelimiterTokenizer::new(b"-");
    let boxed = tokenizer.clone_box();
    assert_eq!(boxed.name(), "delimiter");
    assert_eq!(tokens(boxed.as_ref(), b"x-y"), vec!["x", "y"]);
}

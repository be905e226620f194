pub mod core;
pub mod memory;
pub mod index;
pub mod analysis;
pub mod reader;
pub mod parallel;
pub mod server;

/*
┌──────────────────────────────────────────────────────────────────────────────────────┐
│                              XSEARCH PIPELINE ARCHITECTURE                           │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── ORCHESTRATION ───────────────────────────────────┐
│  struct Pipeline                                                                     │
│  • config: Config                         // lanes, queue/block sizes, delimiters    │
│  • registry: MemoryComponentRegistry      // sole owner of every lane component      │
│  • tokenizer: Box<dyn BlockTokenizer>     // cloned into each indexer                │
│  • total_terms: AtomicUsize               // read only after every lane shut down    │
│                                                                                      │
│  new():  init workers (2 per lane) ──join──► RegistryBuilder::seal()                 │
│  run():  files ──round robin──► lanes ──► readers ──join──► sentinel ──► indexers    │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── ONE LANE ───────────────────────────────────────┐
│                                                                                      │
│   FileReaderDriver          DualQueue (queue_size blocks)          DelimiterTokenizer│
│  ┌──────────────┐   pop_empty ┌─────────────┐ pop_full   ┌──────────────┐            │
│  │ reader thread│ ◄────────── │ empty pool  │            │indexer thread│            │
│  │              │ ──────────► │ full pool   │ ─────────► │              │            │
│  └──────┬───────┘  push_full  └─────────────┘ push_empty └──────┬───────┘            │
│         │ insert(path)                         ▲                │ insert(term, file) │
│         ▼                                      └── recycled ────┘ ▼                  │
│   FileIndex  path → FileIdx                                  TfIdfIndex shard        │
│                                                                                      │
│   DataBlock.length:  > 0 bytes │ 0 end of file │ -1 shutdown sentinel                │
└──────────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── READ SIDE ──────────────────────────────────────┐
│  IndexView ── rayon fan-out over shards ──► TermLookup { doc_freq, hits }            │
│  server::query ── tokio TCP ──► one line per query term                              │
└──────────────────────────────────────────────────────────────────────────────────────┘
*/

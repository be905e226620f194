pub mod init;
pub mod reader_worker;
pub mod indexer_worker;
pub mod orchestrator;

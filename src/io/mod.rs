pub mod cloud;
pub mod parquet;
pub mod partition;

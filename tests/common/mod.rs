use pvcollect::encoding::DedupCache;
use pvcollect::pipeline::Collector;
use pvcollect::sources::HistorySource;
use pvcollect::test_utils::{MemoryWriter, StaticHistorySource};
use std::num::NonZeroUsize;
use std::sync::Arc;

pub mod fixtures;

/// A collector over in-memory devices, writing to a [`MemoryWriter`].
pub struct TestSite {
    pub devices: Vec<Arc<StaticHistorySource>>,
    pub writer: Arc<MemoryWriter>,
    pub dedup: Arc<DedupCache>,
    pub collector: Collector,
}

impl TestSite {
    pub fn new(devices: Vec<StaticHistorySource>) -> Self {
        Self::with_dedup(devices, Arc::new(new_dedup_cache()))
    }

    pub fn with_dedup(devices: Vec<StaticHistorySource>, dedup: Arc<DedupCache>) -> Self {
        let devices: Vec<Arc<StaticHistorySource>> = devices.into_iter().map(Arc::new).collect();
        let writer = Arc::new(MemoryWriter::new());
        let sources: Vec<Arc<dyn HistorySource>> = devices
            .iter()
            .map(|device| device.clone() as Arc<dyn HistorySource>)
            .collect();
        let collector = Collector::new(sources, writer.clone(), dedup.clone());
        Self {
            devices,
            writer,
            dedup,
            collector,
        }
    }
}

pub fn new_dedup_cache() -> DedupCache {
    DedupCache::new(NonZeroUsize::new(1024).unwrap())
}

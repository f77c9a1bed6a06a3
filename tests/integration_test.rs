use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use reelbin::core::{
    AssumeNo, AssumeYes, Confirm, DestinationNegotiator, MetadataProbe, NegotiationError, ProbeError,
    StoreError, TransferProgress, Transport, VideoMetadata, VideoStore,
};
use reelbin::{
    BroadcastBus, ClearOutcome, HttpPutTransport, JsonFileStore, MemoryStore, MockNegotiator, PipelineConfig,
    TimelineCommand, UploadDestination, UploadError, UploadEvent, UploadId, UploadOutcome, UploadPipeline,
    VideoFile, VideoRecord,
};

/// 模拟元数据提取
struct FakeProbe {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeProbe {
    fn ok() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), fail: false })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), fail: true })
    }
}

#[async_trait]
impl MetadataProbe for FakeProbe {
    async fn probe(&self, _file: &VideoFile) -> Result<VideoMetadata, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProbeError::NoVideoStream);
        }
        Ok(VideoMetadata {
            duration_ms: 20_000.0,
            width: 1280,
            height: 720,
            preview_image: "data:image/jpeg;base64,AA==".to_string(),
        })
    }
}

/// 返回固定的真实（非模拟）上传目标
struct FixedNegotiator {
    target: String,
    calls: AtomicUsize,
    fail: bool,
}

impl FixedNegotiator {
    fn new(target: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { target: target.into(), calls: AtomicUsize::new(0), fail: false })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { target: String::new(), calls: AtomicUsize::new(0), fail: true })
    }
}

#[async_trait]
impl DestinationNegotiator for FixedNegotiator {
    async fn negotiate(&self, file_name: &str) -> Result<UploadDestination, NegotiationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NegotiationError::Status(503));
        }
        Ok(UploadDestination {
            upload_target_url: format!("{}/{}", self.target, file_name),
            final_url: format!("https://cdn.example.com/{}", file_name),
            record_name: file_name.to_string(),
            record_id: "rec-1".to_string(),
        })
    }
}

enum Script {
    /// 按字节数上报进度后返回结果
    Steps(Vec<u64>, Result<(), UploadError>),
    /// 永不结束
    Hang,
}

struct FakeTransport {
    script: Script,
}

impl FakeTransport {
    fn steps(steps: Vec<u64>, result: Result<(), UploadError>) -> Arc<Self> {
        Arc::new(Self { script: Script::Steps(steps, result) })
    }

    fn hang() -> Arc<Self> {
        Arc::new(Self { script: Script::Hang })
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn put(
        &self,
        _destination: &UploadDestination,
        file: &VideoFile,
        progress: mpsc::UnboundedSender<TransferProgress>,
    ) -> Result<(), UploadError> {
        match &self.script {
            Script::Steps(steps, result) => {
                for sent in steps {
                    let _ = progress.send(TransferProgress { bytes_sent: *sent, bytes_total: file.size });
                    tokio::task::yield_now().await;
                }
                result.clone()
            }
            Script::Hang => futures::future::pending().await,
        }
    }
}

struct RejectingStore;

#[async_trait]
impl VideoStore for RejectingStore {
    async fn add(&self, record: VideoRecord) -> Result<(), StoreError> {
        Err(StoreError::Duplicate(record.id.to_string()))
    }

    async fn remove(&self, _id: UploadId) -> Result<Option<VideoRecord>, StoreError> {
        Ok(None)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<VideoRecord>, StoreError> {
        Ok(Vec::new())
    }
}

struct CountingConfirm {
    answer: bool,
    prompts: AtomicUsize,
}

#[async_trait]
impl Confirm for CountingConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

fn video(name: &str, size: u64) -> VideoFile {
    VideoFile::new(format!("/videos/{}", name), "video/mp4", size)
}

fn drain(rx: &mut broadcast::Receiver<UploadEvent>) -> Vec<UploadEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn progress_of(events: &[UploadEvent], id: UploadId) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            UploadEvent::Progress { upload_id, percent } if *upload_id == id => Some(*percent),
            _ => None,
        })
        .collect()
}

fn outcome_id(outcome: &UploadOutcome) -> UploadId {
    match outcome {
        UploadOutcome::Completed(record) => record.id,
        UploadOutcome::Failed { upload_id, .. } => *upload_id,
    }
}

#[tokio::test(start_paused = true)]
async fn test_mock_upload_reaches_100_in_steps_of_ten() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = UploadPipeline::builder()
        .probe(FakeProbe::ok())
        .negotiator(Arc::new(MockNegotiator))
        .store(store.clone())
        .build();
    let mut events = pipeline.subscribe();

    let outcomes = pipeline.submit(vec![video("clip.mp4", 1024)]).await.unwrap();
    assert_eq!(outcomes.len(), 1);

    let UploadOutcome::Completed(record) = &outcomes[0] else {
        panic!("expected completion, got {:?}", outcomes[0]);
    };
    assert_eq!(record.source_url, "file:///videos/clip.mp4");
    assert_eq!(record.duration_ms, 20_000.0);
    assert_eq!(record.file_name, "clip.mp4");

    let events = drain(&mut events);
    assert_eq!(
        progress_of(&events, record.id),
        vec![5, 15, 25, 30, 40, 50, 60, 70, 80, 90, 100]
    );
    assert!(events.iter().any(|e| matches!(e, UploadEvent::Completed { upload_id, .. } if *upload_id == record.id)));

    assert!(pipeline.active_tasks().is_empty());
    assert_eq!(store.list().await.unwrap(), vec![record.clone()]);
}

#[tokio::test]
async fn test_png_rejected_before_any_work() {
    let probe = FakeProbe::ok();
    let negotiator = FixedNegotiator::new("https://upload.example.com");
    let pipeline = UploadPipeline::builder()
        .probe(probe.clone())
        .negotiator(negotiator.clone())
        .transport(FakeTransport::steps(vec![], Ok(())))
        .build();

    let png = VideoFile::new("/images/still.png", "image/png", 2048);
    let outcomes = pipeline.submit(vec![png]).await.unwrap();

    assert!(matches!(outcomes[0].error(), Some(UploadError::InvalidType { mime_type }) if mime_type == "image/png"));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    assert_eq!(negotiator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_file_rejected_before_probe() {
    let probe = FakeProbe::ok();
    let pipeline = UploadPipeline::builder().probe(probe.clone()).build();

    let outcomes = pipeline
        .submit(vec![video("huge.mp4", 101 * 1024 * 1024)])
        .await
        .unwrap();

    assert!(matches!(outcomes[0].error(), Some(UploadError::TooLarge { .. })));
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);

    let tasks = pipeline.active_tasks();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].is_failed());
}

#[tokio::test]
async fn test_real_transfer_maps_progress_and_commits() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = UploadPipeline::builder()
        .probe(FakeProbe::ok())
        .negotiator(FixedNegotiator::new("https://upload.example.com"))
        .transport(FakeTransport::steps(vec![250, 500, 1000], Ok(())))
        .store(store.clone())
        .build();
    let mut events = pipeline.subscribe();

    let outcomes = pipeline.submit(vec![video("clip.mp4", 1000)]).await.unwrap();
    let UploadOutcome::Completed(record) = &outcomes[0] else {
        panic!("expected completion");
    };

    assert_eq!(record.source_url, "https://cdn.example.com/clip.mp4");
    assert_eq!(progress_of(&drain(&mut events), record.id), vec![5, 15, 25, 44, 63, 100]);
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transfer_timeout_then_cleanup() {
    let pipeline = UploadPipeline::builder()
        .probe(FakeProbe::ok())
        .negotiator(FixedNegotiator::new("https://upload.example.com"))
        .transport(FakeTransport::hang())
        .build();

    let start = tokio::time::Instant::now();
    let outcomes = pipeline.submit(vec![video("slow.mp4", 1000)]).await.unwrap();

    assert_eq!(outcomes[0].error(), Some(&UploadError::TransferTimeout(Duration::from_secs(300))));
    assert!(start.elapsed() >= Duration::from_secs(300));

    let id = outcome_id(&outcomes[0]);
    let tasks = pipeline.active_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, id);
    assert!(!tasks[0].is_uploading);
    assert_eq!(tasks[0].progress_percent, 0);

    tokio::time::sleep(Duration::from_millis(4900)).await;
    assert_eq!(pipeline.active_tasks().len(), 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(pipeline.active_tasks().is_empty());
}

#[tokio::test]
async fn test_failure_does_not_stop_batch() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = UploadPipeline::builder()
        .probe(FakeProbe::ok())
        .negotiator(FixedNegotiator::new("https://upload.example.com"))
        .transport(FakeTransport::steps(vec![500], Err(UploadError::TransferHttpError(403))))
        .store(store.clone())
        .build();

    let outcomes = pipeline
        .submit(vec![
            VideoFile::new("/videos/a.gif", "image/gif", 10),
            video("b.mp4", 1000),
            video("c.mp4", 1000),
        ])
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[0].error(), Some(UploadError::InvalidType { .. })));
    assert_eq!(outcomes[1].error(), Some(&UploadError::TransferHttpError(403)));
    assert_eq!(outcomes[2].error(), Some(&UploadError::TransferHttpError(403)));
    assert!(store.list().await.unwrap().is_empty());
    assert_eq!(pipeline.active_tasks().len(), 3);
}

#[tokio::test]
async fn test_progress_resets_to_zero_on_failure() {
    let pipeline = UploadPipeline::builder()
        .probe(FakeProbe::ok())
        .negotiator(FixedNegotiator::new("https://upload.example.com"))
        .transport(FakeTransport::steps(vec![400, 800], Err(UploadError::network("connection reset"))))
        .build();
    let mut events = pipeline.subscribe();

    let outcomes = pipeline.submit(vec![video("clip.mp4", 1000)]).await.unwrap();
    let id = outcome_id(&outcomes[0]);
    let events = drain(&mut events);

    let progress = progress_of(&events, id);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {:?}", progress);
    assert!(events.iter().any(|e| matches!(e, UploadEvent::Failed { upload_id, .. } if *upload_id == id)));
    assert_eq!(pipeline.active_tasks()[0].progress_percent, 0);
}

#[tokio::test]
async fn test_probe_and_negotiation_failures() {
    let pipeline = UploadPipeline::builder().probe(FakeProbe::failing()).build();
    let outcomes = pipeline.submit(vec![video("a.mp4", 10)]).await.unwrap();
    assert!(matches!(outcomes[0].error(), Some(UploadError::MetadataExtractionFailed(_))));

    let pipeline = UploadPipeline::builder()
        .probe(FakeProbe::ok())
        .negotiator(FixedNegotiator::failing())
        .build();
    let outcomes = pipeline.submit(vec![video("a.mp4", 10)]).await.unwrap();
    assert!(matches!(outcomes[0].error(), Some(UploadError::DestinationNegotiationFailed(_))));
}

#[tokio::test(start_paused = true)]
async fn test_store_rejection_is_commit_failure() {
    let pipeline = UploadPipeline::builder()
        .probe(FakeProbe::ok())
        .store(Arc::new(RejectingStore))
        .build();

    let outcomes = pipeline.submit(vec![video("a.mp4", 10)]).await.unwrap();
    assert!(matches!(outcomes[0].error(), Some(UploadError::StoreCommitFailed(_))));
}

#[tokio::test]
async fn test_too_many_files_creates_no_tasks() {
    let probe = FakeProbe::ok();
    let pipeline = UploadPipeline::builder().probe(probe.clone()).build();

    let files = (0..6).map(|i| video(&format!("{i}.mp4"), 10)).collect();
    let err = pipeline.submit(files).await.unwrap_err();

    assert_eq!(err, UploadError::TooManyFiles { count: 6, max: 5 });
    assert!(pipeline.active_tasks().is_empty());
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_batch_at_limit_is_accepted() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = UploadPipeline::builder()
        .probe(FakeProbe::ok())
        .store(store.clone())
        .build();

    let files = (0..5).map(|i| video(&format!("{i}.mp4"), 10)).collect();
    let outcomes = pipeline.submit(files).await.unwrap();

    assert_eq!(outcomes.len(), 5);
    assert!(outcomes.iter().all(|o| o.is_completed()));
    assert_eq!(store.list().await.unwrap().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_batches() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = Arc::new(
        UploadPipeline::builder()
            .probe(FakeProbe::ok())
            .store(store.clone())
            .build(),
    );

    let (a, b) = tokio::join!(
        pipeline.submit(vec![video("a1.mp4", 10), video("a2.mp4", 10)]),
        pipeline.submit(vec![video("b1.mp4", 10)]),
    );

    assert!(a.unwrap().iter().all(|o| o.is_completed()));
    assert!(b.unwrap().iter().all(|o| o.is_completed()));
    assert_eq!(store.list().await.unwrap().len(), 3);
    assert!(pipeline.active_tasks().is_empty());
}

#[tokio::test]
async fn test_shutdown_aborts_transfer() {
    let pipeline = Arc::new(
        UploadPipeline::builder()
            .probe(FakeProbe::ok())
            .negotiator(FixedNegotiator::new("https://upload.example.com"))
            .transport(FakeTransport::hang())
            .build(),
    );

    let handle = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.submit(vec![video("a.mp4", 10)]).await }
    });

    // 等待任务进入传输阶段
    let mut events = pipeline.subscribe();
    loop {
        if let Ok(UploadEvent::Progress { percent: 25, .. }) = events.recv().await {
            break;
        }
    }

    pipeline.shutdown();
    let outcomes = handle.await.unwrap().unwrap();
    assert_eq!(outcomes[0].error(), Some(&UploadError::TransferAborted));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_aborts_mock_transfer() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = Arc::new(
        UploadPipeline::builder()
            .probe(FakeProbe::ok())
            .negotiator(Arc::new(MockNegotiator))
            .store(store.clone())
            .build(),
    );
    let mut events = pipeline.subscribe();

    let handle = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.submit(vec![video("a.mp4", 10)]).await }
    });

    loop {
        if let Ok(UploadEvent::Progress { percent: 30, .. }) = events.recv().await {
            break;
        }
    }

    pipeline.shutdown();
    let outcomes = handle.await.unwrap().unwrap();
    assert_eq!(outcomes[0].error(), Some(&UploadError::TransferAborted));
    assert!(store.list().await.unwrap().is_empty());

    let task = &pipeline.active_tasks()[0];
    assert!(task.is_failed());
    assert_eq!(task.progress_percent, 0);
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_failed_task_before_cleanup() {
    let pipeline = UploadPipeline::builder().probe(FakeProbe::failing()).build();

    let outcomes = pipeline.submit(vec![video("a.mp4", 10)]).await.unwrap();
    let id = outcome_id(&outcomes[0]);
    assert_eq!(pipeline.active_tasks().len(), 1);

    let mut events = pipeline.subscribe();
    let dismissed = pipeline.dismiss_task(id).unwrap();
    assert_eq!(dismissed.id, id);
    assert!(pipeline.active_tasks().is_empty());
    assert!(pipeline.dismiss_task(id).is_none());

    // 延迟移除到期后不再产生事件
    tokio::time::sleep(Duration::from_secs(6)).await;
    let removed: Vec<_> = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, UploadEvent::Removed { .. }))
        .collect();
    assert_eq!(removed.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_data_keeps_in_flight_upload() {
    let store = Arc::new(MemoryStore::new());
    store
        .add(VideoRecord {
            id: UploadId::new(),
            source_url: "https://cdn.example.com/old.mp4".to_string(),
            preview_image: "data:image/jpeg;base64,AA==".to_string(),
            duration_ms: 1000.0,
            file_name: "old.mp4".to_string(),
        })
        .await
        .unwrap();

    let pipeline = Arc::new(
        UploadPipeline::builder()
            .probe(FakeProbe::ok())
            .store(store.clone())
            .build(),
    );
    let mut events = pipeline.subscribe();

    let handle = tokio::spawn({
        let pipeline = pipeline.clone();
        async move { pipeline.submit(vec![video("new.mp4", 10)]).await }
    });

    loop {
        if let Ok(UploadEvent::Progress { percent: 30, .. }) = events.recv().await {
            break;
        }
    }

    assert_eq!(pipeline.clear_all_data(&AssumeYes).await.unwrap(), ClearOutcome::Cleared(1));
    assert_eq!(pipeline.active_tasks().len(), 1);

    let outcomes = handle.await.unwrap().unwrap();
    let UploadOutcome::Completed(record) = &outcomes[0] else {
        panic!("expected completion, got {:?}", outcomes[0]);
    };
    assert_eq!(store.list().await.unwrap(), vec![record.clone()]);
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, UploadEvent::Completed { upload_id, .. } if *upload_id == record.id)));
}

#[tokio::test]
async fn test_promote_to_timeline() {
    let bus = Arc::new(BroadcastBus::default());
    let mut commands = bus.subscribe();
    let pipeline = UploadPipeline::builder().bus(bus.clone()).build();

    let record = VideoRecord {
        id: UploadId::new(),
        source_url: "https://cdn.example.com/a.mp4".to_string(),
        preview_image: "data:image/jpeg;base64,AA==".to_string(),
        duration_ms: 5000.0,
        file_name: "a.mp4".to_string(),
    };
    pipeline.promote_to_timeline(&record);

    let TimelineCommand::AddVideo { payload, options } = commands.recv().await.unwrap();
    assert_eq!(payload.details.src, record.source_url);
    assert_eq!(payload.metadata.preview_url, record.preview_image);
    assert_eq!(payload.duration, 5000.0);
    assert_eq!(options.resource_id, "main");

    // 没有订阅者时只记录日志
    drop(commands);
    pipeline.promote_to_timeline(&record);
}

#[tokio::test]
async fn test_clear_all_data_with_no_records_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("videos-storage.json");
    tokio::fs::write(&path, br#"{"videos":[]}"#).await.unwrap();

    let store = Arc::new(JsonFileStore::open(&path).await.unwrap());
    let pipeline = UploadPipeline::builder().store(store).build();
    let confirm = CountingConfirm { answer: true, prompts: AtomicUsize::new(0) };

    assert_eq!(pipeline.clear_all_data(&confirm).await.unwrap(), ClearOutcome::NothingToClear);
    assert_eq!(pipeline.clear_uploaded(&confirm).await.unwrap(), ClearOutcome::NothingToClear);
    assert_eq!(confirm.prompts.load(Ordering::SeqCst), 0);
    assert_eq!(tokio::fs::read(&path).await.unwrap(), br#"{"videos":[]}"#.to_vec());
}

#[tokio::test(start_paused = true)]
async fn test_clear_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("videos-storage.json");
    let store = Arc::new(JsonFileStore::open(&path).await.unwrap());
    let pipeline = UploadPipeline::builder()
        .probe(FakeProbe::ok())
        .store(store.clone())
        .build();

    pipeline
        .submit(vec![video("a.mp4", 10), video("b.mp4", 10)])
        .await
        .unwrap();
    assert_eq!(pipeline.uploaded_videos().await.unwrap().len(), 2);

    assert_eq!(pipeline.clear_uploaded(&AssumeNo).await.unwrap(), ClearOutcome::Declined);
    assert_eq!(pipeline.clear_all_data(&AssumeNo).await.unwrap(), ClearOutcome::Declined);
    assert_eq!(store.list().await.unwrap().len(), 2);

    let first = store.list().await.unwrap()[0].id;
    assert!(pipeline.remove_uploaded(first).await.unwrap().is_some());
    assert_eq!(pipeline.clear_uploaded(&AssumeYes).await.unwrap(), ClearOutcome::Cleared(1));
    assert!(path.exists());

    pipeline.submit(vec![video("c.mp4", 10)]).await.unwrap();
    assert_eq!(pipeline.clear_all_data(&AssumeYes).await.unwrap(), ClearOutcome::Cleared(1));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_end_to_end_http_put() {
    let mut server = mockito::Server::new_async().await;
    let put = server
        .mock("PUT", "/bucket/clip.mp4")
        .match_header("content-type", "video/mp4")
        .with_status(200)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    tokio::fs::write(&path, vec![1u8; 64 * 1024]).await.unwrap();
    let file = VideoFile::from_path(&path).await.unwrap();

    let pipeline = UploadPipeline::builder()
        .config(PipelineConfig::default())
        .probe(FakeProbe::ok())
        .negotiator(FixedNegotiator::new(format!("{}/bucket", server.url())))
        .transport(Arc::new(HttpPutTransport::new()))
        .build();
    let mut events = pipeline.subscribe();

    let outcomes = pipeline.submit(vec![file]).await.unwrap();
    put.assert_async().await;

    let UploadOutcome::Completed(record) = &outcomes[0] else {
        panic!("expected completion, got {:?}", outcomes[0]);
    };
    let progress = progress_of(&drain(&mut events), record.id);
    assert_eq!(progress.last(), Some(&100));
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_end_to_end_http_error_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PUT", "/bucket/clip.mp4")
        .with_status(500)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    tokio::fs::write(&path, vec![1u8; 1024]).await.unwrap();
    let file = VideoFile::from_path(&path).await.unwrap();

    let pipeline = UploadPipeline::builder()
        .probe(FakeProbe::ok())
        .negotiator(FixedNegotiator::new(format!("{}/bucket", server.url())))
        .transport(Arc::new(HttpPutTransport::new()))
        .build();

    let outcomes = pipeline.submit(vec![file]).await.unwrap();
    assert_eq!(outcomes[0].error(), Some(&UploadError::TransferHttpError(500)));
}

//! Integration tests for pdf2svg-bridge.
//!
//! The conversion runtime is replaced by an in-process fake host. Its
//! "PDF" format is plain text with pages separated by form feeds; the
//! export renders each selected page as `<svg><text>…</text></svg>` and
//! honours the `pages` filter of the wire payload.
//!
//! Set `RUST_LOG=pdf2svg_bridge=debug` to see the bridge's logs:
//!   RUST_LOG=pdf2svg_bridge=debug cargo test --test bridge -- --nocapture

use async_trait::async_trait;
use pdf2svg_bridge::{
    BridgeConfig, ConvertExport, HostError, Pdf2Svg, Pdf2SvgError, RuntimeEnvironment,
    RuntimeHost, RuntimeLocation, RuntimeState, SvgOptions,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Lay out a minimal runtime bundle (`_framework/blazor.boot.json`).
fn runtime_bundle() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let loc = RuntimeLocation::from_root(dir.path());
    std::fs::create_dir_all(&loc.framework_dir).unwrap();
    std::fs::write(&loc.boot_config, br#"{"entryAssembly":"PdfToSvgWasm"}"#).unwrap();
    dir
}

fn fake_pdf(pages: &[&str]) -> Vec<u8> {
    pages.join("\x0c").into_bytes()
}

#[derive(Default)]
struct Recorder {
    created: AtomicUsize,
    disposed: AtomicUsize,
    payloads: Mutex<Vec<Option<String>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Recorder {
    fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    fn disposed(&self) -> usize {
        self.disposed.load(Ordering::SeqCst)
    }

    fn payloads(&self) -> Vec<Option<String>> {
        self.payloads.lock().unwrap().clone()
    }

    fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct TextHost {
    recorder: Arc<Recorder>,
    startup_delay: Duration,
    export_delay: Duration,
}

struct TextEnv {
    recorder: Arc<Recorder>,
    export_delay: Duration,
}

fn render(pdf: &[u8], options_json: Option<&str>) -> Result<Vec<String>, HostError> {
    let text = std::str::from_utf8(pdf).map_err(|e| HostError::with_source("not a PDF", e))?;
    let pages: Vec<&str> = text.split('\x0c').collect();

    let indices: Vec<usize> = match options_json {
        Some(json) => {
            let value: serde_json::Value =
                serde_json::from_str(json).map_err(|e| HostError::with_source("bad options", e))?;
            match value.get("pages") {
                Some(p) => serde_json::from_value(p.clone())
                    .map_err(|e| HostError::with_source("bad pages", e))?,
                None => (0..pages.len()).collect(),
            }
        }
        None => (0..pages.len()).collect(),
    };

    indices
        .into_iter()
        .map(|i| {
            pages
                .get(i)
                .map(|body| format!("<svg><text>{body}</text></svg>"))
                .ok_or_else(|| HostError::new(format!("page index {i} out of range")))
        })
        .collect()
}

#[async_trait]
impl RuntimeEnvironment for TextEnv {
    async fn resolve_export(&self, name: &str) -> Option<Arc<dyn ConvertExport>> {
        if name != pdf2svg_bridge::DEFAULT_EXPORT_NAME {
            return None;
        }
        let recorder = Arc::clone(&self.recorder);
        let export_delay = self.export_delay;
        let export: Arc<dyn ConvertExport> =
            Arc::new(move |pdf: &[u8], json: Option<&str>| {
                let running = recorder.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                recorder.max_in_flight.fetch_max(running, Ordering::SeqCst);
                recorder
                    .payloads
                    .lock()
                    .unwrap()
                    .push(json.map(str::to_string));
                std::thread::sleep(export_delay);
                recorder.in_flight.fetch_sub(1, Ordering::SeqCst);
                render(pdf, json)
            });
        Some(export)
    }

    fn dispose(&self) {
        self.recorder.disposed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RuntimeHost for TextHost {
    async fn create(
        &self,
        location: &RuntimeLocation,
    ) -> Result<Box<dyn RuntimeEnvironment>, HostError> {
        assert!(location.boot_config.is_file());
        self.recorder.created.fetch_add(1, Ordering::SeqCst);
        if !self.startup_delay.is_zero() {
            tokio::time::sleep(self.startup_delay).await;
        }
        Ok(Box::new(TextEnv {
            recorder: Arc::clone(&self.recorder),
            export_delay: self.export_delay,
        }))
    }
}

fn bridge_at(dir: &Path, startup_delay: Duration) -> (Pdf2Svg, Arc<Recorder>) {
    slow_bridge_at(dir, startup_delay, Duration::ZERO)
}

fn slow_bridge_at(
    dir: &Path,
    startup_delay: Duration,
    export_delay: Duration,
) -> (Pdf2Svg, Arc<Recorder>) {
    init_logging();
    let recorder = Arc::new(Recorder::default());
    let host = TextHost {
        recorder: Arc::clone(&recorder),
        startup_delay,
        export_delay,
    };
    let config = BridgeConfig::builder().runtime_dir(dir).build().unwrap();
    (Pdf2Svg::new(host, config), recorder)
}

// ── Conversion ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_input_returns_no_pages_without_bootstrap() {
    let bundle = runtime_bundle();
    let (bridge, recorder) = bridge_at(bundle.path(), Duration::ZERO);

    let out = assert_ok!(bridge.convert(Vec::new(), None).await);
    assert!(out.pages.is_empty());
    assert_eq!(recorder.created(), 0);
    assert_eq!(bridge.bootstrap_count(), 0);
}

#[tokio::test]
async fn single_page_document_with_page_one() {
    let bundle = runtime_bundle();
    let (bridge, _) = bridge_at(bundle.path(), Duration::ZERO);

    let opts = SvgOptions::builder().pages([1]).build().unwrap();
    let out = assert_ok!(bridge.convert(fake_pdf(&["only"]), Some(&opts)).await);

    assert_eq!(out.pages.len(), 1);
    let page = &out.pages[0];
    assert_eq!(page.page_index, 0);
    assert_eq!(page.page_number, 1);
    assert!(page.svg.starts_with("<svg"));
    assert!(page.svg.contains("only"));
}

#[tokio::test]
async fn duplicate_and_reordered_pages_follow_the_request() {
    let bundle = runtime_bundle();
    let (bridge, recorder) = bridge_at(bundle.path(), Duration::ZERO);

    let opts = SvgOptions::builder().pages([3, 1, 3, 2]).build().unwrap();
    let out = assert_ok!(bridge.convert(fake_pdf(&["a", "b", "c"]), Some(&opts)).await);

    let numbers: Vec<_> = out.pages.iter().map(|p| p.page_number).collect();
    assert_eq!(numbers, vec![3, 1, 3, 2]);
    assert!(out.pages[0].svg.contains(">c<"));
    assert!(out.pages[1].svg.contains(">a<"));
    assert_eq!(
        recorder.payloads(),
        vec![Some(r#"{"pages":[2,0,2,1]}"#.to_string())]
    );
}

#[tokio::test]
async fn all_pages_when_no_filter_given() {
    let bundle = runtime_bundle();
    let (bridge, recorder) = bridge_at(bundle.path(), Duration::ZERO);

    let opts = SvgOptions::builder().include_links(true).build().unwrap();
    let out = assert_ok!(bridge.convert(fake_pdf(&["a", "b"]), Some(&opts)).await);

    assert_eq!(out.pages.len(), 2);
    assert_eq!(out.pages[1].page_number, 2);
    assert_eq!(
        recorder.payloads(),
        vec![Some(r#"{"includeLinks":true}"#.to_string())]
    );
}

#[tokio::test]
async fn file_source_is_read_from_disk() {
    let bundle = runtime_bundle();
    let (bridge, _) = bridge_at(bundle.path(), Duration::ZERO);

    let docs = tempfile::tempdir().unwrap();
    let path = docs.path().join("doc.pdf");
    std::fs::write(&path, fake_pdf(&["x", "y"])).unwrap();

    let out = assert_ok!(bridge.convert(path.as_path(), None).await);
    assert_eq!(out.pages.len(), 2);

    let missing = docs.path().join("missing.pdf");
    let err = assert_err!(bridge.convert(missing, None).await);
    assert!(matches!(err, Pdf2SvgError::FileNotFound { .. }));
}

#[tokio::test]
async fn export_failure_is_a_conversion_error() {
    let bundle = runtime_bundle();
    let (bridge, _) = bridge_at(bundle.path(), Duration::ZERO);

    let opts = SvgOptions::builder().pages([9]).build().unwrap();
    let err = assert_err!(bridge.convert(fake_pdf(&["a"]), Some(&opts)).await);
    assert!(matches!(err, Pdf2SvgError::ConversionFailed(_)));
    assert!(err.to_string().contains("page index 8 out of range"));

    // The runtime survives a failed conversion.
    assert_eq!(bridge.state().await, RuntimeState::Ready);
    assert_ok!(bridge.convert(fake_pdf(&["a"]), None).await);
    assert_eq!(bridge.bootstrap_count(), 1);
}

// ── Validation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn non_positive_pages_fail_before_bootstrap() {
    let bundle = runtime_bundle();
    let (bridge, recorder) = bridge_at(bundle.path(), Duration::ZERO);

    for (pages, value, position) in [("[0]", "0", 0), ("[2, 5, -1]", "-1", 2), ("[1, 1.5]", "1.5", 1)] {
        let opts = SvgOptions {
            pages: Some(serde_json::from_str(pages).unwrap()),
            ..SvgOptions::default()
        };
        let err = assert_err!(bridge.convert(fake_pdf(&["a"]), Some(&opts)).await);
        let message = err.to_string();
        assert!(message.contains(&format!("Received {value}")), "{message}");
        assert!(message.contains(&format!("position {position}")), "{message}");
    }
    assert_eq!(recorder.created(), 0);
}

#[tokio::test]
async fn json_pages_accept_integral_floats_and_locate_fractions() {
    let bundle = runtime_bundle();
    let (bridge, recorder) = bridge_at(bundle.path(), Duration::ZERO);

    let out = assert_ok!(
        bridge
            .convert_with_json_options(fake_pdf(&["a", "b"]), r#"{"pages":[2.0]}"#)
            .await
    );
    assert_eq!(out.pages[0].page_number, 2);
    assert_eq!(recorder.payloads(), vec![Some(r#"{"pages":[1]}"#.to_string())]);

    let err = assert_err!(
        bridge
            .convert_with_json_options(fake_pdf(&["a", "b"]), r#"{"pages":[1,1.5]}"#)
            .await
    );
    assert!(matches!(
        err,
        Pdf2SvgError::InvalidPageNumber { ref value, position: 1 } if value == "1.5"
    ));
}

#[tokio::test]
async fn non_finite_option_names_the_field() {
    let bundle = runtime_bundle();
    let (bridge, recorder) = bridge_at(bundle.path(), Duration::ZERO);

    let opts = SvgOptions {
        min_stroke_width: Some(f64::INFINITY),
        ..SvgOptions::default()
    };
    let err = assert_err!(bridge.convert(fake_pdf(&["a"]), Some(&opts)).await);
    assert!(err.is_validation());
    assert!(err.to_string().contains("minStrokeWidth"));
    assert_eq!(recorder.created(), 0);
}

#[tokio::test]
async fn auto_and_absent_font_strategy_send_the_same_payload() {
    let bundle = runtime_bundle();
    let (bridge, recorder) = bridge_at(bundle.path(), Duration::ZERO);

    let absent = SvgOptions::builder().include_annotations(false).build().unwrap();
    let auto = SvgOptions::builder()
        .include_annotations(false)
        .font_strategy("AUTO")
        .build()
        .unwrap();
    assert_ok!(bridge.convert(fake_pdf(&["a"]), Some(&absent)).await);
    assert_ok!(bridge.convert(fake_pdf(&["a"]), Some(&auto)).await);

    let payloads = recorder.payloads();
    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0], payloads[1]);
}

#[tokio::test]
async fn unknown_font_strategy_fails_before_conversion() {
    let bundle = runtime_bundle();
    let (bridge, recorder) = bridge_at(bundle.path(), Duration::ZERO);

    let opts = SvgOptions {
        font_strategy: Some("xyz".into()),
        ..SvgOptions::default()
    };
    let err = assert_err!(bridge.convert(fake_pdf(&["a"]), Some(&opts)).await);
    assert!(matches!(err, Pdf2SvgError::UnsupportedFontStrategy { .. }));
    assert!(recorder.payloads().is_empty());
}

// ── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_first_calls_share_one_bootstrap() {
    let bundle = runtime_bundle();
    let (bridge, recorder) = bridge_at(bundle.path(), Duration::from_millis(50));

    let calls = (0..6i64).map(|i| {
        let bridge = bridge.clone();
        tokio::spawn(async move {
            let opts = SvgOptions::builder().pages([i % 2 + 1]).build().unwrap();
            bridge.convert(fake_pdf(&["a", "b"]), Some(&opts)).await
        })
    });
    for result in futures::future::join_all(calls).await {
        let out = assert_ok!(result.unwrap());
        assert_eq!(out.pages.len(), 1);
    }

    assert_eq!(recorder.created(), 1);
    assert_eq!(bridge.bootstrap_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn export_is_never_called_concurrently() {
    let bundle = runtime_bundle();
    let (bridge, recorder) =
        slow_bridge_at(bundle.path(), Duration::ZERO, Duration::from_millis(40));
    assert_ok!(bridge.initialize().await);

    let calls = (0..4).map(|_| {
        let bridge = bridge.clone();
        tokio::spawn(async move { bridge.convert(fake_pdf(&["a", "b"]), None).await })
    });
    for result in futures::future::join_all(calls).await {
        assert_ok!(result.unwrap());
    }

    assert_eq!(recorder.payloads().len(), 4);
    assert_eq!(recorder.max_in_flight(), 1);
}

#[tokio::test]
async fn shutdown_then_convert_bootstraps_again() {
    let bundle = runtime_bundle();
    let (bridge, recorder) = bridge_at(bundle.path(), Duration::ZERO);

    assert_ok!(bridge.initialize().await);
    assert_ok!(bridge.initialize().await);
    assert_eq!(recorder.created(), 1);

    bridge.shutdown().await;
    bridge.shutdown().await;
    assert_eq!(recorder.disposed(), 1);
    assert_eq!(bridge.state().await, RuntimeState::Unloaded);

    assert_ok!(bridge.convert(fake_pdf(&["a"]), None).await);
    assert_eq!(recorder.created(), 2);
    assert_eq!(bridge.state().await, RuntimeState::Ready);
}

#[tokio::test]
async fn missing_bundle_is_a_bootstrap_failure() {
    let empty = tempfile::tempdir().unwrap();
    let (bridge, recorder) = bridge_at(empty.path(), Duration::ZERO);

    let err = assert_err!(bridge.convert(fake_pdf(&["a"]), None).await);
    assert!(matches!(err, Pdf2SvgError::Bootstrap(_)));
    assert!(err.is_lifecycle());
    assert_eq!(recorder.created(), 0);
    assert_eq!(bridge.state().await, RuntimeState::Unloaded);
}

#[tokio::test]
async fn unknown_export_name_is_runtime_unavailable() {
    init_logging();
    let bundle = runtime_bundle();
    let recorder = Arc::new(Recorder::default());
    let host = TextHost {
        recorder: Arc::clone(&recorder),
        startup_delay: Duration::ZERO,
        export_delay: Duration::ZERO,
    };
    let config = BridgeConfig::builder()
        .runtime_dir(bundle.path())
        .export_name("Other.Exports.Convert")
        .build()
        .unwrap();
    let bridge = Pdf2Svg::new(host, config);

    let err = assert_err!(bridge.initialize().await);
    assert!(matches!(err, Pdf2SvgError::RuntimeUnavailable { .. }));
    assert_eq!(recorder.disposed(), 1);
}

// ── Output ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn convert_to_dir_and_json_options() {
    let bundle = runtime_bundle();
    let (bridge, _) = bridge_at(bundle.path(), Duration::ZERO);
    let out_dir = tempfile::tempdir().unwrap();

    let opts = SvgOptions::from_json(r#"{"pages":[2],"fontStrategy":"woff"}"#).unwrap();
    let paths = assert_ok!(
        bridge
            .convert_to_dir(fake_pdf(&["a", "b"]), Some(&opts), out_dir.path(), "report")
            .await
    );
    assert_eq!(paths, vec![out_dir.path().join("report_page2.svg")]);
    let svg = std::fs::read_to_string(&paths[0]).unwrap();
    assert_eq!(svg, "<svg><text>b</text></svg>");
    assert!(!out_dir.path().join("report_page2.svg.tmp").exists());

    let out = assert_ok!(
        bridge
            .convert_with_json_options(fake_pdf(&["a", "b"]), "  ")
            .await
    );
    assert_eq!(out.pages.len(), 2);
}

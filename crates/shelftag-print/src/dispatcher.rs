//! # Label Print Dispatcher
//!
//! Prints barcode labels for a [`PrintRequest`], trying the thermal printer
//! first and rendering pages when that fails.
//!
//! ```text
//! dispatch(request)
//!     │
//!     ├─► try_direct ── build every copy's ops ──► check_printable
//!     │       │                                        │
//!     │       │           acquire ──► send once ──► release (always)
//!     │       │
//!     │       └─ any failure but cancellation ────────┐
//!     │                                                ▼
//!     └───────────────────────────────────────► render_fallback
//!                                               one page per copy, barcode
//!                                               raster placed by the layout
//! ```
//!
//! The direct job is checked before the printer is touched and sent in a
//! single write, so a job either reaches the printer whole or falls back
//! whole; the two tiers never mix. Names the printer's code page cannot
//! show go to the fallback too.
//!
//! Product names and prices are read from the store while the job runs.
//! A barcode with no product prints with an empty name and a zero price.

use serde::{Deserialize, Serialize};
use shelftag_core::barcode::Symbology;
use shelftag_core::geometry::{compute_layout, LabelProfile, PaperSize, ESCPOS_BARCODE_WIDTH};
use shelftag_core::Money;
use shelftag_db::ProductRepository;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::device::{PrinterSession, ThermalPrinter};
use crate::error::{PrintError, PrintResult};
use crate::escpos::{check_printable, Align, Font, PrinterOp};
use crate::page::{Document, Page, TextStyle};
use crate::raster::BarcodeRasterizer;
use crate::settings::PrintSettings;

// =============================================================================
// Request / Outcome
// =============================================================================

/// How many copies of which barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelItem {
    pub barcode: String,
    pub copies: u32,
}

impl LabelItem {
    pub fn new(barcode: impl Into<String>, copies: u32) -> Self {
        LabelItem {
            barcode: barcode.into(),
            copies,
        }
    }
}

/// Everything one label job needs; nothing is read from elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintRequest {
    pub items: Vec<LabelItem>,
    pub paper: PaperSize,
    pub show_price: bool,
}

impl PrintRequest {
    pub fn total_copies(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.copies)).sum()
    }
}

/// Which tier produced the job.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintOutcome {
    /// Sent to the thermal printer.
    Direct { labels: u64 },
    /// Rendered as pages for another printing subsystem.
    Fallback(Document),
}

/// What gets printed on one label.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LabelText {
    name: String,
    price: Money,
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Runs label jobs against one printer.
#[derive(Debug)]
pub struct Dispatcher<P> {
    products: ProductRepository,
    printer: P,
    rasterizer: BarcodeRasterizer,
    settings: PrintSettings,
}

impl<P: ThermalPrinter> Dispatcher<P> {
    pub fn new(products: ProductRepository, printer: P, settings: PrintSettings) -> Self {
        Dispatcher {
            rasterizer: BarcodeRasterizer::new(settings.dpi, settings.scratch_dir.clone()),
            products,
            printer,
            settings,
        }
    }

    /// Replaces the barcode rasterizer used by the fallback path.
    pub fn with_rasterizer(mut self, rasterizer: BarcodeRasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Prints the job on the first tier that works.
    ///
    /// Any failure of the thermal printer tier causes a fallback;
    /// cancellation and lookup failures end the job.
    pub async fn dispatch(
        &self,
        request: &PrintRequest,
        cancel: &CancellationToken,
    ) -> PrintResult<PrintOutcome> {
        if request.total_copies() == 0 {
            return Err(PrintError::NothingToPrint);
        }

        match self.try_direct(request, cancel).await {
            Ok(labels) => {
                info!(labels, paper = %request.paper, "Labels sent to thermal printer");
                Ok(PrintOutcome::Direct { labels })
            }
            Err(e) if e.falls_back() => {
                warn!(error = %e, "Thermal printer unavailable, rendering pages instead");
                let document = self.render_fallback(request, cancel).await?;
                info!(pages = document.len(), paper = %request.paper, "Labels rendered");
                Ok(PrintOutcome::Fallback(document))
            }
            Err(e) => Err(e),
        }
    }

    /// Sends the whole job to the thermal printer, returning the label count.
    ///
    /// The printer is only acquired for a job that encodes cleanly, and is
    /// released on every path once acquired.
    pub async fn try_direct(
        &self,
        request: &PrintRequest,
        cancel: &CancellationToken,
    ) -> PrintResult<u64> {
        let (ops, labels) = self.direct_ops(request, cancel).await?;
        check_printable(&ops)?;

        let mut session = self.printer.acquire().await?;
        let result = session.send(&ops).await;

        if let Err(e) = session.release().await {
            // the job itself already succeeded or failed on its own terms
            warn!(error = %e, "Could not release printer");
        }
        result.map(|()| labels)
    }

    async fn direct_ops(
        &self,
        request: &PrintRequest,
        cancel: &CancellationToken,
    ) -> PrintResult<(Vec<PrinterOp>, u64)> {
        let profile = request.paper.profile();
        let mut ops = Vec::new();
        let mut labels = 0;

        for item in &request.items {
            let label = self.lookup(&item.barcode).await?;
            for _ in 0..item.copies {
                if cancel.is_cancelled() {
                    return Err(PrintError::Cancelled);
                }
                ops.extend(self.label_ops(&item.barcode, &label, &profile, request.show_price));
                labels += 1;
            }
        }
        ops.push(PrinterOp::Cut);

        Ok((ops, labels))
    }

    /// Name, optional price, barcode, spacing.
    fn label_ops(
        &self,
        barcode: &str,
        label: &LabelText,
        profile: &LabelProfile,
        show_price: bool,
    ) -> Vec<PrinterOp> {
        let scale = profile.escpos_scale;
        let mut ops = vec![
            PrinterOp::SetStyle {
                scale,
                font: Font::A,
                align: Align::Center,
            },
            PrinterOp::Text(format!("{}\n", label.name)),
        ];

        if show_price {
            ops.push(PrinterOp::SetStyle {
                scale,
                font: Font::B,
                align: Align::Center,
            });
            ops.push(PrinterOp::Text(format!(
                "{}\n",
                self.settings.label_price_text(label.price)
            )));
        }

        ops.push(PrinterOp::Barcode {
            data: barcode.to_string(),
            symbology: Symbology::Code128,
            width: ESCPOS_BARCODE_WIDTH,
            height: profile.escpos_bar_height,
            align: Align::Center,
        });
        ops.push(PrinterOp::Text("\n\n".to_string()));
        ops
    }

    /// Renders one page per copy, each sized to the label stock.
    pub async fn render_fallback(
        &self,
        request: &PrintRequest,
        cancel: &CancellationToken,
    ) -> PrintResult<Document> {
        let profile = request.paper.profile();
        let mut document = Document::new(profile.width_mm, profile.height_mm, self.settings.dpi);

        for item in request.items.iter().filter(|item| item.copies > 0) {
            let label = self.lookup(&item.barcode).await?;
            let raster = self.rasterizer.render(&item.barcode, &profile).await?;
            let src = raster.data_uri();
            let layout = compute_layout(
                &profile,
                document.page,
                item.barcode.chars().count(),
                request.show_price,
            );

            for _ in 0..item.copies {
                if cancel.is_cancelled() {
                    return Err(PrintError::Cancelled);
                }

                let mut page = Page::default();
                page.image(layout.barcode, src.clone()).text(
                    layout.name,
                    label.name.clone(),
                    TextStyle::bold(profile.name_pt),
                );
                if let Some(price_rect) = layout.price {
                    page.text(
                        price_rect,
                        self.settings.label_price_text(label.price),
                        TextStyle::regular(profile.price_pt),
                    );
                }
                document.push(page);
            }
        }

        Ok(document)
    }

    async fn lookup(&self, barcode: &str) -> PrintResult<LabelText> {
        match self.products.find(barcode).await? {
            Some(product) => Ok(LabelText {
                price: product.sale_price(),
                name: product.name,
            }),
            None => {
                warn!(barcode, "No product for barcode, printing blank name and zero price");
                Ok(LabelText {
                    name: String::new(),
                    price: Money::zero(),
                })
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::DrawOp;
    use crate::device::NetworkPrinter;
    use shelftag_core::{CoreError, ProductDraft};
    use shelftag_db::{Database, DbConfig, RecordingRemover};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::net::TcpListener;

    /// What the simulated printer saw.
    #[derive(Debug, Default)]
    struct Log {
        acquired: usize,
        released: usize,
        sent: Vec<Vec<PrinterOp>>,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Working,
        FailAcquire,
        FailWrite,
        RejectJob,
    }

    #[derive(Debug, Clone)]
    struct MockPrinter {
        mode: Mode,
        log: Arc<Mutex<Log>>,
    }

    impl MockPrinter {
        fn new(mode: Mode) -> Self {
            MockPrinter {
                mode,
                log: Arc::new(Mutex::new(Log::default())),
            }
        }
    }

    struct MockSession {
        mode: Mode,
        log: Arc<Mutex<Log>>,
    }

    impl ThermalPrinter for MockPrinter {
        type Session = MockSession;

        async fn acquire(&self) -> PrintResult<MockSession> {
            if self.mode == Mode::FailAcquire {
                return Err(PrintError::Hardware("device not found".into()));
            }
            self.log.lock().unwrap().acquired += 1;
            Ok(MockSession {
                mode: self.mode,
                log: self.log.clone(),
            })
        }
    }

    impl PrinterSession for MockSession {
        async fn send(&mut self, ops: &[PrinterOp]) -> PrintResult<()> {
            match self.mode {
                Mode::FailWrite => return Err(PrintError::Hardware("paper out".into())),
                Mode::RejectJob => return Err(PrintError::Core(CoreError::EmptySymbol)),
                Mode::Working | Mode::FailAcquire => {}
            }
            self.log.lock().unwrap().sent.push(ops.to_vec());
            Ok(())
        }

        async fn release(self) -> PrintResult<()> {
            self.log.lock().unwrap().released += 1;
            Ok(())
        }
    }

    struct Fixture {
        db: Database,
        scratch: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut tea = ProductDraft::new(
            "Tea",
            5,
            Money::from_cents(10000),
            Money::from_cents(125050),
            "CB00000001",
        );
        db.products().insert(&tea).await.unwrap();
        tea.name = "Coffee".to_string();
        tea.barcode = "6130002".to_string();
        db.products().insert(&tea).await.unwrap();

        Fixture {
            db,
            scratch: tempfile::tempdir().unwrap(),
        }
    }

    fn dispatcher(f: &Fixture, printer: MockPrinter) -> Dispatcher<MockPrinter> {
        let settings = PrintSettings::default().scratch_dir(f.scratch.path());
        Dispatcher::new(f.db.products(), printer, settings)
    }

    fn request(items: &[(&str, u32)], show_price: bool) -> PrintRequest {
        PrintRequest {
            items: items.iter().map(|(b, c)| LabelItem::new(*b, *c)).collect(),
            paper: PaperSize::Medium,
            show_price,
        }
    }

    fn texts(page: &Page) -> Vec<&str> {
        page.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                DrawOp::Image { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_acquire_failure_renders_one_page_per_copy() {
        let f = fixture().await;
        let printer = MockPrinter::new(Mode::FailAcquire);
        let log = printer.log.clone();

        let outcome = dispatcher(&f, printer)
            .dispatch(&request(&[("CB00000001", 3)], true), &CancellationToken::new())
            .await
            .unwrap();

        let PrintOutcome::Fallback(doc) = outcome else {
            panic!("expected fallback");
        };
        assert_eq!(doc.len(), 3);
        assert_eq!(texts(&doc.pages[0]), vec!["Tea", "Prix: 1,250.50 DA"]);

        let log = log.lock().unwrap();
        assert_eq!(log.acquired, 0);
        assert!(log.sent.is_empty());
    }

    #[tokio::test]
    async fn test_direct_job_is_one_write_ending_in_cut() {
        let f = fixture().await;
        let printer = MockPrinter::new(Mode::Working);
        let log = printer.log.clone();

        let outcome = dispatcher(&f, printer)
            .dispatch(
                &request(&[("CB00000001", 2), ("6130002", 1)], true),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(outcome, PrintOutcome::Direct { labels: 3 });

        let log = log.lock().unwrap();
        assert_eq!((log.acquired, log.released), (1, 1));
        assert_eq!(log.sent.len(), 1);

        let ops = &log.sent[0];
        let cuts = ops.iter().filter(|op| **op == PrinterOp::Cut).count();
        assert_eq!(cuts, 1);
        assert_eq!(ops.last(), Some(&PrinterOp::Cut));

        // name, price, barcode, spacing for the first label
        assert_eq!(ops[1], PrinterOp::Text("Tea\n".to_string()));
        assert_eq!(ops[3], PrinterOp::Text("Prix: 1,250.50 DA\n".to_string()));
        assert_eq!(
            ops[4],
            PrinterOp::Barcode {
                data: "CB00000001".to_string(),
                symbology: Symbology::Code128,
                width: 2,
                height: 60,
                align: Align::Center,
            }
        );
        assert_eq!(ops[5], PrinterOp::Text("\n\n".to_string()));
        let barcodes = ops
            .iter()
            .filter(|op| matches!(op, PrinterOp::Barcode { .. }))
            .count();
        assert_eq!(barcodes, 3);
    }

    #[tokio::test]
    async fn test_write_failure_falls_back_and_releases() {
        let f = fixture().await;
        let printer = MockPrinter::new(Mode::FailWrite);
        let log = printer.log.clone();

        let outcome = dispatcher(&f, printer)
            .dispatch(&request(&[("6130002", 2)], false), &CancellationToken::new())
            .await
            .unwrap();

        let PrintOutcome::Fallback(doc) = outcome else {
            panic!("expected fallback");
        };
        assert_eq!(doc.len(), 2);
        assert_eq!(texts(&doc.pages[1]), vec!["Coffee"]);

        let log = log.lock().unwrap();
        assert_eq!((log.acquired, log.released), (1, 1));
        assert!(log.sent.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_job_never_reaches_printer_and_does_not_fall_back() {
        let f = fixture().await;
        let printer = MockPrinter::new(Mode::Working);
        let log = printer.log.clone();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = dispatcher(&f, printer)
            .dispatch(&request(&[("CB00000001", 1)], false), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PrintError::Cancelled));
        let log = log.lock().unwrap();
        assert_eq!((log.acquired, log.released), (0, 0));
        assert!(log.sent.is_empty());
    }

    #[tokio::test]
    async fn test_job_rejected_at_send_falls_back_and_releases() {
        let f = fixture().await;
        let printer = MockPrinter::new(Mode::RejectJob);
        let log = printer.log.clone();

        let outcome = dispatcher(&f, printer)
            .dispatch(&request(&[("CB00000001", 1)], false), &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, PrintOutcome::Fallback(ref doc) if doc.len() == 1));
        let log = log.lock().unwrap();
        assert_eq!((log.acquired, log.released), (1, 1));
    }

    #[tokio::test]
    async fn test_unencodable_barcode_falls_back_before_connecting() {
        let f = fixture().await;
        let long_barcode = "A".repeat(300);
        let draft = ProductDraft::new(
            "Bulk Rice",
            1,
            Money::from_cents(100),
            Money::from_cents(200),
            long_barcode.as_str(),
        );
        f.db.products().insert(&draft).await.unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let printer = NetworkPrinter::from_addr(&listener.local_addr().unwrap().to_string())
            .unwrap()
            .with_timeout(Duration::from_millis(500));

        let settings = PrintSettings::default().scratch_dir(f.scratch.path());
        let outcome = Dispatcher::new(f.db.products(), printer, settings)
            .dispatch(&request(&[(long_barcode.as_str(), 1)], true), &CancellationToken::new())
            .await
            .unwrap();

        let PrintOutcome::Fallback(doc) = outcome else {
            panic!("expected fallback");
        };
        assert_eq!(doc.len(), 1);
        assert_eq!(texts(&doc.pages[0]), vec!["Bulk Rice", "Prix: 2.00 DA"]);

        // the printer was never connected to
        let accepted = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
        assert!(accepted.is_err());
    }

    #[tokio::test]
    async fn test_name_outside_printer_code_page_falls_back() {
        let f = fixture().await;
        let mut draft = f.db.products().get("6130002").await.unwrap().to_draft();
        draft.name = "شاي أخضر".to_string();
        f.db.products().update("6130002", &draft).await.unwrap();

        let printer = MockPrinter::new(Mode::Working);
        let log = printer.log.clone();

        let outcome = dispatcher(&f, printer)
            .dispatch(&request(&[("6130002", 2)], false), &CancellationToken::new())
            .await
            .unwrap();

        let PrintOutcome::Fallback(doc) = outcome else {
            panic!("expected fallback");
        };
        assert_eq!(texts(&doc.pages[0]), vec!["شاي أخضر"]);
        assert_eq!(log.lock().unwrap().acquired, 0);
    }

    #[tokio::test]
    async fn test_missing_product_prints_blank_name_and_zero_price() {
        let f = fixture().await;
        let outcome = dispatcher(&f, MockPrinter::new(Mode::FailAcquire))
            .dispatch(&request(&[("GONE", 1)], true), &CancellationToken::new())
            .await
            .unwrap();

        let PrintOutcome::Fallback(doc) = outcome else {
            panic!("expected fallback");
        };
        assert_eq!(texts(&doc.pages[0]), vec!["", "Prix: 0.00 DA"]);
    }

    #[tokio::test]
    async fn test_lookup_happens_at_dispatch_time() {
        let f = fixture().await;
        let d = dispatcher(&f, MockPrinter::new(Mode::FailAcquire));
        let req = request(&[("CB00000001", 1)], false);

        let mut renamed = f.db.products().get("CB00000001").await.unwrap().to_draft();
        renamed.name = "Green Tea".to_string();
        f.db.products().update("CB00000001", &renamed).await.unwrap();

        let PrintOutcome::Fallback(doc) = d.dispatch(&req, &CancellationToken::new()).await.unwrap()
        else {
            panic!("expected fallback");
        };
        assert_eq!(texts(&doc.pages[0]), vec!["Green Tea"]);
    }

    #[tokio::test]
    async fn test_fallback_layout_and_scratch_cleanup() {
        let f = fixture().await;
        let remover = Arc::new(RecordingRemover::new());
        let settings = PrintSettings::default().scratch_dir(f.scratch.path());
        let rasterizer = BarcodeRasterizer::new(settings.dpi, f.scratch.path())
            .with_remover(remover.clone());
        let d = Dispatcher::new(f.db.products(), MockPrinter::new(Mode::FailAcquire), settings)
            .with_rasterizer(rasterizer);

        let doc = d
            .render_fallback(&request(&[("CB00000001", 2), ("6130002", 0)], true), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.width_mm, 50.0);
        let expected = compute_layout(&PaperSize::Medium.profile(), doc.page, 10, true);
        match &doc.pages[0].ops[0] {
            DrawOp::Image { rect, src } => {
                assert_eq!(*rect, expected.barcode);
                assert!(src.starts_with("data:image/png;base64,"));
            }
            other => panic!("expected image, got {other:?}"),
        }
        // one raster for the item, not one per copy
        assert_eq!(remover.attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_request() {
        let f = fixture().await;
        let err = dispatcher(&f, MockPrinter::new(Mode::Working))
            .dispatch(&request(&[("CB00000001", 0)], false), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PrintError::NothingToPrint));
    }
}

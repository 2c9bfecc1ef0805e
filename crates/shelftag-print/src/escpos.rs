//! ESC/POS command building.
//!
//! The dispatcher describes a label job as a list of [`PrinterOp`]s; this
//! module turns that list into the bytes a thermal printer understands.
//!
//! ```text
//! [SetStyle, Text, SetStyle, Text, Barcode, Text("\n\n"), ..., Cut]
//!        │
//!        ▼  encode_ops
//! ESC @  ESC t 16  ESC a 1  GS ! 11  ESC M 0  "Tea\n"  ...  GS k 73 ...  GS V 0
//! ```

use serde::{Deserialize, Serialize};
use shelftag_core::barcode::Symbology;
use shelftag_core::CoreError;

use crate::error::{PrintError, PrintResult};

/// ESC t 16: Windows-1252 code page on Epson-compatible printers.
const CODE_PAGE_WPC1252: u8 = 16;

/// Largest character magnification GS ! accepts.
const MAX_SCALE: u8 = 8;

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Built-in printer fonts. B is the narrower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    A,
    B,
}

/// One step of a thermal print job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PrinterOp {
    /// Character magnification (1 = normal), font and alignment for what follows.
    SetStyle { scale: u8, font: Font, align: Align },
    /// Text, written as-is (include the newline).
    Text(String),
    /// A barcode symbol. `width` is the module width in dots, `height` the
    /// bar height in dots.
    Barcode {
        data: String,
        symbology: Symbology,
        width: u8,
        height: u8,
        align: Align,
    },
    /// Feed past the tear bar and cut.
    Cut,
}

/// Encodes a job into printer bytes, starting from a printer reset.
pub fn encode_ops(ops: &[PrinterOp]) -> PrintResult<Vec<u8>> {
    let mut builder = EscPosBuilder::new();
    for op in ops {
        match op {
            PrinterOp::SetStyle { scale, font, align } => {
                builder.align(*align).size(*scale).font(*font);
            }
            PrinterOp::Text(text) => {
                builder.text(text);
            }
            PrinterOp::Barcode {
                data,
                symbology,
                width,
                height,
                align,
            } => {
                builder.align(*align);
                match symbology {
                    Symbology::Code128 => builder.code128(data, *width, *height)?,
                };
            }
            PrinterOp::Cut => {
                builder.feed(3).cut();
            }
        }
    }
    Ok(builder.build())
}

/// Checks that a job prints exactly as described, without sending it.
///
/// The builder prints unmappable characters as `?`; here they are an error,
/// as is any barcode the printer cannot encode.
pub fn check_printable(ops: &[PrinterOp]) -> PrintResult<()> {
    for op in ops {
        if let PrinterOp::Text(text) = op {
            let (_, _, unmappable) = encoding_rs::WINDOWS_1252.encode(text);
            if unmappable {
                return Err(PrintError::Unprintable(format!(
                    "'{}' has characters outside Windows-1252",
                    text.trim_end()
                )));
            }
        }
    }
    encode_ops(ops).map(|_| ())
}

/// ESC/POS command builder
///
/// Text is converted to Windows-1252; characters outside it print as `?`.
#[derive(Debug)]
pub struct EscPosBuilder {
    buf: Vec<u8>,
}

impl EscPosBuilder {
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(1024);
        // ESC @ - initialize, ESC t n - code page
        buf.extend_from_slice(&[0x1B, 0x40]);
        buf.extend_from_slice(&[0x1B, 0x74, CODE_PAGE_WPC1252]);
        Self { buf }
    }

    // === Text Output ===

    pub fn text(&mut self, s: &str) -> &mut Self {
        for ch in s.chars() {
            if ch.is_ascii() {
                self.buf.push(ch as u8);
                continue;
            }
            let mut utf8 = [0u8; 4];
            let (bytes, _, unmappable) = encoding_rs::WINDOWS_1252.encode(ch.encode_utf8(&mut utf8));
            if unmappable {
                self.buf.push(b'?');
            } else {
                self.buf.extend_from_slice(&bytes);
            }
        }
        self
    }

    /// Print and feed n lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        // ESC d n
        self.buf.extend_from_slice(&[0x1B, 0x64, lines]);
        self
    }

    // === Style ===

    pub fn align(&mut self, align: Align) -> &mut Self {
        let n = match align {
            Align::Left => 0x00,
            Align::Center => 0x01,
            Align::Right => 0x02,
        };
        // ESC a n
        self.buf.extend_from_slice(&[0x1B, 0x61, n]);
        self
    }

    pub fn font(&mut self, font: Font) -> &mut Self {
        let n = match font {
            Font::A => 0x00,
            Font::B => 0x01,
        };
        // ESC M n
        self.buf.extend_from_slice(&[0x1B, 0x4D, n]);
        self
    }

    /// Same magnification on both axes, clamped to 1..=8.
    pub fn size(&mut self, scale: u8) -> &mut Self {
        let s = scale.clamp(1, MAX_SCALE) - 1;
        // GS ! n - width in the high nibble, height in the low
        self.buf.extend_from_slice(&[0x1D, 0x21, (s << 4) | s]);
        self
    }

    // === Barcodes ===

    /// CODE128 subset B with the human-readable text below the bars.
    pub fn code128(&mut self, data: &str, width: u8, height: u8) -> PrintResult<&mut Self> {
        if data.is_empty() {
            return Err(CoreError::EmptySymbol.into());
        }
        if !data.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
            return Err(CoreError::InvalidBarcode {
                barcode: data.to_string(),
                reason: "only printable ASCII can be sent to the printer".to_string(),
            }
            .into());
        }

        // "{B" selects subset B; a literal '{' is sent as "{{"
        let mut payload = b"{B".to_vec();
        for b in data.bytes() {
            if b == b'{' {
                payload.push(b'{');
            }
            payload.push(b);
        }
        let len = u8::try_from(payload.len()).map_err(|_| CoreError::InvalidBarcode {
            barcode: data.to_string(),
            reason: "too long for a single ESC/POS barcode".to_string(),
        })?;

        // GS H 2 - HRI below, GS w n - module width, GS h n - height
        self.buf.extend_from_slice(&[0x1D, 0x48, 0x02]);
        self.buf.extend_from_slice(&[0x1D, 0x77, width.clamp(2, 6)]);
        self.buf.extend_from_slice(&[0x1D, 0x68, height.max(1)]);
        // GS k 73 n d1..dn - CODE128
        self.buf.extend_from_slice(&[0x1D, 0x6B, 0x49, len]);
        self.buf.extend_from_slice(&payload);
        Ok(self)
    }

    // === Paper Control ===

    /// Cut paper (full cut)
    pub fn cut(&mut self) -> &mut Self {
        // GS V 0
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x00]);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new()
    }
}

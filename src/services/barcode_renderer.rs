//! SVG barcode renderer
//!
//! Maps the client's free-form render parameters onto the `barcoders` 1D
//! symbologies and the `qrcode` crate, producing an SVG string. Only string
//! output exists, whatever the client's `output` parameter says.

use async_trait::async_trait;
use barcoders::generators::svg::SVG;
use barcoders::sym::codabar::Codabar;
use barcoders::sym::code11::Code11;
use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::code93::Code93;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::tf::TF;
use qrcode::QrCode;
use qrcode::render::svg;

use crate::error::RenderError;
use crate::traits::BarcodeRenderer;
use crate::types::RenderParams;

const DEFAULT_HEIGHT: u32 = 80;

/// `barcoders` Code 128 data must start with a character-set indicator;
/// set B covers the printable ASCII range clients actually send.
const CODE128_SET_B: char = '\u{0181}';

#[derive(Debug, Clone, Default)]
pub struct SvgBarcodeRenderer;

impl SvgBarcodeRenderer {
    pub fn new() -> Self {
        Self
    }

    fn render_params(params: &RenderParams) -> Result<String, RenderError> {
        let data = params
            .data
            .as_deref()
            .filter(|data| !data.is_empty())
            .ok_or(RenderError::MissingData)?;
        let symbology = params
            .symbology
            .as_deref()
            .ok_or(RenderError::MissingSymbology)?;
        let height = params.height.unwrap_or(DEFAULT_HEIGHT);

        if symbology == "qrcode" {
            return render_qr(data, height);
        }

        let encoded = encode_linear(symbology, data)?;
        SVG::new(height)
            .generate(&encoded[..])
            .map_err(|err| RenderError::Encode(err.to_string()))
    }
}

#[async_trait]
impl BarcodeRenderer for SvgBarcodeRenderer {
    async fn render(&self, params: &RenderParams) -> Result<String, RenderError> {
        Self::render_params(params)
    }
}

fn encode_linear(symbology: &str, data: &str) -> Result<Vec<u8>, RenderError> {
    let encoded = match symbology {
        "code11" => Code11::new(data).map(|code| code.encode()),
        "code39" => Code39::new(data).map(|code| code.encode()),
        "code93" => Code93::new(data).map(|code| code.encode()),
        "code128" => Code128::new(format!("{CODE128_SET_B}{data}")).map(|code| code.encode()),
        "codabar" => Codabar::new(data).map(|code| code.encode()),
        "ean8" => EAN8::new(data).map(|code| code.encode()),
        "ean13" => EAN13::new(data).map(|code| code.encode()),
        "std2of5" => TF::standard(data).map(|code| code.encode()),
        "int2of5" => TF::interleaved(data).map(|code| code.encode()),
        other => return Err(RenderError::UnsupportedSymbology(other.to_string())),
    };

    encoded.map_err(|err| RenderError::Encode(err.to_string()))
}

fn render_qr(data: &str, height: u32) -> Result<String, RenderError> {
    let code = QrCode::new(data.as_bytes()).map_err(|err| RenderError::Encode(err.to_string()))?;

    Ok(code
        .render()
        .min_dimensions(height, height)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}

//! Chart images as PNG. The SVG from [`super::svg`] is rendered with resvg
//! and encoded with the png crate.

use std::sync::{Arc, Mutex, PoisonError};

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb::Database};

use super::ExportError;

/// Device pixels per chart pixel, so exports stay sharp on dense screens.
pub const PNG_SCALE: f32 = 2.0;

static FONTS: Mutex<Option<Arc<Database>>> = Mutex::new(None);

fn base_fonts() -> Database {
    #[allow(unused_mut)]
    let mut db = Database::new();
    #[cfg(not(target_arch = "wasm32"))]
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "font database ready");
    db
}

fn fonts() -> Arc<Database> {
    let mut guard = FONTS.lock().unwrap_or_else(PoisonError::into_inner);
    guard.get_or_insert_with(|| Arc::new(base_fonts())).clone()
}

/// Add a TrueType/OpenType font and make it the sans-serif fallback for
/// chart text. Hosts without system fonts (the browser) must call this
/// before exporting images, or labels are left out of the PNG.
pub fn register_font(data: Vec<u8>) -> Result<(), ExportError> {
    let mut guard = FONTS.lock().unwrap_or_else(PoisonError::into_inner);
    let mut db = guard.as_deref().cloned().unwrap_or_else(base_fonts);
    let before = db.len();
    db.load_font_data(data);
    if db.len() == before {
        return Err(ExportError::Raster("font data holds no usable face".into()));
    }
    let family = db
        .faces()
        .skip(before)
        .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
    if let Some(family) = family {
        tracing::debug!(%family, "registered export font");
        db.set_sans_serif_family(family);
    }
    *guard = Some(Arc::new(db));
    Ok(())
}

/// Render `svg`, laid out at `width` by `height`, to PNG bytes at
/// [`PNG_SCALE`].
pub fn svg_to_png(svg: &str, width: f64, height: f64) -> Result<Vec<u8>, ExportError> {
    let mut options = usvg::Options::default();
    options.fontdb = fonts();
    let tree = usvg::Tree::from_data(svg.as_bytes(), &options).map_err(|e| ExportError::Raster(e.to_string()))?;

    let px_width = (width * f64::from(PNG_SCALE)).ceil().max(1.0) as u32;
    let px_height = (height * f64::from(PNG_SCALE)).ceil().max(1.0) as u32;
    let mut pixmap = Pixmap::new(px_width, px_height)
        .ok_or_else(|| ExportError::Raster(format!("cannot allocate a {px_width}x{px_height} image")))?;
    resvg::render(&tree, Transform::from_scale(PNG_SCALE, PNG_SCALE), &mut pixmap.as_mut());

    let mut bytes = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut bytes, px_width, px_height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(pixmap.data())?;
        writer.finish()?;
    }
    tracing::debug!(width = px_width, height = px_height, bytes = bytes.len(), "chart rasterized");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn decoded_size(bytes: &[u8]) -> (u32, u32) {
        let reader = png::Decoder::new(bytes).read_info().unwrap();
        let info = reader.info();
        (info.width, info.height)
    }

    #[test]
    fn renders_scaled_png() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="30" viewBox="0 0 40 30"><rect width="40" height="30" fill="#336699"/></svg>"##;
        let bytes = svg_to_png(svg, 40.0, 30.0).unwrap();
        assert!(bytes.starts_with(SIGNATURE));
        assert_eq!(decoded_size(&bytes), (80, 60));
    }

    #[test]
    fn malformed_svg_is_a_raster_error() {
        let err = svg_to_png("<svg", 10.0, 10.0).unwrap_err();
        assert!(matches!(err, ExportError::Raster(_)), "{err:?}");
        assert_eq!(err.message_key(), "export.failed");
    }

    #[test]
    fn garbage_font_is_rejected() {
        let err = register_font(b"not a font".to_vec()).unwrap_err();
        assert!(matches!(err, ExportError::Raster(_)));
    }
}

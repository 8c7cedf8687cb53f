//! Parsed, shareable font resources.
//!
//! A [`Font`] is parsed once and then shared read-only behind an `Arc`, so cloning one (or a
//! whole font list) never copies or re-parses the font data.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use owned_ttf_parser::{AsFaceRef, OwnedFace};
use ttf_parser::Face;

use crate::error::FontError;

const BUNDLED_FONTS: [&[u8]; 10] = [
    include_bytes!("../assets/fonts/DejaVuSans.ttf"),
    include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf"),
    include_bytes!("../assets/fonts/DejaVuSans-Oblique.ttf"),
    include_bytes!("../assets/fonts/DejaVuSans-BoldOblique.ttf"),
    include_bytes!("../assets/fonts/DejaVuSansMono.ttf"),
    include_bytes!("../assets/fonts/DejaVuSansMono-Bold.ttf"),
    include_bytes!("../assets/fonts/DejaVuSansMono-Oblique.ttf"),
    include_bytes!("../assets/fonts/DejaVuSansMono-BoldOblique.ttf"),
    include_bytes!("../assets/fonts/DejaVuSerif.ttf"),
    include_bytes!("../assets/fonts/DejaVuSerif-Bold.ttf"),
];

#[derive(Clone)]
pub struct Font {
    face: Arc<OwnedFace>,
}

impl Font {
    /// Parses the first face of a TrueType/OpenType payload.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ttf_parser::FaceParsingError> {
        let face = OwnedFace::from_vec(data, 0)?;
        Ok(Font {
            face: Arc::new(face),
        })
    }

    pub fn face(&self) -> &Face<'_> {
        self.face.as_face_ref()
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let face = self.face();
        f.debug_struct("Font")
            .field("glyphs", &face.number_of_glyphs())
            .field("units_per_em", &face.units_per_em())
            .finish()
    }
}

/// Parses every payload, failing on the first one that is not a valid font.
pub fn parse_all<I>(payloads: I) -> Result<Vec<Font>, FontError>
where
    I: IntoIterator,
    I::Item: Into<Vec<u8>>,
{
    payloads
        .into_iter()
        .enumerate()
        .map(|(index, data)| {
            Font::from_bytes(data.into()).map_err(|source| FontError::Parse { index, source })
        })
        .collect()
}

/// Reads and parses every font file, failing on the first unreadable or invalid one.
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Font>, FontError> {
    let payloads = paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            std::fs::read(path).map_err(|source| FontError::Read {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect::<Result<Vec<Vec<u8>>, FontError>>()?;
    parse_all(payloads)
}

/// The ten DejaVu variants shipped with the crate, parsed once per process.
pub fn bundled() -> Result<Vec<Font>, FontError> {
    static BUNDLED: OnceCell<Vec<Font>> = OnceCell::new();
    BUNDLED
        .get_or_try_init(|| parse_all(BUNDLED_FONTS))
        .cloned()
}

//! Procedural cube-map synthesis.
//!
//! [`TextureCubeBuilder`] paints the six faces of the environment cube on the
//! CPU. Every face is a pure function of its edge length, its [`CubeFace`] and
//! the label font: a blue background, an inset white panel, the face name
//! (`pos-x`, `neg-y`, ...) centred in blue and a one-pixel outline. Faces on
//! the X and Z axes are turned by 180° so that they can be told apart from
//! inside the cube.
//!
//! The result, [`CubeMapData`], is plain pixel data. Uploading it to the GPU is
//! handled by [`CubeTexture`](crate::CubeTexture); sampling it on the CPU is
//! available through [`CubeMapData::sample`] for the reference shading model.
//!
//! # Example
//!
//! ```
//! use prismbox::{CubeFace, TextureCubeBuilder};
//!
//! let cubemap = TextureCubeBuilder::new().build(64).unwrap();
//! assert_eq!(cubemap.face(CubeFace::NegativeZ).dimensions(), (64, 64));
//! ```

use crate::error::{DemoError, Result};
use crate::label::{LabelFont, fill_block};
use glam::{Vec3, Vec4};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Background and label colour, `rgb(0, 64, 128)`.
pub const BACKGROUND: Rgba<u8> = Rgba([0, 64, 128, 255]);
/// Colour of the inset panel.
pub const PANEL: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Distance of the panel from each face edge, in pixels.
pub const PANEL_INSET: u32 = 8;
/// Largest accepted face edge (wgpu's default 2D texture limit).
pub const MAX_FACE_SIZE: i64 = 8192;

/// Sign half of a face name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn as_str(self) -> &'static str {
        match self {
            Sign::Positive => "pos",
            Sign::Negative => "neg",
        }
    }
}

/// Axis half of a face name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// One of the six faces, in sampler order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces in the order the GPU sampler indexes its layers.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// Layer index of this face.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn sign(self) -> Sign {
        match self {
            CubeFace::PositiveX | CubeFace::PositiveY | CubeFace::PositiveZ => Sign::Positive,
            _ => Sign::Negative,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            CubeFace::PositiveX | CubeFace::NegativeX => Axis::X,
            CubeFace::PositiveY | CubeFace::NegativeY => Axis::Y,
            CubeFace::PositiveZ | CubeFace::NegativeZ => Axis::Z,
        }
    }

    /// Text painted on the face, e.g. `"neg-y"`.
    pub fn label(self) -> String {
        format!("{}-{}", self.sign().as_str(), self.axis().as_str())
    }

    /// X and Z faces are painted upside down.
    pub fn is_flipped(self) -> bool {
        matches!(self.axis(), Axis::X | Axis::Z)
    }
}

/// Six square RGBA images, one per [`CubeFace`]. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct CubeMapData {
    size: u32,
    faces: [RgbaImage; 6],
}

impl CubeMapData {
    /// Edge length of every face in pixels.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn face(&self, face: CubeFace) -> &RgbaImage {
        &self.faces[face.index()]
    }

    /// Faces paired with their identifiers, in sampler order.
    pub fn faces(&self) -> impl Iterator<Item = (CubeFace, &RgbaImage)> {
        CubeFace::ALL.into_iter().zip(self.faces.iter())
    }

    /// All face pixels concatenated layer by layer, ready for upload.
    pub fn layer_major_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.size as usize * self.size as usize * 4 * 6);
        for face in &self.faces {
            bytes.extend_from_slice(face.as_raw());
        }
        bytes
    }

    /// Nearest-texel lookup along `direction`, colours in 0..1.
    ///
    /// Face selection follows the usual major-axis rule. A zero direction
    /// has no face and yields transparent black.
    pub fn sample(&self, direction: Vec3) -> Vec4 {
        let abs = direction.abs();
        if abs.max_element() == 0.0 || !direction.is_finite() {
            return Vec4::ZERO;
        }

        let (face, sc, tc, ma) = if abs.x >= abs.y && abs.x >= abs.z {
            if direction.x > 0.0 {
                (CubeFace::PositiveX, -direction.z, -direction.y, abs.x)
            } else {
                (CubeFace::NegativeX, direction.z, -direction.y, abs.x)
            }
        } else if abs.y >= abs.z {
            if direction.y > 0.0 {
                (CubeFace::PositiveY, direction.x, direction.z, abs.y)
            } else {
                (CubeFace::NegativeY, direction.x, -direction.z, abs.y)
            }
        } else if direction.z > 0.0 {
            (CubeFace::PositiveZ, direction.x, -direction.y, abs.z)
        } else {
            (CubeFace::NegativeZ, -direction.x, -direction.y, abs.z)
        };

        let u = (sc / ma + 1.0) * 0.5;
        let v = (tc / ma + 1.0) * 0.5;
        let last = (self.size - 1) as f32;
        let x = (u * self.size as f32).floor().clamp(0.0, last) as u32;
        let y = (v * self.size as f32).floor().clamp(0.0, last) as u32;

        let texel = self.face(face).get_pixel(x, y);
        Vec4::new(
            texel.0[0] as f32,
            texel.0[1] as f32,
            texel.0[2] as f32,
            texel.0[3] as f32,
        ) / 255.0
    }

    /// Write every face to `dir` as `<label>.png`, creating the directory if needed.
    pub fn export_png(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        for (face, image) in self.faces() {
            let path = dir.join(format!("{}.png", face.label()));
            image.save(&path)?;
            tracing::debug!(path = %path.display(), "exported cube face");
        }
        Ok(())
    }
}

/// Builds [`CubeMapData`] from an edge length.
#[derive(Clone, Debug, Default)]
pub struct TextureCubeBuilder {
    font: Option<LabelFont>,
}

impl TextureCubeBuilder {
    /// A builder using the embedded serif label font.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `font` for the face labels.
    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = Some(font);
        self
    }

    /// Paint all six faces at `size`×`size` pixels.
    ///
    /// Fails with [`DemoError::InvalidTextureSize`] when `size` is not positive
    /// or exceeds [`MAX_FACE_SIZE`]. Identical inputs give identical pixels.
    pub fn build(&self, size: i64) -> Result<CubeMapData> {
        if size <= 0 || size > MAX_FACE_SIZE {
            return Err(DemoError::InvalidTextureSize(size));
        }
        let size = size as u32;
        let font = match &self.font {
            Some(font) => font.clone(),
            None => LabelFont::embedded()?,
        };

        let faces = CubeFace::ALL.map(|face| draw_face(size, face, &font));
        tracing::debug!(size, "built cube-map faces");

        Ok(CubeMapData { size, faces })
    }
}

/// Paint a single face. Pure: depends only on its arguments.
pub fn draw_face(size: u32, face: CubeFace, font: &LabelFont) -> RgbaImage {
    let mut image = paint_upright(size, &face.label(), font);
    if face.is_flipped() {
        image::imageops::rotate180_in_place(&mut image);
    }
    image
}

fn paint_upright(size: u32, label: &str, font: &LabelFont) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(size, size, BACKGROUND);

    let panel = size.saturating_sub(2 * PANEL_INSET);
    fill_block(
        &mut image,
        PANEL_INSET as i64,
        PANEL_INSET as i64,
        panel,
        panel,
        PANEL,
    );

    let center = size as f32 / 2.0;
    font.draw_centered(&mut image, label, center, center, size as f32 / 4.0, BACKGROUND);

    stroke_outline(&mut image, BACKGROUND);
    image
}

fn stroke_outline(image: &mut RgbaImage, color: Rgba<u8>) {
    let (w, h) = image.dimensions();
    fill_block(image, 0, 0, w, 1, color);
    fill_block(image, 0, h as i64 - 1, w, 1, color);
    fill_block(image, 0, 0, 1, h, color);
    fill_block(image, w as i64 - 1, 0, 1, h, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_vec4(color: Rgba<u8>) -> Vec4 {
        Vec4::new(
            color.0[0] as f32,
            color.0[1] as f32,
            color.0[2] as f32,
            color.0[3] as f32,
        ) / 255.0
    }

    #[test]
    fn non_positive_sizes_are_rejected() {
        for size in [0, -1, -512] {
            let err = TextureCubeBuilder::new().build(size).unwrap_err();
            assert!(matches!(err, DemoError::InvalidTextureSize(s) if s == size));
        }
    }

    #[test]
    fn oversized_faces_are_rejected() {
        let err = TextureCubeBuilder::new()
            .build(MAX_FACE_SIZE + 1)
            .unwrap_err();
        assert!(matches!(err, DemoError::InvalidTextureSize(_)));
    }

    #[test]
    fn faces_are_labelled_in_sampler_order() {
        let labels: Vec<String> = CubeFace::ALL.iter().map(|f| f.label()).collect();
        assert_eq!(
            labels,
            ["pos-x", "neg-x", "pos-y", "neg-y", "pos-z", "neg-z"]
        );
        for (i, face) in CubeFace::ALL.iter().enumerate() {
            assert_eq!(face.index(), i);
        }
    }

    #[test]
    fn only_x_and_z_faces_are_flipped() {
        let flipped: Vec<bool> = CubeFace::ALL.iter().map(|f| f.is_flipped()).collect();
        assert_eq!(flipped, [true, true, false, false, true, true]);
    }

    #[test]
    fn building_twice_is_pixel_identical() {
        let builder = TextureCubeBuilder::new();
        let first = builder.build(512).unwrap();
        let second = builder.build(512).unwrap();

        assert_eq!(first.faces().count(), 6);
        for ((face_a, a), (face_b, b)) in first.faces().zip(second.faces()) {
            assert_eq!(face_a, face_b);
            assert_eq!(a.dimensions(), (512, 512));
            assert!(a.as_raw() == b.as_raw(), "{face_a:?} differs between builds");
        }
    }

    #[test]
    fn face_layout_has_border_panel_and_label() {
        let cubemap = TextureCubeBuilder::new().build(512).unwrap();
        for (face, image) in cubemap.faces() {
            assert_eq!(*image.get_pixel(0, 0), BACKGROUND, "{face:?} corner");
            assert_eq!(*image.get_pixel(4, 256), BACKGROUND, "{face:?} border");
            assert_eq!(*image.get_pixel(PANEL_INSET + 1, PANEL_INSET + 1), PANEL);
            assert_eq!(*image.get_pixel(511 - PANEL_INSET - 1, 511 - PANEL_INSET - 1), PANEL);

            let inner = image
                .enumerate_pixels()
                .filter(|(x, y, p)| {
                    (PANEL_INSET..512 - PANEL_INSET).contains(x)
                        && (PANEL_INSET..512 - PANEL_INSET).contains(y)
                        && **p == BACKGROUND
                })
                .count();
            assert!(inner > 0, "{face:?} has no label pixels");
        }
    }

    #[test]
    fn flipped_faces_are_rotated_upright_paintings() {
        let font = LabelFont::embedded().unwrap();
        let upright = paint_upright(128, "pos-x", &font);
        let face = draw_face(128, CubeFace::PositiveX, &font);

        assert_ne!(face, upright);
        assert_eq!(face, image::imageops::rotate180(&upright));
    }

    #[test]
    fn unflipped_faces_are_painted_upright() {
        let font = LabelFont::embedded().unwrap();
        assert_eq!(
            draw_face(128, CubeFace::NegativeY, &font),
            paint_upright(128, "neg-y", &font)
        );
    }

    #[test]
    fn tiny_faces_are_solid_background() {
        let cubemap = TextureCubeBuilder::new().build(1).unwrap();
        for (_, image) in cubemap.faces() {
            assert_eq!(*image.get_pixel(0, 0), BACKGROUND);
        }
    }

    #[test]
    fn layer_major_bytes_concatenates_faces() {
        let cubemap = TextureCubeBuilder::new().build(16).unwrap();
        let bytes = cubemap.layer_major_bytes();
        let face_len = 16 * 16 * 4;
        assert_eq!(bytes.len(), face_len * 6);
        assert_eq!(
            &bytes[face_len * 3..face_len * 4],
            cubemap.face(CubeFace::NegativeY).as_raw().as_slice()
        );
    }

    #[test]
    fn sampling_near_an_edge_hits_the_border() {
        let cubemap = TextureCubeBuilder::new().build(512).unwrap();
        let color = cubemap.sample(Vec3::new(1.0, 0.99, 0.99));
        assert_eq!(color, to_vec4(BACKGROUND));
    }

    #[test]
    fn sampling_the_panel_returns_white() {
        let cubemap = TextureCubeBuilder::new().build(512).unwrap();
        let color = cubemap.sample(Vec3::new(0.5, 1.0, 0.5));
        assert_eq!(color, Vec4::ONE);
    }

    #[test]
    fn sampling_ignores_direction_length() {
        let cubemap = TextureCubeBuilder::new().build(64).unwrap();
        let dir = Vec3::new(-0.3, 0.2, 1.0);
        assert_eq!(cubemap.sample(dir), cubemap.sample(dir * 7.5));
    }

    #[test]
    fn zero_direction_samples_nothing() {
        let cubemap = TextureCubeBuilder::new().build(8).unwrap();
        assert_eq!(cubemap.sample(Vec3::ZERO), Vec4::ZERO);
    }

    #[test]
    fn export_writes_one_png_per_face() {
        let dir = std::env::temp_dir().join(format!("prismbox-export-{}", std::process::id()));
        let cubemap = TextureCubeBuilder::new().build(32).unwrap();
        cubemap.export_png(&dir).unwrap();

        for face in CubeFace::ALL {
            let path = dir.join(format!("{}.png", face.label()));
            let loaded = image::open(&path).unwrap().to_rgba8();
            assert_eq!(&loaded, cubemap.face(face));
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}

//! Minimal fixed-layout PDF writer over `lopdf`: Helvetica text, rules and
//! embedded RGB images, one content stream per page.

use image::GenericImageView;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

/// US Letter, in points.
pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;

/// A decoded raster ready to be embedded as an image XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterImage {
    /// Decodes PNG or JPEG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgb: img.to_rgb8().into_raw(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Content for a single page. Coordinates are PDF points from the bottom left.
#[derive(Debug, Default)]
pub struct Page {
    ops: String,
    images: Vec<(String, ObjectId)>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, x: f64, y: f64, size: f64, font: Font, text: &str) -> &mut Self {
        self.ops.push_str(&format!(
            "BT /{} {} Tf {:.2} {:.2} Td ({}) Tj ET\n",
            font.resource(),
            size,
            x,
            y,
            escape_text(text)
        ));
        self
    }

    /// Horizontally centred text, using an average glyph width estimate.
    pub fn centered(&mut self, y: f64, size: f64, font: Font, text: &str) -> &mut Self {
        let width = text.chars().count() as f64 * size * 0.5;
        self.text((PAGE_WIDTH - width) / 2.0, y, size, font, text)
    }

    pub fn rule(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> &mut Self {
        self.ops.push_str(&format!(
            "{:.2} {:.2} m {:.2} {:.2} l S\n",
            x1, y1, x2, y2
        ));
        self
    }

    /// Draws an image previously registered with [`PdfWriter::add_image`].
    pub fn image(&mut self, id: ObjectId, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        let name = format!("Im{}", self.images.len() + 1);
        self.ops.push_str(&format!(
            "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/{} Do\nQ\n",
            width, height, x, y, name
        ));
        self.images.push((name, id));
        self
    }
}

pub struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    fonts_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let fonts_id = doc.add_object(dictionary! {
            "F1" => regular,
            "F2" => bold,
        });
        Self {
            doc,
            pages_id,
            fonts_id,
            page_ids: Vec::new(),
        }
    }

    /// Embeds the raster once; the id can be drawn on any number of pages.
    pub fn add_image(&mut self, image: &RasterImage) -> ObjectId {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            image.rgb.clone(),
        );
        self.doc.add_object(Object::Stream(stream))
    }

    pub fn add_page(&mut self, page: Page) {
        let mut xobjects = lopdf::Dictionary::new();
        for (name, id) in &page.images {
            xobjects.set(name.as_bytes().to_vec(), *id);
        }
        let resources_id = self.doc.add_object(dictionary! {
            "Font" => self.fonts_id,
            "XObject" => xobjects,
        });
        let content_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, page.ops.into_bytes()));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), (PAGE_WIDTH as i64).into(), (PAGE_HEIGHT as i64).into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        self.page_ids.push(page_id);
    }

    pub fn into_bytes(mut self) -> Result<Vec<u8>, lopdf::Error> {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| (*id).into()).collect();
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.page_ids.len() as i64,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// Escapes a PDF literal string. Non-ASCII characters become `?`.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Splits `text` into lines of at most `width` characters on word boundaries.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

//! Page-level rendering into a PDF document.
//!
//! A [`PageTemplate`] draws the body of each page. After a page body is
//! complete the engine calls [`PageTemplate::draw_footer`] with that page's
//! [`PaginationState`], so footer content is bound late to the finished
//! page. Footer operations are layered underneath the body, the way a
//! page background would be.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::assets::DecorativeImages;
use crate::canvas::Canvas;
use crate::fonts::{Font, encode};
use crate::pagination::{Page, PaginationState};

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.28;

/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 841.89;

/// Draws the pages of a document.
pub trait PageTemplate<T> {
    /// Draws the body of one page: header, content and anything else that
    /// depends on the page's items.
    fn draw_page(&self, canvas: &mut Canvas, page: &Page<'_, T>);

    /// Draws footer decoration for a finished page.
    fn draw_footer(&self, canvas: &mut Canvas, state: &PaginationState);
}

/// Content-stream operations of one rendered page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Counters the footer was drawn with.
    pub state: PaginationState,
    /// Footer layer followed by the page body.
    pub operations: Vec<Operation>,
}

/// Lays out every page, without writing a document.
pub fn compose<T>(template: &impl PageTemplate<T>, pages: &[Page<'_, T>]) -> Vec<RenderedPage> {
    pages
        .iter()
        .map(|page| {
            let mut body = Canvas::new();
            template.draw_page(&mut body, page);

            let mut footer = Canvas::new();
            template.draw_footer(&mut footer, &page.state);

            let mut operations = footer.into_operations();
            operations.extend(body.into_operations());
            log::trace!(
                "Composed page {} ({} operations)",
                page.state.page_number,
                operations.len()
            );
            RenderedPage {
                state: page.state,
                operations,
            }
        })
        .collect()
}

/// Writes composed pages into a compressed PDF.
///
/// # Errors
///
/// * If a content stream fails to encode
/// * If the document fails to serialize
pub fn write_pdf(
    pages: Vec<RenderedPage>,
    images: &DecorativeImages,
    title: &str,
) -> Result<Vec<u8>, crate::ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let resources = resources(&mut doc, images);
    let resources_id = doc.add_object(resources);

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page.operations,
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(count),
        "Resources" => resources_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH),
            Object::Real(PAGE_HEIGHT),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode(title), StringFormat::Literal),
        "Producer" => Object::String(b"air_quality_report".to_vec(), StringFormat::Literal),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    log::debug!("Wrote PDF of {count} pages ({} bytes)", bytes.len());
    Ok(bytes)
}

fn resources(doc: &mut Document, images: &DecorativeImages) -> Dictionary {
    let mut fonts = Dictionary::new();
    for font in [Font::Regular, Font::Bold] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }

    let mut xobjects = Dictionary::new();
    for (kind, image) in images.iter() {
        let image_id = doc.add_object(image.stream.clone());
        xobjects.set(kind.resource_name(), image_id);
    }

    let mut resources = dictionary! {
        "Font" => fonts,
    };
    if !xobjects.is_empty() {
        resources.set("XObject", xobjects);
    }
    resources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Span, shown_text};
    use crate::pagination::{PAGE_CAPACITY, paginate};
    use air_quality_style::Rgb;

    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    struct Numbered;

    impl PageTemplate<u32> for Numbered {
        fn draw_page(&self, canvas: &mut Canvas, page: &Page<'_, u32>) {
            for (i, item) in page.items.iter().enumerate() {
                #[allow(clippy::cast_precision_loss)]
                let y = (i as f32).mul_add(-20.0, 800.0);
                canvas.text(
                    40.0,
                    y,
                    10.0,
                    &Span::new(format!("item {item}"), Font::Regular, BLACK),
                );
            }
        }

        fn draw_footer(&self, canvas: &mut Canvas, state: &PaginationState) {
            canvas.text(
                40.0,
                30.0,
                7.0,
                &Span::new(state.footer_text(), Font::Bold, BLACK),
            );
        }
    }

    #[test]
    fn footer_is_layered_before_body() {
        let items: Vec<u32> = (0..3).collect();
        let pages = paginate(&items, PAGE_CAPACITY);
        let rendered = compose(&Numbered, &pages);
        assert_eq!(rendered.len(), 1);
        assert_eq!(
            shown_text(&rendered[0].operations),
            b"3 de 3 sensores | P\xE1gina 1item 0item 1item 2".to_vec()
        );
    }

    #[test]
    fn written_document_has_one_page_per_chunk() {
        let items: Vec<u32> = (0..15).collect();
        let pages = paginate(&items, PAGE_CAPACITY);
        let bytes = write_pdf(
            compose(&Numbered, &pages),
            &DecorativeImages::default(),
            "Teste",
        )
        .unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        assert_eq!(page_ids.len(), 3);

        let last = doc.get_page_content(page_ids[2]).unwrap();
        let ops = Content::decode(&last).unwrap().operations;
        assert_eq!(
            shown_text(&ops),
            b"15 de 15 sensores | P\xE1gina 3item 14".to_vec()
        );
    }
}

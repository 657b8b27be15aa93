//! PDF document assembly and finalization.

use std::io::Write;
use std::path::Path;

use activity_core::error::{ActivityError, Result};
use activity_core::output::write_atomically;
use activity_core::settings::PageSize;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::canvas::{PageCanvas, FONT_RESOURCE};

/// A PDF being built page by page. Nothing touches the filesystem until
/// [`finalize`](Self::finalize).
pub struct ReportDocument {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    page_size: PageSize,
    title: String,
}

impl ReportDocument {
    pub fn new(page_size: PageSize, title: &str) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_RESOURCE => font_id,
            },
        });

        Self {
            doc,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            page_size,
            title: title.to_string(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append `canvas` as the next page.
    pub fn add_page(&mut self, canvas: PageCanvas) -> Result<()> {
        let content = canvas.into_content()?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            (self.page_size.width as i64).into(),
            (self.page_size.height as i64).into(),
        ];
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "MediaBox" => media_box,
        });
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Close the page tree and write the file at `path` in one atomic step.
    pub fn finalize(mut self, path: &Path) -> Result<()> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
            "Resources" => self.resources_id,
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::string_literal(self.title.as_str()),
            "Producer" => Object::string_literal(concat!("chat-activity ", env!("CARGO_PKG_VERSION"))),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);
        self.doc.compress();

        let doc = &mut self.doc;
        write_atomically(path, |w| {
            let mut writer: &mut dyn Write = w;
            doc.save_to(&mut writer)
                .map_err(|e| ActivityError::Pdf(e.to_string()))
        })?;
        debug!("Wrote {} pages to {}", self.page_ids.len(), path.display());
        Ok(())
    }
}

//! Two-phase catalog export.
//!
//! `preview_*` freezes the loaded catalog into a [`Snapshot`] without any I/O.
//! `confirm` resolves the snapshot's images and renders the PDF. An image
//! that cannot be embedded is drawn as a placeholder instead.

use crate::core::images::ImageResolver;
use crate::core::pdf::{self, DocumentInfo, Element};
use crate::core::presentation::{display_or, export_price};
use crate::core::raster::{self, RasterImage};
use crate::domain::model::{CatalogTree, CategoryNode, Product};
use crate::domain::ports::{ImageFetcher, Storage};
use crate::utils::error::{CatalogError, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;

pub const PLACEHOLDER_LABEL: &str = "Image unavailable";

const MAIN_IMAGE_WIDTH: f32 = 256.0;
const CATEGORY_IMAGE_WIDTH: f32 = 192.0;
const PRODUCT_IMAGE_WIDTH: f32 = 160.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Paragraph(String),
    Image { reference: String, max_width: f32 },
}

/// Frozen, renderable copy of the catalog taken at preview time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    menu_id: String,
    title: String,
    blocks: Vec<Block>,
    captured_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn file_name(&self) -> String {
        format!("menu-{}-details.pdf", self.menu_id)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn image_references(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Image { reference, .. } => Some(reference.as_str()),
            _ => None,
        })
    }
}

/// An image that was replaced by a placeholder during confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderNote {
    /// Index of the image block within the snapshot.
    pub position: usize,
    pub reference: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub placeholders: Vec<PlaceholderNote>,
}

pub struct SnapshotExporter<F: ImageFetcher> {
    fetcher: F,
    resolver: ImageResolver,
}

impl<F: ImageFetcher> SnapshotExporter<F> {
    pub fn new(fetcher: F, resolver: ImageResolver) -> Self {
        Self { fetcher, resolver }
    }

    /// Whole menu: every category followed by its products.
    pub fn preview_tree(&self, tree: &CatalogTree) -> Snapshot {
        let mut blocks = vec![Block::Title("Menu & Categories Overview".to_string())];
        if let Some(image) = tree.first_image.as_ref().or(tree.menu.photo.as_ref()) {
            blocks.push(Block::Image {
                reference: image.clone(),
                max_width: MAIN_IMAGE_WIDTH,
            });
        }
        if tree.categories.is_empty() {
            blocks.push(Block::Paragraph("No categories available.".to_string()));
        }
        for node in &tree.categories {
            push_category(&mut blocks, node, CATEGORY_IMAGE_WIDTH);
        }

        snapshot(&tree.menu.id, &tree.menu.name, blocks)
    }

    /// A single category with its description, representative image and products.
    pub fn preview_category(&self, menu_id: &str, node: &CategoryNode) -> Snapshot {
        let mut blocks = Vec::new();
        push_category(&mut blocks, node, MAIN_IMAGE_WIDTH);
        snapshot(menu_id, &node.category.label, blocks)
    }

    pub async fn confirm(&self, snapshot: &Snapshot) -> ExportedDocument {
        tracing::info!(
            "📄 Rendering {} ({} images)",
            snapshot.file_name(),
            snapshot.image_references().count()
        );

        let loads = snapshot.blocks.iter().map(|block| async move {
            match block {
                Block::Image { reference, .. } => Some(self.load_image(reference).await),
                _ => None,
            }
        });
        let images: Vec<Option<Result<RasterImage>>> = join_all(loads).await;

        let mut placeholders = Vec::new();
        for (position, (block, image)) in snapshot.blocks.iter().zip(&images).enumerate() {
            if let (Block::Image { reference, .. }, Some(Err(e))) = (block, image) {
                tracing::warn!("⚠️ Using placeholder for image '{}': {}", reference, e);
                placeholders.push(PlaceholderNote {
                    position,
                    reference: reference.clone(),
                    reason: e.to_string(),
                });
            }
        }

        let elements: Vec<Element> = snapshot
            .blocks
            .iter()
            .zip(&images)
            .map(|(block, image)| match (block, image) {
                (Block::Title(text), _) => Element::Title(text),
                (Block::Heading(text), _) => Element::Heading(text),
                (Block::Paragraph(text), _) => Element::Paragraph(text),
                (Block::Image { max_width, .. }, Some(Ok(image))) => Element::Image {
                    image,
                    max_width: *max_width,
                },
                (Block::Image { max_width, .. }, _) => Element::Placeholder {
                    label: PLACEHOLDER_LABEL,
                    max_width: *max_width,
                },
            })
            .collect();

        let rendered = pdf::render(
            &elements,
            &DocumentInfo {
                title: &snapshot.title,
                created_at: Utc::now(),
            },
        );

        tracing::info!(
            "✅ Rendered {} pages, {} bytes, {} placeholders",
            rendered.page_count,
            rendered.bytes.len(),
            placeholders.len()
        );

        ExportedDocument {
            file_name: snapshot.file_name(),
            bytes: rendered.bytes,
            page_count: rendered.page_count,
            placeholders,
        }
    }

    pub async fn save<S: Storage>(&self, document: &ExportedDocument, storage: &S) -> Result<String> {
        let path = storage.write_file(&document.file_name, &document.bytes).await?;
        tracing::info!("📁 Export saved to: {}", path);
        Ok(path)
    }

    async fn load_image(&self, reference: &str) -> Result<RasterImage> {
        let url = self.resolver.resolve(reference)?;
        let failed = |reason: String| CatalogError::ExportResolutionFailed {
            reference: reference.to_string(),
            reason,
        };

        tracing::debug!("Fetching image {}", url);
        let bytes = self
            .fetcher
            .fetch_image(&url)
            .await
            .map_err(|e| failed(e.to_string()))?;
        raster::decode(&bytes).map_err(failed)
    }
}

fn snapshot(menu_id: &str, title: &str, blocks: Vec<Block>) -> Snapshot {
    Snapshot {
        menu_id: menu_id.to_string(),
        title: title.to_string(),
        blocks,
        captured_at: Utc::now(),
    }
}

fn push_category(blocks: &mut Vec<Block>, node: &CategoryNode, image_width: f32) {
    let category = &node.category;
    blocks.push(Block::Heading(category.label.clone()));
    blocks.push(Block::Paragraph(
        display_or(category.description.as_deref(), "No description").to_string(),
    ));
    if let Some(photo) = &category.photo {
        blocks.push(Block::Image {
            reference: photo.clone(),
            max_width: image_width,
        });
    }
    for product in &node.products {
        push_product(blocks, product);
    }
}

fn push_product(blocks: &mut Vec<Block>, product: &Product) {
    blocks.push(Block::Heading(product.name.clone()));
    blocks.push(Block::Paragraph(format!("Price: ${}", export_price(product.price))));
    blocks.push(Block::Paragraph(
        display_or(product.description.as_deref(), "No description").to_string(),
    ));
    if let Some(photo) = &product.photo {
        blocks.push(Block::Image {
            reference: photo.clone(),
            max_width: PRODUCT_IMAGE_WIDTH,
        });
    }
}

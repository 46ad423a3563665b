//! Menu seeding.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use bartender_cloud::{ObjectStorage, S3Storage};
use bartender_core::images::{original_key, ALLOWED_UPLOAD_TYPES};
use bartender_core::types::DbId;
use bartender_db::repositories::{DrinkRepo, OrderRepo, SectionRepo};
use bartender_db::DbPool;

use crate::menu::MenuFile;

/// How `seed` treats the existing menu and drink images.
#[derive(Debug, Default)]
pub struct SeedOptions {
    /// Delete existing drinks and sections first.
    pub clear: bool,
    /// Allow `clear` to proceed when orders exist; they are deleted too.
    pub force: bool,
    /// Directory holding the image files named by each drink's `image`.
    pub images_dir: Option<PathBuf>,
}

/// A seeded drink whose image should be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    pub drink_id: DbId,
    pub drink_name: String,
    pub file_name: String,
}

/// Load `file` and insert its sections and drinks, then upload images.
pub async fn run(pool: &DbPool, file: &Path, options: SeedOptions) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let menu: MenuFile = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid menu file", file.display()))?;

    let images = seed_menu(pool, &menu, &options).await?;

    if let Some(dir) = &options.images_dir {
        let bucket = std::env::var("IMAGES_BUCKET")
            .ok()
            .filter(|b| !b.is_empty())
            .context("IMAGES_BUCKET must be set to upload images")?;
        let region = std::env::var("AWS_REGION").ok().filter(|r| !r.is_empty());
        let storage = S3Storage::from_env(bucket, region).await;
        let uploaded = upload_images(&storage, dir, &images).await?;
        tracing::info!(uploaded, bucket = %storage.bucket(), "Image upload complete");
    }
    Ok(())
}

/// Insert every section and drink of `menu` in one transaction.
///
/// Sections get display orders 1..n in file order. Returns the drinks that
/// name an image file.
pub async fn seed_menu(
    pool: &DbPool,
    menu: &MenuFile,
    options: &SeedOptions,
) -> anyhow::Result<Vec<PendingImage>> {
    if options.clear && !options.force {
        let orders = OrderRepo::count(pool).await?;
        if orders > 0 {
            bail!(
                "--clear would delete {orders} existing orders along with their drinks; \
                 re-run with --force to proceed"
            );
        }
    }

    let mut tx = pool.begin().await?;
    let names = menu.section_names();
    let sections = SectionRepo::seed(&mut tx, &names, options.clear)
        .await
        .context("Failed to create sections")?;

    let mut images = Vec::new();
    let mut total = 0;
    for (section, source) in sections.iter().zip(&menu.menu.sections) {
        tracing::info!(section = %section.name, display_order = section.display_order, "Created section");
        for item in &source.drinks {
            let drink = DrinkRepo::create(&mut *tx, &item.to_create(section.id))
                .await
                .with_context(|| format!("Failed to create drink '{}'", item.name))?;
            tracing::info!(drink_id = %drink.id, name = %drink.name, "Created drink");
            if let Some(file_name) = item.image.as_deref().filter(|f| !f.trim().is_empty()) {
                images.push(PendingImage {
                    drink_id: drink.id,
                    drink_name: drink.name.clone(),
                    file_name: file_name.trim().to_string(),
                });
            }
            total += 1;
        }
    }

    tx.commit().await.context("Failed to commit seed")?;
    if options.clear {
        tracing::info!("Existing menu cleared");
    }
    tracing::info!(sections = sections.len(), drinks = total, "Seeding complete");
    Ok(images)
}

/// Upload each pending image from `dir` as its drink's original.
///
/// The image pipeline picks the upload up and fills in `image_url`. Missing
/// files and unsupported extensions are skipped with a warning. Returns the
/// number uploaded.
pub async fn upload_images(
    storage: &dyn ObjectStorage,
    dir: &Path,
    images: &[PendingImage],
) -> anyhow::Result<usize> {
    let mut uploaded = 0;
    for image in images {
        let path = dir.join(&image.file_name);
        let Some((ext, content_type)) = upload_type(&path) else {
            tracing::warn!(drink = %image.drink_name, file = %path.display(), "Unsupported image type, skipping");
            continue;
        };
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(drink = %image.drink_name, file = %path.display(), error = %e, "Image not readable, skipping");
                continue;
            }
        };

        let key = original_key(image.drink_id, ext);
        storage
            .put_object(&key, body, content_type, None)
            .await
            .with_context(|| format!("Failed to upload image for '{}'", image.drink_name))?;
        tracing::info!(drink_id = %image.drink_id, key = %key, "Uploaded image");
        uploaded += 1;
    }
    Ok(uploaded)
}

/// Stored extension and content type for an image file, by its extension.
fn upload_type(path: &Path) -> Option<(&'static str, &'static str)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };
    ALLOWED_UPLOAD_TYPES
        .iter()
        .find(|(_, allowed)| *allowed == ext)
        .map(|(content_type, allowed)| (*allowed, *content_type))
}

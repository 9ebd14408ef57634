//! Deferred image resolution.
//!
//! Uploading runs outside the catalog write path. Its outcome is a list of
//! resolved ids fed back into a pending offering with
//! [`Offering::attach_images`](crate::Offering::attach_images); failed uploads
//! are reported and never touch catalog state.

use thiserror::Error;

use dailyround_core::ImageId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("image rejected: {0}")]
    Rejected(String),

    #[error("upload transport failed: {0}")]
    Transport(String),
}

/// Image collaborator.
pub trait ImageUploader {
    fn upload(&self, image: &[u8]) -> Result<ImageId, UploadError>;
}

impl<U: ImageUploader + ?Sized> ImageUploader for &U {
    fn upload(&self, image: &[u8]) -> Result<ImageId, UploadError> {
        (**self).upload(image)
    }
}

/// Outcome of uploading a batch: ids in input order, plus per-index failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageResolution {
    pub resolved: Vec<ImageId>,
    pub failures: Vec<(usize, UploadError)>,
}

impl ImageResolution {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Upload every image, continuing past failures.
pub fn resolve_images<U, I, B>(uploader: &U, images: I) -> ImageResolution
where
    U: ImageUploader + ?Sized,
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut resolution = ImageResolution::default();
    for (idx, image) in images.into_iter().enumerate() {
        match uploader.upload(image.as_ref()) {
            Ok(id) => resolution.resolved.push(id),
            Err(err) => {
                tracing::warn!(index = idx, error = %err, "image upload failed");
                resolution.failures.push((idx, err));
            }
        }
    }
    resolution
}

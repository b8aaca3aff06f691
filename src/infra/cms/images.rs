use crate::application::render::AssetUrlResolver;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// Resolves `image-<id>-<w>x<h>-<ext>` asset references to CDN URLs.
#[derive(Debug, Clone)]
pub struct SanityImageUrls {
    project_id: String,
    dataset: String,
}

impl SanityImageUrls {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }
}

impl AssetUrlResolver for SanityImageUrls {
    fn image_url(&self, asset_ref: &str) -> Option<String> {
        let (id, dimensions, extension) = parse_image_ref(asset_ref)?;
        Some(format!(
            "{CDN_BASE}/{}/{}/{id}-{dimensions}.{extension}",
            self.project_id, self.dataset
        ))
    }
}

fn parse_image_ref(asset_ref: &str) -> Option<(&str, &str, &str)> {
    let rest = asset_ref.strip_prefix("image-")?;
    let (rest, extension) = rest.rsplit_once('-')?;
    let (id, dimensions) = rest.rsplit_once('-')?;

    let (width, height) = dimensions.split_once('x')?;
    let is_number = |value: &str| !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit());
    let is_token =
        |value: &str| !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphanumeric());
    let id_ok = !id.is_empty()
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

    let well_formed = is_number(width) && is_number(height) && is_token(extension) && id_ok;
    well_formed.then_some((id, dimensions, extension))
}

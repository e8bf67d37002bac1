/// Image file decoding into textures
///
/// Decode failures never abort a load: they are logged and an empty texture
/// is registered under the requested name, which resolves to the default
/// checkerboard.

use std::path::Path;
use crate::asset::{Asset, AssetManager, Texture, TextureHandle};
use crate::error::Result;
use crate::graphics_device::ImageFormat;
use crate::resource::{mip_levels_for, ImageResource};
use crate::{engine_error, engine_info};

fn mip_levels(width: u32, height: u32, mip_mapped: bool) -> u32 {
    if mip_mapped { mip_levels_for(width, height) } else { 1 }
}

/// Upload `image` and register it as a texture named `name`
fn register(manager: &mut AssetManager, name: String, image: ImageResource) -> Result<TextureHandle> {
    if manager.log_asset_loading() {
        engine_info!(
            "galaxy3d::TextureLoader",
            "Loaded texture {} ({}x{}, {} mips)",
            name, image.width, image.height, image.mip_levels
        );
    }
    let transparent = image.transparent;
    let resources = manager.resources_mut();
    let image = resources.add_image(image);
    resources.upload_image(image)?;
    let sampler = resources.default_sampler();
    manager.add_texture(Texture::new(name, image, sampler, transparent))
}

/// Decode an image file into an RGBA8 texture named after its path
pub fn handle_texture(manager: &mut AssetManager, path: &Path, srgb: bool, mip_mapped: bool) -> Result<TextureHandle> {
    let name = path.to_string_lossy().into_owned();
    let decoded = match image::open(path) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(e) => {
            engine_error!("galaxy3d::TextureLoader", "Texture file is invalid {}: {}", name, e);
            return manager.add_texture(Texture::empty(name));
        }
    };

    let (width, height) = decoded.dimensions();
    let format = if srgb { ImageFormat::R8G8B8A8_SRGB } else { ImageFormat::R8G8B8A8_UNORM };
    let image = ImageResource::new(width, height, 4, format, decoded.into_raw())
        .with_mip_levels(mip_levels(width, height, mip_mapped));
    register(manager, name, image)
}

/// Pack grayscale images into the channels of one texture
///
/// Image `i` lands in channel `i`. Three inputs get a zero fourth channel
/// (three-channel formats are not sampled). The texture is named after the
/// joined paths (`a.png+b.png+c.png`).
pub fn handle_texture_combination(manager: &mut AssetManager, paths: &[&Path], mip_mapped: bool) -> Result<TextureHandle> {
    let name = paths
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join("+");

    let mut planes = Vec::with_capacity(paths.len());
    for path in paths {
        match image::open(path) {
            Ok(decoded) => planes.push(decoded.to_luma8()),
            Err(e) => {
                engine_error!("galaxy3d::TextureLoader", "Failed to read texture image {}: {}", path.display(), e);
                return manager.add_texture(Texture::empty(name));
            }
        }
    }

    let Some((width, height)) = planes.first().map(|p| p.dimensions()) else {
        engine_error!("galaxy3d::TextureLoader", "Texture combination without images");
        return manager.add_texture(Texture::empty(name));
    };
    if planes.iter().any(|p| p.dimensions() != (width, height)) {
        engine_error!("galaxy3d::TextureLoader", "Combined images differ in size: {}", name);
        return manager.add_texture(Texture::empty(name));
    }

    let channels = if planes.len() == 3 { 4 } else { planes.len() as u32 };
    let Some(format) = ImageResource::pixel_format_for(channels, false, false) else {
        engine_error!("galaxy3d::TextureLoader", "Cannot combine {} images into one texture", planes.len());
        return manager.add_texture(Texture::empty(name));
    };

    let pixel_count = width as usize * height as usize;
    let stride = channels as usize;
    let mut data = vec![0u8; pixel_count * stride];
    for (channel, plane) in planes.iter().enumerate() {
        for (i, value) in plane.as_raw().iter().enumerate() {
            data[i * stride + channel] = *value;
        }
    }

    let image = ImageResource::new(width, height, channels, format, data)
        .with_mip_levels(mip_levels(width, height, mip_mapped));
    register(manager, name, image)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "texture_loader_tests.rs"]
mod tests;

//! Unit tests for Vulkan format conversion functions
//!
//! Pure mappings, no GPU required.

use super::*;

// ============================================================================
// IMAGE FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_image_format_to_vk_unorm_formats() {
    assert_eq!(image_format_to_vk(ImageFormat::R8_UNORM), vk::Format::R8_UNORM);
    assert_eq!(image_format_to_vk(ImageFormat::R8G8_UNORM), vk::Format::R8G8_UNORM);
    assert_eq!(image_format_to_vk(ImageFormat::R8G8B8A8_UNORM), vk::Format::R8G8B8A8_UNORM);
}

#[test]
fn test_image_format_to_vk_srgb_and_snorm_formats() {
    assert_eq!(image_format_to_vk(ImageFormat::R8_SRGB), vk::Format::R8_SRGB);
    assert_eq!(image_format_to_vk(ImageFormat::R8G8B8A8_SRGB), vk::Format::R8G8B8A8_SRGB);
    assert_eq!(image_format_to_vk(ImageFormat::R8G8_SNORM), vk::Format::R8G8_SNORM);
}

// ============================================================================
// USAGE / MEMORY FLAGS
// ============================================================================

#[test]
fn test_buffer_usage_to_vk() {
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::VERTEX | BufferUsage::TRANSFER_DST),
        vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST
    );
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::STORAGE | BufferUsage::INDEX),
        vk::BufferUsageFlags::STORAGE_BUFFER | vk::BufferUsageFlags::INDEX_BUFFER
    );
    assert_eq!(buffer_usage_to_vk(BufferUsage::empty()), vk::BufferUsageFlags::empty());
}

#[test]
fn test_image_usage_to_vk() {
    assert_eq!(
        image_usage_to_vk(ImageUsage::SAMPLED | ImageUsage::TRANSFER_SRC | ImageUsage::TRANSFER_DST),
        vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_SRC | vk::ImageUsageFlags::TRANSFER_DST
    );
}

#[test]
fn test_memory_properties_from_vk() {
    let staging = memory_properties_from_vk(
        vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
    );
    assert!(staging.is_host_visible());
    assert!(!staging.contains(MemoryProperties::DEVICE_LOCAL));

    let device_local = memory_properties_from_vk(
        vk::MemoryPropertyFlags::DEVICE_LOCAL | vk::MemoryPropertyFlags::LAZILY_ALLOCATED,
    );
    assert_eq!(device_local, MemoryProperties::DEVICE_LOCAL);
}

// ============================================================================
// SAMPLER CONVERSIONS
// ============================================================================

#[test]
fn test_sampler_conversions() {
    assert_eq!(filter_to_vk(Filter::Linear), vk::Filter::LINEAR);
    assert_eq!(mipmap_mode_to_vk(MipmapMode::Nearest), vk::SamplerMipmapMode::NEAREST);
    assert_eq!(address_mode_to_vk(AddressMode::MirroredRepeat), vk::SamplerAddressMode::MIRRORED_REPEAT);
    assert_eq!(address_mode_to_vk(AddressMode::ClampToBorder), vk::SamplerAddressMode::CLAMP_TO_BORDER);
    assert_eq!(border_color_to_vk(BorderColor::IntOpaqueBlack), vk::BorderColor::INT_OPAQUE_BLACK);
}

// ============================================================================
// LAYOUTS
// ============================================================================

#[test]
fn test_image_layout_to_vk() {
    assert_eq!(image_layout_to_vk(ImageLayout::Undefined), vk::ImageLayout::UNDEFINED);
    assert_eq!(image_layout_to_vk(ImageLayout::TransferDst), vk::ImageLayout::TRANSFER_DST_OPTIMAL);
    assert_eq!(image_layout_to_vk(ImageLayout::ShaderReadOnly), vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
}

#[test]
fn test_layout_access_for_upload_path() {
    let (access, stage) = layout_access(ImageLayout::Undefined);
    assert!(access.is_empty());
    assert_eq!(stage, vk::PipelineStageFlags::TOP_OF_PIPE);

    assert_eq!(
        layout_access(ImageLayout::TransferSrc),
        (vk::AccessFlags::TRANSFER_READ, vk::PipelineStageFlags::TRANSFER)
    );
    assert_eq!(
        layout_access(ImageLayout::ShaderReadOnly),
        (vk::AccessFlags::SHADER_READ, vk::PipelineStageFlags::FRAGMENT_SHADER)
    );
}

#[test]
fn test_descriptor_type_and_extent() {
    assert_eq!(descriptor_type_to_vk(DescriptorType::StorageBuffer), vk::DescriptorType::STORAGE_BUFFER);
    assert_eq!(
        descriptor_type_to_vk(DescriptorType::CombinedImageSampler),
        vk::DescriptorType::COMBINED_IMAGE_SAMPLER
    );
    assert_eq!(extent_offset((64, 32)), vk::Offset3D { x: 64, y: 32, z: 1 });
}

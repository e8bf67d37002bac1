//! Integration tests for VulkanGraphicsDevice
//!
//! These tests verify that VulkanGraphicsDevice correctly implements the GraphicsDevice trait
//! on a real GPU, without a window. All tests require a GPU and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_graphics_device_tests -- --ignored

use galaxy_3d_assets::galaxy3d::{AssetConfig, AssetSubsystem};
use galaxy_3d_assets::galaxy3d::device::{
    BufferDesc, BufferUsage, DescriptorBinding, DescriptorSetDesc, DescriptorType, DescriptorWrite,
    GraphicsDevice, ImageBarrier, ImageDesc, ImageFormat, ImageLayout, ImageUsage, MemoryProperties,
    SamplerDesc,
};
use galaxy_3d_assets_vulkan::galaxy3d::VulkanGraphicsDevice;
use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use std::ffi::CStr;
use std::sync::{Arc, Mutex};

/// Headless Vulkan 1.2 instance + device with partially bound descriptors enabled
struct Headless {
    _entry: ash::Entry,
    instance: ash::Instance,
    device: ash::Device,
    allocator: Option<Arc<Mutex<Allocator>>>,
    queue: vk::Queue,
    queue_family: u32,
}

impl Headless {
    fn new() -> Self {
        unsafe {
            let entry = ash::Entry::load().unwrap();
            let app_name = CStr::from_bytes_with_nul(b"galaxy3d_assets_tests\0").unwrap();
            let app_info = vk::ApplicationInfo::default()
                .application_name(app_name)
                .api_version(vk::API_VERSION_1_2);
            let instance = entry
                .create_instance(&vk::InstanceCreateInfo::default().application_info(&app_info), None)
                .unwrap();

            let physical_device = instance.enumerate_physical_devices().unwrap()[0];
            let queue_family = instance
                .get_physical_device_queue_family_properties(physical_device)
                .iter()
                .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                .unwrap() as u32;

            let priorities = [1.0];
            let queue_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(queue_family)
                .queue_priorities(&priorities)];
            let mut features12 = vk::PhysicalDeviceVulkan12Features::default()
                .descriptor_binding_partially_bound(true);
            let device_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_infos)
                .push_next(&mut features12);
            let device = instance.create_device(physical_device, &device_info, None).unwrap();
            let queue = device.get_device_queue(queue_family, 0);

            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .unwrap();

            Self {
                _entry: entry,
                instance,
                device,
                allocator: Some(Arc::new(Mutex::new(allocator))),
                queue,
                queue_family,
            }
        }
    }

    fn graphics_device(&self) -> VulkanGraphicsDevice {
        VulkanGraphicsDevice::new(
            self.device.clone(),
            Arc::clone(self.allocator.as_ref().unwrap()),
            self.queue,
            self.queue_family,
            1024 * 1024,
        )
        .unwrap()
    }
}

impl Drop for Headless {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();
            // Allocator must go before the device
            self.allocator.take();
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}

fn rgba_image_desc(width: u32, height: u32, mip_levels: u32) -> ImageDesc {
    ImageDesc {
        width,
        height,
        mip_levels,
        format: ImageFormat::R8G8B8A8_UNORM,
        usage: ImageUsage::SAMPLED | ImageUsage::TRANSFER_DST | ImageUsage::TRANSFER_SRC,
    }
}

// ============================================================================
// BUFFER TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_create_device_local_buffer() {
    let headless = Headless::new();
    let mut device = headless.graphics_device();

    let buffer = device
        .create_buffer(BufferDesc {
            size: 4096,
            usage: BufferUsage::STORAGE | BufferUsage::TRANSFER_DST,
        })
        .unwrap();

    assert_eq!(buffer.size(), 4096);
    assert!(buffer.memory_properties().contains(MemoryProperties::DEVICE_LOCAL));
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_staging_buffer_is_reused() {
    let headless = Headless::new();
    let mut device = headless.graphics_device();

    let staging = device.request_staging_buffer(256).unwrap();
    assert!(staging.memory_properties().is_host_visible());
    assert!(staging.size() >= 1024 * 1024);
    staging.write_mapped(0, &[1, 2, 3, 4]).unwrap();

    device.return_staging_buffer(staging);
    assert_eq!(device.pooled_staging_buffers(), 1);

    let again = device.request_staging_buffer(512).unwrap();
    assert_eq!(device.pooled_staging_buffers(), 0);
    device.return_staging_buffer(again);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_oversized_staging_request_gets_exact_size() {
    let headless = Headless::new();
    let mut device = headless.graphics_device();

    let staging = device.request_staging_buffer(4 * 1024 * 1024).unwrap();
    assert_eq!(staging.size(), 4 * 1024 * 1024);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_update_buffer_rejects_unaligned_data() {
    let headless = Headless::new();
    let mut device = headless.graphics_device();

    let buffer = device
        .create_buffer(BufferDesc { size: 64, usage: BufferUsage::STORAGE | BufferUsage::TRANSFER_DST })
        .unwrap();
    let mut transfer = device.begin_transfer().unwrap();
    assert!(transfer.update_buffer(&buffer, 0, &[0u8; 6]).is_err());
    transfer.update_buffer(&buffer, 4, &[0u8; 8]).unwrap();
    device.end_transfer(transfer).unwrap();
}

// ============================================================================
// IMAGE TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_upload_image_through_staging() {
    let headless = Headless::new();
    let mut device = headless.graphics_device();

    let image = device.create_image(rgba_image_desc(4, 4, 1)).unwrap();
    assert!(!image.memory_properties().is_host_visible());
    assert!(image.write_mapped(&[0u8; 64]).is_err());

    let staging = device.request_staging_buffer(64).unwrap();
    staging.write_mapped(0, &(0..64).collect::<Vec<u8>>()).unwrap();

    let mut transfer = device.begin_transfer().unwrap();
    transfer
        .image_barrier(&image, &ImageBarrier {
            base_mip_level: 0,
            level_count: 1,
            old_layout: ImageLayout::Undefined,
            new_layout: ImageLayout::TransferDst,
        })
        .unwrap();
    transfer.copy_buffer_to_image(&staging, &image, 4, 4).unwrap();
    transfer
        .image_barrier(&image, &ImageBarrier {
            base_mip_level: 0,
            level_count: 1,
            old_layout: ImageLayout::TransferDst,
            new_layout: ImageLayout::ShaderReadOnly,
        })
        .unwrap();
    device.end_transfer(transfer).unwrap();
    device.return_staging_buffer(staging);
    device.wait_idle().unwrap();
}

// ============================================================================
// DESCRIPTOR SET TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_partially_bound_texture_table() {
    let headless = Headless::new();
    let mut device = headless.graphics_device();

    let set = device
        .create_descriptor_set(&DescriptorSetDesc {
            bindings: vec![
                DescriptorBinding { binding: 0, descriptor_type: DescriptorType::StorageBuffer, count: 1 },
                DescriptorBinding { binding: 1, descriptor_type: DescriptorType::CombinedImageSampler, count: 16 },
            ],
        })
        .unwrap();

    let buffer = device
        .create_buffer(BufferDesc { size: 256, usage: BufferUsage::STORAGE })
        .unwrap();
    let image = device.create_image(rgba_image_desc(2, 2, 1)).unwrap();
    let sampler = device.create_sampler(&SamplerDesc::default()).unwrap();

    device
        .write_descriptor_set(&set, &DescriptorWrite::StorageBuffer { binding: 0, buffer })
        .unwrap();
    device
        .write_descriptor_set(&set, &DescriptorWrite::CombinedImageSampler {
            binding: 1,
            array_element: 3,
            image,
            sampler,
        })
        .unwrap();
}

// ============================================================================
// ASSET SUBSYSTEM TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_asset_subsystem_uploads_defaults() {
    let headless = Headless::new();
    let device: Arc<Mutex<dyn GraphicsDevice>> = Arc::new(Mutex::new(headless.graphics_device()));

    let mut assets = AssetSubsystem::new(&AssetConfig::default(), Arc::clone(&device));
    assets.initialize().unwrap();

    let manager = assets.manager_mut();
    assert!(manager.descriptor_set().is_some());
    assert!(manager.material_buffer().is_some());
    assert_eq!(manager.texture_slots_used(), 1);

    let cube = manager.get_composite_mesh_if_exists("__defaultCompositeMesh");
    assert!(!manager.resolve_composite_mesh(cube).is_empty());

    assets.destroy();
    device.lock().unwrap().wait_idle().unwrap();
}

//! Device creation.

use crate::render::RenderError;

/// Adapter, device and queue shared by every GPU backend and target.
pub struct GpuState {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuState {
    /// Initialize a device with no surface, for off-screen rendering.
    pub fn new_headless() -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("lumen_text"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))?;

        let info = adapter.get_info();
        log::info!("GPU init: adapter={}, backend={:?}", info.name, info.backend);

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }
}

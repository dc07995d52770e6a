//! GPU device bootstrap.
//!
//! A [`GpuContext`] owns the wgpu instance, adapter, device, and queue.
//! Device and queue are `Arc`-wrapped so layers can capture their own
//! handles at construction and keep them for the life of the surface.

use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RendererError {
    #[error("no suitable GPU adapter found")]
    AdapterNotFound,
    #[error("failed to request GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
}

/// Configuration for creating a [`GpuContext`].
#[derive(Clone, Debug)]
pub struct GpuContextConfig {
    pub power_preference: wgpu::PowerPreference,
    /// Preferred texture format (None = use surface preferred).
    pub texture_format: Option<wgpu::TextureFormat>,
}

impl Default for GpuContextConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            texture_format: None,
        }
    }
}

/// Shared GPU handles plus the color format every pipeline targets.
#[derive(Clone)]
pub struct GpuContext {
    instance: Arc<wgpu::Instance>,
    adapter: Arc<wgpu::Adapter>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    texture_format: wgpu::TextureFormat,
}

impl GpuContext {
    /// Preferred backend for the current platform.
    ///
    /// Using the primary backend instead of all backends avoids
    /// initializing multiple GPU driver stacks.
    fn preferred_backends() -> wgpu::Backends {
        #[cfg(target_os = "macos")]
        {
            wgpu::Backends::METAL
        }
        #[cfg(target_os = "windows")]
        {
            wgpu::Backends::DX12
        }
        #[cfg(target_os = "linux")]
        {
            wgpu::Backends::VULKAN
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
        {
            wgpu::Backends::PRIMARY
        }
    }

    /// Creates a context with no surface, for headless use.
    pub async fn new(config: GpuContextConfig) -> Result<Self, RendererError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: Self::preferred_backends(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::AdapterNotFound)?;

        let (device, queue) = Self::request_device(&adapter).await?;

        let texture_format = config
            .texture_format
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        Ok(Self {
            instance: Arc::new(instance),
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
            texture_format,
        })
    }

    /// Creates a context plus a surface for `window`, picking a color
    /// format from the surface capabilities.
    pub async fn with_surface<W>(
        window: Arc<W>,
        config: GpuContextConfig,
    ) -> Result<(Self, wgpu::Surface<'static>), RendererError>
    where
        W: raw_window_handle::HasWindowHandle
            + raw_window_handle::HasDisplayHandle
            + Send
            + Sync
            + 'static,
    {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: Self::preferred_backends(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::AdapterNotFound)?;

        let (device, queue) = Self::request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        tracing::debug!("surface formats: {:?}", surface_caps.formats);

        let texture_format = config.texture_format.unwrap_or_else(|| {
            surface_caps
                .formats
                .iter()
                .find(|f| f.is_srgb())
                .copied()
                .unwrap_or(surface_caps.formats[0])
        });
        tracing::debug!("selected texture format: {:?}", texture_format);

        let context = Self {
            instance: Arc::new(instance),
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
            texture_format,
        };
        Ok((context, surface))
    }

    async fn request_device(
        adapter: &wgpu::Adapter,
    ) -> Result<(wgpu::Device, wgpu::Queue), RendererError> {
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Ember GPU Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    // Prefer lower memory over performance; GPU memory is
                    // shared with the CPU on integrated adapters.
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await?;
        Ok((device, queue))
    }

    pub fn instance(&self) -> &wgpu::Instance {
        &self.instance
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    pub fn texture_format(&self) -> wgpu::TextureFormat {
        self.texture_format
    }
}

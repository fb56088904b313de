//! WebGPU device and canvas surface setup

use tracing::{debug, info};
use web_sys::HtmlCanvasElement;
use wgpu::*;

pub struct WgpuContext {
    pub device: Device,
    pub queue: Queue,
    pub surface: Surface<'static>,
    pub config: SurfaceConfiguration,
}

pub async fn init_wgpu(canvas: HtmlCanvasElement) -> Result<WgpuContext, String> {
    let (width, height) = (canvas.width().max(1), canvas.height().max(1));

    let instance = Instance::new(&InstanceDescriptor {
        backends: Backends::BROWSER_WEBGPU,
        ..Default::default()
    });
    let surface = instance
        .create_surface(SurfaceTarget::Canvas(canvas))
        .map_err(|e| format!("Failed to create surface: {e}"))?;

    let adapter = request_adapter(&instance, &surface).await?;
    info!(adapter = %adapter.get_info().name, "WebGPU adapter ready");

    let (device, queue) = adapter
        .request_device(
            &DeviceDescriptor {
                label: Some("Table Tennis Device"),
                required_features: Features::empty(),
                required_limits: Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: MemoryHints::Performance,
            },
            None,
        )
        .await
        .map_err(|e| format!("Failed to create device: {e}"))?;

    let config = surface_config(&surface, &adapter, width, height)?;
    surface.configure(&device, &config);
    debug!(format = ?config.format, width, height, "Surface configured");

    Ok(WgpuContext {
        device,
        queue,
        surface,
        config,
    })
}

async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> Result<Adapter, String> {
    // Mostly phones; the integrated GPU is plenty for a dozen boxes
    instance
        .request_adapter(&RequestAdapterOptions {
            power_preference: PowerPreference::LowPower,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| "WebGPU adapter unavailable".to_string())
}

/// Adapter defaults, with an sRGB format when offered and vsync pacing.
fn surface_config(
    surface: &Surface<'_>,
    adapter: &Adapter,
    width: u32,
    height: u32,
) -> Result<SurfaceConfiguration, String> {
    let mut config = surface
        .get_default_config(adapter, width, height)
        .ok_or_else(|| "Surface not supported by adapter".to_string())?;

    let caps = surface.get_capabilities(adapter);
    if let Some(format) = caps.formats.iter().copied().find(|f| f.is_srgb()) {
        config.format = format;
    }
    config.present_mode = PresentMode::AutoVsync;
    Ok(config)
}

use crate::cubemap::{CubeFace, CubeMapData};
use crate::gpu::GpuContext;

/// A six-layer cube texture with its cube view and sampler.
#[derive(Debug)]
pub struct CubeTexture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub size: u32,
}

impl CubeTexture {
    /// Upload the six faces of `data` in [`CubeFace::ALL`] layer order.
    pub fn from_data(gpu: &GpuContext, data: &CubeMapData, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let size = data.size();
        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: CubeFace::ALL.len() as u32,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data.layer_major_bytes(),
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{label} View")),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(CubeFace::ALL.len() as u32),
            ..Default::default()
        });

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        tracing::debug!(size, "cube texture uploaded");

        Self {
            texture,
            view,
            sampler,
            size,
        }
    }
}

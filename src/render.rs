// src/render.rs
//
// CPU framebuffer renderer. All drawing happens into an RGBA upload buffer
// (`Frame`), which `Gfx` then copies into a nearest-sampled texture and
// blits to the window surface with a fullscreen triangle. Fifo presents
// give the frame loop its vsync pacing.

use std::sync::Arc;

use rayon::prelude::*;
use winit::window::Window;

use crate::camera::Camera;
use crate::font;

const BLIT_WGSL: &str = r#"
struct VSOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vi: u32) -> VSOut {
  var p = array<vec2<f32>, 3>(
    vec2<f32>(-1.0, -3.0),
    vec2<f32>( 3.0,  1.0),
    vec2<f32>(-1.0,  1.0)
  );
  var uv = array<vec2<f32>, 3>(
    vec2<f32>(0.0, 2.0),
    vec2<f32>(2.0, 0.0),
    vec2<f32>(0.0, 0.0)
  );

  var o: VSOut;
  o.pos = vec4<f32>(p[vi], 0.0, 1.0);
  o.uv  = uv[vi];
  return o;
}

@group(0) @binding(0) var samp: sampler;
@group(0) @binding(1) var tex: texture_2d<f32>;

@fragment
fn fs_main(i: VSOut) -> @location(0) vec4<f32> {
  return textureSample(tex, samp, i.uv);
}
"#;

// -----------------------------
// Frame painter
// -----------------------------

/// One frame's worth of drawing into an RGBA buffer. While a camera is
/// pushed, `fill_rect` and `draw_line` take world coordinates; text is
/// always screen-space overlay.
pub struct Frame<'a> {
    buf: &'a mut [u8],
    bpr: usize,
    width: i32,
    height: i32,
    camera: Option<Camera>,
}

impl<'a> Frame<'a> {
    pub fn new(buf: &'a mut [u8], bpr: usize, width: i32, height: i32) -> Self {
        debug_assert!(buf.len() >= bpr * height as usize);
        Self {
            buf,
            bpr,
            width,
            height,
            camera: None,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn push_camera(&mut self, camera: Camera) {
        self.camera = Some(camera);
    }

    pub fn pop_camera(&mut self) {
        self.camera = None;
    }

    pub fn clear(&mut self, colour: [u8; 4]) {
        let row_bytes = self.width as usize * 4;
        self.buf
            .par_chunks_mut(self.bpr)
            .for_each(|row| {
                let len = row.len();
                for px in row[..row_bytes.min(len)].chunks_exact_mut(4) {
                    px.copy_from_slice(&colour);
                }
            });
    }

    #[inline]
    fn put_pixel(&mut self, px: i32, py: i32, colour: [u8; 4]) {
        if px < 0 || py < 0 || px >= self.width || py >= self.height {
            return;
        }
        let off = py as usize * self.bpr + px as usize * 4;
        self.buf[off..off + 4].copy_from_slice(&colour);
    }

    /// Fills an axis-aligned rectangle, clipped to the frame. Coordinates
    /// are world-space while a camera is pushed, screen-space otherwise.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: [u8; 4]) {
        let (sx, sy, sw, sh) = match self.camera {
            Some(cam) => {
                let (sx, sy) = cam.world_to_screen(x, y);
                (sx, sy, w * cam.zoom(), h * cam.zoom())
            }
            None => (x, y, w, h),
        };

        let x0 = (sx.floor() as i32).max(0);
        let y0 = (sy.floor() as i32).max(0);
        let x1 = ((sx + sw).floor() as i32).min(self.width);
        let y1 = ((sy + sh).floor() as i32).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        for py in y0..y1 {
            let off = py as usize * self.bpr + x0 as usize * 4;
            let row = &mut self.buf[off..off + (x1 - x0) as usize * 4];
            for px in row.chunks_exact_mut(4) {
                px.copy_from_slice(&colour);
            }
        }
    }

    /// Bresenham line, clipped per pixel. Endpoints are world-space while
    /// a camera is pushed.
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, colour: [u8; 4]) {
        let ((ax, ay), (bx, by)) = match self.camera {
            Some(cam) => (cam.world_to_screen(x0, y0), cam.world_to_screen(x1, y1)),
            None => ((x0, y0), (x1, y1)),
        };

        let mut x = ax.round() as i32;
        let mut y = ay.round() as i32;
        let xe = bx.round() as i32;
        let ye = by.round() as i32;

        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put_pixel(x, y, colour);
            if x == xe && y == ye {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draws screen-space text with the 5x7 font, ignoring any pushed
    /// camera. '\n' starts a new line at the original x.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: i32, colour: [u8; 4]) {
        let saved = self.camera.take();
        let scale = scale.max(1);
        let mut cx = x;
        let mut cy = y;

        for ch in text.chars() {
            if ch == '\n' {
                cx = x;
                cy += font::LINE_ADVANCE * scale;
                continue;
            }
            let g = font::glyph(ch);
            for (row, bits) in g.iter().enumerate() {
                for col in 0..font::GLYPH_WIDTH {
                    if (bits >> (font::GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    let px = cx + col * scale;
                    let py = cy + row as i32 * scale;
                    self.fill_rect(px as f32, py as f32, scale as f32, scale as f32, colour);
                }
            }
            cx += font::GLYPH_ADVANCE * scale;
        }

        self.camera = saved;
    }
}

// -----------------------------
// wgpu surface + blit
// -----------------------------

pub struct Gfx {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    bind_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    tex: wgpu::Texture,
    tex_w: u32,
    tex_h: u32,
    bpr: u32,
    upload: Vec<u8>,
}

impl Gfx {
    pub async fn new(window: Arc<Window>, width: u32, height: u32) -> Self {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window).expect("create_surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("no suitable GPU adapter");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::default(),
            })
            .await
            .expect("request_device failed");

        let caps = surface.get_capabilities(&adapter);
        let format = caps.formats[0];
        let present_mode = if caps.present_modes.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            caps.present_modes[0]
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (tex, tex_view, tex_w, tex_h, bpr, upload) =
            Self::make_pixel_texture(&device, config.width, config.height);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blit_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blit_bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
            ],
        });

        let bind_group = Self::make_bind_group(&device, &bind_layout, &sampler, &tex_view);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_WGSL.into()),
        });

        let pl_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blit_pl_layout"),
            bind_group_layouts: &[&bind_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blit_pipeline"),
            layout: Some(&pl_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_group,
            bind_layout,
            sampler,
            tex,
            tex_w,
            tex_h,
            bpr,
            upload,
        }
    }

    fn make_pixel_texture(
        device: &wgpu::Device,
        w: u32,
        h: u32,
    ) -> (wgpu::Texture, wgpu::TextureView, u32, u32, u32, Vec<u8>) {
        let tex_w = w.max(1);
        let tex_h = h.max(1);

        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pixel_tex"),
            size: wgpu::Extent3d {
                width: tex_w,
                height: tex_h,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let tex_view = tex.create_view(&wgpu::TextureViewDescriptor::default());

        // write_texture requires 256-byte row alignment.
        let tight_bpr = 4 * tex_w;
        let bpr = ((tight_bpr + 255) / 256) * 256;
        let upload = vec![0u8; (bpr * tex_h) as usize];

        (tex, tex_view, tex_w, tex_h, bpr, upload)
    }

    fn make_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        tex_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("blit_bind"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(tex_view),
                },
            ],
        })
    }

    pub fn resize(&mut self, new_w: u32, new_h: u32) {
        self.config.width = new_w.max(1);
        self.config.height = new_h.max(1);
        self.surface.configure(&self.device, &self.config);

        let (tex, tex_view, tex_w, tex_h, bpr, upload) =
            Self::make_pixel_texture(&self.device, self.config.width, self.config.height);

        self.tex = tex;
        self.tex_w = tex_w;
        self.tex_h = tex_h;
        self.bpr = bpr;
        self.upload = upload;
        self.bind_group =
            Self::make_bind_group(&self.device, &self.bind_layout, &self.sampler, &tex_view);
    }

    /// Starts drawing this frame's pixels. Present after the frame drops.
    pub fn frame(&mut self) -> Frame<'_> {
        Frame::new(
            &mut self.upload,
            self.bpr as usize,
            self.tex_w as i32,
            self.tex_h as i32,
        )
    }

    /// Uploads the framebuffer and presents it. Blocks on vsync under Fifo.
    pub fn present(&mut self) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.tex,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.upload,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.bpr),
                rows_per_image: Some(self.tex_h),
            },
            wgpu::Extent3d {
                width: self.tex_w,
                height: self.tex_h,
                depth_or_array_layers: 1,
            },
        );

        let frame = match self.surface.get_current_texture() {
            Ok(f) => f,
            Err(_) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut enc = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("enc") });
        {
            let mut rp = enc.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blit"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.bind_group, &[]);
            rp.draw(0..3, 0..1);
        }

        self.queue.submit(Some(enc.finish()));
        frame.present();
    }
}

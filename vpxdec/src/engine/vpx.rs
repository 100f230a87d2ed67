/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! libvpx-backed engine.

use super::{payload_len, DecoderEngine, EngineConfig, EngineError, EngineFactory};
use crate::image::{Image, ImageFormat, PlaneView};
use crate::registry::CodecId;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr;
use vpx_sys::{
    vpx_codec_build_config, vpx_codec_ctx_t, vpx_codec_dec_cfg_t, vpx_codec_dec_init_ver,
    vpx_codec_decode, vpx_codec_destroy, vpx_codec_error, vpx_codec_error_detail,
    vpx_codec_get_frame, vpx_codec_iter_t, vpx_codec_version_str, vpx_codec_vp8_dx,
    vpx_codec_vp9_dx, vpx_img_fmt, VPX_CODEC_OK, VPX_DECODER_ABI_VERSION,
};

fn c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

/// Builds libvpx decoders for one codec.
#[derive(Debug, Clone, Copy)]
pub struct VpxFactory {
    codec: CodecId,
}

impl VpxFactory {
    pub fn new(codec: CodecId) -> Self {
        Self { codec }
    }
}

impl EngineFactory for VpxFactory {
    type Engine = VpxEngine;

    fn create(&self, config: &EngineConfig) -> Result<VpxEngine, EngineError> {
        let cfg = vpx_codec_dec_cfg_t {
            threads: config.threads,
            w: 0,
            h: 0,
        };
        let mut context: vpx_codec_ctx_t = unsafe { std::mem::zeroed() };
        let ret = unsafe {
            let iface = match self.codec {
                CodecId::Vp8 => vpx_codec_vp8_dx(),
                CodecId::Vp9 => vpx_codec_vp9_dx(),
            };
            vpx_codec_dec_init_ver(
                &mut context,
                iface,
                &cfg,
                0,
                VPX_DECODER_ABI_VERSION as i32,
            )
        };
        if ret != VPX_CODEC_OK {
            let message = c_string(unsafe { vpx_codec_error(&context) })
                .unwrap_or_else(|| format!("{:?}", ret));
            return Err(EngineError::new(message));
        }
        Ok(VpxEngine {
            context,
            iter: ptr::null(),
        })
    }

    fn version(&self) -> String {
        c_string(unsafe { vpx_codec_version_str() }).unwrap_or_default()
    }

    fn build_config(&self) -> String {
        c_string(unsafe { vpx_codec_build_config() }).unwrap_or_default()
    }
}

/// One libvpx decoder context.
pub struct VpxEngine {
    context: vpx_codec_ctx_t,
    iter: vpx_codec_iter_t,
}

// SAFETY: the context is only ever touched through `&mut self`, so it is
// never used from two threads at once.
unsafe impl Send for VpxEngine {}

/// Wraps one plane of a `vpx_image_t` whose row 0 starts at `ptr`.
///
/// # Safety
/// `ptr` must address `rows` rows of at least `width` bytes spaced `stride`
/// bytes apart, valid for `'a`.
unsafe fn plane_view<'a>(ptr: *const u8, stride: c_int, width: usize, rows: usize) -> PlaneView<'a> {
    if ptr.is_null() || rows == 0 {
        return PlaneView::empty();
    }
    let span = stride.unsigned_abs() as usize;
    let len = span * (rows - 1) + width;
    if stride >= 0 {
        PlaneView {
            data: std::slice::from_raw_parts(ptr, len),
            offset: 0,
            stride: stride as isize,
        }
    } else {
        let offset = span * (rows - 1);
        PlaneView {
            data: std::slice::from_raw_parts(ptr.sub(offset), len),
            offset,
            stride: stride as isize,
        }
    }
}

impl DecoderEngine for VpxEngine {
    fn feed(&mut self, data: &[u8]) -> Result<(), EngineError> {
        self.iter = ptr::null();
        let len = payload_len(data.len())?;
        let buf = if data.is_empty() {
            ptr::null()
        } else {
            data.as_ptr()
        };
        let ret = unsafe {
            vpx_codec_decode(
                &mut self.context,
                buf,
                len,
                ptr::null_mut(),
                0,
            )
        };
        if ret != VPX_CODEC_OK {
            let message = c_string(unsafe { vpx_codec_error(&self.context) })
                .unwrap_or_else(|| "Unknown codec error".to_string());
            let detail = c_string(unsafe { vpx_codec_error_detail(&self.context) });
            return Err(EngineError { message, detail });
        }
        Ok(())
    }

    fn next_image(&mut self) -> Option<Image<'_>> {
        let img = unsafe { vpx_codec_get_frame(&mut self.context, &mut self.iter) };
        if img.is_null() {
            return None;
        }
        let img = unsafe { &*img };
        let width = img.d_w;
        let height = img.d_h;
        if img.fmt != vpx_img_fmt::VPX_IMG_FMT_I420 {
            return Some(Image {
                format: ImageFormat::Other(img.fmt as u32),
                width,
                height,
                planes: [PlaneView::empty(); 3],
            });
        }
        let chroma_w = ((width + (1 << img.x_chroma_shift) - 1) >> img.x_chroma_shift) as usize;
        let chroma_h = ((height + (1 << img.y_chroma_shift) - 1) >> img.y_chroma_shift) as usize;
        let planes = unsafe {
            [
                plane_view(img.planes[0], img.stride[0], width as usize, height as usize),
                plane_view(img.planes[1], img.stride[1], chroma_w, chroma_h),
                plane_view(img.planes[2], img.stride[2], chroma_w, chroma_h),
            ]
        };
        Some(Image {
            format: ImageFormat::I420,
            width,
            height,
            planes,
        })
    }
}

impl Drop for VpxEngine {
    fn drop(&mut self) {
        unsafe {
            vpx_codec_destroy(&mut self.context);
        }
    }
}

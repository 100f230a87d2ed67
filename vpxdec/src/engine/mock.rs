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

//! A scripted engine for tests and simulations. Each feed consumes the next
//! scripted response; once the script runs out the last response repeats.

use super::{DecoderEngine, EngineConfig, EngineError, EngineFactory};
use crate::image::{Image, ImageFormat, OutputFormat, PlaneView};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Value written into row padding so stride mistakes show up in tests.
pub const PADDING_BYTE: u8 = 0xEE;

/// A solid-color image the mock produces after a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Fill value for the Y, U and V planes.
    pub values: [u8; 3],
    /// Extra bytes at the end of every row.
    pub padding: usize,
}

impl MockImage {
    pub fn solid(width: u32, height: u32, values: [u8; 3]) -> Self {
        Self {
            format: ImageFormat::I420,
            width,
            height,
            values,
            padding: 0,
        }
    }

    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    Image(MockImage),
    /// The feed succeeds but no image comes out.
    Nothing,
    Fail(EngineError),
}

impl MockResponse {
    pub fn fail(message: &str, detail: Option<&str>) -> Self {
        let mut error = EngineError::new(message);
        error.detail = detail.map(str::to_string);
        MockResponse::Fail(error)
    }
}

/// Counters shared by a factory and every engine it built.
#[derive(Debug, Default)]
pub struct MockStats {
    created: AtomicUsize,
    dropped: AtomicUsize,
    configs: Mutex<Vec<EngineConfig>>,
    fed: Mutex<Vec<(usize, Vec<u8>)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockStats {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Config passed to every construction attempt, in order.
    pub fn configs(&self) -> Vec<EngineConfig> {
        lock(&self.configs).clone()
    }

    /// Payloads fed to the engine built `index`-th (0 is the color engine).
    pub fn fed_to(&self, index: usize) -> Vec<Vec<u8>> {
        lock(&self.fed)
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, data)| data.clone())
            .collect()
    }
}

pub struct MockFactory {
    scripts: Mutex<VecDeque<Vec<MockResponse>>>,
    fail_at: Option<usize>,
    attempts: AtomicUsize,
    stats: Arc<MockStats>,
}

impl MockFactory {
    /// One script per engine, in construction order.
    pub fn new(scripts: Vec<Vec<MockResponse>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            fail_at: None,
            attempts: AtomicUsize::new(0),
            stats: Arc::new(MockStats::default()),
        }
    }

    /// Makes the `index`-th construction attempt fail.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }
}

impl EngineFactory for MockFactory {
    type Engine = MockEngine;

    fn create(&self, config: &EngineConfig) -> Result<MockEngine, EngineError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        lock(&self.stats.configs).push(*config);
        let script = lock(&self.scripts).pop_front().unwrap_or_default();
        if self.fail_at == Some(attempt) {
            return Err(EngineError::new("mock engine construction failed"));
        }
        self.stats.created.fetch_add(1, Ordering::SeqCst);
        Ok(MockEngine {
            index: attempt,
            script: script.into(),
            last: None,
            planes: Default::default(),
            strides: [0; 3],
            ready: None,
            stats: Arc::clone(&self.stats),
        })
    }

    fn version(&self) -> String {
        String::from("mock")
    }
}

pub struct MockEngine {
    index: usize,
    script: VecDeque<MockResponse>,
    last: Option<MockResponse>,
    planes: [Vec<u8>; 3],
    strides: [usize; 3],
    ready: Option<MockImage>,
    stats: Arc<MockStats>,
}

impl MockEngine {
    fn next_response(&mut self) -> MockResponse {
        match self.script.pop_front() {
            Some(response) => {
                self.last = Some(response.clone());
                response
            }
            None => self.last.clone().unwrap_or(MockResponse::Nothing),
        }
    }

    fn render(&mut self, image: &MockImage) {
        for (plane, value) in image.values.iter().enumerate() {
            let (width, rows) = OutputFormat::Yuv420p.plane_size(plane, image.width, image.height);
            let stride = width + image.padding;
            let mut data = vec![PADDING_BYTE; stride * rows];
            for row in data.chunks_mut(stride.max(1)) {
                row[..width].fill(*value);
            }
            self.planes[plane] = data;
            self.strides[plane] = stride;
        }
    }
}

impl DecoderEngine for MockEngine {
    fn feed(&mut self, data: &[u8]) -> Result<(), EngineError> {
        lock(&self.stats.fed).push((self.index, data.to_vec()));
        self.ready = None;
        match self.next_response() {
            MockResponse::Image(image) => {
                self.render(&image);
                self.ready = Some(image);
                Ok(())
            }
            MockResponse::Nothing => Ok(()),
            MockResponse::Fail(error) => Err(error),
        }
    }

    fn next_image(&mut self) -> Option<Image<'_>> {
        let image = self.ready.take()?;
        Some(Image {
            format: image.format,
            width: image.width,
            height: image.height,
            planes: [
                PlaneView::new(&self.planes[0], self.strides[0]),
                PlaneView::new(&self.planes[1], self.strides[1]),
                PlaneView::new(&self.planes[2], self.strides[2]),
            ],
        })
    }
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        self.stats.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_is_drained_once_per_feed() {
        let factory = MockFactory::new(vec![vec![MockResponse::Image(MockImage::solid(4, 2, [1, 2, 3]))]]);
        let mut engine = factory.create(&EngineConfig { threads: 1 }).unwrap();
        engine.feed(&[0xAA]).unwrap();
        let image = engine.next_image().unwrap();
        assert_eq!(image.dimensions(), (4, 2));
        assert_eq!(image.planes[1].row(0, 2).unwrap(), &[2, 2]);
        assert!(engine.next_image().is_none());
        engine.feed(&[0xBB]).unwrap();
        assert!(engine.next_image().is_some());
    }

    #[test]
    fn padding_is_visible_through_stride() {
        let factory = MockFactory::new(vec![vec![MockResponse::Image(
            MockImage::solid(2, 2, [5, 6, 7]).with_padding(3),
        )]]);
        let mut engine = factory.create(&EngineConfig { threads: 1 }).unwrap();
        engine.feed(&[]).unwrap();
        let image = engine.next_image().unwrap();
        assert_eq!(image.luma().stride, 5);
        assert_eq!(image.luma().row(1, 5).unwrap(), &[5, 5, PADDING_BYTE, PADDING_BYTE, PADDING_BYTE]);
    }

    #[test]
    fn failures_and_drops_are_recorded() {
        let factory = MockFactory::new(vec![vec![MockResponse::fail("corrupt", Some("bad header"))]]).failing_at(1);
        let stats = factory.stats();
        let mut engine = factory.create(&EngineConfig { threads: 3 }).unwrap();
        let err = engine.feed(&[1, 2]).unwrap_err();
        assert_eq!(err.to_string(), "corrupt (bad header)");
        assert!(factory.create(&EngineConfig { threads: 3 }).is_err());
        drop(engine);
        assert_eq!(stats.created(), 1);
        assert_eq!(stats.dropped(), 1);
        assert_eq!(stats.configs().len(), 2);
        assert_eq!(stats.fed_to(0), vec![vec![1, 2]]);
    }
}

//! Fakes and fixture encoders shared by the unit tests.

use crate::error::ModelError;
use crate::model::{ModelInput, ScoreModel, TextGenerator};
use crate::types::{ImageFormat, ImageRecord};
use dicom_core::{DataElement, PrimitiveValue, VR};
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::intake::tags::{
    BITS_ALLOCATED, BITS_STORED, COLUMNS, IMAGE_LATERALITY, MODALITY, PHOTOMETRIC_INTERPRETATION,
    PIXEL_DATA, ROWS, SAMPLES_PER_PIXEL, VIEW_POSITION,
};

/// Model that always answers with the same score
pub struct FixedScore(pub f64);

impl FixedScore {
    pub fn shared(score: f64) -> Arc<dyn ScoreModel> {
        Arc::new(FixedScore(score))
    }
}

impl ScoreModel for FixedScore {
    fn predict(&self, _input: &ModelInput) -> Result<f64, ModelError> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Model that is always down
pub struct FailingModel(String);

impl FailingModel {
    pub fn shared(message: &str) -> Arc<dyn ScoreModel> {
        Arc::new(FailingModel(message.to_string()))
    }
}

impl ScoreModel for FailingModel {
    fn predict(&self, _input: &ModelInput) -> Result<f64, ModelError> {
        Err(ModelError::Unavailable(self.0.clone()))
    }
}

/// Model that answers only after `delay`
pub struct SlowModel {
    delay: Duration,
    score: f64,
}

impl SlowModel {
    pub fn shared(delay: Duration, score: f64) -> Arc<dyn ScoreModel> {
        Arc::new(SlowModel { delay, score })
    }
}

impl ScoreModel for SlowModel {
    fn predict(&self, _input: &ModelInput) -> Result<f64, ModelError> {
        thread::sleep(self.delay);
        Ok(self.score)
    }
}

/// Fixed-score model that counts its calls
pub struct CountingModel {
    score: f64,
    calls: AtomicUsize,
}

impl CountingModel {
    pub fn new(score: f64) -> Arc<CountingModel> {
        Arc::new(CountingModel {
            score,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScoreModel for CountingModel {
    fn predict(&self, _input: &ModelInput) -> Result<f64, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.score)
    }
}

/// Text generator recording every prompt it receives
pub struct SpyGenerator {
    answer: Result<String, ModelError>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl SpyGenerator {
    pub fn answering(text: &str) -> Arc<SpyGenerator> {
        Self::with_answer(Ok(text.to_string()))
    }

    pub fn failing(error: ModelError) -> Arc<SpyGenerator> {
        Self::with_answer(Err(error))
    }

    fn with_answer(answer: Result<String, ModelError>) -> Arc<SpyGenerator> {
        Arc::new(SpyGenerator {
            answer,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl TextGenerator for SpyGenerator {
    fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.clone()
    }

    fn name(&self) -> &str {
        "spy"
    }
}

/// 128x128 grayscale record with a horizontal gradient
pub fn record() -> ImageRecord {
    let img = GrayImage::from_fn(128, 128, |x, _| Luma([(x * 2) as u8]));
    ImageRecord::new(
        DynamicImage::ImageLuma8(img),
        "scan.png",
        ImageFormat::Png,
        None,
    )
}

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn encode(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    gradient(width, height).write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn encode_png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Png)
}

pub fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Jpeg)
}

/// Parameters of a synthetic single-frame grayscale DICOM file
#[derive(Debug, Clone)]
pub struct DicomFixture {
    pub width: u16,
    pub height: u16,
    pub bits_allocated: u16,
    pub bits_stored: u16,
    pub photometric: &'static str,
    pub fill: u16,
    /// Drop one row of pixel data
    pub truncate_pixels: bool,
}

impl DicomFixture {
    pub fn mono8(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            bits_allocated: 8,
            bits_stored: 8,
            photometric: "MONOCHROME2",
            fill: 128,
            truncate_pixels: false,
        }
    }

    pub fn mono16(width: u16, height: u16, bits_stored: u16, fill: u16) -> Self {
        Self {
            width,
            height,
            bits_allocated: 16,
            bits_stored,
            photometric: "MONOCHROME2",
            fill,
            truncate_pixels: false,
        }
    }
}

// CS values are space padded to an even length
fn cs(value: &str) -> PrimitiveValue {
    if value.len() % 2 == 1 {
        PrimitiveValue::from(format!("{} ", value))
    } else {
        PrimitiveValue::from(value)
    }
}

/// Writes `fixture` as an explicit VR little endian Part 10 file
pub fn encode_dicom(fixture: &DicomFixture) -> Vec<u8> {
    let mut sample_count = fixture.width as usize * fixture.height as usize;
    if fixture.truncate_pixels {
        sample_count -= fixture.width as usize;
    }

    let pixel_data = if fixture.bits_allocated == 8 {
        DataElement::new(
            PIXEL_DATA,
            VR::OB,
            PrimitiveValue::from(vec![fixture.fill as u8; sample_count]),
        )
    } else {
        DataElement::new(
            PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(vec![fixture.fill; sample_count].into()),
        )
    };

    let obj = InMemDicomObject::from_element_iter([
        DataElement::new(MODALITY, VR::CS, cs("MG")),
        DataElement::new(IMAGE_LATERALITY, VR::CS, cs("L")),
        DataElement::new(VIEW_POSITION, VR::CS, cs("CC")),
        DataElement::new(SAMPLES_PER_PIXEL, VR::US, PrimitiveValue::from(1_u16)),
        DataElement::new(
            PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            cs(fixture.photometric),
        ),
        DataElement::new(ROWS, VR::US, PrimitiveValue::from(fixture.height)),
        DataElement::new(COLUMNS, VR::US, PrimitiveValue::from(fixture.width)),
        DataElement::new(
            BITS_ALLOCATED,
            VR::US,
            PrimitiveValue::from(fixture.bits_allocated),
        ),
        DataElement::new(BITS_STORED, VR::US, PrimitiveValue::from(fixture.bits_stored)),
        pixel_data,
    ]);

    let file = obj
        .with_meta(
            FileMetaTableBuilder::new()
                .transfer_syntax("1.2.840.10008.1.2.1")
                .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.1.2")
                .media_storage_sop_instance_uid("1.2.826.0.1.3680043.2.1125.1"),
        )
        .unwrap();

    let mut buf = Vec::new();
    file.write_all(&mut buf).unwrap();
    buf
}

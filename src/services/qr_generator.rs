use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use qrcode::render::svg;
use qrcode::QrCode;

use crate::models::{Vehicle, VehicleRegistration};
use crate::services::registration_resolver;

#[derive(thiserror::Error, Debug)]
pub enum QrGenerationError {
    #[error("QR code generation failed: {0}")]
    QrCodeError(#[from] qrcode::types::QrError),

    #[error("Image encoding failed: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Refusing to encode an empty pass code")]
    EmptyCode,
}

/// What the pass screen shows for a vehicle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassQr<'a> {
    /// Encode `payload`, which is exactly the registration code
    Ready {
        registration: &'a VehicleRegistration,
        payload: &'a str,
    },
    /// Expired or missing registration; nothing may be encoded
    NoValidPass,
}

impl<'a> PassQr<'a> {
    pub fn for_vehicle(vehicle: &'a Vehicle, now: DateTime<Utc>) -> Self {
        Self::for_registrations(&vehicle.vehicle_registration, now)
    }

    pub fn for_registrations(registrations: &'a [VehicleRegistration], now: DateTime<Utc>) -> Self {
        match registration_resolver::current_registration(registrations, now) {
            Some(registration) if !registration.code.trim().is_empty() => PassQr::Ready {
                registration,
                payload: registration.code.as_str(),
            },
            Some(registration) => {
                tracing::warn!(
                    registration_id = registration.id,
                    "Current registration has an empty code"
                );
                PassQr::NoValidPass
            }
            None => PassQr::NoValidPass,
        }
    }

    pub fn payload(&self) -> Option<&'a str> {
        match self {
            PassQr::Ready { payload, .. } => Some(*payload),
            PassQr::NoValidPass => None,
        }
    }

    pub fn to_svg(&self) -> Result<Option<String>, QrGenerationError> {
        self.payload().map(generate_qr_svg).transpose()
    }
}

fn encode(code: &str) -> Result<QrCode, QrGenerationError> {
    if code.trim().is_empty() {
        return Err(QrGenerationError::EmptyCode);
    }
    Ok(QrCode::new(code.as_bytes())?)
}

/// Generates a QR code SVG whose payload is exactly `code`
pub fn generate_qr_svg(code: &str) -> Result<String, QrGenerationError> {
    let qr = encode(code)?;

    let svg = qr
        .render::<svg::Color>()
        .min_dimensions(300, 300)
        .quiet_zone(true)
        .build();

    Ok(svg)
}

/// Generates a QR code PNG whose payload is exactly `code`
pub fn generate_qr_png(code: &str) -> Result<Vec<u8>, QrGenerationError> {
    use image::{ImageBuffer, Luma};

    let qr = encode(code)?;

    let module_size = 10u32; // Each module is 10x10 pixels
    let quiet_zone = 4u32;
    let width = qr.width() as u32;
    let img_size = (width + 2 * quiet_zone) * module_size;

    let img = ImageBuffer::<Luma<u8>, Vec<u8>>::from_fn(img_size, img_size, |x, y| {
        let module_x = (x / module_size).checked_sub(quiet_zone);
        let module_y = (y / module_size).checked_sub(quiet_zone);

        match (module_x, module_y) {
            (Some(mx), Some(my)) if mx < width && my < width => {
                match qr[(mx as usize, my as usize)] {
                    qrcode::types::Color::Dark => Luma([0u8]),
                    qrcode::types::Color::Light => Luma([255u8]),
                }
            }
            _ => Luma([255u8]),
        }
    });

    let mut png_data = Vec::new();
    image::DynamicImage::ImageLuma8(img).write_to(
        &mut std::io::Cursor::new(&mut png_data),
        image::ImageFormat::Png,
    )?;

    Ok(png_data)
}

/// PNG as a `data:image/png;base64,` URL, ready for an `<img>` tag
pub fn generate_qr_data_url(code: &str) -> Result<String, QrGenerationError> {
    let png = generate_qr_png(code)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

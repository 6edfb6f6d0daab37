//! Payloads of the data frames that follow OPEN, MODULE_INFO, GET_IMAGE
//! and GET_RAWIMAGE responses.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::warn;

use crate::{
    constants::{image, raw_image},
    error::{Error, Result},
    packet::DataPacket,
};

/// Fixed-size payload of a data frame
pub trait DataPayload: Sized {
    /// Payload size in bytes
    const SIZE: usize;

    /// Parse a payload of exactly [`Self::SIZE`] bytes
    fn parse(payload: &[u8]) -> Result<Self>;

    /// Serialize the payload
    fn write(&self, buf: &mut BytesMut);

    /// Wrap the payload in a data frame
    fn to_packet(&self) -> DataPacket {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        self.write(&mut buf);
        DataPacket::new(buf.freeze())
    }

    /// Decode a complete data frame carrying this payload
    fn decode(buf: &[u8]) -> Result<Self> {
        Self::parse(&DataPacket::decode(buf, Self::SIZE)?.payload)
    }
}

fn ensure_len(payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() < expected {
        return Err(Error::Truncated {
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

/// Decode a fixed-width latin-1 string, stopping at the first NUL
fn latin1(raw: &[u8]) -> String {
    raw.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

/// Answer to OPEN with a non-zero parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenData {
    pub firmware_version: u32,
    pub iso_area_max_size: u32,
    pub serial_number: [u8; 16],
}

impl OpenData {
    /// Firmware version as bare lower-case hex (`0x0121` renders as `"121"`)
    pub fn firmware_version_string(&self) -> String {
        format!("{:x}", self.firmware_version)
    }

    /// Serial number as upper-case hex
    pub fn serial_number_hex(&self) -> String {
        hex::encode_upper(self.serial_number)
    }
}

impl DataPayload for OpenData {
    const SIZE: usize = 24;

    fn parse(payload: &[u8]) -> Result<Self> {
        ensure_len(payload, Self::SIZE)?;
        let mut buf = payload;

        let firmware_version = buf.get_u32_le();
        let iso_area_max_size = buf.get_u32_le();
        let mut serial_number = [0u8; 16];
        buf.copy_to_slice(&mut serial_number);

        Ok(Self {
            firmware_version,
            iso_area_max_size,
            serial_number,
        })
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_u32_le(self.firmware_version);
        buf.put_u32_le(self.iso_area_max_size);
        buf.put_slice(&self.serial_number);
    }
}

/// Answer to MODULE_INFO
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfoData {
    pub sensor: [u8; 12],
    pub engine_version: [u8; 12],
    pub raw_img_width: u16,
    pub raw_img_height: u16,
    pub img_width: u16,
    pub img_height: u16,
    pub max_record_count: u16,
    pub enroll_count: u16,
    pub template_size: u16,
}

impl ModuleInfoData {
    /// Parse whatever part of the payload the module sent
    ///
    /// Firmware revisions differ in how much module info they report; most
    /// announce 36 bytes and leave out the template size. Missing trailing
    /// fields read as zero and surplus bytes are dropped. Both cases are
    /// logged.
    pub fn parse_lenient(payload: &[u8]) -> Self {
        if payload.len() != Self::SIZE {
            warn!(
                "Module info payload is {} bytes, expected {}",
                payload.len(),
                Self::SIZE
            );
        }

        let mut padded = [0u8; Self::SIZE];
        let len = payload.len().min(Self::SIZE);
        padded[..len].copy_from_slice(&payload[..len]);

        Self::read(&mut &padded[..])
    }

    /// Sensor name
    pub fn sensor_name(&self) -> String {
        latin1(&self.sensor)
    }

    /// Matching engine version
    pub fn engine_version_string(&self) -> String {
        latin1(&self.engine_version)
    }

    fn read(buf: &mut &[u8]) -> Self {
        let mut sensor = [0u8; 12];
        buf.copy_to_slice(&mut sensor);
        let mut engine_version = [0u8; 12];
        buf.copy_to_slice(&mut engine_version);

        Self {
            sensor,
            engine_version,
            raw_img_width: buf.get_u16_le(),
            raw_img_height: buf.get_u16_le(),
            img_width: buf.get_u16_le(),
            img_height: buf.get_u16_le(),
            max_record_count: buf.get_u16_le(),
            enroll_count: buf.get_u16_le(),
            template_size: buf.get_u16_le(),
        }
    }
}

impl DataPayload for ModuleInfoData {
    const SIZE: usize = 38;

    fn parse(payload: &[u8]) -> Result<Self> {
        ensure_len(payload, Self::SIZE)?;
        Ok(Self::read(&mut &payload[..Self::SIZE]))
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.sensor);
        buf.put_slice(&self.engine_version);
        buf.put_u16_le(self.raw_img_width);
        buf.put_u16_le(self.raw_img_height);
        buf.put_u16_le(self.img_width);
        buf.put_u16_le(self.img_height);
        buf.put_u16_le(self.max_record_count);
        buf.put_u16_le(self.enroll_count);
        buf.put_u16_le(self.template_size);
    }
}

/// Answer to GET_IMAGE: 202x258 8-bit grayscale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub pixels: Bytes,
}

impl DataPayload for ImageData {
    const SIZE: usize = image::SIZE;

    fn parse(payload: &[u8]) -> Result<Self> {
        ensure_len(payload, Self::SIZE)?;
        Ok(Self {
            pixels: Bytes::copy_from_slice(&payload[..Self::SIZE]),
        })
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.pixels);
    }
}

/// Answer to GET_RAWIMAGE: 160x120 8-bit grayscale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImageData {
    pub pixels: Bytes,
}

impl DataPayload for RawImageData {
    const SIZE: usize = raw_image::SIZE;

    fn parse(payload: &[u8]) -> Result<Self> {
        ensure_len(payload, Self::SIZE)?;
        Ok(Self {
            pixels: Bytes::copy_from_slice(&payload[..Self::SIZE]),
        })
    }

    fn write(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.pixels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn module_info() -> ModuleInfoData {
        let mut sensor = [0u8; 12];
        sensor[..8].copy_from_slice(b"GT521F32");
        let mut engine_version = [0u8; 12];
        engine_version[..4].copy_from_slice(b"1.2\xB5");

        ModuleInfoData {
            sensor,
            engine_version,
            raw_img_width: 160,
            raw_img_height: 120,
            img_width: 202,
            img_height: 258,
            max_record_count: 200,
            enroll_count: 3,
            template_size: 498,
        }
    }

    #[test]
    fn test_open_data_rendering() {
        let data = OpenData {
            firmware_version: 0x0121,
            iso_area_max_size: 400,
            serial_number: [0xAB; 16],
        };

        assert_eq!(data.firmware_version_string(), "121");
        assert_eq!(data.serial_number_hex(), "AB".repeat(16));
    }

    #[test]
    fn test_open_data_frame() {
        let data = OpenData {
            firmware_version: 0x2013_0411,
            iso_area_max_size: 0,
            serial_number: *b"0123456789abcdef",
        };

        let encoded = data.to_packet().encode();
        assert_eq!(encoded.len(), 30);
        assert_eq!(OpenData::decode(&encoded).unwrap(), data);
    }

    #[test]
    fn test_open_data_truncated() {
        let encoded = OpenData {
            firmware_version: 1,
            iso_area_max_size: 1,
            serial_number: [0; 16],
        }
        .to_packet()
        .encode();

        let result = OpenData::decode(&encoded[..20]);
        assert_eq!(
            result,
            Err(Error::Truncated {
                expected: 30,
                actual: 20
            })
        );
    }

    #[test]
    fn test_module_info_strings() {
        let info = module_info();

        assert_eq!(info.sensor_name(), "GT521F32");
        assert_eq!(info.engine_version_string(), "1.2µ");
    }

    #[test]
    fn test_module_info_round_trip() {
        let info = module_info();
        let encoded = info.to_packet().encode();

        assert_eq!(ModuleInfoData::decode(&encoded).unwrap(), info);
    }

    #[test]
    fn test_module_info_lenient_short() {
        let mut buf = BytesMut::new();
        module_info().write(&mut buf);

        // Firmware without the template size field
        let parsed = ModuleInfoData::parse_lenient(&buf[..34]);
        assert_eq!(parsed.enroll_count, 3);
        assert_eq!(parsed.template_size, 0);
        assert_eq!(parsed.sensor_name(), "GT521F32");
    }

    #[test]
    fn test_module_info_size_matches_fields() {
        let mut buf = BytesMut::new();
        module_info().write(&mut buf);

        assert_eq!(buf.len(), ModuleInfoData::SIZE);
        assert_eq!(ModuleInfoData::parse(&buf).unwrap(), module_info());
    }

    #[test]
    fn test_module_info_short_parse_fails() {
        let mut buf = BytesMut::new();
        module_info().write(&mut buf);

        assert_eq!(
            ModuleInfoData::parse(&buf[..36]),
            Err(Error::Truncated {
                expected: 38,
                actual: 36
            })
        );
    }

    #[test]
    fn test_module_info_lenient_announced_36() {
        let mut buf = BytesMut::new();
        module_info().write(&mut buf);

        let parsed = ModuleInfoData::parse_lenient(&buf[..36]);
        assert_eq!(parsed.max_record_count, 200);
        assert_eq!(parsed.enroll_count, 3);
        assert_eq!(parsed.template_size, 0);
    }

    #[test]
    fn test_module_info_lenient_long() {
        let mut buf = BytesMut::new();
        module_info().write(&mut buf);
        buf.put_slice(&[0xEE; 8]);

        assert_eq!(ModuleInfoData::parse_lenient(&buf), module_info());
    }

    #[test]
    fn test_image_sizes() {
        assert_eq!(ImageData::SIZE, 52_116);
        assert_eq!(RawImageData::SIZE, 19_200);
    }

    #[test]
    fn test_raw_image_frame() {
        let pixels: Vec<u8> = (0..RawImageData::SIZE).map(|i| (i % 251) as u8).collect();
        let data = RawImageData {
            pixels: Bytes::from(pixels),
        };

        let encoded = data.to_packet().encode();
        assert_eq!(encoded.len(), RawImageData::SIZE + DataPacket::OVERHEAD);
        assert_eq!(RawImageData::decode(&encoded).unwrap(), data);
    }
}

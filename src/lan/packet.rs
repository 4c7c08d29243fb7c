//! LIFX LAN protocol frames.
//!
//! Every frame is a 36-byte little-endian header followed by a
//! message-specific payload:
//!
//! | bytes | field                                              |
//! |-------|----------------------------------------------------|
//! | 0-1   | total size                                         |
//! | 2-3   | protocol (1024), addressable, tagged, origin bits  |
//! | 4-7   | source                                             |
//! | 8-15  | target (MAC in the first 6 bytes)                  |
//! | 16-21 | reserved                                           |
//! | 22    | res_required (bit 0), ack_required (bit 1)         |
//! | 23    | sequence                                           |
//! | 24-31 | reserved                                           |
//! | 32-33 | message type                                       |
//! | 34-35 | reserved                                           |

use crate::errors::Error;
use crate::types::LightState;

type Result<T> = std::result::Result<T, Error>;

pub const HEADER_SIZE: usize = 36;

const PROTOCOL: u16 = 1024;
const ADDRESSABLE: u16 = 1 << 12;
const TAGGED: u16 = 1 << 13;
const RES_REQUIRED: u8 = 1;
const ACK_REQUIRED: u8 = 1 << 1;
const LABEL_SIZE: usize = 32;

/// LAN service id for UDP in `StateService`.
pub const SERVICE_UDP: u8 = 1;

/// Messages the bridge sends or understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    GetService,
    StateService { service: u8, port: u32 },
    LightGet,
    LightSetColor { color: Hsbk, duration_ms: u32 },
    LightState { color: Hsbk, power: u16, label: String },
    LightSetPower { level: u16, duration_ms: u32 },
    LightStatePower { level: u16 },
    /// Anything else; kept so the listener can log and skip it.
    Unknown { kind: u16 },
}

/// Hue, saturation, brightness, kelvin in protocol units.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hsbk {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

impl Message {
    pub fn kind(&self) -> u16 {
        match self {
            Message::GetService => 2,
            Message::StateService { .. } => 3,
            Message::LightGet => 101,
            Message::LightSetColor { .. } => 102,
            Message::LightState { .. } => 107,
            Message::LightSetPower { .. } => 117,
            Message::LightStatePower { .. } => 118,
            Message::Unknown { kind } => *kind,
        }
    }

    fn encode_payload(&self, buf: &mut Vec<u8>) {
        match self {
            Message::GetService | Message::LightGet | Message::Unknown { .. } => {}
            Message::StateService { service, port } => {
                buf.push(*service);
                buf.extend_from_slice(&port.to_le_bytes());
            }
            Message::LightSetColor { color, duration_ms } => {
                buf.push(0);
                color.encode(buf);
                buf.extend_from_slice(&duration_ms.to_le_bytes());
            }
            Message::LightState { color, power, label } => {
                color.encode(buf);
                buf.extend_from_slice(&0i16.to_le_bytes());
                buf.extend_from_slice(&power.to_le_bytes());
                let mut raw = [0u8; LABEL_SIZE];
                let bytes = label.as_bytes();
                let len = bytes.len().min(LABEL_SIZE);
                raw[..len].copy_from_slice(&bytes[..len]);
                buf.extend_from_slice(&raw);
                buf.extend_from_slice(&0u64.to_le_bytes());
            }
            Message::LightSetPower { level, duration_ms } => {
                buf.extend_from_slice(&level.to_le_bytes());
                buf.extend_from_slice(&duration_ms.to_le_bytes());
            }
            Message::LightStatePower { level } => {
                buf.extend_from_slice(&level.to_le_bytes());
            }
        }
    }

    fn decode_payload(kind: u16, payload: &[u8]) -> Result<Self> {
        let mut r = Reader::new(payload);
        let message = match kind {
            2 => Message::GetService,
            3 => Message::StateService {
                service: r.u8()?,
                port: r.u32()?,
            },
            101 => Message::LightGet,
            102 => {
                r.skip(1)?;
                Message::LightSetColor {
                    color: Hsbk::decode(&mut r)?,
                    duration_ms: r.u32()?,
                }
            }
            107 => {
                let color = Hsbk::decode(&mut r)?;
                r.skip(2)?;
                let power = r.u16()?;
                let label = decode_label(r.take(LABEL_SIZE)?);
                Message::LightState {
                    color,
                    power,
                    label,
                }
            }
            117 => Message::LightSetPower {
                level: r.u16()?,
                duration_ms: r.u32()?,
            },
            118 => Message::LightStatePower { level: r.u16()? },
            kind => Message::Unknown { kind },
        };
        Ok(message)
    }
}

impl Hsbk {
    fn encode(&self, buf: &mut Vec<u8>) {
        for v in [self.hue, self.saturation, self.brightness, self.kelvin] {
            buf.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Hsbk {
            hue: r.u16()?,
            saturation: r.u16()?,
            brightness: r.u16()?,
            kelvin: r.u16()?,
        })
    }
}

impl From<&LightState> for Hsbk {
    fn from(state: &LightState) -> Self {
        Hsbk {
            hue: state.hue,
            saturation: state.saturation,
            brightness: state.brightness,
            kelvin: state.kelvin,
        }
    }
}

/// A complete frame: addressing plus message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub source: u32,
    /// All zeroes addresses every bulb.
    pub target: [u8; 8],
    pub sequence: u8,
    pub res_required: bool,
    pub ack_required: bool,
    pub message: Message,
}

impl Packet {
    pub fn new(source: u32, target: [u8; 8], sequence: u8, message: Message) -> Self {
        Packet {
            source,
            target,
            sequence,
            res_required: false,
            ack_required: false,
            message,
        }
    }

    /// Whether the frame is addressed to every bulb.
    pub fn is_tagged(&self) -> bool {
        self.target == [0; 8]
    }

    /// Identifier of the addressed bulb: its MAC as lowercase hex.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifx_bridge_rs::lan::{Message, Packet};
    ///
    /// let packet = Packet::new(1, [0xd0, 0x73, 0xd5, 0, 0, 0x01, 0, 0], 0, Message::LightGet);
    /// assert_eq!(packet.device_id(), "d073d5000001");
    /// ```
    pub fn device_id(&self) -> String {
        self.target[..6].iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + 52);
        buf.extend_from_slice(&0u16.to_le_bytes());

        let mut flags = PROTOCOL | ADDRESSABLE;
        if self.is_tagged() {
            flags |= TAGGED;
        }
        buf.extend_from_slice(&flags.to_le_bytes());
        buf.extend_from_slice(&self.source.to_le_bytes());

        buf.extend_from_slice(&self.target);
        buf.extend_from_slice(&[0u8; 6]);
        let mut required = 0u8;
        if self.res_required {
            required |= RES_REQUIRED;
        }
        if self.ack_required {
            required |= ACK_REQUIRED;
        }
        buf.push(required);
        buf.push(self.sequence);

        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&self.message.kind().to_le_bytes());
        buf.extend_from_slice(&0u16.to_le_bytes());

        self.message.encode_payload(&mut buf);

        let size = buf.len() as u16;
        buf[..2].copy_from_slice(&size.to_le_bytes());
        buf
    }

    pub fn decode(frame: &[u8]) -> Result<Self> {
        if frame.len() < HEADER_SIZE {
            return Err(Error::packet(format!(
                "frame of {} bytes is shorter than the header",
                frame.len()
            )));
        }

        let mut r = Reader::new(frame);
        let size = r.u16()? as usize;
        if size < HEADER_SIZE || size > frame.len() {
            return Err(Error::packet(format!(
                "declared size {size} does not fit a {} byte frame",
                frame.len()
            )));
        }

        let flags = r.u16()?;
        if flags & 0x0fff != PROTOCOL {
            return Err(Error::packet(format!("unsupported protocol {}", flags & 0x0fff)));
        }
        let source = r.u32()?;
        let mut target = [0u8; 8];
        target.copy_from_slice(r.take(8)?);
        r.skip(6)?;
        let required = r.u8()?;
        let sequence = r.u8()?;
        r.skip(8)?;
        let kind = r.u16()?;
        r.skip(2)?;

        let message = Message::decode_payload(kind, &frame[HEADER_SIZE..size])?;
        Ok(Packet {
            source,
            target,
            sequence,
            res_required: required & RES_REQUIRED != 0,
            ack_required: required & ACK_REQUIRED != 0,
            message,
        })
    }
}

/// Parse a MAC given as 12 hex digits into a frame target.
pub fn target_from_id(id: &str) -> Option<[u8; 8]> {
    if id.len() != 12 || !id.is_ascii() {
        return None;
    }
    let mut target = [0u8; 8];
    for (i, slot) in target.iter_mut().take(6).enumerate() {
        *slot = u8::from_str_radix(&id[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(target)
}

/// Labels are cut at 32 bytes, which can split a multi-byte character.
fn decode_label(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos + n;
        let slice = self
            .buf
            .get(self.pos..end)
            .ok_or_else(|| Error::packet(format!("truncated at byte {}", self.pos)))?;
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BULB: [u8; 8] = [0xd0, 0x73, 0xd5, 0x00, 0x00, 0x01, 0, 0];

    #[test]
    fn test_get_service_is_tagged_broadcast() {
        let frame = Packet::new(42, [0; 8], 7, Message::GetService).encode();
        assert_eq!(frame.len(), HEADER_SIZE);
        assert_eq!(u16::from_le_bytes([frame[0], frame[1]]), 36);
        assert_eq!(u16::from_le_bytes([frame[2], frame[3]]), 0x3400);
        assert_eq!(u32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]), 42);
        assert_eq!(frame[23], 7);
        assert_eq!(u16::from_le_bytes([frame[32], frame[33]]), 2);
    }

    #[test]
    fn test_set_color_layout() {
        let color = Hsbk {
            hue: 10000,
            saturation: 65535,
            brightness: 32768,
            kelvin: 5500,
        };
        let frame = Packet::new(1, BULB, 0, Message::LightSetColor {
            color,
            duration_ms: 0,
        })
        .encode();
        assert_eq!(frame.len(), HEADER_SIZE + 13);
        assert_eq!(u16::from_le_bytes([frame[2], frame[3]]), 0x1400);
        assert_eq!(&frame[8..14], &BULB[..6]);
        assert_eq!(u16::from_le_bytes([frame[37], frame[38]]), 10000);
        assert_eq!(u16::from_le_bytes([frame[43], frame[44]]), 5500);
    }

    #[test]
    fn test_light_state_decode() {
        let mut packet = Packet::new(9, BULB, 3, Message::LightState {
            color: Hsbk {
                hue: 1,
                saturation: 2,
                brightness: 3,
                kelvin: 3500,
            },
            power: 65535,
            label: "Kitchen".to_string(),
        });
        packet.res_required = true;
        let frame = packet.encode();
        assert_eq!(frame.len(), HEADER_SIZE + 52);

        let decoded = Packet::decode(&frame).unwrap();
        assert_eq!(decoded, packet);
        assert_eq!(decoded.device_id(), "d073d5000001");
    }

    #[test]
    fn test_light_state_split_label() {
        let mut frame = Packet::new(9, BULB, 3, Message::LightState {
            color: Hsbk {
                hue: 10,
                saturation: 20,
                brightness: 30,
                kelvin: 2700,
            },
            power: 0,
            label: String::new(),
        })
        .encode();
        // label starts after color (8), reserved (2) and power (2)
        let label_at = HEADER_SIZE + 12;
        frame[label_at..label_at + 3].copy_from_slice(b"Hal");
        frame[label_at + 3..label_at + 5].copy_from_slice(&[0xe2, 0x82]);

        match Packet::decode(&frame).unwrap().message {
            Message::LightState { color, power, label } => {
                assert_eq!(color.kelvin, 2700);
                assert_eq!(color.brightness, 30);
                assert_eq!(power, 0);
                assert_eq!(label, "Hal\u{fffd}");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_state_service_decode() {
        let frame = Packet::new(9, BULB, 0, Message::StateService {
            service: SERVICE_UDP,
            port: 56700,
        })
        .encode();
        let decoded = Packet::decode(&frame).unwrap();
        assert_eq!(
            decoded.message,
            Message::StateService {
                service: SERVICE_UDP,
                port: 56700
            }
        );
    }

    #[test]
    fn test_decode_rejects_short_frames() {
        assert!(matches!(Packet::decode(&[0u8; 10]), Err(Error::Packet(_))));

        let mut frame = Packet::new(1, BULB, 0, Message::LightStatePower { level: 0 }).encode();
        frame.truncate(HEADER_SIZE + 1);
        assert!(matches!(Packet::decode(&frame), Err(Error::Packet(_))));
    }

    #[test]
    fn test_decode_unknown_message() {
        let frame = Packet::new(1, BULB, 0, Message::Unknown { kind: 45 }).encode();
        assert_eq!(
            Packet::decode(&frame).unwrap().message,
            Message::Unknown { kind: 45 }
        );
    }

    #[test]
    fn test_target_from_id() {
        assert_eq!(target_from_id("d073d5000001"), Some(BULB));
        assert_eq!(target_from_id("d073d50000"), None);
        assert_eq!(target_from_id("zz73d5000001"), None);
    }
}

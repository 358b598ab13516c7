//! Client -> Server packet parsing.

use super::ClientOpcode;
use crate::{BinaryReader, ProtocolError};

/// Parsed client packet.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientPacket {
    PlayerUpdate {
        nick: String,
        skin: String,
        team_tag: String,
    },
    Spectate {
        lock: bool,
        cell_id: u16,
    },
    MouseMove {
        dx: i16,
        dy: i16,
    },
    ToggleFeed(bool),
    /// Split macro; the pending split count becomes `macro + 1`.
    Split(u8),
    /// Opcodes the server accepts but does not act on.
    Ignored(u8),
}

impl ClientPacket {
    /// Parse a client packet from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.is_empty() {
            return Err(ProtocolError::Empty);
        }

        let mut reader = BinaryReader::new(data.to_vec());
        let opcode = reader.read_u8()?;

        match opcode {
            op if op == ClientOpcode::PlayerUpdate as u8 => Ok(ClientPacket::PlayerUpdate {
                nick: reader.read_string(),
                skin: reader.read_string(),
                team_tag: reader.read_string(),
            }),
            op if op == ClientOpcode::Spectate as u8 => Ok(ClientPacket::Spectate {
                lock: reader.read_u8()? != 0,
                cell_id: reader.read_u16()?,
            }),
            op if op == ClientOpcode::MouseMove as u8 => Ok(ClientPacket::MouseMove {
                dx: reader.read_i16()?,
                dy: reader.read_i16()?,
            }),
            op if op == ClientOpcode::ToggleFeed as u8 => {
                Ok(ClientPacket::ToggleFeed(reader.read_u8()? != 0))
            }
            op if op == ClientOpcode::Split as u8 => Ok(ClientPacket::Split(reader.read_u8()?)),
            op if (ClientOpcode::StopMovement as u8..=ClientOpcode::SaveReplay as u8).contains(&op) => {
                Ok(ClientPacket::Ignored(op))
            }
            _ => Err(ProtocolError::InvalidOpcode(opcode)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BinaryWriter;

    #[test]
    fn test_parse_mouse_move() {
        let mut w = BinaryWriter::new();
        w.put_u8(ClientOpcode::MouseMove as u8);
        w.put_i16(-120);
        w.put_i16(45);
        let packet = ClientPacket::parse(w.as_slice()).unwrap();
        assert_eq!(packet, ClientPacket::MouseMove { dx: -120, dy: 45 });
    }

    #[test]
    fn test_parse_player_update() {
        let mut w = BinaryWriter::new();
        w.put_u8(ClientOpcode::PlayerUpdate as u8);
        w.put_string("blob");
        w.put_string("");
        w.put_string("red");
        let packet = ClientPacket::parse(w.as_slice()).unwrap();
        assert_eq!(
            packet,
            ClientPacket::PlayerUpdate {
                nick: "blob".into(),
                skin: String::new(),
                team_tag: "red".into(),
            }
        );
    }

    #[test]
    fn test_truncated_split() {
        let data = [ClientOpcode::Split as u8];
        assert_eq!(ClientPacket::parse(&data), Err(ProtocolError::UnexpectedEof));
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(ClientPacket::parse(&[0x42]), Err(ProtocolError::InvalidOpcode(0x42)));
        assert_eq!(ClientPacket::parse(&[]), Err(ProtocolError::Empty));
        assert_eq!(ClientPacket::parse(&[7]), Ok(ClientPacket::Ignored(7)));
    }
}
